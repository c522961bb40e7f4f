use super::*;

#[test]
fn test_line_comment_is_blanked() {
    let source = "say 1 // hello\nsay 2";
    let out = preprocess(source);
    assert_eq!(out, "say 1         \nsay 2");
    assert_eq!(out.len(), source.len());
}

#[test]
fn test_block_comment_keeps_newlines() {
    let source = "say 1 /* one\ntwo */ say 2";
    let out = preprocess(source);
    assert_eq!(out.lines().count(), 2);
    assert_eq!(out.len(), source.len());
    assert!(out.ends_with("say 2"));
    assert!(!out.contains("two"));
}

#[test]
fn test_comment_markers_inside_strings_survive() {
    let source = r#"say "http://example.com /* not */""#;
    assert_eq!(preprocess(source), source);
}

#[test]
fn test_escaped_quote_does_not_end_string() {
    let source = r#"say "a \" // still string" // gone"#;
    let out = preprocess(source);
    assert!(out.contains("// still string"));
    assert!(!out.contains("gone"));
}

#[test]
fn test_unterminated_block_comment_blanks_to_end() {
    let out = preprocess("say 1 /* never\nclosed");
    assert_eq!(out.trim_end(), "say 1");
    assert_eq!(out.matches('\n').count(), 1);
}

#[test]
fn test_unterminated_block_comment_is_reported() {
    let result = scan("say 1\n  /* never\nend");
    assert_eq!(result.open_comment, Some(8));

    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!((errors[0].line, errors[0].column), (2, 3));
    assert!(errors[0].message.contains("'*/'"));
}

#[test]
fn test_closed_comments_report_nothing() {
    let result = scan("say 1 /* a */ // b");
    assert_eq!(result.open_comment, None);
    assert!(result.errors().is_empty());
}

#[test]
fn test_line_endings_are_normalized() {
    assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
    assert_eq!(preprocess("say 1\r\n// x\r\nsay 2"), "say 1\n    \nsay 2");
}

#[test]
fn test_multibyte_comment_text_keeps_byte_length() {
    let source = "say 1 // ❄ snow";
    assert_eq!(preprocess(source).len(), source.len());
}
