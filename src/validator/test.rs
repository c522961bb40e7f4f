use super::*;
use crate::lexer::tokenize;
use crate::reporter::ErrorKind;

/// 词法分析后直接校验，要求词法阶段没有错误。
fn check(source: &str) -> Vec<StructuralError> {
    let (units, lexer_errors) = tokenize(source);
    assert!(lexer_errors.is_empty(), "Lexing failed: {:?}", lexer_errors);
    let (_units, errors) = validate(units);
    errors
}

#[test]
fn test_balanced_blocks_have_no_errors() {
    assert!(check("build greet: say \"hi\" end").is_empty());
    assert!(check("build outer: if true: say \"yes\" end end").is_empty());
    assert!(check("snowman Elsa:\n build sing(): say 1 end\nend").is_empty());
    assert!(check("keep x < 3: x += 1 end for each i in xs: say i end").is_empty());
}

#[test]
fn test_units_pass_through_unchanged() {
    let (units, _) = tokenize("build f: end");
    let expected = units.clone();
    let (returned, errors) = validate(units);
    assert!(errors.is_empty());
    assert_eq!(returned, expected);
}

#[test]
fn test_missing_end_names_opener_and_line() {
    let errors = check("build f: say \"hi\"");
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].kind,
        ErrorKind::UnclosedBlock {
            opener: "build f:".to_string(),
            line: 1
        }
    );
    assert_eq!(errors[0].line, 1);
}

#[test]
fn test_lonely_end_is_unmatched() {
    let errors = check("end");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::UnmatchedEnd);
    assert_eq!(errors[0].line, 1);
}

#[test]
fn test_all_errors_are_collected_in_one_pass() {
    let source = "end\nbuild a:\n  if x:\nend\nend\nend\nkeep y:";
    let errors = check(source);
    let kinds: Vec<_> = errors.iter().map(|e| e.kind.name()).collect();
    // 第 1 行与第 6 行的 end 多余，第 7 行的 keep 没有闭合
    assert_eq!(kinds, vec!["UnmatchedEnd", "UnmatchedEnd", "UnclosedBlock"]);
    assert_eq!(errors[0].line, 1);
    assert_eq!(errors[1].line, 6);
    assert_eq!(errors[2].line, 7);
}

#[test]
fn test_every_unclosed_frame_is_reported() {
    let errors = check("build outer(a, b):\n  keep a:\n    if b:");
    assert_eq!(errors.len(), 3);
    let openers: Vec<_> = errors
        .iter()
        .map(|e| match &e.kind {
            ErrorKind::UnclosedBlock { opener, line } => (opener.as_str(), *line),
            other => panic!("unexpected error {:?}", other),
        })
        .collect();
    assert_eq!(
        openers,
        vec![("if b:", 3), ("keep a:", 2), ("build outer(a, b):", 1)]
    );
}

#[test]
fn test_header_text_without_colon_runs_to_line_end() {
    let errors = check("snowman Olaf\nsay 1");
    assert_eq!(
        errors[0].kind,
        ErrorKind::UnclosedBlock {
            opener: "snowman Olaf".to_string(),
            line: 1
        }
    );
}

#[test]
fn test_else_must_belong_to_if() {
    assert!(check("if a: say 1 else if b: say 2 else: say 3 end").is_empty());

    let errors = check("keep a: else: end");
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0].kind,
        ErrorKind::UnknownConstruct { text, .. } if text == "else"
    ));

    let errors = check("else:");
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_nothing_may_follow_final_else() {
    let errors = check("if a: say 1 else: say 2 else if b: say 3 end");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("final 'else'"));
}

#[test]
fn test_else_inside_nested_block_is_checked_against_innermost() {
    // else 属于内层的 keep，而不是外层的 if
    let errors = check("if a: keep b: else: end end");
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_unbalanced_delimiters() {
    let errors = check("say (1 + 2");
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].kind,
        ErrorKind::UnbalancedDelimiter {
            delimiter: '(',
            line: 1
        }
    );

    let errors = check("say 1)");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("no matching"));

    let errors = check("say [1, 2)");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("expected ']'"));
}

#[test]
fn test_block_keywords_inside_brackets_are_rejected() {
    let errors = check("build f: foo(end) end");
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0].kind,
        ErrorKind::UnknownConstruct { text, .. } if text == "end"
    ));

    let errors = check("items.each(x => return x)");
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_expression_keywords_inside_brackets_are_fine() {
    assert!(check("items.each(item => say item)").is_empty());
    assert!(check("say [array, new Thing, this.size]").is_empty());
}

#[test]
fn test_interpolation_is_expression_only() {
    let (units, _) = tokenize(r##"say "#{end}""##);
    let (_units, errors) = validate(units);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("interpolation"));

    let (units, _) = tokenize(r##"say "#{(a}""##);
    let (_units, errors) = validate(units);
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].kind,
        ErrorKind::UnbalancedDelimiter {
            delimiter: '(',
            line: 1
        }
    );
}

#[test]
fn test_balance_invariant_over_generated_nesting() {
    // 任意深度的正确嵌套都不会产生错误
    let openers = ["build f:", "if x:", "keep y:", "for each i in xs:", "snowman S:"];
    for depth in 1..=openers.len() {
        let mut source = String::new();
        for opener in openers.iter().take(depth) {
            source.push_str(opener);
            source.push('\n');
        }
        source.push_str("say 1\n");
        for _ in 0..depth {
            source.push_str("end\n");
        }
        assert!(check(&source).is_empty(), "depth {depth} failed:\n{source}");
    }
}

#[test]
fn test_wait_is_statement_only() {
    assert!(check("build f:\n  wait\nend").is_empty());

    let errors = check("build f:\n  items.each(x => wait)\nend");
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0].kind,
        ErrorKind::UnknownConstruct { text, line: 2 } if text == "wait"
    ));

    let (units, _) = tokenize(r##"say "#{wait}""##);
    let (_units, errors) = validate(units);
    assert_eq!(errors.len(), 1);
}
