pub mod diagnostics;
pub mod lexer;
pub mod options;
pub mod preprocess;
pub mod reporter;
pub mod translator;
pub mod validator;
mod utils;

pub use options::Options;
pub use reporter::{ErrorKind, StructuralError};
pub use utils::Span;

use diagnostics::Diagnostics;
use tracing::debug;

/// 使用默认选项把 Olaf 源码编译成 JavaScript。
///
/// # Returns
/// * `Ok(String)` 包含生成的 JavaScript。
/// * `Err(Vec<StructuralError>)` 包含所有遇到的结构性错误，按位置排序。
pub fn compile(source: &str) -> Result<String, Vec<StructuralError>> {
    compile_with(source, &Options::default())
}

/// 与 [`compile`] 相同，但使用给定的选项。
/// 所有状态都是这次调用的局部变量，可以在任意线程上并发调用。
pub fn compile_with(source: &str, options: &Options) -> Result<String, Vec<StructuralError>> {
    let mut diagnostics = Diagnostics::new();

    // 1. 预处理
    let preprocessed = preprocess::scan(source);
    diagnostics.extend(preprocessed.errors());

    // 2. 词法分析
    // lexer 总是返回一个以 Eof 结尾的单元序列，即使有错误。
    let (units, lexer_errors) = lexer::tokenize(&preprocessed.text);
    diagnostics.extend(lexer_errors);

    // 3. 块校验
    // 即使有词法错误也继续校验，一次报告尽可能多的问题。
    let (units, validator_errors) = validator::validate(units);
    diagnostics.extend(validator_errors);

    // 任何错误都不生成代码
    if diagnostics.has_errors() {
        debug!(errors = diagnostics.len(), "compilation failed before generation");
    }
    diagnostics.finish()?;

    // 4. 代码生成
    translator::generate(&units, options)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_comments_do_not_shift_lines() {
        let source = "/* a\n   b */ build f:\n  say 1 // done\n";
        let errors = compile(source).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].kind,
            ErrorKind::UnclosedBlock {
                opener: "build f:".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn test_unclosed_block_comment_fails() {
        let errors = compile("/* abc\nend").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0].kind,
            ErrorKind::UnknownConstruct { text, line: 1 } if text == "/*"
        ));
    }

    #[test]
    fn test_all_stages_report_together_in_order() {
        let source = "end\nsay @\nbuild g:";
        let errors = compile(source).unwrap_err();
        let kinds: Vec<_> = errors.iter().map(|e| (e.kind.name(), e.line)).collect();
        assert_eq!(
            kinds,
            vec![
                ("UnmatchedEnd", 1),
                ("UnknownConstruct", 2),
                ("UnclosedBlock", 3)
            ]
        );
    }

    #[test]
    fn test_crlf_and_comments_compile() {
        let source = "build greet: // hello\r\n  say \"hi\"\r\nend\r\n";
        assert_eq!(
            compile(source).unwrap(),
            "function greet() {\n  console.log(\"hi\");\n}\n"
        );
    }

    #[test]
    fn test_repeated_calls_share_no_state() {
        // 失败的调用不影响之后的调用
        assert!(compile("build f:").is_err());
        assert_eq!(compile("say 1").unwrap(), "console.log(1);\n");
        assert!(compile("end").is_err());
        assert_eq!(compile("say 1").unwrap(), "console.log(1);\n");
    }

    #[test]
    fn test_concurrent_calls() {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    let source = format!("build f{i}:\n  say {i}\nend");
                    compile(&source)
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let js = handle.join().unwrap().unwrap();
            assert_eq!(js, format!("function f{i}() {{\n  console.log({i});\n}}\n"));
        }
    }

    #[test]
    fn test_options_flow_through() {
        let options = Options::new().with_indent_width(0).with_wait_millis(5);
        let js = compile_with("build f:\n  wait\nend", &options).unwrap();
        assert_eq!(
            js,
            "async function f() {\nawait new Promise(resolve => setTimeout(resolve, 5));\n}\n"
        );
    }
}
