pub mod codes;


use crate::reporter::StructuralError;
use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use codes::code_for;
use std::ops::Range;

/// 一次编译调用内部的错误收集器。
/// 每次调用新建一个，不在调用之间共享。
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<StructuralError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, error: StructuralError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = StructuralError>) {
        self.errors.extend(errors);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// 有任何错误就失败，错误按源码位置排序。
    /// 排序是稳定的：同一位置的错误保持报告顺序。
    pub fn finish(mut self) -> Result<(), Vec<StructuralError>> {
        if self.errors.is_empty() {
            return Ok(());
        }
        self.errors.sort_by_key(|error| (error.line, error.column));
        Err(self.errors)
    }
}

// --- Printer 打印逻辑 ---

/// 把所有错误渲染成带源码片段的文本，不带颜色。
/// `source` 应当是换行已经规范化过的原文，这样行号与 span 才对得上。
pub fn render(file_name: &str, source: &str, errors: &[StructuralError]) -> String {
    let cache = (file_name, Source::from(source));
    let mut out = Vec::new();

    for error in errors {
        let code = code_for(&error.kind);
        let range = char_range(source, error.span.into_range());

        let report = Report::build(ReportKind::Error, (file_name, range.clone()))
            .with_config(Config::default().with_color(false))
            .with_code(code.code)
            .with_message(code.message)
            .with_label(
                Label::new((file_name, range))
                    .with_message(&error.message)
                    .with_color(Color::Red),
            )
            .with_note(code.explanation)
            .finish();

        if report.write(cache.clone(), &mut out).is_err() {
            // 写入内存缓冲区不会失败，失败时退回到一行的形式
            out.extend_from_slice(format!("error[{}]: {}\n", code.code, error).as_bytes());
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// ariadne 按字符计数，把字节范围换算成字符范围。
fn char_range(source: &str, bytes: Range<usize>) -> Range<usize> {
    let to_chars = |offset: usize| {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        source[..offset].chars().count()
    };
    to_chars(bytes.start)..to_chars(bytes.end)
}
