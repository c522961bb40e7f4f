//! 编译器的结构化错误定义。
//! 词法、块校验、代码生成三个阶段报告的错误都统一为 `StructuralError`。

use crate::utils::Span;
use thiserror::Error;

/// 结构性错误的种类。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// 没有对应开启关键字的 `end`。
    UnmatchedEnd,

    /// 直到文件末尾都没有被 `end` 关闭的块。
    UnclosedBlock { opener: String, line: usize },

    /// 无法识别的字符或单元序列。
    UnknownConstruct { text: String, line: usize },

    /// 未闭合或多余的括号。
    UnbalancedDelimiter { delimiter: char, line: usize },

    /// 代码生成器遇到了没有对应规则的单元。
    /// 只要校验通过就不应该出现。
    Internal,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::UnmatchedEnd => "UnmatchedEnd",
            ErrorKind::UnclosedBlock { .. } => "UnclosedBlock",
            ErrorKind::UnknownConstruct { .. } => "UnknownConstruct",
            ErrorKind::UnbalancedDelimiter { .. } => "UnbalancedDelimiter",
            ErrorKind::Internal => "Internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct StructuralError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

impl StructuralError {
    pub fn unmatched_end(line: usize, column: usize, span: Span) -> Self {
        Self {
            kind: ErrorKind::UnmatchedEnd,
            message: "'end' does not close any open block".to_string(),
            line,
            column,
            span,
        }
    }

    pub fn unclosed_block(opener: &str, line: usize, column: usize, span: Span) -> Self {
        Self {
            kind: ErrorKind::UnclosedBlock {
                opener: opener.to_string(),
                line,
            },
            message: format!("'{opener}' is never closed with 'end'"),
            line,
            column,
            span,
        }
    }

    pub fn unknown_construct(
        text: &str,
        message: impl Into<String>,
        line: usize,
        column: usize,
        span: Span,
    ) -> Self {
        Self {
            kind: ErrorKind::UnknownConstruct {
                text: text.to_string(),
                line,
            },
            message: message.into(),
            line,
            column,
            span,
        }
    }

    pub fn unbalanced_delimiter(
        delimiter: char,
        message: impl Into<String>,
        line: usize,
        column: usize,
        span: Span,
    ) -> Self {
        Self {
            kind: ErrorKind::UnbalancedDelimiter { delimiter, line },
            message: message.into(),
            line,
            column,
            span,
        }
    }

    pub fn internal(message: impl Into<String>, line: usize, column: usize, span: Span) -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: message.into(),
            line,
            column,
            span,
        }
    }
}
