// src/diagnostics/codes.rs

use crate::reporter::ErrorKind;

/// 一个错误码及其说明。所有诊断信息的唯一来源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode {
    pub code: &'static str,
    pub message: &'static str,
    pub explanation: &'static str,
}

/*
E00xx: 词法错误。

E01xx: 块结构错误。

E03xx: 代码生成错误。
*/
// --- E00xx: Lexical Errors ---

pub const E0001_UNKNOWN_CONSTRUCT: ErrorCode = ErrorCode {
    code: "E0001",
    message: "Unknown construct",
    explanation: "The compiler found a character or keyword sequence that is not part of the Olaf dialect, \
                  or a construct written in a place where it has no meaning (an `else` outside an `if`, \
                  a block keyword inside brackets, a header without its `:`)."
};

// --- E01xx: Block Structure Errors ---

pub const E0100_UNMATCHED_END: ErrorCode = ErrorCode {
    code: "E0100",
    message: "Unmatched `end`",
    explanation: "Every `end` closes the most recently opened `build`, `snowman`, `if`, `keep` or `for each` block. \
                  This `end` was reached when no block was open. Remove it, or check whether an earlier `end` closed the block too soon."
};

pub const E0101_UNCLOSED_BLOCK: ErrorCode = ErrorCode {
    code: "E0101",
    message: "Unclosed block",
    explanation: "A block was opened but the file ended before a matching `end` was found. \
                  Add an `end` after the last statement of the block."
};

pub const E0102_UNBALANCED_DELIMITER: ErrorCode = ErrorCode {
    code: "E0102",
    message: "Unbalanced delimiter",
    explanation: "Parentheses, brackets and braces must be closed in the reverse order they were opened, \
                  and must be closed before the statement ends."
};

// --- E03xx: Code Generation Errors ---

pub const E0300_INTERNAL_GENERATOR_ERROR: ErrorCode = ErrorCode {
    code: "E0300",
    message: "Internal generator error",
    explanation: "The code generator met a unit it has no rule for. Validation should have rejected the input first, \
                  so this indicates a bug in the Olaf compiler itself. Please report it with the source that caused it."
};

/// 每种错误对应的错误码。
pub fn code_for(kind: &ErrorKind) -> &'static ErrorCode {
    match kind {
        ErrorKind::UnknownConstruct { .. } => &E0001_UNKNOWN_CONSTRUCT,
        ErrorKind::UnmatchedEnd => &E0100_UNMATCHED_END,
        ErrorKind::UnclosedBlock { .. } => &E0101_UNCLOSED_BLOCK,
        ErrorKind::UnbalancedDelimiter { .. } => &E0102_UNBALANCED_DELIMITER,
        ErrorKind::Internal => &E0300_INTERNAL_GENERATOR_ERROR,
    }
}
