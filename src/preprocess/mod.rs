//! 预处理：统一换行符并抹掉注释。
//!
//! 注释被替换成等长（按字节）的空格，换行原样保留，
//! 所以后续阶段报告的行号和字节偏移都与原文一致。

#[cfg(test)]
mod test;

use crate::reporter::StructuralError;
use crate::utils::{LineIndex, Span};

/// 把 `\r\n` 与单独的 `\r` 统一成 `\n`。
pub fn normalize_line_endings(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Str,
    LineComment,
    BlockComment,
}

/// 预处理的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    /// 注释已抹掉的文本。
    pub text: String,
    /// 没有闭合的 `/*` 的字节位置。
    pub open_comment: Option<usize>,
}

impl Preprocessed {
    /// 未闭合的块注释报告为一个错误，位置指向 `/*`。
    pub fn errors(&self) -> Vec<StructuralError> {
        let Some(start) = self.open_comment else {
            return Vec::new();
        };
        let (line, column) = LineIndex::new(&self.text).position(start);
        vec![StructuralError::unknown_construct(
            "/*",
            "block comment is never closed with '*/'",
            line,
            column,
            Span::new(start, start + 2),
        )]
    }
}

/// 去掉 `// ...` 单行注释和 `/* ... */` 块注释（不嵌套）。
/// 字符串字面量里的注释标记不算注释。
pub fn preprocess(raw: &str) -> String {
    scan(raw).text
}

/// 与 [`preprocess`] 相同，同时记下没有闭合的块注释。
pub fn scan(raw: &str) -> Preprocessed {
    let text = normalize_line_endings(raw);
    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut comment_start = 0;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match (c, chars.peek()) {
                ('/', Some('/')) => {
                    chars.next();
                    out.push_str("  ");
                    state = State::LineComment;
                }
                ('/', Some('*')) => {
                    chars.next();
                    comment_start = out.len();
                    out.push_str("  ");
                    state = State::BlockComment;
                }
                ('"', _) => {
                    out.push(c);
                    state = State::Str;
                }
                _ => out.push(c),
            },
            State::Str => {
                out.push(c);
                match c {
                    '\\' => {
                        // 转义字符原样保留，包括 `\"`
                        if let Some(&next) = chars.peek() {
                            if next != '\n' {
                                out.push(next);
                                chars.next();
                            }
                        }
                    }
                    // 字符串不跨行，未闭合的字符串交给词法分析报告
                    '"' | '\n' => state = State::Code,
                    _ => {}
                }
            }
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    blank(&mut out, c);
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else if c == '\n' {
                    out.push('\n');
                } else {
                    blank(&mut out, c);
                }
            }
        }
    }

    Preprocessed {
        text: out,
        open_comment: (state == State::BlockComment).then_some(comment_start),
    }
}

fn blank(out: &mut String, c: char) {
    for _ in 0..c.len_utf8() {
        out.push(' ');
    }
}
