//! 块结构校验。
//!
//! 一次遍历收集所有结构性错误：`end` 与开启关键字的配对、`else` 的位置、
//! 括号的平衡，以及只能出现在语句开头的关键字有没有跑进表达式里。

mod frame;
#[cfg(test)]
mod test;

pub use frame::{BlockFrame, BlockStack};

use crate::lexer::{self, Keyword, LexicalUnit, UnitKind};
use crate::reporter::StructuralError;
use crate::utils::Span;
use tracing::debug;

/// 校验单元序列。单元本身原样返回，只有错误集合为空时才应交给代码生成。
pub fn validate(units: Vec<LexicalUnit>) -> (Vec<LexicalUnit>, Vec<StructuralError>) {
    let mut validator = Validator::new(false);
    for index in 0..units.len() {
        validator.visit(&units, index);
    }
    let errors = validator.finish();

    debug!(units = units.len(), errors = errors.len(), "validated block structure");
    (units, errors)
}

/// 一个未闭合的括号。
#[derive(Debug)]
struct OpenDelimiter {
    opener: char,
    closer: char,
    line: usize,
    column: usize,
    span: Span,
}

struct Validator {
    blocks: BlockStack,
    delimiters: Vec<OpenDelimiter>,
    /// 正在校验字符串插值，整个片段都算表达式。
    in_interpolation: bool,
    errors: Vec<StructuralError>,
}

impl Validator {
    fn new(in_interpolation: bool) -> Self {
        Self {
            blocks: BlockStack::new(),
            delimiters: Vec::new(),
            in_interpolation,
            errors: Vec::new(),
        }
    }

    fn inside_expression(&self) -> bool {
        self.in_interpolation || !self.delimiters.is_empty()
    }

    fn visit(&mut self, units: &[LexicalUnit], index: usize) {
        let unit = &units[index];

        for nested in unit.interpolations() {
            self.check_interpolation(nested);
        }

        match &unit.kind {
            UnitKind::Punctuation => self.delimiter(unit),
            UnitKind::BlockOpen(opener) => {
                if self.inside_expression() {
                    self.misplaced(unit);
                    return;
                }
                let header = header_text(units, index);
                self.blocks.push(BlockFrame::new(
                    *opener,
                    header,
                    unit.line,
                    unit.column,
                    unit.span,
                ));
            }
            UnitKind::BlockClose => {
                if self.inside_expression() {
                    self.misplaced(unit);
                } else if self.blocks.pop().is_none() {
                    self.errors.push(StructuralError::unmatched_end(
                        unit.line,
                        unit.column,
                        unit.span,
                    ));
                }
            }
            UnitKind::Keyword(keyword) if keyword.is_statement_only() => {
                if self.inside_expression() {
                    self.misplaced(unit);
                } else if matches!(keyword, Keyword::Else | Keyword::ElseIf) {
                    self.else_clause(*keyword, unit);
                }
            }
            _ => {}
        }
    }

    fn delimiter(&mut self, unit: &LexicalUnit) {
        if let Some(closer) = unit.opening_delimiter() {
            self.delimiters.push(OpenDelimiter {
                opener: unit.text.chars().next().unwrap_or_default(),
                closer,
                line: unit.line,
                column: unit.column,
                span: unit.span,
            });
            return;
        }

        let Some(found) = unit.closing_delimiter() else {
            return;
        };
        match self.delimiters.pop() {
            Some(open) if open.closer == found => {}
            Some(open) => self.errors.push(StructuralError::unbalanced_delimiter(
                found,
                format!(
                    "expected '{}' to close '{}' from line {}, found '{}'",
                    open.closer, open.opener, open.line, found
                ),
                unit.line,
                unit.column,
                unit.span,
            )),
            None => self.errors.push(StructuralError::unbalanced_delimiter(
                found,
                format!("'{found}' has no matching opening delimiter"),
                unit.line,
                unit.column,
                unit.span,
            )),
        }
    }

    fn else_clause(&mut self, keyword: Keyword, unit: &LexicalUnit) {
        let message = match self.blocks.top_mut() {
            Some(frame) if frame.opener == lexer::Opener::If => {
                if !frame.has_else {
                    frame.has_else = keyword == Keyword::Else;
                    return;
                }
                format!(
                    "'{}' follows the final 'else' of '{}' (line {})",
                    keyword, frame.opener_text, frame.line
                )
            }
            _ => format!("'{keyword}' without an enclosing 'if' block"),
        };
        self.errors.push(StructuralError::unknown_construct(
            &unit.text,
            message,
            unit.line,
            unit.column,
            unit.span,
        ));
    }

    fn misplaced(&mut self, unit: &LexicalUnit) {
        let message = if self.in_interpolation {
            format!("'{}' cannot appear inside a string interpolation", unit.text)
        } else {
            format!("'{}' cannot appear inside brackets", unit.text)
        };
        self.errors.push(StructuralError::unknown_construct(
            &unit.text,
            message,
            unit.line,
            unit.column,
            unit.span,
        ));
    }

    /// 插值片段用一个独立的校验器检查，片段内的括号必须自成一体。
    fn check_interpolation(&mut self, nested: &[LexicalUnit]) {
        let mut validator = Validator::new(true);
        for index in 0..nested.len() {
            validator.visit(nested, index);
        }
        let errors = validator.finish();
        self.errors.extend(errors);
    }

    fn finish(mut self) -> Vec<StructuralError> {
        for open in self.delimiters.drain(..).rev() {
            self.errors.push(StructuralError::unbalanced_delimiter(
                open.opener,
                format!("'{}' is never closed", open.opener),
                open.line,
                open.column,
                open.span,
            ));
        }
        for frame in self.blocks.drain_innermost_first() {
            self.errors.push(StructuralError::unclosed_block(
                &frame.opener_text,
                frame.line,
                frame.column,
                frame.span,
            ));
        }
        self.errors
    }
}

/// 开启语句的原文：从关键字到同一行第一个不在括号里的 `:`（包含）。
/// 没有 `:` 时取到行尾。
pub(crate) fn header_text(units: &[LexicalUnit], start: usize) -> String {
    lexer::spell(&units[start..header_end(units, start)])
}

/// 开启语句的头部结束的位置（不包含）。
pub(crate) fn header_end(units: &[LexicalUnit], start: usize) -> usize {
    let line = units[start].line;
    let mut depth = 0usize;
    let mut end = start + 1;

    for (index, unit) in units.iter().enumerate().skip(start + 1) {
        if unit.is_eof() || unit.line != line {
            break;
        }
        end = index + 1;
        if unit.opening_delimiter().is_some() {
            depth += 1;
        } else if unit.closing_delimiter().is_some() {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && unit.is_punct(":") {
            break;
        }
    }

    end
}
