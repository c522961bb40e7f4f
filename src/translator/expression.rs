use std::ops::Range;

use super::rules::starts_statement;
use crate::lexer::{Keyword, LexicalUnit, StringPart, UnitKind};
use crate::reporter::StructuralError;

/// 计算从 `from` 开始的表达式在哪里结束（返回结束位置，不包含）。
///
/// 括号外遇到以下情况表达式结束：新语句的关键字、`Eof`、
/// 换行（除非行尾或下一行开头表明表达式还没写完），
/// 以及 `stop_at_colon` 时的 `:`。
pub fn expression_end(units: &[LexicalUnit], from: usize, stop_at_colon: bool) -> usize {
    let mut depth = 0usize;
    let mut index = from;

    while let Some(unit) = units.get(index) {
        if unit.is_eof() {
            break;
        }
        if depth == 0 {
            if starts_statement(units, index) {
                break;
            }
            if index > from && breaks_line(&units[index - 1], unit) {
                break;
            }
            if stop_at_colon && unit.is_punct(":") {
                break;
            }
        }
        if unit.opening_delimiter().is_some() {
            depth += 1;
        } else if unit.closing_delimiter().is_some() {
            if depth == 0 {
                break;
            }
            depth -= 1;
        }
        index += 1;
    }

    index
}

/// 紧跟在 `keyword` 后面的表达式在哪里结束。
/// 关键字后面直接换行时表达式为空，除非下一行明显是接着写的。
pub fn expression_after(units: &[LexicalUnit], keyword: usize, stop_at_colon: bool) -> usize {
    let from = keyword + 1;
    match units.get(from) {
        Some(first) if breaks_line(&units[keyword], first) => from,
        _ => expression_end(units, from, stop_at_colon),
    }
}

/// 嵌套的 `say`/`melt` 的操作数：到同层的 `,` 或外层的闭合括号为止。
fn operand_end(units: &[LexicalUnit], from: usize, limit: usize) -> usize {
    let mut depth = 0usize;
    let mut index = from;
    while index < limit {
        let unit = &units[index];
        if unit.opening_delimiter().is_some() {
            depth += 1;
        } else if unit.closing_delimiter().is_some() {
            if depth == 0 {
                break;
            }
            depth -= 1;
        } else if depth == 0 && unit.is_punct(",") {
            break;
        }
        index += 1;
    }
    index
}

fn breaks_line(previous: &LexicalUnit, next: &LexicalUnit) -> bool {
    next.line > previous.line && !continues(previous, next)
}

fn continues(previous: &LexicalUnit, next: &LexicalUnit) -> bool {
    let joins = |unit: &LexicalUnit| {
        matches!(
            unit.kind,
            UnitKind::Keyword(Keyword::In | Keyword::Is | Keyword::Isnt | Keyword::And | Keyword::Or)
        )
    };

    previous.kind == UnitKind::Operator
        || previous.is_punct(",")
        || previous.is_punct(".")
        || joins(previous)
        || previous.is_keyword(Keyword::Not)
        || previous.is_keyword(Keyword::New)
        || next.is_punct(".")
        || (next.kind == UnitKind::Operator && !next.is_operator("!"))
        || joins(next)
}

/// 表达式翻译器：逐个单元套用表达式级规则，必要时递归。
pub struct ExprWriter<'a, 'e> {
    units: &'a [LexicalUnit],
    errors: &'e mut Vec<StructuralError>,
}

impl<'a, 'e> ExprWriter<'a, 'e> {
    pub fn new(units: &'a [LexicalUnit], errors: &'e mut Vec<StructuralError>) -> Self {
        Self { units, errors }
    }

    /// 先检查 `units[range]` 是不是一个完整的表达式，再翻译。
    pub fn write_checked(&mut self, range: Range<usize>) -> String {
        self.check(range.clone());
        self.write(range)
    }

    /// 括号外的 `:` 只能结束块的头部；两个操作数之间必须有运算符。
    fn check(&mut self, range: Range<usize>) {
        let units = self.units;
        let mut depth = 0usize;

        for index in range.clone() {
            let unit = &units[index];
            if unit.opening_delimiter().is_some() {
                depth += 1;
            } else if unit.closing_delimiter().is_some() {
                depth = depth.saturating_sub(1);
            } else if depth == 0 && unit.is_punct(":") {
                self.reject(unit, "':' can only end a block header".to_string());
            }

            if index > range.start {
                let previous = &units[index - 1];
                if ends_operand(previous) && starts_operand(unit) {
                    let message = format!(
                        "expected an operator between '{}' and '{}'",
                        previous.text, unit.text
                    );
                    self.reject(unit, message);
                }
            }
        }
    }

    fn reject(&mut self, unit: &LexicalUnit, message: String) {
        self.errors.push(StructuralError::unknown_construct(
            &unit.text,
            message,
            unit.line,
            unit.column,
            unit.span,
        ));
    }

    /// 翻译 `units[range]`。单元之间的空白按源码保留为一个空格。
    pub fn write(&mut self, range: Range<usize>) -> String {
        let units = self.units;
        let mut out = String::new();
        let mut index = range.start;
        let mut previous_end: Option<usize> = None;
        let mut glued = false;

        while index < range.end {
            let unit = &units[index];
            if !glued && previous_end.is_some_and(|end| unit.span.start > end) {
                out.push(' ');
            }

            let (text, consumed) = self.translate(index, range.end);
            out.push_str(&text);

            // `not x` 变成 `!x`
            glued = unit.is_keyword(Keyword::Not);
            previous_end = Some(units[index + consumed - 1].span.end);
            index += consumed;
        }

        out
    }

    /// 翻译位于 `index` 的构造，返回生成的文本与消耗的单元数。
    fn translate(&mut self, index: usize, limit: usize) -> (String, usize) {
        let units = self.units;
        let unit = &units[index];

        match &unit.kind {
            UnitKind::Identifier | UnitKind::Number | UnitKind::Operator => (unit.text.clone(), 1),
            UnitKind::Punctuation => {
                if unit.is_punct(".") {
                    let member = units[..limit].get(index + 1).filter(|u| u.is_identifier());
                    match member.map(|u| u.text.as_str()) {
                        Some("each") => return (".forEach".to_string(), 2),
                        Some("size") => return (".length".to_string(), 2),
                        _ => {}
                    }
                }
                (unit.text.clone(), 1)
            }
            UnitKind::Str(parts) => (self.string(unit, parts), 1),
            UnitKind::Keyword(keyword) => match keyword {
                Keyword::Is => ("===".to_string(), 1),
                Keyword::Isnt => ("!==".to_string(), 1),
                Keyword::And => ("&&".to_string(), 1),
                Keyword::Or => ("||".to_string(), 1),
                Keyword::Not => ("!".to_string(), 1),
                Keyword::Array => ("[]".to_string(), 1),
                Keyword::This => ("this".to_string(), 1),
                Keyword::In => ("in".to_string(), 1),
                Keyword::ItsCold => ("true".to_string(), 1),
                Keyword::New => self.construction(index, limit),
                Keyword::Say => {
                    let end = operand_end(units, index + 1, limit);
                    let operand = self.write(index + 1..end);
                    (format!("console.log({operand})"), end - index)
                }
                Keyword::Melt => {
                    let end = operand_end(units, index + 1, limit);
                    let operand = self.write(index + 1..end);
                    (format!("delete {operand}"), end - index)
                }
                Keyword::Snowball
                | Keyword::Freeze
                | Keyword::Else
                | Keyword::ElseIf
                | Keyword::Return
                | Keyword::Wait => (self.internal(unit), 1),
            },
            UnitKind::BlockOpen(_) | UnitKind::BlockClose | UnitKind::Eof => {
                (self.internal(unit), 1)
            }
        }
    }

    /// `new Name` 没有参数列表时补上 `()`。
    fn construction(&mut self, index: usize, limit: usize) -> (String, usize) {
        let units = &self.units[..limit];
        let Some(class) = units.get(index + 1).filter(|u| u.is_identifier()) else {
            return ("new".to_string(), 1);
        };
        let has_arguments = units.get(index + 2).is_some_and(|u| u.is_punct("("));
        if has_arguments {
            ("new".to_string(), 1)
        } else {
            (format!("new {}()", class.text), 2)
        }
    }

    /// 没有插值的字符串原样输出；有插值的变成模板字符串。
    fn string(&mut self, unit: &LexicalUnit, parts: &[StringPart]) -> String {
        if unit.interpolations().next().is_none() {
            return unit.text.clone();
        }

        let mut out = String::from("`");
        for part in parts {
            match part {
                StringPart::Text(text) => out.push_str(&escape_template(text)),
                StringPart::Interpolation(nested) => {
                    let mut writer = ExprWriter::new(nested, self.errors);
                    let inner = writer.write_checked(0..nested.len());
                    out.push_str("${");
                    out.push_str(&inner);
                    out.push('}');
                }
            }
        }
        out.push('`');
        out
    }

    fn internal(&mut self, unit: &LexicalUnit) -> String {
        self.errors.push(StructuralError::internal(
            format!("no expression rule for {}", unit.describe()),
            unit.line,
            unit.column,
            unit.span,
        ));
        String::new()
    }
}

fn ends_operand(unit: &LexicalUnit) -> bool {
    match &unit.kind {
        UnitKind::Identifier | UnitKind::Number | UnitKind::Str(_) => true,
        UnitKind::Keyword(keyword) => {
            matches!(keyword, Keyword::This | Keyword::Array | Keyword::ItsCold)
        }
        UnitKind::Punctuation => unit.closing_delimiter().is_some(),
        _ => false,
    }
}

fn starts_operand(unit: &LexicalUnit) -> bool {
    match &unit.kind {
        UnitKind::Identifier | UnitKind::Number | UnitKind::Str(_) => true,
        UnitKind::Keyword(keyword) => matches!(
            keyword,
            Keyword::This | Keyword::Array | Keyword::ItsCold | Keyword::New | Keyword::Not
        ),
        _ => false,
    }
}

fn escape_template(text: &str) -> String {
    text.replace('`', "\\`").replace("${", "\\${")
}
