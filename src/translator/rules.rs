//! 翻译规则的选择。
//!
//! 每个位置只看单元种类加上最多两个单元的前瞻，用一个穷尽的 `match`
//! 决定适用哪条规则。新增关键字时编译器会强制这里同步更新。

use crate::lexer::{Keyword, LexicalUnit, Opener, UnitKind};

/// 光标处适用的语句级翻译规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    /// `build NAME(params):`
    FunctionDecl,
    /// `snowman NAME:`
    ClassDecl,
    /// `if COND:`
    Conditional,
    /// `else if COND:`
    ElseIfBranch,
    /// `else:`
    ElseBranch,
    /// `keep COND:`
    Loop,
    /// `for each ITEM in COLLECTION:`
    Iteration,
    /// `end`
    BlockEnd,
    /// `snowball NAME = EXPR`
    MutableBinding,
    /// `freeze NAME = EXPR`
    ImmutableBinding,
    /// `array NAME = EXPR`
    ArrayBinding,
    /// `say EXPR`
    Print,
    /// `return EXPR`
    Return,
    /// `wait`
    Wait,
    /// `melt EXPR`
    Melt,
    /// 其余所有以表达式开头的语句
    ExpressionStatement,
    EndOfInput,
}

impl Construct {
    /// 根据光标处的窗口选出唯一适用的规则。`window` 从光标开始，以 `Eof` 结尾。
    pub fn classify(window: &[LexicalUnit]) -> Construct {
        let Some(first) = window.first() else {
            return Construct::EndOfInput;
        };

        match &first.kind {
            UnitKind::Eof => Construct::EndOfInput,
            UnitKind::BlockOpen(opener) => match opener {
                Opener::Build => Construct::FunctionDecl,
                Opener::Snowman => Construct::ClassDecl,
                Opener::If => Construct::Conditional,
                Opener::Keep => Construct::Loop,
                Opener::ForEach => Construct::Iteration,
            },
            UnitKind::BlockClose => Construct::BlockEnd,
            UnitKind::Keyword(keyword) => match keyword {
                Keyword::Snowball => Construct::MutableBinding,
                Keyword::Freeze => Construct::ImmutableBinding,
                Keyword::Say => Construct::Print,
                Keyword::Else => Construct::ElseBranch,
                Keyword::ElseIf => Construct::ElseIfBranch,
                Keyword::Return => Construct::Return,
                Keyword::Wait => Construct::Wait,
                Keyword::Melt => Construct::Melt,
                Keyword::Array if is_array_binding(window, 0) => Construct::ArrayBinding,
                Keyword::Array
                | Keyword::New
                | Keyword::This
                | Keyword::In
                | Keyword::Is
                | Keyword::Isnt
                | Keyword::And
                | Keyword::Or
                | Keyword::Not
                | Keyword::ItsCold => Construct::ExpressionStatement,
            },
            UnitKind::Identifier
            | UnitKind::Number
            | UnitKind::Str(_)
            | UnitKind::Operator
            | UnitKind::Punctuation => Construct::ExpressionStatement,
        }
    }
}

/// `array` 后面紧跟同一行的标识符，是声明而不是空数组字面量。
pub fn is_array_binding(units: &[LexicalUnit], index: usize) -> bool {
    let Some(array) = units.get(index) else {
        return false;
    };
    array.is_keyword(Keyword::Array)
        && units
            .get(index + 1)
            .is_some_and(|next| next.is_identifier() && next.line == array.line)
}

/// 位于 `index` 的单元是否开始一条新语句（从而结束前面的表达式）。
pub fn starts_statement(units: &[LexicalUnit], index: usize) -> bool {
    match &units[index].kind {
        UnitKind::BlockOpen(_) | UnitKind::BlockClose => true,
        UnitKind::Keyword(keyword) => {
            keyword.starts_statement() || is_array_binding(units, index)
        }
        _ => false,
    }
}
