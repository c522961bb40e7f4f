use crate::utils::Span;
use std::fmt::{Display, Formatter, Result};

/// 词法单元：种类、原文以及它在预处理后文本中的位置。
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalUnit {
    pub kind: UnitKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

/// 方言中所有可能的词法单元种类。
#[derive(Debug, Clone, PartialEq)]
pub enum UnitKind {
    /// 关键字（不含块标记）。
    Keyword(Keyword),

    /// 开启一个块的关键字。
    BlockOpen(Opener),

    /// `end`。
    BlockClose,

    /// 标识符。
    Identifier,

    /// 数字字面量。
    Number,

    /// 字符串字面量，按文本片段和插值片段切开。
    Str(Vec<StringPart>),

    /// 运算符。
    Operator,

    /// 分隔符与标点。
    Punctuation,

    /// 文件结束标志。
    Eof,
}

/// 字符串字面量的组成部分。
#[derive(Debug, Clone, PartialEq)]
pub enum StringPart {
    /// 原样的文本，转义序列保持源码写法。
    Text(String),

    /// `#{...}` 里面的表达式，已经被递归地切成词法单元。
    Interpolation(Vec<LexicalUnit>),
}

/// 开启块的关键字。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opener {
    Build,
    Snowman,
    If,
    Keep,
    ForEach,
}

impl Display for Opener {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let s = match self {
            Opener::Build => "build",
            Opener::Snowman => "snowman",
            Opener::If => "if",
            Opener::Keep => "keep",
            Opener::ForEach => "for each",
        };
        write!(f, "{}", s)
    }
}

/// 不开启块的关键字。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // 语句
    Snowball,
    Freeze,
    Say,
    Else,
    ElseIf,
    Return,
    Wait,
    Melt,

    // 表达式
    Array,
    New,
    This,
    In,
    Is,
    Isnt,
    And,
    Or,
    Not,
    ItsCold,
}

impl Keyword {
    /// 只能出现在语句开头的关键字，不能出现在括号或插值里。
    /// `wait` 也只能作为语句出现。
    pub fn is_statement_only(self) -> bool {
        matches!(
            self,
            Keyword::Snowball
                | Keyword::Freeze
                | Keyword::Else
                | Keyword::ElseIf
                | Keyword::Return
                | Keyword::Wait
        )
    }

    /// 在语句层面会结束前一个表达式的关键字。
    pub fn starts_statement(self) -> bool {
        self.is_statement_only() || matches!(self, Keyword::Say | Keyword::Melt)
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let s = match self {
            Keyword::Snowball => "snowball",
            Keyword::Freeze => "freeze",
            Keyword::Say => "say",
            Keyword::Else => "else",
            Keyword::ElseIf => "else if",
            Keyword::Return => "return",
            Keyword::Wait => "wait",
            Keyword::Melt => "melt",
            Keyword::Array => "array",
            Keyword::New => "new",
            Keyword::This => "this",
            Keyword::In => "in",
            Keyword::Is => "is",
            Keyword::Isnt => "isnt",
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::Not => "not",
            Keyword::ItsCold => "it's cold",
        };
        write!(f, "{}", s)
    }
}

impl LexicalUnit {
    pub fn new(kind: UnitKind, text: impl Into<String>, line: usize, column: usize, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
            span,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == UnitKind::Eof
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == UnitKind::Keyword(keyword)
    }

    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == UnitKind::Punctuation && self.text == text
    }

    pub fn is_operator(&self, text: &str) -> bool {
        self.kind == UnitKind::Operator && self.text == text
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == UnitKind::Identifier
    }

    /// `(`、`[`、`{` 对应的闭合符号。
    pub fn opening_delimiter(&self) -> Option<char> {
        if self.kind != UnitKind::Punctuation {
            return None;
        }
        match self.text.as_str() {
            "(" => Some(')'),
            "[" => Some(']'),
            "{" => Some('}'),
            _ => None,
        }
    }

    pub fn closing_delimiter(&self) -> Option<char> {
        if self.kind != UnitKind::Punctuation {
            return None;
        }
        match self.text.as_str() {
            ")" => Some(')'),
            "]" => Some(']'),
            "}" => Some('}'),
            _ => None,
        }
    }

    /// 字符串里所有插值片段的词法单元。
    pub fn interpolations(&self) -> impl Iterator<Item = &[LexicalUnit]> {
        let parts: &[StringPart] = match &self.kind {
            UnitKind::Str(parts) => parts,
            _ => &[],
        };
        parts.iter().filter_map(|part| match part {
            StringPart::Interpolation(units) => Some(units.as_slice()),
            StringPart::Text(_) => None,
        })
    }

    /// 一个用于错误报告的简单字符串表示。
    pub fn describe(&self) -> String {
        match &self.kind {
            UnitKind::Eof => "end of file".to_string(),
            UnitKind::Identifier => format!("identifier `{}`", self.text),
            UnitKind::Number => format!("number `{}`", self.text),
            UnitKind::Str(_) => "a string literal".to_string(),
            UnitKind::Keyword(k) => format!("keyword `{}`", k),
            UnitKind::BlockOpen(o) => format!("keyword `{}`", o),
            UnitKind::BlockClose => "keyword `end`".to_string(),
            UnitKind::Operator => format!("operator `{}`", self.text),
            UnitKind::Punctuation => format!("`{}`", self.text),
        }
    }
}

impl Display for LexicalUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.text)
    }
}
