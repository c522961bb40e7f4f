// 导入logos分词库
use logos::Logos;
// 导入错误处理模组
use crate::reporter::StructuralError;
// 导入定位处理
use crate::utils::{LineIndex, Span};
use std::ops::Range;
use tracing::debug;

mod token;
pub use token::{Keyword, LexicalUnit, Opener, StringPart, UnitKind};


// logos 解析时需要使用的错误类型
#[derive(Debug, Default, Clone, PartialEq)]
pub enum LexingError {
    #[default]
    InvalidToken,
}

/// 词素定义
/// 注释已经被预处理抹掉，这里只需要跳过空白。
#[derive(Logos, Debug, PartialEq, Clone, Copy)]
#[logos(error = LexingError)]
#[logos(skip r"[ \t\n\f]+")]
enum RawToken {
    // 块标记
    #[token("build")]
    Build,
    #[token("snowman")]
    Snowman,
    #[token("if")]
    If,
    #[token("keep")]
    Keep,
    // `for` 只有后面跟着 `each` 才有意义，在合并阶段处理
    #[token("for")]
    For,
    #[token("end")]
    End,

    // 语句关键字
    #[token("else")]
    Else,
    #[token("snowball")]
    Snowball,
    #[token("freeze")]
    Freeze,
    #[token("say")]
    Say,
    #[token("return")]
    Return,
    #[token("wait")]
    Wait,
    #[token("melt")]
    Melt,

    // 表达式关键字
    #[token("array")]
    Array,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("in")]
    In,
    #[token("is")]
    Is,
    #[token("isnt")]
    Isnt,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[regex(r"it's[ \t]+cold")]
    ItsCold,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    // 字符串不跨行
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("=")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("==")]
    #[token("!=")]
    #[token("<")]
    #[token(">")]
    #[token("<=")]
    #[token(">=")]
    #[token("&&")]
    #[token("||")]
    #[token("!")]
    #[token("=>")]
    Operator,

    #[token("(")]
    #[token(")")]
    #[token("[")]
    #[token("]")]
    #[token("{")]
    #[token("}")]
    #[token(",")]
    #[token(".")]
    #[token(":")]
    Punct,
}

impl RawToken {
    /// 由字母组成、可以充当属性名的关键字。
    fn is_word(self) -> bool {
        !matches!(
            self,
            RawToken::ItsCold
                | RawToken::Number
                | RawToken::Str
                | RawToken::Ident
                | RawToken::Operator
                | RawToken::Punct
        )
    }

    fn unit_kind(self) -> UnitKind {
        match self {
            RawToken::Build => UnitKind::BlockOpen(Opener::Build),
            RawToken::Snowman => UnitKind::BlockOpen(Opener::Snowman),
            RawToken::If => UnitKind::BlockOpen(Opener::If),
            RawToken::Keep => UnitKind::BlockOpen(Opener::Keep),
            // 合并失败的 `for` 不会走到这里
            RawToken::For => UnitKind::Identifier,
            RawToken::End => UnitKind::BlockClose,
            RawToken::Else => UnitKind::Keyword(Keyword::Else),
            RawToken::Snowball => UnitKind::Keyword(Keyword::Snowball),
            RawToken::Freeze => UnitKind::Keyword(Keyword::Freeze),
            RawToken::Say => UnitKind::Keyword(Keyword::Say),
            RawToken::Return => UnitKind::Keyword(Keyword::Return),
            RawToken::Wait => UnitKind::Keyword(Keyword::Wait),
            RawToken::Melt => UnitKind::Keyword(Keyword::Melt),
            RawToken::Array => UnitKind::Keyword(Keyword::Array),
            RawToken::New => UnitKind::Keyword(Keyword::New),
            RawToken::This => UnitKind::Keyword(Keyword::This),
            RawToken::In => UnitKind::Keyword(Keyword::In),
            RawToken::Is => UnitKind::Keyword(Keyword::Is),
            RawToken::Isnt => UnitKind::Keyword(Keyword::Isnt),
            RawToken::And => UnitKind::Keyword(Keyword::And),
            RawToken::Or => UnitKind::Keyword(Keyword::Or),
            RawToken::Not => UnitKind::Keyword(Keyword::Not),
            RawToken::ItsCold => UnitKind::Keyword(Keyword::ItsCold),
            RawToken::Number => UnitKind::Number,
            // 字符串的片段在 Scanner::string_parts 里填充
            RawToken::Str => UnitKind::Str(Vec::new()),
            RawToken::Ident => UnitKind::Identifier,
            RawToken::Operator => UnitKind::Operator,
            RawToken::Punct => UnitKind::Punctuation,
        }
    }
}

/// 对预处理后的文本进行词法分析。
/// 总是返回一个以 `Eof` 结尾的单元序列，以及扫描中发现的所有错误。
pub fn tokenize(text: &str) -> (Vec<LexicalUnit>, Vec<StructuralError>) {
    let index = LineIndex::new(text);
    let mut scanner = Scanner {
        text,
        index: &index,
        errors: Vec::new(),
    };

    let mut units = scanner.scan(0..text.len());
    let (line, column) = index.position(text.len());
    units.push(LexicalUnit::new(
        UnitKind::Eof,
        "",
        line,
        column,
        Span::new(text.len(), text.len()),
    ));

    debug!(
        units = units.len(),
        errors = scanner.errors.len(),
        "tokenized source"
    );
    (units, scanner.errors)
}

struct Scanner<'t, 'i> {
    text: &'t str,
    index: &'i LineIndex<'t>,
    errors: Vec<StructuralError>,
}

impl Scanner<'_, '_> {
    /// 扫描 `text[range]`，返回的 span 都是相对整段文本的绝对位置。
    /// 插值片段通过递归调用本函数切分。
    fn scan(&mut self, range: Range<usize>) -> Vec<LexicalUnit> {
        let base = range.start;
        let text = self.text;
        let fragment = &text[range];

        let mut raw = Vec::new();
        for (result, span) in RawToken::lexer(fragment).spanned() {
            let span = Span::from(span).offset(base);
            match result {
                Ok(token) => raw.push((token, span)),
                Err(_lexing_error) => self.unrecognized(span),
            }
        }

        self.merge(raw)
    }

    /// 把原始 token 转成词法单元，同时合并 `for each` 与 `else if` 这样的双词关键字。
    fn merge(&mut self, raw: Vec<(RawToken, Span)>) -> Vec<LexicalUnit> {
        let mut units = Vec::with_capacity(raw.len());
        let mut tokens = raw.into_iter().peekable();

        while let Some((token, span)) = tokens.next() {
            // `range.end`、`list.new` 里点号后面的关键字只是属性名
            let after_dot = units.last().is_some_and(|unit: &LexicalUnit| unit.is_punct("."));
            if after_dot && token.is_word() {
                let text = self.text[span.into_range()].to_string();
                units.push(self.unit(UnitKind::Identifier, text, span));
                continue;
            }

            match token {
                RawToken::For => {
                    let next = tokens
                        .next_if(|(next, next_span)| {
                            *next == RawToken::Ident
                                && &self.text[next_span.into_range()] == "each"
                                && self.same_line(span, *next_span)
                        });
                    match next {
                        Some((_, each_span)) => units.push(self.unit(
                            UnitKind::BlockOpen(Opener::ForEach),
                            "for each",
                            span.to(each_span),
                        )),
                        None => {
                            let (line, column) = self.index.position(span.start);
                            self.errors.push(StructuralError::unknown_construct(
                                "for",
                                "'for' must be followed by 'each'",
                                line,
                                column,
                                span,
                            ));
                        }
                    }
                }
                RawToken::Else => {
                    let next = tokens.next_if(|(next, next_span)| {
                        *next == RawToken::If && self.same_line(span, *next_span)
                    });
                    match next {
                        Some((_, if_span)) => units.push(self.unit(
                            UnitKind::Keyword(Keyword::ElseIf),
                            "else if",
                            span.to(if_span),
                        )),
                        None => units.push(self.unit(
                            UnitKind::Keyword(Keyword::Else),
                            "else",
                            span,
                        )),
                    }
                }
                RawToken::Str => {
                    let parts = self.string_parts(span);
                    let text = self.text[span.into_range()].to_string();
                    units.push(self.unit(UnitKind::Str(parts), text, span));
                }
                other => {
                    let text = self.text[span.into_range()].to_string();
                    units.push(self.unit(other.unit_kind(), text, span));
                }
            }
        }

        units
    }

    /// 切分字符串内容。`#{` 到与之配对的 `}` 之间是一个插值表达式。
    fn string_parts(&mut self, span: Span) -> Vec<StringPart> {
        let inner_start = span.start + 1;
        let text = self.text;
        let inner = &text[inner_start..span.end - 1];
        let bytes = inner.as_bytes();

        let mut parts = Vec::new();
        let mut text_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                // 跳过被转义的字符，`\#{` 不是插值
                b'\\' => i += 2,
                b'#' if bytes.get(i + 1) == Some(&b'{') => {
                    let Some(close) = matching_brace(bytes, i + 1) else {
                        let marker = Span::new(inner_start + i, inner_start + i + 2);
                        let (line, column) = self.index.position(marker.start);
                        self.errors.push(StructuralError::unknown_construct(
                            "#{",
                            "string interpolation is never closed with '}'",
                            line,
                            column,
                            marker,
                        ));
                        break;
                    };
                    if text_start < i {
                        parts.push(StringPart::Text(inner[text_start..i].to_string()));
                    }
                    let nested = self.scan(inner_start + i + 2..inner_start + close);
                    parts.push(StringPart::Interpolation(nested));
                    i = close + 1;
                    text_start = i;
                }
                _ => i += 1,
            }
        }

        if text_start < bytes.len() {
            parts.push(StringPart::Text(inner[text_start..].to_string()));
        }
        parts
    }

    fn unrecognized(&mut self, span: Span) {
        let text = self.text;
        let slice = &text[span.into_range()];
        let unrecognized_char = slice.chars().next().unwrap_or_default();
        let (line, column) = self.index.position(span.start);
        let message = if unrecognized_char == '"' {
            "string literal is never closed".to_string()
        } else {
            format!("unrecognized character '{unrecognized_char}'")
        };
        self.errors.push(StructuralError::unknown_construct(
            &unrecognized_char.to_string(),
            message,
            line,
            column,
            span,
        ));
    }

    fn unit(&self, kind: UnitKind, text: impl Into<String>, span: Span) -> LexicalUnit {
        let (line, column) = self.index.position(span.start);
        LexicalUnit::new(kind, text, line, column, span)
    }

    fn same_line(&self, a: Span, b: Span) -> bool {
        self.index.position(a.start).0 == self.index.position(b.start).0
    }
}

/// 从 `open`（指向 `{`）开始找到与之配对的 `}` 的下标。
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, byte) in bytes[open..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// 按源码中的间隔把一串单元拼回文本：原来有空白的地方放一个空格。
pub fn spell(units: &[LexicalUnit]) -> String {
    let mut out = String::new();
    let mut previous_end = None;
    for unit in units {
        if previous_end.is_some_and(|end| unit.span.start > end) {
            out.push(' ');
        }
        out.push_str(&unit.text);
        previous_end = Some(unit.span.end);
    }
    out
}
