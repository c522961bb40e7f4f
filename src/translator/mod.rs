// In src/translator/mod.rs

mod expression;
mod rules;

pub use rules::Construct;

use crate::lexer::{Keyword, LexicalUnit, Opener, UnitKind};
use crate::options::Options;
use crate::reporter::StructuralError;
use crate::validator::{BlockFrame, BlockStack, header_end, header_text};
use expression::{ExprWriter, expression_after, expression_end};
use std::ops::Range;
use tracing::{debug, trace};

/// 顶层代码生成函数。只应在校验没有发现错误时调用。
/// 任何一条规则失败都会让整个生成失败，不会返回残缺的输出。
pub fn generate(units: &[LexicalUnit], options: &Options) -> Result<String, Vec<StructuralError>> {
    let mut translator = Translator::new(units, options);
    translator.run();
    translator.finish()
}

/// 按行收集输出，并负责缩进。
struct Emitter {
    lines: Vec<String>,
    depth: usize,
    indent: String,
}

impl Emitter {
    fn new(indent: String) -> Self {
        Self {
            lines: Vec::new(),
            depth: 0,
            indent,
        }
    }

    fn line(&mut self, text: &str) {
        let mut line = self.indent.repeat(self.depth);
        line.push_str(text);
        self.lines.push(line);
    }

    fn open(&mut self, header: &str) {
        self.line(header);
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    /// `} else {` 这类在同一层关闭再打开的行。
    fn reopen(&mut self, header: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(header);
        self.depth += 1;
    }

    fn finish(self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

struct Translator<'a> {
    units: &'a [LexicalUnit],
    options: &'a Options,
    cursor: usize,
    blocks: BlockStack,
    out: Emitter,
    errors: Vec<StructuralError>,
}

impl<'a> Translator<'a> {
    fn new(units: &'a [LexicalUnit], options: &'a Options) -> Self {
        Self {
            units,
            options,
            cursor: 0,
            blocks: BlockStack::new(),
            out: Emitter::new(options.indent_unit()),
            errors: Vec::new(),
        }
    }

    fn run(&mut self) {
        while self.cursor < self.units.len() {
            let construct = Construct::classify(&self.units[self.cursor..]);
            if construct == Construct::EndOfInput {
                break;
            }
            trace!(
                ?construct,
                line = self.units[self.cursor].line,
                depth = self.blocks.depth(),
                "applying rule"
            );
            let consumed = self.apply(construct, self.cursor);
            self.cursor += consumed.max(1);
        }
    }

    fn finish(mut self) -> Result<String, Vec<StructuralError>> {
        if let Some(frame) = self.blocks.top() {
            let message = format!("'{}' was still open after the last unit", frame.opener_text);
            let error = StructuralError::internal(message, frame.line, frame.column, frame.span);
            self.errors.push(error);
        }

        if !self.errors.is_empty() {
            debug!(errors = self.errors.len(), "generation failed");
            return Err(self.errors);
        }
        let output = self.out.finish();
        debug!(bytes = output.len(), "generated output");
        Ok(output)
    }

    /// 套用一条规则，返回它消耗的单元数。
    fn apply(&mut self, construct: Construct, at: usize) -> usize {
        match construct {
            Construct::FunctionDecl => self.function_decl(at),
            Construct::ClassDecl => self.class_decl(at),
            Construct::Conditional => self.conditional(at, Opener::If, "if"),
            Construct::Loop => self.conditional(at, Opener::Keep, "while"),
            Construct::ElseIfBranch => self.else_if_branch(at),
            Construct::ElseBranch => self.else_branch(at),
            Construct::Iteration => self.iteration(at),
            Construct::BlockEnd => self.block_end(at),
            Construct::MutableBinding => self.binding(at, "let"),
            Construct::ImmutableBinding => self.binding(at, "const"),
            Construct::ArrayBinding => self.array_binding(at),
            Construct::Print => self.keyword_statement(at, |expr| format!("console.log({expr});")),
            Construct::Return => self.keyword_statement(at, |expr| {
                if expr.is_empty() {
                    "return;".to_string()
                } else {
                    format!("return {expr};")
                }
            }),
            Construct::Melt => self.melt(at),
            Construct::Wait => {
                let statement = format!("{};", self.options.wait_expression());
                self.out.line(&statement);
                1
            }
            Construct::ExpressionStatement => self.expression_statement(at),
            Construct::EndOfInput => 1,
        }
    }

    // --- 块规则 ---

    fn function_decl(&mut self, at: usize) -> usize {
        let units = self.units;
        let Some(name) = units.get(at + 1).filter(|u| u.is_identifier()) else {
            return self.malformed_opener(at, Opener::Build, "expected a name after 'build'");
        };

        let mut next = at + 2;
        let mut params = String::new();
        if units[next].is_punct("(") {
            let Some(close) = matching_close(units, next) else {
                return self.malformed_opener(at, Opener::Build, "parameter list is never closed");
            };
            params = self.expression(next + 1..close);
            next = close + 1;
        }
        if !units[next].is_punct(":") {
            return self.malformed_opener(at, Opener::Build, "expected ':' after the function header");
        }

        let is_async = body_waits(units, at);
        let async_prefix = if is_async { "async " } else { "" };
        let header = if self.blocks.in_class_body() {
            if name.text == "constructor" {
                if is_async {
                    self.malformed(at, "'wait' cannot be used inside a constructor");
                }
                format!("constructor({params}) {{")
            } else {
                format!("{async_prefix}{}({params}) {{", name.text)
            }
        } else {
            format!("{async_prefix}function {}({params}) {{", name.text)
        };

        self.open_block(Opener::Build, at, &header);
        next + 1 - at
    }

    fn class_decl(&mut self, at: usize) -> usize {
        let units = self.units;
        let Some(name) = units.get(at + 1).filter(|u| u.is_identifier()) else {
            return self.malformed_opener(at, Opener::Snowman, "expected a name after 'snowman'");
        };
        if !units[at + 2].is_punct(":") {
            return self.malformed_opener(at, Opener::Snowman, "expected ':' after the snowman name");
        }
        self.open_block(Opener::Snowman, at, &format!("class {} {{", name.text));
        3
    }

    /// `if COND:` 与 `keep COND:`，只有输出的关键字不同。
    fn conditional(&mut self, at: usize, opener: Opener, keyword: &str) -> usize {
        let Some((condition, colon)) = self.condition(at) else {
            return self.malformed_opener(at, opener, &format!("expected 'COND:' after '{opener}'"));
        };
        self.open_block(opener, at, &format!("{keyword} ({condition}) {{"));
        colon + 1 - at
    }

    fn else_if_branch(&mut self, at: usize) -> usize {
        let Some((condition, colon)) = self.condition(at) else {
            self.malformed(at, "expected 'COND:' after 'else if'");
            return header_end(self.units, at) - at;
        };
        self.out.reopen(&format!("}} else if ({condition}) {{"));
        colon + 1 - at
    }

    fn else_branch(&mut self, at: usize) -> usize {
        if !self.units[at + 1].is_punct(":") {
            return self.malformed(at, "expected ':' after 'else'");
        }
        self.out.reopen("} else {");
        2
    }

    fn iteration(&mut self, at: usize) -> usize {
        let units = self.units;
        let item = units.get(at + 1).filter(|u| u.is_identifier());
        let has_in = units.get(at + 2).is_some_and(|u| u.is_keyword(Keyword::In));
        let Some(item) = item.filter(|_| has_in) else {
            return self.malformed_opener(at, Opener::ForEach, "expected 'for each ITEM in COLLECTION:'");
        };

        let end = expression_after(units, at + 2, true);
        if end == at + 3 || !units.get(end).is_some_and(|u| u.is_punct(":")) {
            return self.malformed_opener(at, Opener::ForEach, "expected 'COLLECTION:' after 'in'");
        }
        let collection = self.expression(at + 3..end);
        self.open_block(
            Opener::ForEach,
            at,
            &format!("for (const {} of {collection}) {{", item.text),
        );
        end + 1 - at
    }

    fn block_end(&mut self, at: usize) -> usize {
        if self.blocks.pop().is_none() {
            let unit = &self.units[at];
            self.errors.push(StructuralError::internal(
                "'end' reached the generator without an open block",
                unit.line,
                unit.column,
                unit.span,
            ));
        }
        self.out.close();
        1
    }

    // --- 语句规则 ---

    /// `snowball NAME = EXPR` 与 `freeze NAME = EXPR`。
    /// 直接位于类体中的 `snowball` 声明的是字段。
    fn binding(&mut self, at: usize, declarator: &str) -> usize {
        let units = self.units;
        let Some(name) = units.get(at + 1).filter(|u| u.is_identifier()) else {
            return self.malformed(at, &format!("expected a name after '{}'", units[at].text));
        };
        let in_class = self.blocks.in_class_body();
        if in_class && declarator == "const" {
            return self.malformed(at, "'freeze' cannot declare a snowman field");
        }

        let prefix = if in_class {
            String::new()
        } else {
            format!("{declarator} ")
        };

        if !units[at + 2].is_operator("=") {
            if declarator == "const" {
                return self.malformed(at, "'freeze' needs a value: 'freeze NAME = EXPR'");
            }
            self.out.line(&format!("{prefix}{};", name.text));
            return 2;
        }

        let end = expression_after(units, at + 2, false);
        if end == at + 3 {
            return self.malformed(at, "expected a value after '='");
        }
        let value = self.expression(at + 3..end);
        self.out.line(&format!("{prefix}{} = {value};", name.text));
        end - at
    }

    fn array_binding(&mut self, at: usize) -> usize {
        let units = self.units;
        let name = &units[at + 1];
        if !units[at + 2].is_operator("=") {
            self.out.line(&format!("let {} = [];", name.text));
            return 2;
        }
        let end = expression_after(units, at + 2, false);
        if end == at + 3 {
            return self.malformed(at, "expected a value after '='");
        }
        let value = self.expression(at + 3..end);
        self.out.line(&format!("let {} = {value};", name.text));
        end - at
    }

    /// `say`、`return` 这类“关键字 + 可选表达式”的语句。
    fn keyword_statement(&mut self, at: usize, template: impl FnOnce(&str) -> String) -> usize {
        let end = expression_after(self.units, at, false);
        let expr = self.expression(at + 1..end);
        self.out.line(&template(&expr));
        end - at
    }

    fn melt(&mut self, at: usize) -> usize {
        let end = expression_after(self.units, at, false);
        if end == at + 1 {
            return self.malformed(at, "expected something to melt");
        }
        let target = self.expression(at + 1..end);
        self.out.line(&format!("delete {target};"));
        end - at
    }

    fn expression_statement(&mut self, at: usize) -> usize {
        let end = expression_end(self.units, at, false);
        if end == at {
            let unit = &self.units[at];
            self.errors.push(StructuralError::internal(
                format!("no statement rule for {}", unit.describe()),
                unit.line,
                unit.column,
                unit.span,
            ));
            return 1;
        }
        let expr = self.expression(at..end);
        self.out.line(&format!("{expr};"));
        end - at
    }

    // --- 辅助函数 ---

    fn expression(&mut self, range: Range<usize>) -> String {
        ExprWriter::new(self.units, &mut self.errors).write_checked(range)
    }

    /// 读取 `KEYWORD COND:` 的条件，返回翻译后的条件与 `:` 的位置。
    fn condition(&mut self, at: usize) -> Option<(String, usize)> {
        let end = expression_after(self.units, at, true);
        if end == at + 1 || !self.units.get(end).is_some_and(|u| u.is_punct(":")) {
            return None;
        }
        Some((self.expression(at + 1..end), end))
    }

    fn open_block(&mut self, opener: Opener, at: usize, header: &str) {
        let unit = &self.units[at];
        let frame = BlockFrame::new(
            opener,
            header_text(self.units, at),
            unit.line,
            unit.column,
            unit.span,
        );
        self.blocks.push(frame);
        self.out.open(header);
    }

    fn malformed(&mut self, at: usize, message: &str) -> usize {
        let unit = &self.units[at];
        self.errors.push(StructuralError::unknown_construct(
            &header_text(self.units, at),
            message,
            unit.line,
            unit.column,
            unit.span,
        ));
        1
    }

    /// 开启关键字的头部写错了也要压栈，否则后面的 `end` 会对不上。
    /// 整个头部一起跳过，不再当作表达式翻译。
    fn malformed_opener(&mut self, at: usize, opener: Opener, message: &str) -> usize {
        self.malformed(at, message);
        self.open_block(opener, at, "");
        header_end(self.units, at) - at
    }
}

/// `open` 处的 `(` 对应的 `)` 的位置。
fn matching_close(units: &[LexicalUnit], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, unit) in units.iter().enumerate().skip(open) {
        if unit.opening_delimiter().is_some() {
            depth += 1;
        } else if unit.closing_delimiter().is_some() {
            depth -= 1;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

/// 函数自己的函数体里（不含嵌套函数）有没有 `wait`。
/// `wait` 只能作为语句出现，不需要看括号和插值里面。
fn body_waits(units: &[LexicalUnit], at: usize) -> bool {
    // true 表示这一层是嵌套的 build
    let mut nested: Vec<bool> = Vec::new();
    for unit in &units[at + 1..] {
        match &unit.kind {
            UnitKind::BlockOpen(opener) => nested.push(*opener == Opener::Build),
            UnitKind::BlockClose => {
                if nested.pop().is_none() {
                    return false;
                }
            }
            _ => {
                if !nested.contains(&true) && unit.is_keyword(Keyword::Wait) {
                    return true;
                }
            }
        }
    }
    false
}
