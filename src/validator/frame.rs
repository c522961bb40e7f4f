use crate::lexer::Opener;
use crate::utils::Span;

/// 块栈中的一帧：记录是哪个关键字开启了这个块，以及它在哪里。
#[derive(Debug, Clone, PartialEq)]
pub struct BlockFrame {
    pub opener: Opener,
    /// 开启语句的原文，例如 `build f:`。
    pub opener_text: String,
    pub line: usize,
    pub column: usize,
    pub span: Span,
    /// `if` 块是否已经遇到过 `else:`。
    pub has_else: bool,
}

impl BlockFrame {
    pub fn new(opener: Opener, opener_text: String, line: usize, column: usize, span: Span) -> Self {
        Self {
            opener,
            opener_text,
            line,
            column,
            span,
            has_else: false,
        }
    }
}

/// 后进先出的块栈，是嵌套关系的唯一来源。
/// 校验器用它匹配 `end`，代码生成器用它判断当前处于哪种块中。
#[derive(Debug, Default)]
pub struct BlockStack {
    frames: Vec<BlockFrame>,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: BlockFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<BlockFrame> {
        self.frames.pop()
    }

    pub fn top(&self) -> Option<&BlockFrame> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut BlockFrame> {
        self.frames.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// 当前是否直接位于 `snowman` 的类体中。
    pub fn in_class_body(&self) -> bool {
        self.top().is_some_and(|frame| frame.opener == Opener::Snowman)
    }

    /// 取出所有剩余的帧，最内层的在前。
    pub fn drain_innermost_first(&mut self) -> impl Iterator<Item = BlockFrame> + '_ {
        self.frames.drain(..).rev()
    }
}
