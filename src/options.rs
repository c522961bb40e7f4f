/// 代码生成的可配置项。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// 每一层缩进使用的空格数。
    pub indent_width: usize,
    /// `wait` 生成的定时器时长（毫秒）。固定值，不做任何采样。
    pub wait_millis: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            indent_width: 2,
            wait_millis: 1000,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }

    #[must_use]
    pub fn with_wait_millis(mut self, wait_millis: u64) -> Self {
        self.wait_millis = wait_millis;
        self
    }

    pub(crate) fn indent_unit(&self) -> String {
        " ".repeat(self.indent_width)
    }

    /// `wait` 对应的 await 表达式（不带分号）。
    pub(crate) fn wait_expression(&self) -> String {
        format!(
            "await new Promise(resolve => setTimeout(resolve, {}))",
            self.wait_millis
        )
    }
}
