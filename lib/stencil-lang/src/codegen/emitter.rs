//! Structured output buffer
//!
//! Accumulates generated preprocessor text with an indentation level, so
//! the nesting of `#if` blocks stays readable in the output files.

const INDENT: &str = "    ";

#[derive(Debug, Default)]
pub struct Emitter {
    buf: String,
    level: usize,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indent(&mut self) {
        self.level += 1;
    }

    pub fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Emit one line at the current indentation level.
    pub fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.level {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(text.as_ref());
        self.buf.push('\n');
    }

    /// Emit text verbatim, ignoring the indentation level. Used for raw C
    /// payloads, whose layout belongs to the author.
    pub fn raw(&mut self, text: impl AsRef<str>) {
        self.buf.push_str(text.as_ref());
        self.buf.push('\n');
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
