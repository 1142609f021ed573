//! Low-level output writer.
//!
//! Tracks the current column (with tab stops) and defers indentation until
//! something is written on a line, so a line that ends up empty carries no
//! trailing blanks. Checkpoints let the formatter try a layout and take it
//! back.

use crate::FormatOptions;

/// A saved writer position.
#[derive(Debug, Clone)]
pub(crate) struct Checkpoint {
    len: usize,
    /// Trailing blanks at the checkpoint, which a later `newline` may trim
    blanks: String,
    col: usize,
    lines: usize,
    indent_level: usize,
    at_line_start: bool,
}

pub(crate) struct LineWriter<'a> {
    out: String,
    options: &'a FormatOptions,
    /// Indentation applied when the current line gets its first text
    pub(crate) indent_level: usize,
    at_line_start: bool,
    col: usize,
    lines: usize,
}

impl<'a> LineWriter<'a> {
    pub(crate) fn new(options: &'a FormatOptions) -> Self {
        Self {
            out: String::new(),
            options,
            indent_level: 0,
            at_line_start: true,
            col: 0,
            lines: 0,
        }
    }

    pub(crate) fn options(&self) -> &'a FormatOptions {
        self.options
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }

    /// Line breaks written so far.
    pub(crate) fn lines(&self) -> usize {
        self.lines
    }

    /// Current column. At the start of a line this is where the pending
    /// indentation will end.
    pub(crate) fn column(&self) -> usize {
        if self.at_line_start {
            self.options.indent_col(self.indent_level)
        } else {
            self.col
        }
    }

    fn write_indent(&mut self) {
        if self.at_line_start {
            let indent = self.options.indent_str(self.indent_level);
            self.out.push_str(&indent);
            self.col = 0;
            self.advance_col(&indent);
            self.at_line_start = false;
        }
    }

    fn advance_col(&mut self, s: &str) {
        let width = self.options.indent_width.max(1);
        for c in s.chars() {
            match c {
                '\n' => self.col = 0,
                '\t' => self.col = (self.col / width + 1) * width,
                _ => self.col += 1,
            }
        }
    }

    pub(crate) fn write(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.write_indent();
        self.out.push_str(s);
        self.advance_col(s);
    }

    /// Write a space unless at the start of a line.
    pub(crate) fn space(&mut self) {
        if !self.at_line_start {
            self.write(" ");
        }
    }

    /// Break the line, dropping trailing blanks.
    pub(crate) fn newline(&mut self) {
        let trimmed = self.out.trim_end_matches([' ', '\t']).len();
        self.out.truncate(trimmed);
        self.out.push('\n');
        self.at_line_start = true;
        self.col = 0;
        self.lines += 1;
    }

    /// Break the line unless already at the start of one.
    pub(crate) fn end_line(&mut self) {
        if !self.at_line_start {
            self.newline();
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        let text = self.out.trim_end_matches([' ', '\t']).len();
        Checkpoint {
            len: self.out.len(),
            blanks: self.out[text..].to_string(),
            col: self.col,
            lines: self.lines,
            indent_level: self.indent_level,
            at_line_start: self.at_line_start,
        }
    }

    pub(crate) fn rollback(&mut self, cp: Checkpoint) {
        self.out.truncate(cp.len - cp.blanks.len());
        self.out.push_str(&cp.blanks);
        self.col = cp.col;
        self.lines = cp.lines;
        self.indent_level = cp.indent_level;
        self.at_line_start = cp.at_line_start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deferred_indent_and_trim() {
        let options = FormatOptions::default();
        let mut w = LineWriter::new(&options);
        w.indent_level = 1;
        w.write("a =");
        w.write(" ");
        w.newline();
        w.newline();
        w.indent_level = 0;
        w.write("}");
        assert_eq!(w.finish(), "\ta =\n\n}");
    }

    #[test]
    fn test_column_uses_tab_stops() {
        let options = FormatOptions::default().indent_width(4);
        let mut w = LineWriter::new(&options);
        w.indent_level = 2;
        assert_eq!(w.column(), 8);
        w.write("ab\tc");
        assert_eq!(w.column(), 13);
    }

    #[test]
    fn test_rollback() {
        let options = FormatOptions::default().spaces(2);
        let mut w = LineWriter::new(&options);
        w.write("key");
        let cp = w.checkpoint();
        w.write(" = value");
        w.newline();
        w.rollback(cp);
        assert_eq!(w.column(), 3);
        assert_eq!(w.lines(), 0);
        assert_eq!(w.finish(), "key");
    }

    #[test]
    fn test_rollback_restores_trimmed_blanks() {
        let options = FormatOptions::default();
        let mut w = LineWriter::new(&options);
        w.write("a");
        w.space();
        let cp = w.checkpoint();
        w.newline();
        w.write("# note");
        w.rollback(cp);
        assert_eq!(w.column(), 2);
        w.newline();
        w.write("b");
        assert_eq!(w.finish(), "a\nb");
    }
}
