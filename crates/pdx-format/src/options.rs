//! Formatting options for script printing.

/// Indentation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    /// One tab per level.
    Tabs,
    /// N spaces per level.
    Spaces(usize),
}

/// Options for printing a script tree.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Indentation style (default: tabs)
    pub indent: Indent,

    /// Tab stop width used for column accounting (default: 8)
    pub indent_width: usize,

    /// Column past which lines are folded (default: 125)
    pub wrap_column: usize,

    /// String values of pairs with these keys are always quoted
    pub force_quote_keys: Vec<String>,

    /// Objects under these keys are never folded onto one line
    pub no_fold_keys: Vec<String>,

    /// Single-pair objects at this depth or shallower are never folded
    /// (default: none)
    pub no_fold_to_depth: Option<usize>,

    /// Insert blank lines around object values at this depth or shallower
    /// (default: never)
    pub newlines_to_depth: Option<usize>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: Indent::Tabs,
            indent_width: 8,
            wrap_column: 125,
            force_quote_keys: Vec::new(),
            no_fold_keys: Vec::new(),
            no_fold_to_depth: None,
            newlines_to_depth: None,
        }
    }
}

impl FormatOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent with `n` spaces per level. Also sets the tab stop width.
    pub fn spaces(mut self, n: usize) -> Self {
        self.indent = Indent::Spaces(n);
        self.indent_width = n;
        self
    }

    /// Indent with tabs.
    pub fn tabs(mut self) -> Self {
        self.indent = Indent::Tabs;
        self
    }

    /// Set the tab stop width.
    pub fn indent_width(mut self, width: usize) -> Self {
        self.indent_width = width.max(1);
        self
    }

    /// Set the wrap column.
    pub fn wrap_column(mut self, column: usize) -> Self {
        self.wrap_column = column;
        self
    }

    /// Always quote string values of pairs with these keys.
    pub fn force_quote_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.force_quote_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Never fold objects under these keys onto one line.
    pub fn no_fold_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_fold_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Never fold single-pair objects at `depth` or shallower.
    pub fn no_fold_to_depth(mut self, depth: usize) -> Self {
        self.no_fold_to_depth = Some(depth);
        self
    }

    /// Insert blank lines around object values at `depth` or shallower.
    pub fn newlines_to_depth(mut self, depth: usize) -> Self {
        self.newlines_to_depth = Some(depth);
        self
    }

    /// The text of `level` indentation steps.
    pub(crate) fn indent_str(&self, level: usize) -> String {
        match self.indent {
            Indent::Tabs => "\t".repeat(level),
            Indent::Spaces(n) => " ".repeat(n * level),
        }
    }

    /// Column reached after `level` indentation steps.
    pub(crate) fn indent_col(&self, level: usize) -> usize {
        match self.indent {
            Indent::Tabs => level * self.indent_width,
            Indent::Spaces(n) => level * n,
        }
    }
}
