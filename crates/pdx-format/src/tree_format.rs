//! Tree formatter.
//!
//! Every node renders either inline (continuing the current line) or as a
//! block (its own indented lines). Objects first try a one-line layout and
//! fall back to a block when anything breaks or runs past the wrap column.

use pdx_tree::{
    BraceKind, Comment, Commented, HEADER_MARKER, Item, Object, Pair, ScalarValue, TopLevel,
    Value,
};
use tracing::trace;

use crate::FormatOptions;
use crate::scalar::scalar_text;
use crate::writer::LineWriter;

/// Format a whole file.
pub fn format_tree(tree: &TopLevel, options: &FormatOptions) -> String {
    let mut formatter = TreeFormatter::new(options);
    formatter.format_toplevel(tree);
    formatter.finish()
}

/// Format a single value as it would appear at the top level, without a
/// trailing newline.
pub fn format_value(value: &Value, options: &FormatOptions) -> String {
    let mut formatter = TreeFormatter::new(options);
    formatter.format_value(value, 0, false);
    let mut out = formatter.finish();
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out
}

struct TreeFormatter<'a> {
    w: LineWriter<'a>,
}

impl<'a> TreeFormatter<'a> {
    fn new(options: &'a FormatOptions) -> Self {
        Self {
            w: LineWriter::new(options),
        }
    }

    fn finish(self) -> String {
        self.w.finish()
    }

    fn options(&self) -> &'a FormatOptions {
        self.w.options()
    }

    fn format_toplevel(&mut self, tree: &TopLevel) {
        let items = tree.items();
        for (i, item) in items.iter().enumerate() {
            self.format_block_item(item, 0);
            if self.blank_line_after(items, i, 0) {
                self.w.newline();
            }
        }
        if !tree.post_comments.is_empty() {
            self.w.end_line();
            self.w.indent_level = 0;
            self.format_comments(&tree.post_comments, 0);
        }
    }

    /// Whether a blank line separates item `i` from the next one.
    fn blank_line_after(&self, items: &[Item], i: usize, depth: usize) -> bool {
        let Some(limit) = self.options().newlines_to_depth else {
            return false;
        };
        depth <= limit
            && i + 1 < items.len()
            && (items[i].value().is_object() || items[i + 1].value().is_object())
    }

    /// Comment lines at the current indentation, each ending its line.
    fn format_comments(&mut self, comments: &[Comment], indent: usize) {
        let mut comments = comments;
        if indent == 0
            && let Some((first, rest)) = comments.split_first()
            && first.starts_with(HEADER_MARKER)
        {
            self.w.write(&first.to_string());
            self.w.newline();
            self.w.newline();
            comments = rest;
        }
        for comment in comments {
            self.w.write(&comment.to_string());
            self.w.newline();
        }
    }

    /// A commented leaf inline: leading comments on their own lines, the
    /// text, then a trailing comment that ends the line.
    fn format_commented<T>(&mut self, node: &Commented<T>, text: &str, indent: usize, closing: bool) {
        self.w.indent_level = indent;
        if !node.pre_comments.is_empty() {
            self.w.end_line();
            // comments before `}` belong to the block's contents
            let pre_indent = if closing { indent + 1 } else { indent };
            self.w.indent_level = pre_indent;
            self.format_comments(&node.pre_comments, pre_indent);
            self.w.indent_level = indent;
        }
        self.w.write(text);
        if let Some(comment) = &node.post_comment {
            self.w.write(" ");
            self.w.write(&comment.to_string());
            self.w.newline();
        }
    }

    /// An item on its own line(s) at `indent`.
    fn format_block_item(&mut self, item: &Item, indent: usize) {
        self.w.end_line();
        self.w.indent_level = indent;
        self.format_item(item, indent);
        self.w.end_line();
    }

    fn format_item(&mut self, item: &Item, indent: usize) {
        match item {
            Item::Pair(pair) => self.format_pair(pair, indent),
            Item::Value(value) => self.format_value(value, indent, false),
        }
    }

    fn format_value(&mut self, value: &Value, indent: usize, force_quote: bool) {
        match value {
            Value::Scalar(scalar) => {
                let text = scalar_text(&scalar.value, force_quote);
                self.format_commented(scalar, &text, indent, false);
            }
            Value::Object(object) => self.format_object(object, indent),
        }
    }

    fn format_pair(&mut self, pair: &Pair, indent: usize) {
        let options = self.options();
        let key_text = match &pair.key.value {
            ScalarValue::String(t) => Some(t.value.as_str()),
            _ => None,
        };
        let force_quote = key_text.is_some_and(|k| options.force_quote_keys.iter().any(|f| f == k));

        let text = scalar_text(&pair.key.value, false);
        self.format_commented(&pair.key, &text, indent, false);
        self.w.space();

        let before_op = self.w.column();
        let cp = self.w.checkpoint();
        self.format_commented(&pair.op, pair.op.value.as_str(), indent, false);
        if before_op > options.indent_col(indent) && self.w.column() > options.wrap_column {
            // hang the assignment on the next line
            trace!(column = before_op, "operator past wrap column");
            self.w.rollback(cp);
            self.w.newline();
            self.format_commented(&pair.op, pair.op.value.as_str(), indent + 1, false);
            self.w.space();
            self.format_value(&pair.value, indent + 1, force_quote);
            return;
        }
        self.w.space();
        self.format_value(&pair.value, indent, force_quote);
    }

    fn might_fit_on_line(&self, object: &Object, indent: usize) -> bool {
        if object.open.has_comments() || !object.close.pre_comments.is_empty() {
            return false;
        }
        let options = self.options();
        match object.items().first() {
            Some(Item::Pair(pair)) => {
                let deep_enough = options.no_fold_to_depth.is_none_or(|d| indent > d);
                let foldable_key = match &pair.key.value {
                    ScalarValue::String(t) => !options.no_fold_keys.iter().any(|k| *k == t.value),
                    _ => true,
                };
                object.len() == 1 && !pair.has_comments() && deep_enough && foldable_key
            }
            _ => object
                .iter()
                .all(|item| matches!(item, Item::Value(Value::Scalar(s)) if !s.has_comments())),
        }
    }

    /// Try `{ a b c }` on the current line. Leaves the writer untouched on
    /// failure.
    fn try_one_line(&mut self, object: &Object, indent: usize) -> bool {
        let cp = self.w.checkpoint();
        let lines = self.w.lines();
        let wrap = self.options().wrap_column;
        for item in object.iter() {
            self.w.write(" ");
            self.format_item(item, indent);
            if self.w.lines() != lines || self.w.column() + 2 > wrap {
                self.w.rollback(cp);
                return false;
            }
        }
        if !object.is_empty() {
            self.w.write(" ");
        }
        self.format_commented(&object.close, BraceKind::Close.as_str(), indent, true);
        true
    }

    fn format_object(&mut self, object: &Object, indent: usize) {
        self.format_commented(&object.open, BraceKind::Open.as_str(), indent, false);
        if self.might_fit_on_line(object, indent) && self.try_one_line(object, indent) {
            return;
        }
        let inner = indent + 1;
        match object.items().first() {
            None | Some(Item::Pair(_)) => {
                let items = object.items();
                for (i, item) in items.iter().enumerate() {
                    self.format_block_item(item, inner);
                    if self.blank_line_after(items, i, inner) {
                        self.w.newline();
                    }
                }
            }
            Some(Item::Value(_)) => self.format_filled(object, inner),
        }
        self.w.end_line();
        self.format_commented(&object.close, BraceKind::Close.as_str(), indent, true);
    }

    /// Bare values packed onto as few lines as fit.
    fn format_filled(&mut self, object: &Object, inner: usize) {
        let options = self.options();
        self.w.end_line();
        self.w.indent_level = inner;
        for item in object.iter() {
            self.w.space();
            let before = self.w.column();
            let cp = self.w.checkpoint();
            self.format_item(item, inner);
            if before > options.indent_col(inner) && self.w.column() > options.wrap_column {
                self.w.rollback(cp);
                self.w.newline();
                self.w.indent_level = inner;
                self.format_item(item, inner);
            }
        }
    }
}
