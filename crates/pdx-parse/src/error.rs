//! Parse errors and their diagnostic rendering.

use ariadne::{Color, Label, Report, ReportKind, Source};
use pdx_tokenizer::{LexError, Span};

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// No token pattern matched at this position.
    InvalidInput,
    /// A token that cannot appear here.
    UnexpectedToken,
    /// Expected a key (at the top level or inside an object).
    ExpectedKey,
    /// A top-level key not followed by an operator.
    ExpectedOperator,
    /// An operator not followed by a value.
    ExpectedValue,
    /// Missing `}` (strict mode). The span points at the opening brace.
    UnclosedObject,
    /// Input ended in the middle of a pair.
    UnexpectedEof,
}

/// A parse error with source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Source location.
    pub span: Span,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whether this error came from the tokenizer rather than the grammar.
    pub fn is_lex_error(&self) -> bool {
        self.kind == ParseErrorKind::InvalidInput
    }

    /// Render this error with ariadne.
    ///
    /// Returns the formatted report with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| self.to_string())
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename);
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range: std::ops::Range<usize> = self.span.into();
        let (label, help) = match self.kind {
            ParseErrorKind::InvalidInput => (
                "no token starts here",
                Some("strings containing spaces or special characters must be quoted"),
            ),
            ParseErrorKind::UnexpectedToken => ("unexpected", None),
            ParseErrorKind::ExpectedKey => ("expected a key here", None),
            ParseErrorKind::ExpectedOperator => (
                "expected `=`, `==`, `<`, `<=`, `>` or `>=` after this key",
                Some("only key-value pairs may appear at the top level"),
            ),
            ParseErrorKind::ExpectedValue => ("expected a value here", None),
            ParseErrorKind::UnclosedObject => ("object opened here", Some("add a closing '}'")),
            ParseErrorKind::UnexpectedEof => ("input ends here", None),
        };
        let report = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_message(self.kind.message())
            .with_label(
                Label::new((filename, range))
                    .with_message(label)
                    .with_color(Color::Red),
            );
        match help {
            Some(help) => report.with_help(help),
            None => report,
        }
    }
}

impl ParseErrorKind {
    fn message(&self) -> &'static str {
        match self {
            ParseErrorKind::InvalidInput => "unrecognized input",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::ExpectedKey => "expected key",
            ParseErrorKind::ExpectedOperator => "expected operator",
            ParseErrorKind::ExpectedValue => "expected value",
            ParseErrorKind::UnclosedObject => "unclosed object",
            ParseErrorKind::UnexpectedEof => "unexpected end of input",
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.kind.message(), self.span.start)
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self::new(ParseErrorKind::InvalidInput, err.span)
    }
}
