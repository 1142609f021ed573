//! Scalar and value node types.
//!
//! Every leaf in a script tree carries the comments that surround it:
//!
//! - `pre_comments` are whole-line `#` comments directly above the node
//! - `post_comment` is at most one `#` comment on the same line after it
//!
//! A [`Value`] is either a [`Scalar`] or an [`Object`]; pattern-match on it
//! instead of probing types at runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Object;

/// A `#` comment, stored without the leading `#` and surrounding blanks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Comment {
    text: String,
}

impl Comment {
    /// Normalize a raw comment: strip one leading `#`, then trim.
    pub fn new(raw: &str) -> Self {
        let raw = raw.strip_prefix('#').unwrap_or(raw);
        Self {
            text: raw.trim().to_string(),
        }
    }

    /// The normalized comment text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the comment starts with `marker`.
    pub fn starts_with(&self, marker: &str) -> bool {
        self.text.starts_with(marker)
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() || self.text.starts_with('#') {
            write!(f, "#{}", self.text)
        } else {
            write!(f, "# {}", self.text)
        }
    }
}

/// A node value together with its attached comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commented<T> {
    /// The node itself.
    pub value: T,
    /// Comment lines rendered above the node.
    pub pre_comments: Vec<Comment>,
    /// Comment rendered after the node on the same line.
    pub post_comment: Option<Comment>,
}

impl<T> Commented<T> {
    /// Wrap a value with no comments.
    pub fn new(value: T) -> Self {
        Self {
            value,
            pre_comments: Vec::new(),
            post_comment: None,
        }
    }

    /// Builder-style: replace the comments above the node.
    pub fn with_pre_comments<I, S>(mut self, comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.pre_comments = comments
            .into_iter()
            .map(|c| Comment::new(c.as_ref()))
            .collect();
        self
    }

    /// Builder-style: set the trailing comment.
    pub fn with_post_comment(mut self, comment: &str) -> Self {
        self.post_comment = Some(Comment::new(comment));
        self
    }

    /// Whether any comment is attached.
    pub fn has_comments(&self) -> bool {
        !self.pre_comments.is_empty() || self.post_comment.is_some()
    }
}

/// A scalar leaf: string, number or date, with comments.
pub type Scalar = Commented<ScalarValue>;

/// An assignment operator with comments.
pub type OpNode = Commented<Operator>;

/// An object brace with comments. The opening brace holds the block's
/// leading comments, the closing brace its trailing ones.
pub type Brace = Commented<BraceKind>;

/// Which brace a [`Brace`] node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BraceKind {
    /// `{`
    Open,
    /// `}`
    Close,
}

impl BraceKind {
    /// Source text of the brace.
    pub fn as_str(&self) -> &'static str {
        match self {
            BraceKind::Open => "{",
            BraceKind::Close => "}",
        }
    }
}

/// The payload of a scalar node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    /// Quoted or bare string.
    String(Text),
    /// Integer or decimal.
    Number(Number),
    /// `year.month.day`
    Date(Date),
}

/// A string scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Text {
    /// The string contents, without quotes.
    pub value: String,
    /// Always print with quotes, even when the contents would lex as a bare
    /// token. Set for strings that were quoted in the source.
    pub force_quote: bool,
}

impl Text {
    /// A string that prints bare when it can.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            force_quote: false,
        }
    }

    /// A string that always prints quoted.
    pub fn quoted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            force_quote: true,
        }
    }
}

/// Numeric payload of a [`Number`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NumberValue {
    /// Parsed as an integer.
    Int(i64),
    /// Did not fit an integer; parsed as a float.
    Float(f64),
}

/// A number, remembering the text it was written as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Number {
    value: NumberValue,
    text: String,
}

impl Number {
    /// Parse number text: integer if possible, else float.
    pub fn parse(text: &str) -> Option<Self> {
        let value = match text.parse::<i64>() {
            Ok(i) => NumberValue::Int(i),
            Err(_) => match text.parse::<f64>() {
                Ok(f) if f.is_finite() => NumberValue::Float(f),
                _ => return None,
            },
        };
        Some(Self {
            value,
            text: text.to_string(),
        })
    }

    /// The parsed value.
    pub fn value(&self) -> NumberValue {
        self.value
    }

    /// The text the number prints as.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Integer value, if this number is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self.value {
            NumberValue::Int(i) => Some(i),
            NumberValue::Float(_) => None,
        }
    }

    /// Value as a float.
    pub fn as_f64(&self) -> f64 {
        match self.value {
            NumberValue::Int(i) => i as f64,
            NumberValue::Float(f) => f,
        }
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Self {
            value: NumberValue::Int(i),
            text: i.to_string(),
        }
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        let text = if f.fract() == 0.0 {
            format!("{f:.1}")
        } else {
            format!("{f}")
        };
        Self {
            value: NumberValue::Float(f),
            text,
        }
    }
}

/// A `year.month.day` date. Missing components are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Date {
    /// Year (may be negative).
    pub year: i32,
    /// Month.
    pub month: i32,
    /// Day.
    pub day: i32,
}

impl Date {
    /// Create a date from its components.
    pub fn new(year: i32, month: i32, day: i32) -> Self {
        Self { year, month, day }
    }

    /// Parse `Y.M.D` text where any component may be empty (`..5`).
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split('.');
        let mut next = || -> Option<i32> {
            match parts.next()? {
                "" | "-" => Some(0),
                part => part.parse().ok(),
            }
        };
        let date = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return None;
        }
        Some(date)
    }

    /// The components as a tuple.
    pub fn as_tuple(&self) -> (i32, i32, i32) {
        (self.year, self.month, self.day)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.year, self.month, self.day)
    }
}

/// Assignment or comparison operator between a key and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operator {
    /// `=`
    #[default]
    Assign,
    /// `==`
    Equal,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
}

impl Operator {
    /// Parse operator text.
    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "=" => Operator::Assign,
            "==" => Operator::Equal,
            "<" => Operator::Less,
            "<=" => Operator::LessEqual,
            ">" => Operator::Greater,
            ">=" => Operator::GreaterEqual,
            _ => return None,
        })
    }

    /// Source text of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Assign => "=",
            Operator::Equal => "==",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value: either a scalar or a braced object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// String, number or date.
    Scalar(Scalar),
    /// `{ ... }`
    Object(Object),
}

impl Value {
    /// Get as scalar.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Object(_) => None,
        }
    }

    /// Get as object.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            Value::Scalar(_) => None,
        }
    }

    /// Get as mutable object.
    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(o) => Some(o),
            Value::Scalar(_) => None,
        }
    }

    /// Whether this value is an object.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// String contents, for string scalars.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar {
                value: ScalarValue::String(t),
                ..
            }) => Some(&t.value),
            _ => None,
        }
    }

    /// Integer value, for integer scalars.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Scalar(Scalar {
                value: ScalarValue::Number(n),
                ..
            }) => n.as_i64(),
            _ => None,
        }
    }

    /// Float value, for numeric scalars.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Scalar(Scalar {
                value: ScalarValue::Number(n),
                ..
            }) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// Date value, for date scalars.
    pub fn as_date(&self) -> Option<Date> {
        match self {
            Value::Scalar(Scalar {
                value: ScalarValue::Date(d),
                ..
            }) => Some(*d),
            _ => None,
        }
    }

    /// Comments above the value (the opening brace's, for objects).
    pub fn pre_comments(&self) -> &[Comment] {
        match self {
            Value::Scalar(s) => &s.pre_comments,
            Value::Object(o) => &o.open.pre_comments,
        }
    }

    /// Mutable comments above the value.
    pub fn pre_comments_mut(&mut self) -> &mut Vec<Comment> {
        match self {
            Value::Scalar(s) => &mut s.pre_comments,
            Value::Object(o) => &mut o.open.pre_comments,
        }
    }

    /// Trailing comment (the closing brace's, for objects).
    pub fn post_comment(&self) -> Option<&Comment> {
        match self {
            Value::Scalar(s) => s.post_comment.as_ref(),
            Value::Object(o) => o.close.post_comment.as_ref(),
        }
    }

    /// Replace the trailing comment.
    pub fn set_post_comment(&mut self, comment: Option<Comment>) {
        match self {
            Value::Scalar(s) => s.post_comment = comment,
            Value::Object(o) => o.close.post_comment = comment,
        }
    }

    /// Whether this value or anything inside it carries a comment.
    pub fn has_comments(&self) -> bool {
        match self {
            Value::Scalar(s) => s.has_comments(),
            Value::Object(o) => o.has_comments(),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::String(Text::new(s))
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::String(Text::new(s))
    }
}

impl From<Text> for ScalarValue {
    fn from(t: Text) -> Self {
        ScalarValue::String(t)
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        ScalarValue::Number(Number::from(i))
    }
}

impl From<f64> for ScalarValue {
    fn from(f: f64) -> Self {
        ScalarValue::Number(Number::from(f))
    }
}

impl From<Number> for ScalarValue {
    fn from(n: Number) -> Self {
        ScalarValue::Number(n)
    }
}

impl From<Date> for ScalarValue {
    fn from(d: Date) -> Self {
        ScalarValue::Date(d)
    }
}

impl<T: Into<ScalarValue>> From<T> for Scalar {
    fn from(value: T) -> Self {
        Commented::new(value.into())
    }
}

impl<T: Into<ScalarValue>> From<T> for Value {
    fn from(value: T) -> Self {
        Value::Scalar(Commented::new(value.into()))
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}
