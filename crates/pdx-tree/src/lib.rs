//! Node model for Paradox-style script files.
//!
//! A parsed file is a [`TopLevel`]: an ordered list of [`Item`]s, each either
//! a [`Pair`] (`key op value`) or a bare [`Value`]. Values are scalars or
//! braced [`Object`]s. Comments ride along on the nodes they belong to, so a
//! tree can be printed back without losing them.
//!
//! ```
//! use pdx_tree::{Object, Pair, TopLevel};
//!
//! let top = TopLevel::new(vec![
//!     Pair::new("name", "Alice"),
//!     Pair::new("scores", Object::from_values([1i64, 2, 3])),
//! ]);
//! assert_eq!(top.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

mod key;
mod object;
mod value;

pub use key::Key;
pub use object::{Entries, HEADER_MARKER, Item, Object, Pair, TopLevel};
pub use value::{
    Brace, BraceKind, Comment, Commented, Date, Number, NumberValue, OpNode, Operator, Scalar,
    ScalarValue, Text, Value,
};
