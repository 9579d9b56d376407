//! Type-directed formatting for the map's `Display` output. Textual keys and
//! values are wrapped in double quotes; everything else goes through its own
//! `Display` impl untouched.

use std::{
    any::Any,
    borrow::Cow,
    fmt::{self, Display, Formatter},
    rc::Rc,
    sync::Arc,
};

/// Borrows a key or value for rendering.
pub(crate) struct Rendered<'a, T>(pub(crate) &'a T);

impl<T> Display for Rendered<'_, T>
where
    T: Display + Any,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let any: &dyn Any = self.0;

        if let Some(text) = as_text(any) {
            write!(f, "\"{}\"", text)
        } else if let Some(c) = any.downcast_ref::<char>() {
            write!(f, "\"{}\"", c)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// The string slice behind `any`, if its concrete type is one of the owned or
/// borrowed string types.
fn as_text(any: &dyn Any) -> Option<&str> {
    if let Some(s) = any.downcast_ref::<&'static str>() {
        Some(*s)
    } else if let Some(s) = any.downcast_ref::<String>() {
        Some(s.as_str())
    } else if let Some(s) = any.downcast_ref::<Box<str>>() {
        Some(&**s)
    } else if let Some(s) = any.downcast_ref::<Cow<'static, str>>() {
        Some(&**s)
    } else if let Some(s) = any.downcast_ref::<Rc<str>>() {
        Some(&**s)
    } else if let Some(s) = any.downcast_ref::<Arc<str>>() {
        Some(&**s)
    } else {
        None
    }
}
