//! Utility module

mod span;
mod error;
pub(crate) mod sync;

pub use span::Span;
pub use error::{Error, Result};
