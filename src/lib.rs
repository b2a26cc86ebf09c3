//! jresolve
//!
//! Type model and resolution engine for a Java-like language: canonical type
//! handles, assignability, member lookup and overload specificity.

pub mod feedback;
pub mod loader;
pub mod model;
pub mod types;
pub mod utils;
