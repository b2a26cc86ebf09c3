//! Primitive kinds and JVM descriptor encoding

pub mod descriptor;
mod primitive;

pub use primitive::Primitive;
