/// Canvas and color primitives.
pub mod core;
/// Crate error taxonomy.
pub mod error;
