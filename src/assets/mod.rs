//! Template images and typefaces.

/// Font loading, shaping and measurement.
pub mod fonts;
/// Template resolution and decoding.
pub mod template;
