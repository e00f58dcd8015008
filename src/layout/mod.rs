//! Auto-fitting vertical layout of the card text.

/// Layout plan, style and measurement seam.
pub mod plan;
