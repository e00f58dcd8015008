/// Card text composition.
pub mod text;
