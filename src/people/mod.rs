//! People records, the directory client and household grouping.

/// Directory interface and Planning Center client.
pub mod directory;
/// Couple and single grouping by household.
pub mod grouper;
/// Person, date and entry types.
pub mod model;
