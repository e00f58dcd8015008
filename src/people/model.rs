use chrono::{Datelike, NaiveDate};

use crate::foundation::error::{CardError, CardResult};

/// Directory identifier of a person.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(pub String);

/// Directory identifier of a household.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HouseholdId(pub String);

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for HouseholdId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Month/day of a celebration, with the year of the event when the directory knows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CelebrationDate {
    /// Month, 1-based.
    pub month: u32,
    /// Day of month, 1-based.
    pub day: u32,
    /// Year of birth or wedding, if recorded.
    pub year: Option<i32>,
}

impl CelebrationDate {
    /// Parse `YYYY-MM-DD` or `MM-DD`.
    ///
    /// `MM-DD` is validated against a leap year so `02-29` is accepted.
    pub fn parse(s: &str) -> CardResult<Self> {
        let s = s.trim();
        if let Ok(date) = Self::parse_full(s) {
            return Ok(date);
        }
        let d = NaiveDate::parse_from_str(&format!("2000-{s}"), "%Y-%m-%d")
            .map_err(|_| CardError::validation(format!("unrecognized date \"{s}\"")))?;
        Ok(Self {
            month: d.month(),
            day: d.day(),
            year: None,
        })
    }

    /// Parse a complete `YYYY-MM-DD` date only.
    pub fn parse_full(s: &str) -> CardResult<Self> {
        let d = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| CardError::validation(format!("expected YYYY-MM-DD, got \"{s}\"")))?;
        Ok(Self {
            month: d.month(),
            day: d.day(),
            year: Some(d.year()),
        })
    }

    /// `true` when month and day match `today`, regardless of year.
    pub fn falls_on(&self, today: NaiveDate) -> bool {
        self.month == today.month() && self.day == today.day()
    }
}

/// One person as returned by the directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonRecord {
    /// Directory id; some endpoints omit it.
    pub id: Option<PersonId>,
    /// Display name as recorded in the directory.
    pub full_name: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Birthday or anniversary date.
    pub date: CelebrationDate,
}

impl PersonRecord {
    /// Minimal record used for birthday entries and tests.
    pub fn named(full_name: impl Into<String>, date: CelebrationDate) -> Self {
        Self {
            id: None,
            full_name: full_name.into(),
            first_name: None,
            last_name: None,
            date,
        }
    }
}

/// Final display unit placed on the postcard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CelebrationEntry {
    /// Single name, or a merged couple name.
    pub display_name: String,
}

impl CelebrationEntry {
    /// Wrap a display name.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/people/model.rs"]
mod tests;
