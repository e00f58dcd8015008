use chrono::{Datelike, NaiveDate};

use crate::people::model::CelebrationEntry;

/// Header placed above birthday names.
pub const BIRTHDAY_HEADER: &str = "Cumpleaños";
/// Header placed above anniversary names.
pub const ANNIVERSARY_HEADER: &str = "Aniversario";

const MONTHS_ES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// One line of postcard text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    /// Bold section title.
    SectionHeader(String),
    /// A celebrant (person or couple).
    NameLine(String),
    /// Vertical spacer between sections.
    BlankSeparator,
    /// The date, pinned near the bottom of the card.
    DateLine(String),
}

impl Line {
    /// Text carried by the line; empty for separators.
    pub fn text(&self) -> &str {
        match self {
            Line::SectionHeader(t) | Line::NameLine(t) | Line::DateLine(t) => t,
            Line::BlankSeparator => "",
        }
    }
}

/// Ordered sequence of postcard lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextBlock {
    lines: Vec<Line>,
}

impl TextBlock {
    /// Wrap an explicit line sequence.
    pub fn from_lines(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Lines in display order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Number of lines, separators and date included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// `true` when the block has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Newline-joined text, separators as empty lines.
    pub fn to_plain_text(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Build the postcard text: birthdays, anniversaries, then the date.
pub fn compose(
    birthdays: &[CelebrationEntry],
    anniversaries: &[CelebrationEntry],
    today_label: &str,
) -> TextBlock {
    let mut lines = Vec::with_capacity(birthdays.len() + anniversaries.len() + 6);

    if !birthdays.is_empty() {
        lines.push(Line::SectionHeader(BIRTHDAY_HEADER.to_string()));
        lines.extend(
            birthdays
                .iter()
                .map(|e| Line::NameLine(e.display_name.clone())),
        );
    }

    if !birthdays.is_empty() && !anniversaries.is_empty() {
        lines.push(Line::BlankSeparator);
        lines.push(Line::BlankSeparator);
    }

    if !anniversaries.is_empty() {
        lines.push(Line::SectionHeader(ANNIVERSARY_HEADER.to_string()));
        lines.extend(
            anniversaries
                .iter()
                .map(|e| Line::NameLine(e.display_name.clone())),
        );
    }

    lines.push(Line::BlankSeparator);
    lines.push(Line::DateLine(today_label.to_string()));
    TextBlock { lines }
}

/// Spanish month name for a 1-based month.
pub fn month_name_es(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTHS_ES.get(idx).copied()
}

/// `"Marzo 5, 2024"`.
pub fn today_label(date: NaiveDate) -> String {
    let month = month_name_es(date.month()).unwrap_or_default();
    format!("{month} {}, {}", date.day(), date.year())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/text.rs"]
mod tests;
