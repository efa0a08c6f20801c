use serde::{Deserialize, Serialize};
use std::fmt;

use super::patterns;

/// The seven contact fields a card can yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Name,
    Title,
    Company,
    Email,
    Phone,
    Website,
    Address,
}

impl FieldName {
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Title,
        Self::Company,
        Self::Email,
        Self::Phone,
        Self::Website,
        Self::Address,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Title => "title",
            Self::Company => "company",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Website => "website",
            Self::Address => "address",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One surviving line of OCR text.
///
/// `index` is the position among surviving lines, not the raw line offset.
/// `consumed_by` is written at most once per classification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub index: usize,
    pub text: String,
    pub consumed_by: Option<FieldName>,
}

impl Line {
    #[must_use]
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            consumed_by: None,
        }
    }

    pub const fn is_consumed(&self) -> bool {
        self.consumed_by.is_some()
    }

    /// Marks the line as consumed by `field`. Returns false, leaving the
    /// line untouched, if another field already owns it.
    pub fn consume(&mut self, field: FieldName) -> bool {
        if self.consumed_by.is_some() {
            return false;
        }
        self.consumed_by = Some(field);
        true
    }
}

/// Splits raw OCR text into trimmed, non-empty, non-separator lines,
/// indexed contiguously from zero in their original order.
pub fn normalize(raw: &str) -> Vec<Line> {
    raw.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty() && !patterns::is_separator(line))
        .enumerate()
        .map(|(index, text)| Line::new(index, text))
        .collect()
}
