use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::normalizer::{FieldName, Line};
use super::patterns;

/// Only this many unconsumed lines from the top are considered for the name.
const NAME_WINDOW: usize = 5;

/// Output of [`classify`]: one value per assigned field, plus the lines with
/// their consumption record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    assignments: BTreeMap<FieldName, String>,
    lines: Vec<Line>,
}

impl Classification {
    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.assignments.get(&field).map(String::as_str)
    }

    pub const fn assignments(&self) -> &BTreeMap<FieldName, String> {
        &self.assignments
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Indices of every line some field consumed.
    pub fn consumed(&self) -> BTreeSet<usize> {
        self.lines
            .iter()
            .filter(|l| l.is_consumed())
            .map(|l| l.index)
            .collect()
    }

    /// Indices of the lines attributed to `field`, top to bottom.
    pub fn sources(&self, field: FieldName) -> Vec<usize> {
        self.lines
            .iter()
            .filter(|l| l.consumed_by == Some(field))
            .map(|l| l.index)
            .collect()
    }
}

/// Classifies normalized lines into contact fields.
///
/// Passes run in a fixed order and each only looks at lines no earlier pass
/// consumed: contact info, title/company keywords, name, company fallback,
/// address. A field, once set, is never overwritten.
pub fn classify(lines: Vec<Line>) -> Classification {
    let mut classifier = Classifier {
        assignments: BTreeMap::new(),
        lines,
    };

    classifier.contact_pass();
    classifier.keyword_pass();
    classifier.name_pass();
    classifier.company_fallback_pass();
    classifier.address_pass();

    Classification {
        assignments: classifier.assignments,
        lines: classifier.lines,
    }
}

struct Classifier {
    assignments: BTreeMap<FieldName, String>,
    lines: Vec<Line>,
}

impl Classifier {
    fn has(&self, field: FieldName) -> bool {
        self.assignments.contains_key(&field)
    }

    fn unconsumed(&self) -> Vec<usize> {
        (0..self.lines.len())
            .filter(|&i| !self.lines[i].is_consumed())
            .collect()
    }

    fn assign(&mut self, position: usize, field: FieldName, value: String) {
        if self.has(field) || !self.lines[position].consume(field) {
            return;
        }
        tracing::debug!(field = %field, line = self.lines[position].index, "assigned");
        self.assignments.insert(field, value);
    }

    fn contact_pass(&mut self) {
        for i in self.unconsumed() {
            let text = &self.lines[i].text;

            if !self.has(FieldName::Email) {
                if let Some(email) = patterns::find_email(text).map(str::to_owned) {
                    self.assign(i, FieldName::Email, email);
                    continue;
                }
            }

            if !self.has(FieldName::Phone) {
                if let Some(phone) = patterns::find_phone(text).map(str::to_owned) {
                    self.assign(i, FieldName::Phone, phone);
                    continue;
                }
            }

            if !self.has(FieldName::Website) {
                if let Some(website) = patterns::find_website(text) {
                    self.assign(i, FieldName::Website, website);
                }
            }
        }
    }

    fn keyword_pass(&mut self) {
        for i in self.unconsumed() {
            let text = &self.lines[i].text;

            if !self.has(FieldName::Title) && patterns::has_title_keyword(text) {
                let value = text.clone();
                self.assign(i, FieldName::Title, value);
            } else if !self.has(FieldName::Company) && patterns::has_company_indicator(text) {
                let value = text.clone();
                self.assign(i, FieldName::Company, value);
            }
        }
    }

    fn name_pass(&mut self) {
        if self.has(FieldName::Name) {
            return;
        }

        let candidate = self
            .unconsumed()
            .into_iter()
            .take(NAME_WINDOW)
            .find(|&i| patterns::looks_like_name(&self.lines[i].text));

        if let Some(i) = candidate {
            let value = self.lines[i].text.clone();
            self.assign(i, FieldName::Name, value);
        }
    }

    fn company_fallback_pass(&mut self) {
        if self.has(FieldName::Company) {
            return;
        }

        let candidate = self.unconsumed().into_iter().find(|&i| {
            let text = &self.lines[i].text;
            text.chars().count() > 3
                && !patterns::has_contact_info(text)
                && !patterns::looks_like_address(text)
                && (patterns::is_upper_case(text) || patterns::word_count(text) <= 4)
        });

        if let Some(i) = candidate {
            let value = self.lines[i].text.clone();
            self.assign(i, FieldName::Company, value);
        }
    }

    fn address_pass(&mut self) {
        if self.has(FieldName::Address) {
            return;
        }

        let mut parts = Vec::new();
        let mut found_address_shape = false;
        let mut i = 0;

        // Detection sees every line; only unconsumed ones are taken.
        while i < self.lines.len() {
            if patterns::looks_like_address(&self.lines[i].text) {
                found_address_shape = true;

                if self.lines[i].consume(FieldName::Address) {
                    parts.push(self.lines[i].text.clone());

                    let next = i + 1;
                    if next < self.lines.len()
                        && patterns::is_address_continuation(&self.lines[next].text)
                        && self.lines[next].consume(FieldName::Address)
                    {
                        parts.push(self.lines[next].text.clone());
                        i = next;
                    }
                }
            }
            i += 1;
        }

        if !found_address_shape {
            for i in self.unconsumed() {
                self.lines[i].consume(FieldName::Address);
                parts.push(self.lines[i].text.clone());
            }
            if !parts.is_empty() {
                tracing::debug!(lines = parts.len(), "no address-shaped line, using leftovers");
            }
        }

        if !parts.is_empty() {
            self.assignments.insert(FieldName::Address, parts.join(", "));
        }
    }
}
