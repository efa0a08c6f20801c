use serde::{Deserialize, Serialize};

use super::classifier::Classification;
use super::normalizer::FieldName;

/// Structured contact record. Every field is always present; a field no
/// pass could fill is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedContact {
    pub name: String,
    pub title: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: String,
    pub raw_text: String,
}

impl ParsedContact {
    pub fn get(&self, field: FieldName) -> &str {
        match field {
            FieldName::Name => &self.name,
            FieldName::Title => &self.title,
            FieldName::Company => &self.company,
            FieldName::Email => &self.email,
            FieldName::Phone => &self.phone,
            FieldName::Website => &self.website,
            FieldName::Address => &self.address,
        }
    }

    fn slot(&mut self, field: FieldName) -> &mut String {
        match field {
            FieldName::Name => &mut self.name,
            FieldName::Title => &mut self.title,
            FieldName::Company => &mut self.company,
            FieldName::Email => &mut self.email,
            FieldName::Phone => &mut self.phone,
            FieldName::Website => &mut self.website,
            FieldName::Address => &mut self.address,
        }
    }

    /// True when no contact field was filled.
    pub fn is_empty(&self) -> bool {
        FieldName::ALL.iter().all(|&f| self.get(f).is_empty())
    }

    pub fn missing_fields(&self) -> Vec<FieldName> {
        FieldName::ALL
            .into_iter()
            .filter(|&f| self.get(f).is_empty())
            .collect()
    }
}

pub fn assemble(raw_text: &str, classification: &Classification) -> ParsedContact {
    let mut contact = ParsedContact {
        raw_text: raw_text.to_string(),
        ..ParsedContact::default()
    };

    for (&field, value) in classification.assignments() {
        value.clone_into(contact.slot(field));
    }

    contact
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::classifier::classify;
    use crate::extract::normalizer::normalize;

    #[test]
    fn test_unassigned_fields_are_empty_strings() {
        let raw = "jane@example.com";
        let contact = assemble(raw, &classify(normalize(raw)));

        assert_eq!(contact.email, "jane@example.com");
        assert_eq!(contact.raw_text, raw);
        assert_eq!(contact.missing_fields().len(), 6);
        assert!(!contact.is_empty());
    }

    #[test]
    fn test_serializes_every_key() {
        let contact = assemble("", &classify(Vec::new()));
        let json = serde_json::to_value(&contact).unwrap();

        for key in [
            "name", "title", "company", "email", "phone", "website", "address", "rawText",
        ] {
            assert_eq!(json[key], "", "missing or non-empty key {key}");
        }
        assert!(contact.is_empty());
    }

    #[test]
    fn test_raw_text_kept_verbatim() {
        let raw = "  ----\n  John Doe  \n";
        let contact = assemble(raw, &classify(normalize(raw)));

        assert_eq!(contact.raw_text, raw);
        assert_eq!(contact.name, "John Doe");
    }
}
