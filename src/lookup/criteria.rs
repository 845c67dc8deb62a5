use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::PillRecord;

/// Input parameters for the pill request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LookupCriteria {
    /// color of the pill
    pub color: String,
    /// shape of the pill
    pub shape: String,
    /// imprint on the pill, which is optional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imprint: Option<String>,
}

impl LookupCriteria {
    /// Creates criteria that match on color and shape only.
    pub fn new(color: impl Into<String>, shape: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            shape: shape.into(),
            imprint: None,
        }
    }

    /// Adds an imprint to match on.
    pub fn with_imprint(mut self, imprint: impl Into<String>) -> Self {
        self.imprint = Some(imprint.into());
        self
    }

    /// The imprint to match, if one was supplied. An empty imprint counts as
    /// not supplied.
    pub fn imprint(&self) -> Option<&str> {
        self.imprint.as_deref().filter(|imprint| !imprint.is_empty())
    }

    /// Returns whether `record` satisfies every supplied criterion.
    ///
    /// Comparison is exact and case-sensitive.
    pub fn matches(&self, record: &PillRecord) -> bool {
        record.color == self.color
            && record.shape == self.shape
            && self.imprint().is_none_or(|imprint| record.imprint == imprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn advil() -> PillRecord {
        PillRecord::new("Advil", "brown", "round", "I2", "http://x/1")
    }

    #[test]
    fn test_matches_without_imprint_ignores_record_imprint() {
        let criteria = LookupCriteria::new("brown", "round");
        assert!(criteria.matches(&advil()));
    }

    #[test]
    fn test_matches_all_three_fields() {
        assert!(LookupCriteria::new("brown", "round").with_imprint("I2").matches(&advil()));
        assert!(!LookupCriteria::new("brown", "round").with_imprint("ZZZ").matches(&advil()));
        assert!(!LookupCriteria::new("brown", "oval").with_imprint("I2").matches(&advil()));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert!(!LookupCriteria::new("Brown", "round").matches(&advil()));
        assert!(!LookupCriteria::new("brown", "round").with_imprint("i2").matches(&advil()));
    }

    #[test]
    fn test_empty_imprint_is_treated_as_absent() {
        let criteria = LookupCriteria::new("brown", "round").with_imprint("");
        assert_eq!(criteria.imprint(), None);
        assert!(criteria.matches(&advil()));
    }

    #[test]
    fn test_deserialize_optional_imprint() {
        let criteria: LookupCriteria =
            serde_json::from_value(json!({"color": "brown", "shape": "round"})).unwrap();
        assert_eq!(criteria, LookupCriteria::new("brown", "round"));

        let err = serde_json::from_value::<LookupCriteria>(json!({"color": "brown"})).unwrap_err();
        assert!(err.to_string().contains("shape"));
    }
}
