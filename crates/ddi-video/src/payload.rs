//! Animation request payload.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::requester::AnimationError;

/// Length of the hex idempotency key.
const KEY_LEN: usize = 16;

/// Data needed to render an interaction animation.
///
/// Serialized as `{drug1, drug2, smiles1, smiles2, sideEffects}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationPayload {
    pub drug1: String,
    pub drug2: String,
    pub smiles1: String,
    pub smiles2: String,
    pub side_effects: String,
}

impl AnimationPayload {
    pub fn new(
        drug1: impl Into<String>,
        drug2: impl Into<String>,
        smiles1: impl Into<String>,
        smiles2: impl Into<String>,
        side_effects: impl Into<String>,
    ) -> Self {
        Self {
            drug1: drug1.into(),
            drug2: drug2.into(),
            smiles1: smiles1.into(),
            smiles2: smiles2.into(),
            side_effects: side_effects.into(),
        }
    }

    /// Check that both names and both identifiers are present.
    pub fn validate(&self) -> Result<(), AnimationError> {
        let required = [
            ("drug1", &self.drug1),
            ("drug2", &self.drug2),
            ("smiles1", &self.smiles1),
            ("smiles2", &self.smiles2),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AnimationError::MissingField(field.to_string()));
            }
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate), and side effects must be present too.
    ///
    /// The renderer narrates the side effects, so the service requires them.
    pub fn validate_for_render(&self) -> Result<(), AnimationError> {
        self.validate()?;
        if self.side_effects.trim().is_empty() {
            return Err(AnimationError::MissingField("sideEffects".to_string()));
        }
        Ok(())
    }

    /// Deterministic key for the unordered name pair.
    ///
    /// SHA-256 over the trimmed, lowercased names in sorted order.
    pub fn idempotency_key(&self) -> String {
        let mut names = [
            self.drug1.trim().to_lowercase(),
            self.drug2.trim().to_lowercase(),
        ];
        names.sort();

        let mut hasher = Sha256::new();
        hasher.update(names[0].as_bytes());
        hasher.update([0u8]);
        hasher.update(names[1].as_bytes());
        let mut key = hex::encode(hasher.finalize());
        key.truncate(KEY_LEN);
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> AnimationPayload {
        AnimationPayload::new(
            "Warfarin",
            "Aspirin",
            "CC(=O)CC(C1=CC=CC=C1)C1=C(O)C2=CC=CC=C2OC1=O",
            "CC(=O)OC1=CC=CC=C1C(=O)O",
            "1: hemorrhage",
        )
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(payload()).unwrap();
        assert_eq!(json["drug1"], "Warfarin");
        assert_eq!(json["sideEffects"], "1: hemorrhage");
        assert!(json.get("side_effects").is_none());
    }

    #[test]
    fn test_missing_fields_deserialize_empty() {
        let parsed: AnimationPayload = serde_json::from_str(r#"{"drug1":"Warfarin"}"#).unwrap();
        assert_eq!(parsed.drug2, "");
        assert_eq!(
            parsed.validate(),
            Err(AnimationError::MissingField("drug2".into()))
        );
    }

    #[test]
    fn test_validate() {
        assert!(payload().validate().is_ok());

        let mut missing = payload();
        missing.smiles2 = "  ".into();
        assert_eq!(
            missing.validate(),
            Err(AnimationError::MissingField("smiles2".into()))
        );

        let mut no_effects = payload();
        no_effects.side_effects.clear();
        assert!(no_effects.validate().is_ok());
        assert_eq!(
            no_effects.validate_for_render(),
            Err(AnimationError::MissingField("sideEffects".into()))
        );
    }

    #[test]
    fn test_idempotency_key_is_order_and_case_insensitive() {
        let forward = payload();
        let mut reverse = payload();
        reverse.drug1 = " aspirin ".into();
        reverse.drug2 = "WARFARIN".into();

        assert_eq!(forward.idempotency_key(), reverse.idempotency_key());
        assert_eq!(forward.idempotency_key().len(), 16);

        let mut other = payload();
        other.drug2 = "Ibuprofen".into();
        assert_ne!(forward.idempotency_key(), other.idempotency_key());
    }
}
