//! The signed claim carried by a share link.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CapabilityError, CapabilityResult};

/// Action tag identifying a share-access claim.
pub const SHARE_ACTION: &str = "share_access";

/// A share-access claim.
///
/// Field order is significant: the canonical bytes are the compact JSON
/// rendering in declaration order, which is also what a browser produces
/// for `JSON.stringify` of the same object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SharePayload {
    /// Always [`SHARE_ACTION`].
    pub action: String,
    /// Identifier of the credential being shared.
    pub credential_id: String,
    /// Random value scoping this link's view budget.
    pub nonce: String,
    /// Number of successful redemptions the link allows.
    pub max_views: u32,
    /// Creation time in Unix milliseconds. Advisory only.
    pub timestamp: u64,
}

impl SharePayload {
    /// Build a claim for `credential_id` with a fresh v4 nonce and the current time.
    #[must_use]
    pub fn new(credential_id: impl Into<String>, max_views: u32) -> Self {
        Self {
            action: SHARE_ACTION.to_string(),
            credential_id: credential_id.into(),
            nonce: Uuid::new_v4().to_string(),
            max_views,
            timestamp: u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0),
        }
    }

    /// The exact bytes a signature over this claim covers.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::SerializationError`] if the claim cannot be rendered.
    pub fn canonical_bytes(&self) -> CapabilityResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| CapabilityError::SerializationError(e.to_string()))
    }

    /// Check the claim's semantic invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::InvalidPayload`] if the action tag is wrong,
    /// the credential id or nonce is blank, or `max_views` is zero.
    pub fn validate(&self) -> CapabilityResult<()> {
        if self.action != SHARE_ACTION {
            return Err(CapabilityError::InvalidPayload(format!(
                "unexpected action {:?}",
                self.action
            )));
        }
        if self.credential_id.trim().is_empty() {
            return Err(CapabilityError::InvalidPayload(
                "credentialId is empty".into(),
            ));
        }
        if self.nonce.trim().is_empty() {
            return Err(CapabilityError::InvalidPayload("nonce is empty".into()));
        }
        if self.max_views == 0 {
            return Err(CapabilityError::InvalidPayload(
                "maxViews must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> SharePayload {
        SharePayload {
            action: SHARE_ACTION.into(),
            credential_id: "cred-1".into(),
            nonce: "6f1c2d9e-0000-4000-8000-000000000001".into(),
            max_views: 3,
            timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_canonical_bytes_field_order() {
        let bytes = payload().canonical_bytes().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"action":"share_access","credentialId":"cred-1","nonce":"6f1c2d9e-0000-4000-8000-000000000001","maxViews":3,"timestamp":1700000000000}"#
        );
    }

    #[test]
    fn test_new_draws_unique_nonces() {
        let a = SharePayload::new("cred-1", 2);
        let b = SharePayload::new("cred-1", 2);
        assert_ne!(a.nonce, b.nonce);
        assert_eq!(a.action, SHARE_ACTION);
        assert!(a.timestamp > 0);
        a.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_claims() {
        let mut wrong_action = payload();
        wrong_action.action = "grant_admin".into();

        let mut blank_id = payload();
        blank_id.credential_id = "  ".into();

        let mut blank_nonce = payload();
        blank_nonce.nonce = String::new();

        let mut zero_views = payload();
        zero_views.max_views = 0;

        for bad in [wrong_action, blank_id, blank_nonce, zero_views] {
            assert!(matches!(
                bad.validate(),
                Err(CapabilityError::InvalidPayload(_))
            ));
        }
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{"action":"share_access","credentialId":"c","nonce":"n","maxViews":1,"timestamp":0,"admin":true}"#;
        assert!(serde_json::from_str::<SharePayload>(json).is_err());
    }
}
