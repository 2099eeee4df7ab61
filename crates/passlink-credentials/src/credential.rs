//! The credential record as stored and returned to verifiers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CredentialError, CredentialResult};

/// An issued course credential.
///
/// Only `id` and `student_address` carry meaning for share redemption; the
/// rest is passed through to the verifier untouched, including any fields
/// this type does not name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Credential identifier.
    pub id: String,
    /// Address of the owning student.
    pub student_address: String,
    /// Course the credential certifies.
    #[serde(default)]
    pub course_name: String,
    /// Issuing institution.
    #[serde(default)]
    pub issuer_name: String,
    /// Issue time, Unix seconds.
    #[serde(default)]
    pub issue_date: i64,
    /// Expiry time, Unix seconds. `0` means no expiry.
    #[serde(default)]
    pub expiration_date: i64,
    /// Whether the issuer has revoked it.
    #[serde(default)]
    pub revoked: bool,
    /// Fields not modelled here.
    #[serde(default, flatten, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Credential {
    /// Whether the credential has expired at `now` (Unix seconds).
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expiration_date != 0 && now >= self.expiration_date
    }

    /// Whether this credential belongs to `owner`, ignoring case and `0x`.
    #[must_use]
    pub fn is_owned_by(&self, owner: &str) -> bool {
        strip_hex_prefix(&self.student_address).eq_ignore_ascii_case(strip_hex_prefix(owner))
    }

    /// Check the fields an indexer must supply.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidCredential`] if `id` or
    /// `student_address` is blank.
    pub fn validate(&self) -> CredentialResult<()> {
        if self.id.trim().is_empty() {
            return Err(CredentialError::InvalidCredential("id is empty".into()));
        }
        if self.student_address.trim().is_empty() {
            return Err(CredentialError::InvalidCredential(
                "studentAddress is empty".into(),
            ));
        }
        Ok(())
    }
}

fn strip_hex_prefix(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
