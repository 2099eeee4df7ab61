//! Share-link redemption.
//!
//! A redemption walks a fixed sequence of stages and stops at the first
//! failure:
//!
//! ```text
//! Received -> Decoded -> SignatureVerified -> Admitted -> Resolved -> Responded
//! ```
//!
//! Admission consumes a view before the credential is resolved, so a token
//! whose signer owns nothing still spends one view of its nonce. Nothing is
//! rolled back and nothing is retried.

use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use passlink_capabilities::{CapabilityError, ShareToken, ViewGate};
use passlink_credentials::{Credential, CredentialError, CredentialResolver};
use passlink_crypto::Address;
use thiserror::Error;

/// Where a redemption stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionStage {
    /// Token text arrived.
    Received,
    /// Token parsed and validated.
    Decoded,
    /// Signer recovered.
    SignatureVerified,
    /// A view was admitted by the gate.
    Admitted,
    /// The signer's credential was found.
    Resolved,
    /// A result was produced.
    Responded,
}

impl fmt::Display for RedemptionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Decoded => "decoded",
            Self::SignatureVerified => "signature_verified",
            Self::Admitted => "admitted",
            Self::Resolved => "resolved",
            Self::Responded => "responded",
        };
        f.write_str(name)
    }
}

/// Why a redemption was rejected.
///
/// `Display` carries diagnostic detail for logs; callers only ever see
/// [`public_message`](Self::public_message) and [`code`](Self::code).
#[derive(Debug, Error)]
pub enum RedeemError {
    /// No token in the request.
    #[error("missing access token")]
    MissingToken,

    /// Token text is not base64 or not JSON.
    #[error("malformed token: {0}")]
    Decode(String),

    /// Token has the wrong shape or an invalid claim.
    #[error("invalid payload: {0}")]
    Payload(String),

    /// Signature malformed or unrecoverable.
    #[error("invalid signature: {0}")]
    Signature(String),

    /// The nonce's view budget is spent.
    #[error("view limit reached for nonce {nonce} (max {max_views})")]
    ViewLimitReached {
        /// Exhausted nonce.
        nonce: String,
        /// The link's cap.
        max_views: u32,
    },

    /// The signer owns no credential with the requested id.
    #[error("credential {credential_id} not owned by signer")]
    NotFound {
        /// Requested credential id.
        credential_id: String,
    },

    /// A collaborator failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RedeemError {
    /// HTTP status for this rejection.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::Decode(_) | Self::Payload(_) | Self::Signature(_) => {
                StatusCode::BAD_REQUEST
            },
            Self::ViewLimitReached { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "invalid_token",
            Self::MissingToken | Self::Payload(_) => "invalid_payload",
            Self::Signature(_) => "invalid_signature",
            Self::ViewLimitReached { .. } => "view_limit_reached",
            Self::NotFound { .. } => "credential_not_found",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Message safe to return to the caller.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MissingToken => "Missing access token",
            Self::Decode(_) => "Invalid token format",
            Self::Payload(_) => "Invalid payload structure",
            Self::Signature(_) => "Invalid signature",
            Self::ViewLimitReached { .. } => "Access Link Expired: Max views reached.",
            Self::NotFound { .. } => "Credential not found or does not belong to signer.",
            Self::Internal(_) => "Internal Server Validation Error",
        }
    }
}

impl From<CapabilityError> for RedeemError {
    fn from(e: CapabilityError) -> Self {
        match e {
            CapabilityError::Decode(detail) => Self::Decode(detail),
            CapabilityError::InvalidPayload(detail) => Self::Payload(detail),
            CapabilityError::InvalidSignature(detail) => Self::Signature(detail),
            CapabilityError::ViewLimitReached { nonce, max_views } => {
                Self::ViewLimitReached { nonce, max_views }
            },
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<CredentialError> for RedeemError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::NotFound { credential_id } => Self::NotFound { credential_id },
            other => Self::Internal(other.to_string()),
        }
    }
}

/// A successful redemption.
#[derive(Debug, Clone)]
pub struct Redemption {
    /// The shared credential.
    pub credential: Credential,
    /// Views left on the link after this one.
    pub views_left: u32,
    /// Address recovered from the token's signature.
    pub owner: Address,
}

/// Composes the codec, the gate and the resolver into one redemption.
///
/// Holds no state of its own; the gate owns the view counters.
#[derive(Clone)]
pub struct RedemptionService {
    gate: Arc<dyn ViewGate>,
    resolver: CredentialResolver,
}

impl RedemptionService {
    /// Create a service over `gate` and `resolver`.
    #[must_use]
    pub fn new(gate: Arc<dyn ViewGate>, resolver: CredentialResolver) -> Self {
        Self { gate, resolver }
    }

    /// The view gate.
    #[must_use]
    pub fn gate(&self) -> &Arc<dyn ViewGate> {
        &self.gate
    }

    /// The credential resolver.
    #[must_use]
    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    /// Redeem `token` once.
    ///
    /// Records the token's nonce on the current span when it has a `nonce`
    /// field.
    ///
    /// # Errors
    ///
    /// Returns the [`RedeemError`] of the first stage that fails.
    pub async fn redeem(&self, token: Option<&str>) -> Result<Redemption, RedeemError> {
        let mut stage = RedemptionStage::Received;
        let result = self.run(token, &mut stage).await;
        if result.is_ok() {
            stage = RedemptionStage::Responded;
        }

        match &result {
            Ok(redemption) => tracing::info!(
                stage = %stage,
                owner = %redemption.owner,
                credential_id = %redemption.credential.id,
                views_left = redemption.views_left,
                "Share token redeemed"
            ),
            Err(e @ RedeemError::Internal(_)) => {
                tracing::error!(stage = %stage, error = %e, "Redemption failed");
            },
            Err(e) => {
                tracing::info!(stage = %stage, code = e.code(), error = %e, "Redemption rejected");
            },
        }

        result
    }

    async fn run(
        &self,
        token: Option<&str>,
        stage: &mut RedemptionStage,
    ) -> Result<Redemption, RedeemError> {
        let text = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(RedeemError::MissingToken)?;

        let token = ShareToken::decode(text)?;
        *stage = RedemptionStage::Decoded;
        tracing::Span::current().record("nonce", token.payload.nonce.as_str());

        let owner = token.signer_address()?;
        *stage = RedemptionStage::SignatureVerified;

        let admission = self
            .gate
            .try_admit(&token.payload.nonce, token.payload.max_views)
            .await?;
        *stage = RedemptionStage::Admitted;

        let credential = self
            .resolver
            .resolve_owned(&owner, &token.payload.credential_id)
            .await?;
        *stage = RedemptionStage::Resolved;

        Ok(Redemption {
            credential,
            views_left: admission.views_left,
            owner,
        })
    }
}

impl fmt::Debug for RedemptionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedemptionService")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passlink_capabilities::InMemoryViewGate;
    use passlink_credentials::InMemoryCredentialStore;
    use passlink_capabilities::SharePayload;
    use passlink_crypto::{LocalSigner, RecoverableSignature, SIGNATURE_LENGTH, Signer};
    use serde_json::Map;

    fn credential(id: &str, owner: &Address) -> Credential {
        Credential {
            id: id.into(),
            student_address: owner.to_string(),
            course_name: "Operating Systems".into(),
            issuer_name: "Open University".into(),
            issue_date: 1_700_000_000,
            expiration_date: 0,
            revoked: false,
            extra: Map::new(),
        }
    }

    fn service(credentials: Vec<Credential>) -> RedemptionService {
        let store = Arc::new(InMemoryCredentialStore::with_credentials(credentials));
        RedemptionService::new(
            Arc::new(InMemoryViewGate::new()),
            CredentialResolver::new(store),
        )
    }

    #[tokio::test]
    async fn test_redeem_success() {
        let owner = LocalSigner::generate();
        let svc = service(vec![credential("c1", &owner.address())]);
        let token = ShareToken::issue("c1", 2, &owner).unwrap().encode().unwrap();

        let redemption = svc.redeem(Some(&token)).await.unwrap();
        assert_eq!(redemption.owner, owner.address());
        assert_eq!(redemption.credential.id, "c1");
        assert_eq!(redemption.views_left, 1);
    }

    #[tokio::test]
    async fn test_missing_token() {
        let svc = service(Vec::new());
        for token in [None, Some(""), Some("   ")] {
            let err = svc.redeem(token).await.unwrap_err();
            assert!(matches!(err, RedeemError::MissingToken));
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
            assert_eq!(err.code(), "invalid_payload");
        }
    }

    #[tokio::test]
    async fn test_limit_then_forbidden() {
        let owner = LocalSigner::generate();
        let svc = service(vec![credential("c1", &owner.address())]);
        let token = ShareToken::issue("c1", 1, &owner).unwrap().encode().unwrap();

        svc.redeem(Some(&token)).await.unwrap();
        let err = svc.redeem(Some(&token)).await.unwrap_err();
        assert!(matches!(err, RedeemError::ViewLimitReached { max_views: 1, .. }));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.public_message(), "Access Link Expired: Max views reached.");
    }

    #[tokio::test]
    async fn test_not_found_still_consumes_view() {
        let owner = LocalSigner::generate();
        let svc = service(Vec::new());
        let token = ShareToken::issue("c1", 3, &owner).unwrap();

        let err = svc
            .redeem(Some(&token.encode().unwrap()))
            .await
            .unwrap_err();
        assert!(matches!(err, RedeemError::NotFound { .. }));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(svc.gate().views_used(&token.payload.nonce).await.unwrap(), 1);
    }

    #[test]
    fn test_error_mapping() {
        let cases = [
            (RedeemError::Decode("x".into()), 400, "invalid_token"),
            (RedeemError::Payload("x".into()), 400, "invalid_payload"),
            (RedeemError::Signature("x".into()), 400, "invalid_signature"),
            (
                RedeemError::ViewLimitReached {
                    nonce: "n".into(),
                    max_views: 1,
                },
                403,
                "view_limit_reached",
            ),
            (
                RedeemError::NotFound {
                    credential_id: "c".into(),
                },
                404,
                "credential_not_found",
            ),
            (RedeemError::Internal("x".into()), 500, "internal_error"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status().as_u16(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[tokio::test]
    async fn test_unrecoverable_signature_rejected_before_admission() {
        let owner = LocalSigner::generate();
        let svc = service(vec![credential("c1", &owner.address())]);
        let payload = SharePayload::new("c1", 3);

        let mut zero_scalars = [0u8; SIGNATURE_LENGTH];
        zero_scalars[64] = 27;

        let mut bad_v = *owner
            .sign_message(&payload.canonical_bytes().unwrap())
            .unwrap()
            .as_bytes();
        bad_v[64] = 5;

        for bytes in [zero_scalars, bad_v] {
            let token = ShareToken::new(payload.clone(), RecoverableSignature::from_bytes(bytes))
                .encode()
                .unwrap();
            let err = svc.redeem(Some(&token)).await.unwrap_err();
            assert!(matches!(err, RedeemError::Signature(_)), "got {err:?}");
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
            assert_eq!(err.code(), "invalid_signature");
            assert_eq!(err.public_message(), "Invalid signature");
        }
        assert_eq!(svc.gate().views_used(&payload.nonce).await.unwrap(), 0);
    }

    #[test]
    fn test_internal_detail_not_public() {
        let err = RedeemError::from(CredentialError::StorageError("disk on fire".into()));
        assert!(err.to_string().contains("disk on fire"));
        assert!(!err.public_message().contains("disk"));
    }
}
