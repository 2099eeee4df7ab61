//! Shared fixtures for integration tests.

use std::sync::Arc;

use passlink_capabilities::{InMemoryViewGate, ShareToken};
use passlink_credentials::{Credential, CredentialResolver, InMemoryCredentialStore};
use passlink_crypto::{LocalSigner, Signer};
use passlink_gateway::{AppState, RedemptionService};

/// Deterministic signer for identity `seed` (1..=255).
#[allow(dead_code)]
pub fn signer(seed: u8) -> LocalSigner {
    LocalSigner::from_secret_key(&[seed; 32]).expect("seeded key is a valid scalar")
}

/// A credential with `id` owned by `owner`.
#[allow(dead_code)]
pub fn credential(id: &str, owner: &LocalSigner) -> Credential {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "studentAddress": owner.address().to_lower_hex(),
        "courseName": "Distributed Systems",
        "issuerName": "Open University",
        "issueDate": 1_700_000_000,
        "expirationDate": 0,
        "revoked": false,
    }))
    .expect("fixture credential parses")
}

/// Store, gate and service wired together over `credentials`.
#[allow(dead_code)]
pub struct Harness {
    /// Shared gateway state.
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl Harness {
    /// Build a harness seeded with `credentials`.
    pub fn new(credentials: Vec<Credential>) -> Self {
        let store = Arc::new(InMemoryCredentialStore::with_credentials(credentials));
        Self {
            state: Arc::new(AppState::new(Arc::new(InMemoryViewGate::new()), store)),
        }
    }

    /// The redemption service.
    pub fn service(&self) -> &RedemptionService {
        &self.state.service
    }

    /// A second service sharing this harness's gate and store.
    pub fn cloned_service(&self) -> RedemptionService {
        RedemptionService::new(
            Arc::clone(self.state.service.gate()),
            CredentialResolver::new(Arc::clone(&self.state.credentials)),
        )
    }
}

/// Encoded share token for `credential_id` signed by `owner`.
#[allow(dead_code)]
pub fn token(owner: &LocalSigner, credential_id: &str, max_views: u32) -> String {
    ShareToken::issue(credential_id, max_views, owner)
        .and_then(|t| t.encode())
        .expect("token issues")
}
