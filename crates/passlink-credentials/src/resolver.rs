//! Ownership-scoped credential lookup.

use std::sync::Arc;

use passlink_crypto::Address;

use crate::credential::Credential;
use crate::error::{CredentialError, CredentialResult};
use crate::store::CredentialStore;

/// Resolves a credential only if the given address owns it.
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn CredentialStore>,
}

impl CredentialResolver {
    /// Create a resolver over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Find credential `credential_id` among those owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotFound`] when `owner` does not own a
    /// credential with that id, for whatever reason. Store failures are
    /// propagated unchanged.
    pub async fn resolve_owned(
        &self,
        owner: &Address,
        credential_id: &str,
    ) -> CredentialResult<Credential> {
        let owned = self
            .store
            .credentials_by_owner(&owner.to_lower_hex())
            .await?;
        owned
            .into_iter()
            .find(|c| c.id == credential_id)
            .ok_or_else(|| CredentialError::NotFound {
                credential_id: credential_id.to_string(),
            })
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCredentialStore;
    use serde_json::Map;

    fn alice() -> Address {
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap()
    }

    fn bob() -> Address {
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359".parse().unwrap()
    }

    fn credential(id: &str, owner: &str) -> Credential {
        Credential {
            id: id.into(),
            student_address: owner.into(),
            course_name: "Compilers".into(),
            issuer_name: "Open University".into(),
            issue_date: 1_700_000_000,
            expiration_date: 0,
            revoked: false,
            extra: Map::new(),
        }
    }

    fn resolver() -> CredentialResolver {
        let store = InMemoryCredentialStore::with_credentials(vec![
            credential("alice-1", &alice().to_string()),
            credential("bob-1", &bob().to_lower_hex()),
        ]);
        CredentialResolver::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_resolves_owned_credential() {
        let found = resolver().resolve_owned(&alice(), "alice-1").await.unwrap();
        assert_eq!(found.id, "alice-1");
    }

    #[tokio::test]
    async fn test_every_miss_is_not_found() {
        let resolver = resolver();
        let stranger: Address = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB".parse().unwrap();

        for (owner, id) in [
            (alice(), "missing"),
            (alice(), "bob-1"),
            (stranger, "alice-1"),
        ] {
            assert!(matches!(
                resolver.resolve_owned(&owner, id).await,
                Err(CredentialError::NotFound { .. })
            ));
        }
    }
}
