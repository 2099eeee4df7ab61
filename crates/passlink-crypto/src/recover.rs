//! Signer recovery for personal-message signatures.
//!
//! Messages are hashed the way wallet `personal_sign` does it: the bytes are
//! prefixed with `"\x19Ethereum Signed Message:\n"` and their decimal length,
//! then hashed with Keccak-256. Binding the prefix stops a share-token
//! signature from being replayed as a transaction signature.

use k256::ecdsa::VerifyingKey;
use sha3::{Digest, Keccak256};

use crate::address::Address;
use crate::error::{CryptoError, CryptoResult};
use crate::signature::RecoverableSignature;

/// Domain prefix for personal messages.
const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// Hash a message with the personal-message domain prefix.
#[must_use]
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX);
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Recover the address that signed `message`.
///
/// Pure: identical inputs always produce the identical address. A signature
/// made over different bytes does not fail here; it recovers some other
/// address, which callers detect by ownership checks.
///
/// # Errors
///
/// - [`CryptoError::EmptyMessage`] if `message` is empty
/// - [`CryptoError::ScalarOutOfRange`] / [`CryptoError::InvalidRecoveryId`]
///   if the signature components are malformed
/// - [`CryptoError::RecoveryFailed`] if no public key can be recovered
pub fn recover_address(message: &[u8], signature: &RecoverableSignature) -> CryptoResult<Address> {
    if message.is_empty() {
        return Err(CryptoError::EmptyMessage);
    }

    let (sig, recovery_id) = signature.to_parts()?;
    let prehash = hash_message(message);
    let key = VerifyingKey::recover_from_prehash(&prehash, &sig, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;

    Ok(Address::from_verifying_key(&key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LocalSigner, Signer};

    #[test]
    fn test_hash_message_vector() {
        assert_eq!(
            hex::encode(hash_message(b"Hello World")),
            "a1de988600a42c4b4ab089b619297c17d53cffae5d5120d82d8a92d0bb3b78f2"
        );
    }

    #[test]
    fn test_recover_matches_signer() {
        let signer = LocalSigner::generate();
        let message = br#"{"action":"share_access"}"#;
        let sig = signer.sign_message(message).unwrap();

        assert_eq!(recover_address(message, &sig).unwrap(), signer.address());
    }

    #[test]
    fn test_recover_is_deterministic() {
        let signer = LocalSigner::generate();
        let sig = signer.sign_message(b"same input").unwrap();

        let first = recover_address(b"same input", &sig).unwrap();
        for _ in 0..10 {
            assert_eq!(recover_address(b"same input", &sig).unwrap(), first);
        }
    }

    #[test]
    fn test_tampered_message_recovers_other_address() {
        let signer = LocalSigner::generate();
        let sig = signer.sign_message(b"credentialId=1").unwrap();

        // Recovery either fails outright or lands on an unrelated key.
        match recover_address(b"credentialId=2", &sig) {
            Ok(addr) => assert_ne!(addr, signer.address()),
            Err(e) => assert!(matches!(e, CryptoError::RecoveryFailed)),
        }
    }

    #[test]
    fn test_empty_message_rejected() {
        let signer = LocalSigner::generate();
        let sig = signer.sign_message(b"x").unwrap();
        assert!(matches!(
            recover_address(b"", &sig),
            Err(CryptoError::EmptyMessage)
        ));
    }

    #[test]
    fn test_v_zero_one_accepted() {
        let signer = LocalSigner::generate();
        let legacy = signer.sign_message(b"raw v").unwrap();
        let mut bytes = *legacy.as_bytes();
        bytes[64] = bytes[64].saturating_sub(27);
        let raw = RecoverableSignature::from_bytes(bytes);

        assert_eq!(
            recover_address(b"raw v", &raw).unwrap(),
            recover_address(b"raw v", &legacy).unwrap()
        );
    }

    #[test]
    fn test_out_of_range_scalar_rejected() {
        let mut bytes = [0xffu8; 65];
        bytes[64] = 27;
        let sig = RecoverableSignature::from_bytes(bytes);
        assert!(matches!(
            recover_address(b"msg", &sig),
            Err(CryptoError::ScalarOutOfRange)
        ));
    }
}
