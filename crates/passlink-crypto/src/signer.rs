//! Message signers.
//!
//! The gateway never signs; it only recovers. Signing lives behind the
//! [`Signer`] trait so the issuing client can plug in a wallet and tests can
//! use a deterministic in-process key.

use std::io::Write;
use std::path::Path;

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::address::Address;
use crate::error::{CryptoError, CryptoResult};
use crate::recover::hash_message;
use crate::signature::RecoverableSignature;

/// Something that can produce personal-message signatures for one identity.
pub trait Signer: Send + Sync {
    /// The address this signer signs as.
    fn address(&self) -> Address;

    /// Sign `message` with the personal-message domain prefix.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::SigningFailed`] if the backend cannot sign.
    fn sign_message(&self, message: &[u8]) -> CryptoResult<RecoverableSignature>;
}

/// An in-process secp256k1 signer.
///
/// The secret scalar is zeroized on drop by `k256`.
pub struct LocalSigner {
    signing_key: SigningKey,
    address: Address,
}

impl LocalSigner {
    /// Generate a new random key.
    #[must_use]
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    /// Create from a secret key (32 bytes).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] if the slice is not exactly 32 bytes,
    /// or [`CryptoError::InvalidSecretKey`] if it is zero or not below the curve order.
    pub fn from_secret_key(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidSecretKey)?;
        Ok(Self::from_signing_key(signing_key))
    }

    /// Create from a hex-encoded secret key (the `0x` or `0X` prefix is optional).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid hex or not a valid key.
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes =
            Zeroizing::new(hex::decode(digits).map_err(|_| CryptoError::InvalidHexEncoding)?);
        Self::from_secret_key(&bytes)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = Address::from_verifying_key(signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    /// Export the secret key as hex (careful - sensitive!).
    ///
    /// This should only be used for secure storage.
    #[must_use]
    pub fn secret_key_hex(&self) -> Zeroizing<String> {
        let bytes = Zeroizing::new(self.signing_key.to_bytes());
        Zeroizing::new(hex::encode(bytes.as_slice()))
    }

    /// Load an existing key from a file, or generate and save a new one.
    ///
    /// The file holds the secret key as hex text. New files are created
    /// atomically with mode `0o600` on Unix; symlinked key files are refused.
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::IoError`] on I/O failures or symlink detection,
    /// or a key error if the file contents are not a valid key.
    pub fn load_or_generate(path: impl AsRef<Path>) -> CryptoResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CryptoError::IoError(e.to_string()))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .mode(0o600)
                .open(path)
            {
                Ok(mut file) => {
                    let signer = Self::generate();
                    file.write_all(signer.secret_key_hex().as_bytes())
                        .map_err(|e| CryptoError::IoError(e.to_string()))?;
                    return Ok(signer);
                },
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {},
                Err(e) => return Err(CryptoError::IoError(e.to_string())),
            }
        }

        #[cfg(not(unix))]
        if !path.exists() {
            let signer = Self::generate();
            let mut file =
                std::fs::File::create(path).map_err(|e| CryptoError::IoError(e.to_string()))?;
            file.write_all(signer.secret_key_hex().as_bytes())
                .map_err(|e| CryptoError::IoError(e.to_string()))?;
            return Ok(signer);
        }

        Self::load(path)
    }

    /// Load a key from an existing file.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::IoError`] if the file cannot be read or is a
    /// symlink, or a key error if its contents are not a valid key.
    pub fn load(path: impl AsRef<Path>) -> CryptoResult<Self> {
        let path = path.as_ref();
        let meta =
            std::fs::symlink_metadata(path).map_err(|e| CryptoError::IoError(e.to_string()))?;
        if meta.file_type().is_symlink() {
            return Err(CryptoError::IoError(
                "refusing to read key file: path is a symlink".into(),
            ));
        }

        let text = Zeroizing::new(
            std::fs::read_to_string(path).map_err(|e| CryptoError::IoError(e.to_string()))?,
        );
        Self::from_hex(&text)
    }
}

impl Signer for LocalSigner {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_message(&self, message: &[u8]) -> CryptoResult<RecoverableSignature> {
        let prehash = hash_message(message);
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&prehash)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        Ok(RecoverableSignature::from_parts(&signature, recovery_id))
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recover_address;

    #[test]
    fn test_known_key_address() {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let signer = LocalSigner::from_secret_key(&secret).unwrap();
        assert_eq!(
            signer.address().to_string(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn test_generated_keys_differ() {
        assert_ne!(
            LocalSigner::generate().address(),
            LocalSigner::generate().address()
        );
    }

    #[test]
    fn test_hex_roundtrip() {
        let original = LocalSigner::generate();
        let restored = LocalSigner::from_hex(&original.secret_key_hex()).unwrap();
        assert_eq!(original.address(), restored.address());

        let prefixed = format!("0x{}\n", original.secret_key_hex().as_str());
        assert_eq!(
            LocalSigner::from_hex(&prefixed).unwrap().address(),
            original.address()
        );

        let upper = format!("0X{}", original.secret_key_hex().to_uppercase());
        assert_eq!(
            LocalSigner::from_hex(&upper).unwrap().address(),
            original.address()
        );
    }

    #[test]
    fn test_sign_recovers_to_address() {
        let signer = LocalSigner::generate();
        let sig = signer.sign_message(b"hello").unwrap();
        assert_eq!(recover_address(b"hello", &sig).unwrap(), signer.address());
    }

    #[test]
    fn test_invalid_secret_keys() {
        assert!(matches!(
            LocalSigner::from_secret_key(&[1u8; 31]),
            Err(CryptoError::InvalidKeyLength { .. })
        ));
        assert!(matches!(
            LocalSigner::from_secret_key(&[0u8; 32]),
            Err(CryptoError::InvalidSecretKey)
        ));
        assert!(matches!(
            LocalSigner::from_secret_key(&[0xffu8; 32]),
            Err(CryptoError::InvalidSecretKey)
        ));
    }

    #[test]
    fn test_load_or_generate_creates_new() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys").join("share.key");

        let first = LocalSigner::load_or_generate(&path).unwrap();
        assert!(path.exists());

        let second = LocalSigner::load_or_generate(&path).unwrap();
        assert_eq!(first.address(), second.address());
    }

    #[test]
    fn test_load_rejects_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.key");
        std::fs::write(&path, "abcd").unwrap();

        assert!(matches!(
            LocalSigner::load_or_generate(&path),
            Err(CryptoError::InvalidKeyLength { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_load_or_generate_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secure.key");

        LocalSigner::load_or_generate(&path).unwrap();

        let perms = std::fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_load_rejects_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let real_path = dir.path().join("real.key");
        let link_path = dir.path().join("link.key");

        LocalSigner::load_or_generate(&real_path).unwrap();
        std::os::unix::fs::symlink(&real_path, &link_path).unwrap();

        let err = LocalSigner::load_or_generate(&link_path).unwrap_err();
        assert!(
            err.to_string().contains("symlink"),
            "expected symlink error, got: {err}"
        );
    }
}
