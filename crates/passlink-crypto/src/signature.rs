//! Recoverable secp256k1 signatures.
//!
//! The wire layout is the 65-byte `r || s || v` form returned by wallet
//! `personal_sign`, where `v` is either `0/1` or the legacy `27/28`.

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CryptoError, CryptoResult};

/// Length of a recoverable signature in bytes.
pub const SIGNATURE_LENGTH: usize = 65;

/// Offset added to the recovery id by legacy `eth_sign` encoders.
const LEGACY_V_OFFSET: u8 = 27;

/// A recoverable ECDSA signature over secp256k1 (`r || s || v`).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature([u8; SIGNATURE_LENGTH]);

impl RecoverableSignature {
    /// Create from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Try to create from a slice.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSignatureLength`] if the slice is not exactly 65 bytes.
    pub fn try_from_slice(slice: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; SIGNATURE_LENGTH] =
            slice
                .try_into()
                .map_err(|_| CryptoError::InvalidSignatureLength {
                    expected: SIGNATURE_LENGTH,
                    actual: slice.len(),
                })?;
        Ok(Self(bytes))
    }

    /// Assemble from a k256 signature and recovery id, using the legacy `27/28` `v`.
    #[must_use]
    pub fn from_parts(signature: &EcdsaSignature, recovery_id: RecoveryId) -> Self {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = recovery_id.to_byte().saturating_add(LEGACY_V_OFFSET);
        Self(bytes)
    }

    /// Get the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// The `v` byte as carried on the wire.
    #[must_use]
    pub const fn v(&self) -> u8 {
        self.0[64]
    }

    /// Split into the k256 signature and a normalized recovery id.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::ScalarOutOfRange`] if `r` or `s` is zero, not
    /// below the curve order, or `s` is in the upper half; or [`CryptoError::InvalidRecoveryId`] if `v` is
    /// not one of `0`, `1`, `27`, `28`.
    pub fn to_parts(&self) -> CryptoResult<(EcdsaSignature, RecoveryId)> {
        let signature =
            EcdsaSignature::from_slice(&self.0[..64]).map_err(|_| CryptoError::ScalarOutOfRange)?;
        // Malleable high-s form is not accepted.
        if signature.normalize_s().is_some() {
            return Err(CryptoError::ScalarOutOfRange);
        }
        let v = self.v();
        let normalized = match v {
            0 | 1 => v,
            27 | 28 => v.saturating_sub(LEGACY_V_OFFSET),
            other => return Err(CryptoError::InvalidRecoveryId(other)),
        };
        let recovery_id =
            RecoveryId::from_byte(normalized).ok_or(CryptoError::InvalidRecoveryId(v))?;
        Ok((signature, recovery_id))
    }

    /// Encode as `0x`-prefixed hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Decode from hex string (the `0x` or `0X` prefix is optional).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid hex or not 65 bytes.
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| CryptoError::InvalidHexEncoding)?;
        Self::try_from_slice(&bytes)
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoverableSignature({}...)", &self.to_hex()[..18])
    }
}

impl fmt::Display for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for RecoverableSignature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RecoverableSignature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl From<[u8; SIGNATURE_LENGTH]> for RecoverableSignature {
    fn from(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for RecoverableSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
