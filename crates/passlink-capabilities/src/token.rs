//! Share tokens - a signed claim plus its URL-safe wire encoding.
//!
//! A token is `{ "payload": {...}, "signature": "0x..." }` rendered as JSON
//! and base64-encoded for use in a link. The signature is a wallet
//! personal-message signature over [`SharePayload::canonical_bytes`], so the
//! signer can be recovered without any key lookup.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use passlink_crypto::{Address, RecoverableSignature, Signer, recover_address};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::error::{CapabilityError, CapabilityResult};
use crate::payload::SharePayload;

/// Longest token text accepted by [`ShareToken::decode`].
pub const MAX_TOKEN_LEN: usize = 8 * 1024;

#[derive(Serialize)]
struct WireTokenRef<'a> {
    payload: &'a SharePayload,
    signature: &'a RecoverableSignature,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WireToken {
    payload: SharePayload,
    signature: String,
}

/// A signed share claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareToken {
    /// The claim.
    pub payload: SharePayload,
    /// Signature over the claim's canonical bytes.
    pub signature: RecoverableSignature,
}

impl ShareToken {
    /// Pair a claim with an existing signature.
    #[must_use]
    pub fn new(payload: SharePayload, signature: RecoverableSignature) -> Self {
        Self { payload, signature }
    }

    /// Build, validate and sign a fresh claim for `credential_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::InvalidPayload`] if the claim is invalid
    /// (for example `max_views == 0`), or [`CapabilityError::CryptoError`]
    /// if the signer fails.
    pub fn issue(
        credential_id: impl Into<String>,
        max_views: u32,
        signer: &dyn Signer,
    ) -> CapabilityResult<Self> {
        let payload = SharePayload::new(credential_id, max_views);
        payload.validate()?;
        let signature = signer.sign_message(&payload.canonical_bytes()?)?;

        tracing::debug!(
            nonce = %payload.nonce,
            credential_id = %payload.credential_id,
            max_views,
            signer = %signer.address(),
            "Issued share token"
        );

        Ok(Self { payload, signature })
    }

    /// Render as URL-safe base64 (no padding).
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::SerializationError`] if the token cannot be rendered.
    pub fn encode(&self) -> CapabilityResult<String> {
        let json = serde_json::to_vec(&WireTokenRef {
            payload: &self.payload,
            signature: &self.signature,
        })
        .map_err(|e| CapabilityError::SerializationError(e.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Parse token text produced by [`encode`](Self::encode) or by a browser
    /// (`btoa`, standard alphabet with padding).
    ///
    /// # Errors
    ///
    /// - [`CapabilityError::Decode`] if the text is oversized, not base64 or not JSON
    /// - [`CapabilityError::InvalidPayload`] if the JSON has the wrong shape or
    ///   the claim fails [`SharePayload::validate`]
    /// - [`CapabilityError::InvalidSignature`] if the signature is not 65 bytes of hex
    pub fn decode(token: &str) -> CapabilityResult<Self> {
        let trimmed = token.trim();
        if trimmed.len() > MAX_TOKEN_LEN {
            return Err(CapabilityError::Decode(format!(
                "token exceeds {MAX_TOKEN_LEN} bytes"
            )));
        }

        // Either alphabet, padded or not.
        let normalized: String = trimmed
            .trim_end_matches('=')
            .chars()
            .map(|c| match c {
                '+' => '-',
                '/' => '_',
                other => other,
            })
            .collect();
        let bytes = URL_SAFE_NO_PAD
            .decode(normalized.as_bytes())
            .map_err(|e| CapabilityError::Decode(format!("not base64: {e}")))?;

        let wire: WireToken = serde_json::from_slice(&bytes).map_err(|e| match e.classify() {
            Category::Data => CapabilityError::InvalidPayload(e.to_string()),
            Category::Io | Category::Syntax | Category::Eof => {
                CapabilityError::Decode(format!("not JSON: {e}"))
            },
        })?;

        wire.payload.validate()?;
        let signature = RecoverableSignature::from_hex(&wire.signature)
            .map_err(|e| CapabilityError::InvalidSignature(e.to_string()))?;

        Ok(Self {
            payload: wire.payload,
            signature,
        })
    }

    /// Recover the address that signed this claim.
    ///
    /// A claim edited after signing recovers an unrelated address rather
    /// than failing here.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::InvalidSignature`] if recovery fails.
    pub fn signer_address(&self) -> CapabilityResult<Address> {
        let message = self.payload.canonical_bytes()?;
        recover_address(&message, &self.signature)
            .map_err(|e| CapabilityError::InvalidSignature(e.to_string()))
    }

    /// Append this token to `base` as the `data` query parameter.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::SerializationError`] if the token cannot be rendered.
    pub fn share_url(&self, base: &str) -> CapabilityResult<String> {
        let separator = if base.contains('?') { '&' } else { '?' };
        Ok(format!("{base}{separator}data={}", self.encode()?))
    }
}
