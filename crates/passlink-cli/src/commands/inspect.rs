//! Inspect command - decode a token without touching any gate.

use chrono::{DateTime, Utc};
use passlink_capabilities::ShareToken;

use crate::theme::Theme;

/// Decode `input` and print its claim and recovered signer.
pub(crate) fn inspect_token(input: &str) -> anyhow::Result<()> {
    let token = ShareToken::decode(token_text(input))?;
    let signer = token.signer_address()?;
    let payload = &token.payload;

    let issued = i64::try_from(payload.timestamp)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map_or_else(|| payload.timestamp.to_string(), |t| t.to_rfc3339());

    println!("{}", Theme::header("Share token"));
    println!("{}", Theme::field("Action", &payload.action));
    println!("{}", Theme::field("Credential", &payload.credential_id));
    println!("{}", Theme::field("Nonce", &payload.nonce));
    println!("{}", Theme::field("Max views", &payload.max_views.to_string()));
    println!("{}", Theme::field("Issued", &issued));
    println!("{}", Theme::field("Signer", &signer.to_string()));
    Ok(())
}

/// The token inside a share link, or `input` itself.
fn token_text(input: &str) -> &str {
    let input = input.trim();
    match input.rfind("data=") {
        Some(start) => {
            let rest = &input[start.saturating_add(5)..];
            rest.split('&').next().unwrap_or(rest)
        },
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passlink_crypto::LocalSigner;

    #[test]
    fn test_token_text() {
        assert_eq!(token_text(" abc "), "abc");
        assert_eq!(token_text("http://h/#/verify/access?data=abc"), "abc");
        assert_eq!(token_text("http://h/?x=1&data=abc&y=2"), "abc");
    }

    #[test]
    fn test_inspect_link_and_garbage() {
        let signer = LocalSigner::generate();
        let token = ShareToken::issue("c1", 3, &signer).unwrap();
        let url = token.share_url("http://h/#/verify/access").unwrap();

        inspect_token(&url).unwrap();
        assert!(inspect_token("%%%").is_err());
    }
}
