//! Share command - issue a signed, view-capped link.

use std::path::Path;

use passlink_capabilities::ShareToken;
use passlink_crypto::{LocalSigner, Signer};

use crate::theme::Theme;

/// Sign a share token for `credential_id` and print its link.
pub(crate) fn issue_link(
    key: &Path,
    credential_id: &str,
    max_views: u32,
    base_url: &str,
) -> anyhow::Result<()> {
    let signer = LocalSigner::load(key)?;
    let token = ShareToken::issue(credential_id, max_views, &signer)?;
    let url = token.share_url(base_url)?;

    println!("{}", Theme::header("Share link"));
    println!("{}", Theme::field("Credential", credential_id));
    println!("{}", Theme::field("Owner", &signer.address().to_string()));
    println!("{}", Theme::field("Max views", &max_views.to_string()));
    println!("{}", Theme::field("Nonce", &token.payload.nonce));
    println!();
    println!("{url}");
    Ok(())
}
