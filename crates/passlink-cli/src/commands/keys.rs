//! Keys command - manage the owner's signing key.

use std::path::Path;

use anyhow::bail;
use passlink_crypto::{LocalSigner, Signer};

use crate::theme::Theme;

/// Generate a new key file at `out`.
pub(crate) fn generate_key(out: &Path, force: bool) -> anyhow::Result<()> {
    if out.exists() {
        if !force {
            bail!(
                "{} already exists; pass --force to replace it",
                out.display()
            );
        }
        // Links issued with the old key stop resolving to its credentials.
        std::fs::remove_file(out)?;
    }

    let signer = LocalSigner::load_or_generate(out)?;

    println!("{}", Theme::success("New key generated."));
    println!("{}", Theme::field("Address", &signer.address().to_string()));
    println!("{}", Theme::field("Key file", &out.display().to_string()));
    Ok(())
}

/// Print the address of the key at `key`.
pub(crate) fn show_address(key: &Path) -> anyhow::Result<()> {
    let signer = LocalSigner::load(key)?;
    println!("{}", signer.address());
    Ok(())
}
