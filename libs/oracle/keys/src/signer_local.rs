//! Loading and storing local signing keys.

use std::{path::Path, str::FromStr};

use alloy_signer_local::PrivateKeySigner;

/// Parse a hex encoded private key, with or without a `0x` prefix.
pub fn from_hex(private_key: &str) -> anyhow::Result<PrivateKeySigner> {
    PrivateKeySigner::from_str(private_key.trim())
        .map_err(|e| anyhow::anyhow!("invalid private key: {e}"))
}

/// Decrypt the JSON keystore at `path`.
pub fn read_from_keystore(path: impl AsRef<Path>, password: &str) -> anyhow::Result<PrivateKeySigner> {
    let path = path.as_ref();
    PrivateKeySigner::decrypt_keystore(path, password)
        .map_err(|e| anyhow::anyhow!("unable to read keystore {}: {e}", path.display()))
}

/// Encrypt `signer` into `dir/name`.
pub fn write_to_keystore(
    dir: impl AsRef<Path>,
    name: &str,
    signer: &PrivateKeySigner,
    password: &str,
) -> anyhow::Result<()> {
    let mut rng = rand::thread_rng();
    PrivateKeySigner::encrypt_keystore(
        dir,
        &mut rng,
        signer.credential().to_bytes(),
        password,
        Some(name),
    )
    .map_err(|e| anyhow::anyhow!("unable to write keystore: {e}"))?;
    Ok(())
}
