use std::{fmt, path::PathBuf};

use alloy_primitives::Signature;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use oracle_keys::{
    signature::sign as sync_sign,
    signer_local::{from_hex, read_from_keystore},
    PublicKey,
};
use tracing::info;

use super::{Signer, SignerBuilder, SignerError};

/// Default keystore name
pub const DEFAULT_KEYSTORE_NAME: &str = "price-attestor-keystore";

/// Configuration for building a local signer
///
/// Exactly one of `private_key` and `keystore_path` is expected. When both are
/// set the inline key wins.
#[derive(Clone, Default, serde::Deserialize)]
pub struct LocalSignerConfig {
    /// Hex encoded secp256k1 private key
    #[serde(default)]
    pub private_key: Option<String>,
    /// Path to keystore file or directory
    #[serde(default)]
    pub keystore_path: Option<PathBuf>,
    /// Keystore password, empty when unset
    #[serde(default)]
    pub keystore_password: Option<String>,
}

impl fmt::Debug for LocalSignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSignerConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("keystore_path", &self.keystore_path)
            .field(
                "keystore_password",
                &self.keystore_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Local signer implementation using PrivateKeySigner
///
/// Wraps the synchronous signing logic in an async interface
pub struct LocalSigner {
    inner: PrivateKeySigner,
    public_key: PublicKey,
}

impl LocalSigner {
    /// Creates a new instance of [`LocalSigner`]
    pub fn new(signer: PrivateKeySigner) -> Self {
        let public_key = PublicKey::from(signer.credential().verifying_key().clone());
        Self {
            inner: signer,
            public_key,
        }
    }

    /// The wrapped private key.
    pub const fn private_key(&self) -> &PrivateKeySigner {
        &self.inner
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

fn expand_home(path: PathBuf) -> Result<PathBuf, SignerError> {
    if !path.starts_with("~/") {
        return Ok(path);
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| {
            SignerError::ConfigError(
                "unable to determine home directory from environment".to_string(),
            )
        })?;
    Ok(PathBuf::from(path.to_string_lossy().replacen('~', &home, 1)))
}

impl SignerBuilder for LocalSigner {
    type Config = LocalSignerConfig;
    type Signer = Self;

    fn signer_name() -> &'static str {
        "local"
    }

    fn build(config: Self::Config) -> Result<Self::Signer, SignerError> {
        if let Some(private_key) = config.private_key {
            let signer =
                from_hex(&private_key).map_err(|e| SignerError::ConfigError(e.to_string()))?;
            let signer = Self::new(signer);
            info!(publicKey = %signer.public_key, "local signer initialized from inline key");
            return Ok(signer);
        }

        let keystore_path = config.keystore_path.ok_or_else(|| {
            SignerError::ConfigError(
                "either `private_key` or `keystore_path` must be set".to_string(),
            )
        })?;

        let keystore_path = expand_home(keystore_path)?;
        let keystore_path = if keystore_path.is_dir() {
            keystore_path.join(DEFAULT_KEYSTORE_NAME)
        } else {
            keystore_path
        };

        info!(keystorePath = %keystore_path.display(), "initalizing local signer");

        let password = config.keystore_password.unwrap_or_default();
        let private_key_signer = read_from_keystore(&keystore_path, &password)
            .map_err(|e| SignerError::ConfigError(e.to_string()))?;
        let signer = Self::new(private_key_signer);

        info!(
            keystorePath = %keystore_path.display(),
            publicKey = %signer.public_key,
            "local signer initialized successfully"
        );

        Ok(signer)
    }
}

#[async_trait]
impl Signer for LocalSigner {
    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError> {
        sync_sign(&self.inner, message).map_err(|e| SignerError::LocalError(e.to_string()))
    }

    fn public_key(&self) -> PublicKey {
        self.public_key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_keys::signer_local::write_to_keystore;

    const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[tokio::test]
    async fn test_local_signer_sign() {
        let signer = LocalSigner::new(PrivateKeySigner::random());
        let message = b"test message";

        let signature = signer.sign(message).await.unwrap();
        assert_eq!(signature.as_bytes().len(), 65);
        assert!(oracle_keys::signature::verify(
            &signer.public_key(),
            message,
            &signature
        ));
    }

    #[tokio::test]
    async fn test_local_signer_deterministic() {
        let signer = LocalSigner::new(PrivateKeySigner::random());
        let message = b"test message";

        let sig1 = signer.sign(message).await.unwrap();
        let sig2 = signer.sign(message).await.unwrap();
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn builds_from_inline_key() {
        let config = LocalSignerConfig {
            private_key: Some(TEST_KEY.to_string()),
            ..LocalSignerConfig::default()
        };
        let expected = from_hex(TEST_KEY).unwrap();
        let signer = LocalSigner::build(config).unwrap();
        assert_eq!(signer.private_key().address(), expected.address());
    }

    #[test]
    fn builds_from_keystore_directory() {
        let dir = tempfile::tempdir().unwrap();
        let key = PrivateKeySigner::random();
        write_to_keystore(dir.path(), DEFAULT_KEYSTORE_NAME, &key, "pw").unwrap();

        let config = LocalSignerConfig {
            keystore_path: Some(dir.path().to_path_buf()),
            keystore_password: Some("pw".to_string()),
            ..LocalSignerConfig::default()
        };
        let signer = LocalSigner::build(config).unwrap();
        assert_eq!(signer.private_key().address(), key.address());
    }

    #[test]
    fn build_without_key_material_fails() {
        let err = LocalSigner::build(LocalSignerConfig::default()).unwrap_err();
        assert!(matches!(err, SignerError::ConfigError(_)));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = LocalSignerConfig {
            private_key: Some(TEST_KEY.to_string()),
            keystore_password: Some("pw".to_string()),
            ..LocalSignerConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains(&TEST_KEY[2..]));
        assert!(rendered.contains("<redacted>"));
    }
}
