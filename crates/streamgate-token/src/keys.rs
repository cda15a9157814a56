//! Ed25519 keypairs for signing and verifying access tokens.

use crate::error::TokenError;
use biscuit_auth::{Algorithm, KeyPair as BiscuitKeyPair, PrivateKey, PublicKey};
use rand::RngCore;
use std::path::Path;

/// An Ed25519 keypair. Only the issuing side needs one; the gateway itself
/// holds just the public key.
pub struct KeyPair {
    inner: BiscuitKeyPair,
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self {
            inner: BiscuitKeyPair::from(&self.inner.private()),
        }
    }
}

impl KeyPair {
    /// Generate a new random keypair.
    pub fn generate() -> Result<Self, TokenError> {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);

        let private_key = PrivateKey::from_bytes(&bytes, Algorithm::Ed25519)
            .map_err(|e| TokenError::KeyGenerationFailed(e.to_string()))?;
        Ok(Self {
            inner: BiscuitKeyPair::from(&private_key),
        })
    }

    /// Load a keypair from a hex-encoded private key string.
    pub fn from_private_key_hex(hex: &str) -> Result<Self, TokenError> {
        let private_key = PrivateKey::from_bytes_hex(hex, Algorithm::Ed25519)
            .map_err(|e| TokenError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self {
            inner: BiscuitKeyPair::from(&private_key),
        })
    }

    /// Load a keypair from a file holding a hex-encoded private key.
    pub fn load_from_file(private_key_path: &Path) -> Result<Self, TokenError> {
        let hex = std::fs::read_to_string(private_key_path)?;
        Self::from_private_key_hex(hex.trim())
    }

    /// Resolve a private key given either a file path or the hex key itself.
    pub fn from_path_or_hex(source: &str) -> Result<Self, TokenError> {
        let path = Path::new(source);
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Self::from_private_key_hex(source.trim())
        }
    }

    pub(crate) fn inner(&self) -> &BiscuitKeyPair {
        &self.inner
    }

    pub fn public_key(&self) -> PublicKey {
        self.inner.public()
    }

    pub fn private_key_hex(&self) -> String {
        self.inner.private().to_bytes_hex()
    }

    pub fn public_key_hex(&self) -> String {
        self.inner.public().to_bytes_hex()
    }

    /// Write `private.key` and `public.key` into `dir`, creating it if needed.
    pub fn save_to_dir(&self, dir: &Path) -> Result<(), TokenError> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join("private.key"), self.private_key_hex())?;
        std::fs::write(dir.join("public.key"), self.public_key_hex())?;
        Ok(())
    }
}

/// Load a public key from hex string.
pub fn load_public_key_hex(hex: &str) -> Result<PublicKey, TokenError> {
    PublicKey::from_bytes_hex(hex.trim(), Algorithm::Ed25519)
        .map_err(|e| TokenError::InvalidPublicKey(e.to_string()))
}

/// Resolve a public key given either a file path or the hex key itself.
pub fn load_public_key(source: &str) -> Result<PublicKey, TokenError> {
    let path = Path::new(source);
    if path.exists() {
        let hex = std::fs::read_to_string(path)?;
        load_public_key_hex(&hex)
    } else {
        load_public_key_hex(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_roundtrip_through_hex() {
        let keypair = KeyPair::generate().unwrap();
        let restored = KeyPair::from_private_key_hex(&keypair.private_key_hex()).unwrap();
        assert_eq!(keypair.public_key_hex(), restored.public_key_hex());
        assert_eq!(keypair.clone().public_key_hex(), keypair.public_key_hex());
    }

    #[test]
    fn test_save_and_resolve_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let keypair = KeyPair::generate().unwrap();
        keypair.save_to_dir(&dir.path().join("keys")).unwrap();

        let private_path = dir.path().join("keys/private.key");
        let public_path = dir.path().join("keys/public.key");

        let loaded = KeyPair::from_path_or_hex(private_path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.public_key_hex(), keypair.public_key_hex());

        let public = load_public_key(public_path.to_str().unwrap()).unwrap();
        assert_eq!(public.to_bytes_hex(), keypair.public_key_hex());
    }

    #[test]
    fn test_invalid_public_key() {
        assert!(matches!(
            load_public_key_hex("not-hex"),
            Err(TokenError::InvalidPublicKey(_))
        ));
    }
}
