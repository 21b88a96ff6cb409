use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("malformed ed25519 public key {0}")]
    Malformed(String),
}

/// Raw bytes of an ed25519 verifying key.
///
/// Kept as plain bytes so key sets can be ordered and hashed; call
/// [`PublicKey::to_verifying_key`] when a signature has to be checked.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        PublicKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_verifying_key(&self) -> Result<VerifyingKey, KeyError> {
        VerifyingKey::from_bytes(&self.0).map_err(|_| KeyError::Malformed(self.to_string()))
    }
}

impl From<&VerifyingKey> for PublicKey {
    fn from(key: &VerifyingKey) -> Self {
        PublicKey(key.to_bytes())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}..)", hex::encode(&self.0[..6]))
    }
}

/// A well-known identity on the network: a display name bound to the key
/// that signs on its behalf.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Party {
    name: String,
    owning_key: PublicKey,
}

impl Party {
    pub fn new(name: impl Into<String>, owning_key: PublicKey) -> Self {
        Party {
            name: name.into(),
            owning_key,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owning_key(&self) -> PublicKey {
        self.owning_key
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;

    #[test]
    fn test_public_key_round_trips_through_verifying_key() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let key = PublicKey::from(&signing_key.verifying_key());
        assert_eq!(key.to_verifying_key().unwrap(), signing_key.verifying_key());
        assert_eq!(key.to_string().len(), 64);
    }

    #[test]
    fn test_parties_compare_by_name_and_key() {
        let alice_key = PublicKey::from(&SigningKey::generate(&mut OsRng).verifying_key());
        let bob_key = PublicKey::from(&SigningKey::generate(&mut OsRng).verifying_key());
        let alice = Party::new("Alice", alice_key);
        assert_eq!(alice, Party::new("Alice", alice_key));
        assert_ne!(alice, Party::new("Alice", bob_key));
        assert_eq!(alice.to_string(), "Alice");
    }
}
