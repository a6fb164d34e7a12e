use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512_256};
use std::fmt;
use std::ops::Deref;

/// Identifier of an asset on the ledger. Zero means "no asset".
pub type AssetId = u64;

/// Identifier of a deployed application. Zero signals the creation call.
pub type AppId = u64;

// Address identifies an account on the ledger: a user, or the account
// controlled by an application. It is a 32 byte value resembling a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address([u8; 32]);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format as a hex string with a prefix of the first 6 bytes
        let prefix = hex::encode(&self.0[0..6]);
        write!(f, "addr:{}", prefix)
    }
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for Address {
    fn default() -> Self {
        Address::ZERO
    }
}

impl Deref for Address {
    type Target = [u8; 32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Address {
    /// The null address. Used by transaction fields that are "not requested".
    pub const ZERO: Address = Address([0; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }

    /// Create an Address from a byte slice, which must be exactly 32 bytes long
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; 32] = bytes.try_into().ok()?;
        Some(Address(bytes))
    }

    /// Get a reference to the internal bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 32]
    }

    /// The account address controlled by an application.
    ///
    /// Derived as SHA-512/256 over the domain separator `appID` followed by the
    /// big-endian application id, so every application has a stable address that
    /// no private key controls.
    pub fn for_application(app_id: AppId) -> Self {
        let mut hasher = Sha512_256::new();
        hasher.update(b"appID");
        hasher.update(app_id.to_be_bytes());
        Address(hasher.finalize().into())
    }

    /// Derive a deterministic user address from a seed. Handy for fixtures and
    /// for tooling that needs stable, human-named accounts.
    pub fn from_seed(seed: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        // Domain separator
        hasher.update(b"ASC_Account");
        hasher.update(seed);
        Address(hasher.finalize().into())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_default_is_zero() {
        let default_addr = Address::default();
        assert_eq!(*default_addr, [0u8; 32]);
        assert!(default_addr.is_zero());
        assert_eq!(default_addr, Address::ZERO);
    }

    #[test]
    fn test_application_address() {
        let a = Address::for_application(1);
        let b = Address::for_application(1);
        let c = Address::for_application(2);

        // Deterministic per id, distinct across ids
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_zero());
    }

    #[test]
    fn test_seeded_addresses_do_not_collide_with_applications() {
        let user = Address::from_seed(b"master");
        assert_eq!(user, Address::from_seed(b"master"));
        assert_ne!(user, Address::from_seed(b"buyer"));
        assert_ne!(user, Address::for_application(1));
    }

    #[test]
    fn test_from_slice() {
        let bytes = [7u8; 32];
        assert_eq!(Address::from_slice(&bytes), Some(Address::new(bytes)));
        assert_eq!(Address::from_slice(&bytes[..31]), None);
        assert_eq!(Address::from_slice(&[]), None);
    }

    #[test]
    fn test_display_prefix() {
        let addr = Address::new([0xab; 32]);
        assert_eq!(addr.to_string(), "addr:abababababab");
    }
}
