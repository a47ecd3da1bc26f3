//! Per-account security stamp.

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;

use crate::account::Account;

/// Number of random bytes in a security stamp.
const STAMP_LEN: usize = 32;

/// Opaque, unpredictable per-account value.
///
/// Only equality is meaningful. The value is bound into every purpose token,
/// so replacing it invalidates all tokens issued before the rotation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SecurityStamp([u8; STAMP_LEN]);

impl SecurityStamp {
    /// Generates a fresh stamp from the operating system RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; STAMP_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Restores a stamp from its persisted hex form.
    pub fn from_hex(value: &str) -> Option<Self> {
        let mut bytes = [0u8; STAMP_LEN];
        hex::decode_to_slice(value, &mut bytes).ok()?;
        Some(Self(bytes))
    }

    /// Returns the hex form for persistence.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the raw bytes for MAC computation.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecurityStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecurityStamp(..)")
    }
}

/// Produces and exposes account security stamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityStampAuthority;

impl SecurityStampAuthority {
    /// Creates a new [`SecurityStampAuthority`].
    #[inline]
    pub const fn new() -> Self {
        Self
    }

    /// Produces a fresh stamp value.
    ///
    /// Called exactly once per password change.
    #[inline]
    pub fn rotate(&self) -> SecurityStamp {
        SecurityStamp::generate()
    }

    /// Returns the stamp currently bound to the account.
    #[inline]
    pub fn current_stamp<'a>(&self, account: &'a Account) -> &'a SecurityStamp {
        &account.security_stamp
    }
}
