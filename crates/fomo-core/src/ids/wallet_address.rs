use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Business-layer wrapper for a connected wallet account address.
/// This provides type safety and prevents mixing with invite codes or
/// other plain strings flowing through the onboarding session.
///
/// The value is whatever the wallet provider reports (typically a 0x-prefixed
/// hex string); it is compared byte-for-byte and never normalized here. The
/// directory backend owns any canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn new(address: String) -> Self {
        Self(address)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Abbreviated form shown in the connected view: first six characters,
    /// an ellipsis, then the last four. Addresses too short to abbreviate
    /// are returned unchanged.
    pub fn short_form(&self) -> String {
        let s = &self.0;
        if s.chars().count() <= 10 {
            return s.clone();
        }
        let head: String = s.chars().take(6).collect();
        let tail: String = s.chars().skip(s.chars().count() - 4).collect();
        format!("{}...{}", head, tail)
    }
}

impl Display for WalletAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WalletAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
