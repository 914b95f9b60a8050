//! Addressing primitives: [`Selector`] and [`Address`].

use crate::felt::Felt;
use sha3::{Digest, Keccak256};
use std::fmt;

/// Name of the reserved setup entry point on modules.
///
/// Invoked out-of-band by a batch; never registered in a selector map.
pub const INITIALIZER: &str = "initializer";

/// Name of the batch-change entry point served by the registry module.
pub const CHANGE_MODULES: &str = "changeModules";

/// Accepted alias of [`CHANGE_MODULES`].
pub const DIAMOND_CUT: &str = "diamondCut";

/// Name of the event emitted once per committed batch.
pub const MODULES_CHANGED: &str = "ModulesChanged";

/// Deterministic identifier of a named operation.
///
/// Derived as Keccak-256 of the UTF-8 name, truncated to its low 250 bits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selector(Felt);

impl Selector {
    /// Derive the selector of an operation name.
    pub fn from_name(name: &str) -> Self {
        let digest = Keccak256::digest(name.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        bytes[0] &= 0x03;
        Self(Felt::from_be_bytes(bytes))
    }

    /// Wrap a raw word received over calldata.
    pub const fn from_felt(felt: Felt) -> Self {
        Self(felt)
    }

    /// The underlying word.
    pub const fn felt(&self) -> Felt {
        self.0
    }

    /// Selector of the reserved `initializer` entry point.
    pub fn initializer() -> Self {
        Self::from_name(INITIALIZER)
    }
}

impl From<Selector> for Felt {
    fn from(selector: Selector) -> Self {
        selector.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({:#x})", self.0)
    }
}

/// Location of a deployed module or instance, or identity of a principal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(Felt);

impl Address {
    /// The "no address" sentinel.
    pub const ZERO: Address = Address(Felt::ZERO);

    /// Wrap a raw word.
    pub const fn from_felt(felt: Felt) -> Self {
        Self(felt)
    }

    /// The underlying word.
    pub const fn felt(&self) -> Felt {
        self.0
    }

    /// Whether this is the zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self(Felt::from(value))
    }
}

impl From<u128> for Address {
    fn from(value: u128) -> Self {
        Self(Felt::from(value))
    }
}

impl From<Address> for Felt {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:#x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_matches_known_value() {
        // Well-known entry point selector of `transfer`.
        assert_eq!(
            Selector::from_name("transfer").to_string(),
            "0x83afd3f4caedc6eebf44246fe54e38c95e3179a5ec9ea81740eca5b482d12e"
        );
    }

    #[test]
    fn test_selector_is_deterministic_and_masked() {
        let a = Selector::from_name("getReference");
        let b = Selector::from_name("getReference");
        assert_eq!(a, b);
        assert_ne!(a, Selector::from_name("setReference"));
        assert!(a.felt().to_be_bytes()[0] <= 0x03);
    }

    #[test]
    fn test_zero_address_sentinel() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::from(1u64).is_zero());
        assert_eq!(Address::default(), Address::ZERO);
    }
}
