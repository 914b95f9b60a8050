//! The wire value type.
//!
//! Every argument, return value, storage slot, address and selector is a
//! [`Felt`]: a 256-bit word stored big-endian. Ordering follows the numeric
//! value, so comparisons in modules behave like integer comparisons.

use std::fmt;

/// A 256-bit big-endian word.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Felt([u8; 32]);

impl Felt {
    /// The zero word.
    pub const ZERO: Felt = Felt([0; 32]);

    /// The word `1`.
    pub const ONE: Felt = Felt::from_u64(1);

    /// Build a word from its big-endian bytes.
    pub const fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build a word from a `u64`.
    pub const fn from_u64(value: u64) -> Self {
        let src = value.to_be_bytes();
        let mut bytes = [0u8; 32];
        let mut i = 0;
        while i < 8 {
            bytes[24 + i] = src[i];
            i += 1;
        }
        Self(bytes)
    }

    /// Build a word from a `u128`.
    pub const fn from_u128(value: u128) -> Self {
        let src = value.to_be_bytes();
        let mut bytes = [0u8; 32];
        let mut i = 0;
        while i < 16 {
            bytes[16 + i] = src[i];
            i += 1;
        }
        Self(bytes)
    }

    /// The big-endian bytes of this word.
    pub const fn to_be_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Whether this word is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 32]
    }

    /// Narrow to `u128`, or `None` if the value does not fit.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0[..16].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&self.0[16..]);
        Some(u128::from_be_bytes(low))
    }

    /// Narrow to `u64`, or `None` if the value does not fit.
    pub fn to_u64(&self) -> Option<u64> {
        self.to_u128().and_then(|v| u64::try_from(v).ok())
    }

    /// Narrow to `usize`, or `None` if the value does not fit.
    pub fn to_usize(&self) -> Option<usize> {
        self.to_u64().and_then(|v| usize::try_from(v).ok())
    }
}

impl From<u64> for Felt {
    fn from(value: u64) -> Self {
        Felt::from_u64(value)
    }
}

impl From<u128> for Felt {
    fn from(value: u128) -> Self {
        Felt::from_u128(value)
    }
}

impl From<u32> for Felt {
    fn from(value: u32) -> Self {
        Felt::from_u64(u64::from(value))
    }
}

impl From<usize> for Felt {
    fn from(value: usize) -> Self {
        Felt::from_u64(value as u64)
    }
}

impl From<bool> for Felt {
    fn from(value: bool) -> Self {
        if value { Felt::ONE } else { Felt::ZERO }
    }
}

impl fmt::LowerHex for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.0.iter().position(|b| *b != 0);
        let Some(first) = first else {
            return f.write_str(if f.alternate() { "0x0" } else { "0" });
        };
        if f.alternate() {
            f.write_str("0x")?;
        }
        write!(f, "{:x}", self.0[first])?;
        for byte in &self.0[first + 1..] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self)
    }
}

impl fmt::Debug for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Felt({:#x})", self)
    }
}
