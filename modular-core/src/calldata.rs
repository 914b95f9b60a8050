//! Flat calldata encoding.
//!
//! Arguments and results travel as flat sequences of [`Felt`]s. Arrays are
//! encoded as a length prefix followed by their elements.

use crate::{
    error::CalldataError,
    felt::Felt,
    selector::{Address, Selector},
};

/// Sequential decoder over a calldata slice.
#[derive(Debug, Clone)]
pub struct CalldataReader<'a> {
    data: &'a [Felt],
    pos: usize,
}

impl<'a> CalldataReader<'a> {
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [Felt]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of values not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Read one value.
    pub fn felt(&mut self) -> Result<Felt, CalldataError> {
        let value = self.data.get(self.pos).copied().ok_or(CalldataError::TooShort {
            expected: self.pos + 1,
            actual: self.data.len(),
        })?;
        self.pos += 1;
        Ok(value)
    }

    /// Read one value as an address.
    pub fn address(&mut self) -> Result<Address, CalldataError> {
        self.felt().map(Address::from_felt)
    }

    /// Read one value as a selector.
    pub fn selector(&mut self) -> Result<Selector, CalldataError> {
        self.felt().map(Selector::from_felt)
    }

    /// Read a length prefix, checking it against the remaining input.
    pub fn len_prefix(&mut self) -> Result<usize, CalldataError> {
        let raw = self.felt()?;
        raw.to_usize()
            .ok_or_else(|| CalldataError::InvalidLength(raw.to_string()))
    }

    /// Read a length-prefixed array of values.
    pub fn array(&mut self) -> Result<&'a [Felt], CalldataError> {
        let len = self.len_prefix()?;
        let end = self.pos.checked_add(len).ok_or_else(|| {
            CalldataError::InvalidLength(len.to_string())
        })?;
        if end > self.data.len() {
            return Err(CalldataError::TooShort {
                expected: end,
                actual: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Fail if any values are left unread.
    pub fn finish(self) -> Result<(), CalldataError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CalldataError::Trailing(n)),
        }
    }
}

/// Encode a length-prefixed array.
pub fn encode_array<I, T>(items: I) -> Vec<Felt>
where
    I: IntoIterator<Item = T>,
    T: Into<Felt>,
{
    let mut out = vec![Felt::ZERO];
    let mut len = 0usize;
    for item in items {
        out.push(item.into());
        len += 1;
    }
    out[0] = Felt::from(len);
    out
}
