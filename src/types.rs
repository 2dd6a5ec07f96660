//! Core identifiers: Symbol, PositionId, SubPortfolioId.

use std::fmt;

/// A ticker symbol, stored inline as up to 8 ASCII bytes.
///
/// Symbols are uppercased on construction ("aapl" and "AAPL" are the same
/// symbol). Longer inputs are truncated to 8 bytes. Being `Copy` and 8 bytes
/// wide, a `Symbol` is as cheap to pass around as a `u64`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    bytes: [u8; 8],
    len: u8,
}

impl Symbol {
    /// Create a symbol from a string, uppercasing ASCII letters.
    pub fn new(s: &str) -> Self {
        let mut bytes = [0u8; 8];
        let mut len = 0u8;
        for &b in s.as_bytes().iter().take(8) {
            bytes[len as usize] = b.to_ascii_uppercase();
            len += 1;
        }
        Self { bytes, len }
    }

    /// The symbol as a string slice.
    pub fn as_str(&self) -> &str {
        // Construction only stores ASCII bytes, which are valid UTF-8.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }

    /// True if the symbol holds no characters.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Symbol {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Symbol {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Symbol::new(&s))
    }
}

/// Unique position identifier, assigned when a holding is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionId(pub u64);

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Unique sub-portfolio identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubPortfolioId(pub u64);

impl fmt::Display for SubPortfolioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}
