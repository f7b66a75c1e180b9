//! 4-byte ASCII tag aliased as a `u32` for O(1) equality and ordering.

use core::fmt;

/// A 4-byte ASCII tag. `NameTag::NULL` (all-zero) marks "no tag".
///
/// Equality and ordering compare the 4 bytes as a single big-endian `u32`
/// (`d_id` in the reference implementation), not lexicographically byte by
/// byte — the two happen to coincide for ASCII tags but the `u32` view is
/// what the wire format and hash maps key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameTag {
    id: u32,
}

impl NameTag {
    /// The null tag (`id == 0`).
    pub const NULL: Self = Self { id: 0 };

    /// Builds a tag directly from its 32-bit id.
    #[must_use]
    pub const fn from_id(id: u32) -> Self {
        Self { id }
    }

    /// Builds a tag from up to 4 ASCII bytes, zero-padding the rest.
    ///
    /// Bytes beyond the 4th are ignored, matching the reference
    /// implementation's `strncpy`-style truncation.
    #[must_use]
    pub fn from_ascii(s: &[u8]) -> Self {
        let mut buf = [0u8; 4];
        let n = s.len().min(4);
        buf[..n].copy_from_slice(&s[..n]);
        Self { id: u32::from_be_bytes(buf) }
    }

    /// The raw 32-bit id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.id
    }

    /// `true` if this is the null tag.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.id == 0
    }

    /// The 4 underlying bytes, big-endian (wire order).
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 4] {
        self.id.to_be_bytes()
    }
}

impl Default for NameTag {
    fn default() -> Self {
        Self::NULL
    }
}

impl From<[u8; 4]> for NameTag {
    fn from(bytes: [u8; 4]) -> Self {
        Self { id: u32::from_be_bytes(bytes) }
    }
}

impl From<&str> for NameTag {
    fn from(s: &str) -> Self {
        Self::from_ascii(s.as_bytes())
    }
}

impl fmt::Display for NameTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.to_bytes() {
            if b == 0 {
                break;
            }
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_tag_has_zero_id() {
        assert!(NameTag::NULL.is_null());
        assert_eq!(NameTag::NULL.id(), 0);
    }

    #[test]
    fn ascii_roundtrip() {
        let tag = NameTag::from_ascii(b"ABC");
        assert_eq!(tag.to_string(), "ABC");
        assert_eq!(tag.to_bytes(), *b"ABC\0");
    }

    #[test]
    fn truncates_beyond_four_bytes() {
        let tag = NameTag::from_ascii(b"TOOLONG");
        assert_eq!(tag.to_string(), "TOOL");
    }

    #[test]
    fn ordering_uses_numeric_id() {
        let a = NameTag::from_id(1);
        let b = NameTag::from_id(2);
        assert!(a < b);
    }
}
