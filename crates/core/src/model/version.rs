//! Protocol class/revision.

use std::fmt;

/// A PCL XL protocol class and revision, as declared in the stream header.
///
/// Ordering is lexicographic on (class, revision), so `2.0 < 2.1 < 3.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolVersion {
    pub class: u8,
    pub revision: u8,
}

impl ProtocolVersion {
    /// Class 1.1, the first public protocol level.
    pub const V1_1: Self = Self::new(1, 1);
    pub const V2_0: Self = Self::new(2, 0);
    pub const V2_1: Self = Self::new(2, 1);
    pub const V3_0: Self = Self::new(3, 0);

    /// Lowest level any operator or attribute can require.
    pub const ANY: Self = Self::V1_1;

    pub const fn new(class: u8, revision: u8) -> Self {
        Self { class, revision }
    }

    /// Whether a stream declared at `self` may use something introduced at `min`.
    pub fn supports(self, min: Self) -> bool {
        self >= min
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::V2_0
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}.{}", self.class, self.revision)
    }
}
