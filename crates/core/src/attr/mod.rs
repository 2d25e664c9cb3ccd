//! Attributes, the bounded attribute set and schema matching.
//!
//! - `attribute` - Decoded values and typed accessors
//! - `set` - Fixed-capacity per-operator attribute set
//! - `matcher` - Required/optional/excess checks against operator schemas

pub mod attribute;
pub mod matcher;
pub mod set;

// Re-export main types for convenience
pub use attribute::{ArrayPayload, Attribute, Number, Value};
pub use matcher::{
    AttrSpec, MatchMode, Matched, match_at_least_one, match_empty, match_exact, match_schema,
};
pub use set::{AttributeHandle, AttributeSet, MAX_ATTRIBUTES};
