//! PCL XL data model - protocol levels, value data types and attribute metadata.
//!
//! - `version` - Protocol class/revision ordering
//! - `datatype` - Numeric kinds, shapes and their wire tags
//! - `attributes` - Per-ID attribute metadata table

pub mod attributes;
pub mod datatype;
pub mod version;

// Re-export main types for convenience
pub use attributes::{AttributeId, AttributeInfo, attribute_info};
pub use datatype::{DataType, NumericKind, Shape};
pub use version::ProtocolVersion;
