//! PCL XL stream parsing.
//!
//! - `scanner`: Binary stream scanner (header, attributes, operator tags, embedded data)

pub mod scanner;

// Re-export main types for convenience
pub use scanner::{Binding, ScannedOperator, Scanner, StreamHeader, UEL};
