//! Interpreter options.

use crate::model::ProtocolVersion;

/// Limits and policies for one interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// How deep ExecStream may recurse into stored streams.
    pub max_stream_nesting: usize,

    /// Protocol level assumed for bodies run without a stream header.
    pub default_version: ProtocolVersion,

    /// Largest embedded data block or array payload the scanner accepts, in bytes.
    pub max_embedded_data: usize,

    /// Reject attribute IDs introduced after the declared protocol level.
    pub strict_attribute_versions: bool,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            max_stream_nesting: 8,
            default_version: ProtocolVersion::V2_0,
            max_embedded_data: 16 << 20,
            strict_attribute_versions: true,
        }
    }
}

impl InterpreterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_max_stream_nesting(mut self, depth: usize) -> Self {
        self.max_stream_nesting = depth;
        self
    }

    pub const fn with_default_version(mut self, version: ProtocolVersion) -> Self {
        self.default_version = version;
        self
    }

    pub const fn with_max_embedded_data(mut self, bytes: usize) -> Self {
        self.max_embedded_data = bytes;
        self
    }

    pub const fn with_strict_attribute_versions(mut self, strict: bool) -> Self {
        self.strict_attribute_versions = strict;
        self
    }
}
