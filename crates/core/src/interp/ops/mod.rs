//! Operator handlers.
//!
//! Handlers are grouped by category, each adding `do_*` methods to
//! [`Interpreter`]:
//! - `session` - Session, page, comment and vendor operators
//! - `font` - Font header and glyph download
//! - `stream` - Named stream capture and execution
//! - `image` - Images, raster patterns and scan lines
//! - `graphics_state` - Graphics state and character attributes
//! - `path` - Path construction and painting
//!
//! Operators without a dedicated handler are matched against the schema
//! from [`forward_schema`] and passed to the device unchanged.

mod font;
mod graphics_state;
mod image;
mod path;
mod session;
mod stream;

use super::device::PxlDevice;
use super::interpreter::Interpreter;
use super::operator::Operator;
use crate::attr::{AttrSpec, Attribute, MatchMode, match_schema};
use crate::error::{PxlError, Result};
use crate::model::{AttributeId, NumericKind};

const fn req(id: AttributeId) -> AttrSpec {
    AttrSpec::required(id)
}

const fn opt(id: AttributeId) -> AttrSpec {
    AttrSpec::optional(id)
}

/// Schema of an operator forwarded without a dedicated handler.
pub fn forward_schema(op: Operator) -> (MatchMode, &'static [AttrSpec]) {
    graphics_state::schema(op)
        .or_else(|| path::schema(op))
        .or_else(|| image::schema(op))
        .or_else(|| session::schema(op))
        .unwrap_or((MatchMode::Empty, &[]))
}

/// Text of a name or comment attribute.
///
/// ubyte arrays are taken as raw bytes; uint16 arrays as character codes,
/// stored UTF-8 encoded.
pub(crate) fn attr_text(attr: &Attribute) -> Result<Vec<u8>> {
    if let Ok(bytes) = attr.as_bytes() {
        return Ok(bytes.to_vec());
    }
    let text: String = attr
        .as_uint_array()?
        .into_iter()
        .map(|code| char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    Ok(text.into_bytes())
}

/// Embedded data must be exactly as long as its length attribute says.
pub(crate) fn check_length(declared: u32, data: &[u8]) -> Result<()> {
    if declared as usize != data.len() {
        return Err(PxlError::DataLengthMismatch {
            declared: u64::from(declared),
            actual: data.len(),
        });
    }
    Ok(())
}

/// Byte size of one coordinate of an embedded point list.
pub(crate) fn point_type_size(code: u32) -> Result<usize> {
    let kind = match code {
        0 => NumericKind::UByte,
        // sbyte: same width as ubyte
        1 => NumericKind::UByte,
        2 => NumericKind::UInt16,
        3 => NumericKind::SInt16,
        _ => {
            return Err(PxlError::IllegalAttributeValue {
                attribute: "PointType",
                msg: format!("unknown point type {code}"),
            });
        }
    };
    Ok(kind.size())
}

impl<D: PxlDevice> Interpreter<'_, D> {
    /// Match `op` against its schema and hand it to the device.
    pub(crate) fn do_forward(&mut self, op: Operator, data: Option<&[u8]>) -> Result<()> {
        let (mode, schema) = forward_schema(op);
        let matched = match_schema(&self.set, mode, schema)?;
        self.device.operator(op, &matched);
        if let Some(data) = data {
            self.device.embedded_data(op, &matched, data);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_operator_has_a_schema_mode() {
        for &op in Operator::ALL {
            let (mode, schema) = forward_schema(op);
            if mode == MatchMode::Empty {
                assert!(schema.is_empty(), "{op}");
            } else {
                assert!(!schema.is_empty(), "{op}");
            }
        }
    }

    #[test]
    fn test_point_type_sizes() {
        assert_eq!(point_type_size(0).unwrap(), 1);
        assert_eq!(point_type_size(3).unwrap(), 2);
        assert!(point_type_size(4).is_err());
    }
}
