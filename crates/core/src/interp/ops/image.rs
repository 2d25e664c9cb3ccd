//! Raster operators.
//!
//! Handles: BeginImage, ReadImage, EndImage, BeginRastPattern,
//! ReadRastPattern, EndRastPattern, BeginScan, ScanLineRel, EndScan

use super::{check_length, opt, req};
use crate::attr::{AttrSpec, MatchMode, match_exact};
use crate::error::{PxlError, Result};
use crate::interp::device::PxlDevice;
use crate::interp::interpreter::Interpreter;
use crate::interp::operator::Operator;
use crate::model::AttributeId as A;

const BEGIN_IMAGE: &[AttrSpec] = &[
    req(A::COLOR_MAPPING),
    req(A::COLOR_DEPTH),
    req(A::SOURCE_WIDTH),
    req(A::SOURCE_HEIGHT),
    req(A::DESTINATION_SIZE),
];

const BEGIN_RAST_PATTERN: &[AttrSpec] = &[
    req(A::COLOR_MAPPING),
    req(A::COLOR_DEPTH),
    req(A::SOURCE_WIDTH),
    req(A::SOURCE_HEIGHT),
    req(A::DESTINATION_SIZE),
    req(A::PATTERN_DEFINE_ID),
    req(A::PATTERN_PERSISTENCE),
];

const READ_RASTER: &[AttrSpec] = &[
    req(A::START_LINE),
    req(A::BLOCK_HEIGHT),
    req(A::COMPRESS_MODE),
    opt(A::PAD_BYTES_MULTIPLE),
    opt(A::BLOCK_BYTE_LENGTH),
];

const SCAN_LINE_REL: &[AttrSpec] = &[opt(A::NUMBER_OF_SCAN_LINES)];

pub(super) fn schema(op: Operator) -> Option<(MatchMode, &'static [AttrSpec])> {
    use MatchMode::{Empty, Exact};
    use Operator as Op;
    let entry: (MatchMode, &'static [AttrSpec]) = match op {
        Op::BeginImage => (Exact, BEGIN_IMAGE),
        Op::BeginRastPattern => (Exact, BEGIN_RAST_PATTERN),
        Op::ReadImage | Op::ReadRastPattern => (Exact, READ_RASTER),
        Op::ScanLineRel => (Exact, SCAN_LINE_REL),
        Op::EndImage | Op::EndRastPattern | Op::BeginScan | Op::EndScan => (Empty, &[]),
        _ => return None,
    };
    Some(entry)
}

impl<D: PxlDevice> Interpreter<'_, D> {
    /// BeginImage, BeginRastPattern: the source raster may not be empty.
    pub(crate) fn do_begin_raster(&mut self, op: Operator) -> Result<()> {
        let schema = if op == Operator::BeginImage {
            BEGIN_IMAGE
        } else {
            BEGIN_RAST_PATTERN
        };
        let matched = match_exact(&self.set, schema)?;
        for id in [A::SOURCE_WIDTH, A::SOURCE_HEIGHT] {
            if matched.require(id)?.as_uint()? == 0 {
                return Err(PxlError::IllegalAttributeValue {
                    attribute: id.name(),
                    msg: "zero source dimension".into(),
                });
            }
        }
        self.device.operator(op, &matched);
        Ok(())
    }

    /// ReadImage, ReadRastPattern: a block of raster rows.
    ///
    /// When BlockByteLength is given the data must match it.
    pub(crate) fn do_read_raster(&mut self, op: Operator, data: &[u8]) -> Result<()> {
        let matched = match_exact(&self.set, READ_RASTER)?;
        if let Some(length) = matched.get(A::BLOCK_BYTE_LENGTH) {
            check_length(length.as_uint()?, data)?;
        }
        self.device.operator(op, &matched);
        self.device.embedded_data(op, &matched, data);
        Ok(())
    }
}
