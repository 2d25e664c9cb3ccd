//! Path construction and painting operators.
//!
//! Handles: NewPath, CloseSubPath, SetCursor(Rel), Line(Rel)Path,
//! Bezier(Rel)Path, the arc/chord/ellipse/pie/rectangle shapes and their
//! painting forms, Text(Path), PaintPath and user-defined line caps.
//!
//! Line and Bezier paths take either a single segment as attributes or a
//! point list as embedded data. For point lists, NumberOfPoints and
//! PointType fix the data length.

use super::{opt, point_type_size, req};
use crate::attr::{AttrSpec, MatchMode, match_exact};
use crate::error::{PxlError, Result};
use crate::interp::device::PxlDevice;
use crate::interp::interpreter::Interpreter;
use crate::interp::operator::Operator;
use crate::model::AttributeId as A;

const POINT: &[AttrSpec] = &[req(A::POINT)];

const LINE_PATH: &[AttrSpec] = &[
    opt(A::END_POINT),
    opt(A::NUMBER_OF_POINTS),
    opt(A::POINT_TYPE),
];

const BEZIER_PATH: &[AttrSpec] = &[
    opt(A::CONTROL_POINT1),
    opt(A::CONTROL_POINT2),
    opt(A::END_POINT),
    opt(A::NUMBER_OF_POINTS),
    opt(A::POINT_TYPE),
];

const ARC_PATH: &[AttrSpec] = &[
    req(A::BOUNDING_BOX),
    req(A::START_POINT),
    req(A::END_POINT),
    opt(A::ARC_DIRECTION),
];

const CHORD: &[AttrSpec] = &[
    req(A::BOUNDING_BOX),
    req(A::START_POINT),
    req(A::END_POINT),
];

const BOX: &[AttrSpec] = &[req(A::BOUNDING_BOX)];

const ROUND_RECTANGLE: &[AttrSpec] = &[req(A::BOUNDING_BOX), req(A::ELLIPSE_DIMENSION)];

const TEXT: &[AttrSpec] = &[
    req(A::TEXT_DATA),
    opt(A::X_SPACING_DATA),
    opt(A::Y_SPACING_DATA),
];

pub(super) fn schema(op: Operator) -> Option<(MatchMode, &'static [AttrSpec])> {
    use MatchMode::{Empty, Exact};
    use Operator as Op;
    let entry: (MatchMode, &'static [AttrSpec]) = match op {
        Op::NewPath
        | Op::CloseSubPath
        | Op::PaintPath
        | Op::BeginUserDefinedLineCap
        | Op::EndUserDefinedLineCap => (Empty, &[]),

        Op::SetCursor | Op::SetCursorRel => (Exact, POINT),
        Op::LinePath | Op::LineRelPath => (Exact, LINE_PATH),
        Op::BezierPath | Op::BezierRelPath => (Exact, BEZIER_PATH),

        Op::ArcPath => (Exact, ARC_PATH),
        Op::Chord | Op::ChordPath | Op::Pie | Op::PiePath => (Exact, CHORD),
        Op::Ellipse | Op::EllipsePath | Op::Rectangle | Op::RectanglePath => (Exact, BOX),
        Op::RoundRectangle | Op::RoundRectanglePath => (Exact, ROUND_RECTANGLE),

        Op::Text | Op::TextPath => (Exact, TEXT),

        _ => return None,
    };
    Some(entry)
}

impl<D: PxlDevice> Interpreter<'_, D> {
    /// LinePath, LineRelPath, BezierPath, BezierRelPath.
    ///
    /// Without data the segment's points must be attributes. With data the
    /// list length is NumberOfPoints coordinate pairs of PointType; Bezier
    /// lists hold whole curves of three points each.
    pub(crate) fn do_point_path(&mut self, op: Operator, data: Option<&[u8]>) -> Result<()> {
        let bezier = matches!(op, Operator::BezierPath | Operator::BezierRelPath);
        let schema = if bezier { BEZIER_PATH } else { LINE_PATH };
        let matched = match_exact(&self.set, schema)?;

        match data {
            None => {
                let points: &[A] = if bezier {
                    &[A::CONTROL_POINT1, A::CONTROL_POINT2, A::END_POINT]
                } else {
                    &[A::END_POINT]
                };
                for &id in points {
                    matched.require(id)?;
                }
            }
            Some(data) => {
                let count = matched.require(A::NUMBER_OF_POINTS)?.as_uint()?;
                let size = point_type_size(matched.require(A::POINT_TYPE)?.as_uint()?)?;
                if bezier && count % 3 != 0 {
                    return Err(PxlError::IllegalAttributeValue {
                        attribute: "NumberOfPoints",
                        msg: format!("{count} is not a whole number of curves"),
                    });
                }
                let expected = u64::from(count) * 2 * size as u64;
                if expected != data.len() as u64 {
                    return Err(PxlError::DataLengthMismatch {
                        declared: expected,
                        actual: data.len(),
                    });
                }
            }
        }

        self.device.operator(op, &matched);
        if let Some(data) = data {
            self.device.embedded_data(op, &matched, data);
        }
        Ok(())
    }
}
