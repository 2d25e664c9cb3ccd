//! Graphics state operators.
//!
//! Handles: PushGS, PopGS, SetDefaultGS, color sources and color space,
//! clipping, line style, page transforms, fonts and character attributes.
//!
//! None of these need interpreter state; they are matched against the
//! schemas below and forwarded to the device.

use super::{opt, req};
use crate::attr::{AttrSpec, MatchMode};
use crate::interp::operator::Operator;
use crate::model::AttributeId as A;

const PEN_SOURCE: &[AttrSpec] = &[
    opt(A::RGB_COLOR),
    opt(A::GRAY_LEVEL),
    opt(A::NULL_PEN),
    opt(A::PATTERN_SELECT_ID),
    opt(A::PRIMARY_ARRAY),
    opt(A::PRIMARY_DEPTH),
    opt(A::PATTERN_ORIGIN),
    opt(A::NEW_DESTINATION_SIZE),
];

const BRUSH_SOURCE: &[AttrSpec] = &[
    opt(A::RGB_COLOR),
    opt(A::GRAY_LEVEL),
    opt(A::NULL_BRUSH),
    opt(A::PATTERN_SELECT_ID),
    opt(A::PRIMARY_ARRAY),
    opt(A::PRIMARY_DEPTH),
    opt(A::PATTERN_ORIGIN),
    opt(A::NEW_DESTINATION_SIZE),
];

const COLOR_SPACE: &[AttrSpec] = &[
    opt(A::COLOR_SPACE),
    opt(A::COLORIMETRIC_COLOR_SPACE),
    opt(A::PALETTE_DEPTH),
    opt(A::PALETTE_DATA),
    opt(A::XY_CHROMATICITIES),
    opt(A::WHITE_POINT_REFERENCE),
    opt(A::CRGB_MIN_MAX),
    opt(A::GAMMA_GAIN),
];

const HALFTONE_METHOD: &[AttrSpec] = &[
    opt(A::DITHER_ORIGIN),
    opt(A::DEVICE_MATRIX),
    opt(A::DITHER_MATRIX_DATA_TYPE),
    opt(A::DITHER_MATRIX_SIZE),
    opt(A::DITHER_MATRIX_DEPTH),
    opt(A::ALL_OBJECT_TYPES),
    opt(A::TEXT_OBJECTS),
    opt(A::VECTOR_OBJECTS),
    opt(A::RASTER_OBJECTS),
];

const OBJECT_TYPES: &[AttrSpec] = &[
    opt(A::ALL_OBJECT_TYPES),
    opt(A::TEXT_OBJECTS),
    opt(A::VECTOR_OBJECTS),
    opt(A::RASTER_OBJECTS),
];

const LINE_DASH: &[AttrSpec] = &[
    opt(A::LINE_DASH_STYLE),
    opt(A::DASH_OFFSET),
    opt(A::SOLID_LINE),
];

const PAGE_SCALE: &[AttrSpec] = &[
    opt(A::PAGE_SCALE),
    opt(A::MEASURE),
    opt(A::UNITS_PER_MEASURE),
];

const SET_FONT: &[AttrSpec] = &[
    req(A::FONT_NAME),
    req(A::CHAR_SIZE),
    req(A::SYMBOL_SET),
];

const CLIP_RECTANGLE: &[AttrSpec] = &[req(A::CLIP_REGION), req(A::BOUNDING_BOX)];

const SET_COLOR_TREATMENT: &[AttrSpec] = &[req(A::COLOR_TREATMENT)];
const CLIP_REGION: &[AttrSpec] = &[req(A::CLIP_REGION)];
const SET_CLIP_MODE: &[AttrSpec] = &[req(A::CLIP_MODE)];
const SET_FILL_MODE: &[AttrSpec] = &[req(A::FILL_MODE)];
const SET_LINE_CAP: &[AttrSpec] = &[req(A::LINE_CAP_STYLE)];
const SET_LINE_JOIN: &[AttrSpec] = &[req(A::LINE_JOIN_STYLE)];
const SET_MITER_LIMIT: &[AttrSpec] = &[req(A::MITER_LENGTH)];
const SET_PEN_WIDTH: &[AttrSpec] = &[req(A::PEN_WIDTH)];
const SET_ROP: &[AttrSpec] = &[req(A::ROP3)];
const TX_MODE: &[AttrSpec] = &[req(A::TX_MODE)];
const SET_PAGE_ORIGIN: &[AttrSpec] = &[req(A::PAGE_ORIGIN)];
const SET_PAGE_ROTATION: &[AttrSpec] = &[req(A::PAGE_ANGLE)];
const SET_CHAR_ANGLE: &[AttrSpec] = &[req(A::CHAR_ANGLE)];
const SET_CHAR_SCALE: &[AttrSpec] = &[req(A::CHAR_SCALE)];
const SET_CHAR_SHEAR: &[AttrSpec] = &[req(A::CHAR_SHEAR)];
const SET_CHAR_BOLD_VALUE: &[AttrSpec] = &[req(A::CHAR_BOLD_VALUE)];
const SET_CHAR_SUB_MODE: &[AttrSpec] = &[req(A::CHAR_SUB_MODE_ARRAY)];
const SET_CHAR_ATTRIBUTES: &[AttrSpec] = &[req(A::WRITING_MODE)];

pub(super) fn schema(op: Operator) -> Option<(MatchMode, &'static [AttrSpec])> {
    use MatchMode::{AtLeastOne, Empty, Exact};
    use Operator as Op;
    let entry: (MatchMode, &'static [AttrSpec]) = match op {
        Op::PushGS
        | Op::PopGS
        | Op::SetDefaultGS
        | Op::SetClipToPage
        | Op::SetPathToClip
        | Op::SetPageDefaultCTM => (Empty, &[]),

        Op::SetPenSource => (AtLeastOne, PEN_SOURCE),
        Op::SetBrushSource => (AtLeastOne, BRUSH_SOURCE),
        Op::SetColorSpace => (AtLeastOne, COLOR_SPACE),
        Op::SetHalftoneMethod => (AtLeastOne, HALFTONE_METHOD),
        Op::SetAdaptiveHalftoning => (AtLeastOne, OBJECT_TYPES),
        Op::SetColorTreatment => (Exact, SET_COLOR_TREATMENT),

        Op::SetClipReplace | Op::SetClipIntersect => (Exact, CLIP_REGION),
        Op::SetClipRectangle => (Exact, CLIP_RECTANGLE),
        Op::SetClipMode => (Exact, SET_CLIP_MODE),
        Op::SetFillMode => (Exact, SET_FILL_MODE),

        Op::SetLineCap => (Exact, SET_LINE_CAP),
        Op::SetLineJoin => (Exact, SET_LINE_JOIN),
        Op::SetLineDash => (AtLeastOne, LINE_DASH),
        Op::SetMiterLimit => (Exact, SET_MITER_LIMIT),
        Op::SetPenWidth => (Exact, SET_PEN_WIDTH),

        Op::SetROP => (Exact, SET_ROP),
        Op::SetPaintTxMode | Op::SetSourceTxMode => (Exact, TX_MODE),

        Op::SetPageOrigin => (Exact, SET_PAGE_ORIGIN),
        Op::SetPageRotation => (Exact, SET_PAGE_ROTATION),
        Op::SetPageScale => (AtLeastOne, PAGE_SCALE),

        Op::SetFont => (Exact, SET_FONT),
        Op::SetCharAngle => (Exact, SET_CHAR_ANGLE),
        Op::SetCharScale => (Exact, SET_CHAR_SCALE),
        Op::SetCharShear => (Exact, SET_CHAR_SHEAR),
        Op::SetCharBoldValue => (Exact, SET_CHAR_BOLD_VALUE),
        Op::SetCharSubMode => (Exact, SET_CHAR_SUB_MODE),
        Op::SetCharAttributes => (Exact, SET_CHAR_ATTRIBUTES),

        _ => return None,
    };
    Some(entry)
}
