//! Attribute metadata table.
//!
//! Each known attribute ID maps to its symbolic name, the protocol level
//! that introduced it, and the (at most four) data types it accepts. IDs
//! that are not in the table, including everything above 255, resolve to a
//! catch-all entry that is valid at any protocol level and accepts any type.

use super::datatype::DataType;
use super::version::ProtocolVersion;
use std::fmt;
use std::sync::LazyLock;

/// Highest attribute ID addressable by the one-byte attribute tag.
pub const MAX_ATTRIBUTE_ID: u16 = 255;

/// Maximum number of accepted data types per attribute.
pub const MAX_ACCEPTED_TYPES: usize = 4;

/// An attribute identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AttributeId(pub u16);

/// Static metadata for one attribute ID.
#[derive(Debug)]
pub struct AttributeInfo {
    pub id: AttributeId,
    pub name: &'static str,
    pub min_version: ProtocolVersion,
    accepts: &'static [DataType],
}

impl AttributeInfo {
    /// Data types valid for this attribute, in table order.
    ///
    /// Empty for the catch-all entry, meaning "unrestricted".
    pub const fn accepted_types(&self) -> &'static [DataType] {
        self.accepts
    }

    pub fn accepts(&self, data_type: DataType) -> bool {
        self.accepts.is_empty() || self.accepts.contains(&data_type)
    }

    /// Whether this is the catch-all entry for an unknown ID.
    pub fn is_unknown(&self) -> bool {
        std::ptr::eq(self, &UNKNOWN_ATTRIBUTE)
    }
}

static UNKNOWN_ATTRIBUTE: AttributeInfo = AttributeInfo {
    id: AttributeId(0),
    name: "UnknownAttribute",
    min_version: ProtocolVersion::ANY,
    accepts: &[],
};

macro_rules! attribute_table {
    ($($id:literal => $konst:ident, $name:literal, $version:ident, [$($ty:ident),+];)*) => {
        impl AttributeId {
            $(pub const $konst: Self = Self($id);)*
        }

        static ATTRIBUTES: &[AttributeInfo] = &[
            $(AttributeInfo {
                id: AttributeId($id),
                name: $name,
                min_version: ProtocolVersion::$version,
                accepts: &[$(DataType::$ty),+],
            },)*
        ];
    };
}

attribute_table! {
    2 => PALETTE_DEPTH, "PaletteDepth", V1_1, [UBYTE];
    3 => COLOR_SPACE, "ColorSpace", V1_1, [UBYTE];
    4 => NULL_BRUSH, "NullBrush", V1_1, [UBYTE];
    5 => NULL_PEN, "NullPen", V1_1, [UBYTE];
    6 => PALETTE_DATA, "PaletteData", V1_1, [UBYTE_ARRAY];
    8 => PATTERN_SELECT_ID, "PatternSelectID", V1_1, [SINT16];
    9 => GRAY_LEVEL, "GrayLevel", V1_1, [UBYTE, REAL32];
    11 => RGB_COLOR, "RGBColor", V1_1, [UBYTE_ARRAY, REAL32_ARRAY];
    12 => PATTERN_ORIGIN, "PatternOrigin", V1_1, [SINT16_XY];
    13 => NEW_DESTINATION_SIZE, "NewDestinationSize", V1_1, [UINT16_XY];
    14 => PRIMARY_ARRAY, "PrimaryArray", V2_0, [UBYTE_ARRAY, REAL32_ARRAY];
    15 => PRIMARY_DEPTH, "PrimaryDepth", V2_0, [UBYTE];
    17 => COLORIMETRIC_COLOR_SPACE, "ColorimetricColorSpace", V2_0, [UBYTE];
    18 => XY_CHROMATICITIES, "XYChromaticities", V2_0, [REAL32_ARRAY];
    19 => WHITE_POINT_REFERENCE, "WhitePointReference", V2_0, [UBYTE];
    20 => CRGB_MIN_MAX, "CRGBMinMax", V2_0, [UBYTE_ARRAY, REAL32_ARRAY];
    21 => GAMMA_GAIN, "GammaGain", V2_0, [REAL32_ARRAY];
    29 => ALL_OBJECT_TYPES, "AllObjectTypes", V2_0, [UBYTE];
    30 => TEXT_OBJECTS, "TextObjects", V2_0, [UBYTE];
    31 => VECTOR_OBJECTS, "VectorObjects", V2_0, [UBYTE];
    32 => RASTER_OBJECTS, "RasterObjects", V2_0, [UBYTE];
    33 => DEVICE_MATRIX, "DeviceMatrix", V1_1, [UBYTE];
    34 => DITHER_MATRIX_DATA_TYPE, "DitherMatrixDataType", V1_1, [UBYTE];
    35 => DITHER_ORIGIN, "DitherOrigin", V1_1, [SINT16_XY];
    36 => MEDIA_DESTINATION, "MediaDestination", V1_1, [UBYTE];
    37 => MEDIA_SIZE, "MediaSize", V1_1, [UBYTE, UBYTE_ARRAY];
    38 => MEDIA_SOURCE, "MediaSource", V1_1, [UBYTE];
    39 => MEDIA_TYPE, "MediaType", V1_1, [UBYTE_ARRAY];
    40 => ORIENTATION, "Orientation", V1_1, [UBYTE];
    41 => PAGE_ANGLE, "PageAngle", V1_1, [SINT16];
    42 => PAGE_ORIGIN, "PageOrigin", V1_1, [UINT16_XY];
    43 => PAGE_SCALE, "PageScale", V1_1, [UBYTE_XY, UINT16_XY, REAL32_XY];
    44 => ROP3, "ROP3", V1_1, [UBYTE];
    45 => TX_MODE, "TxMode", V1_1, [UBYTE];
    47 => CUSTOM_MEDIA_SIZE, "CustomMediaSize", V1_1, [UINT16_XY, REAL32_XY];
    48 => CUSTOM_MEDIA_SIZE_UNITS, "CustomMediaSizeUnits", V1_1, [UBYTE];
    49 => PAGE_COPIES, "PageCopies", V1_1, [UINT16];
    50 => DITHER_MATRIX_SIZE, "DitherMatrixSize", V1_1, [UINT16_XY];
    51 => DITHER_MATRIX_DEPTH, "DitherMatrixDepth", V1_1, [UBYTE];
    52 => SIMPLEX_PAGE_MODE, "SimplexPageMode", V1_1, [UBYTE];
    53 => DUPLEX_PAGE_MODE, "DuplexPageMode", V1_1, [UBYTE];
    54 => DUPLEX_PAGE_SIDE, "DuplexPageSide", V1_1, [UBYTE];
    65 => ARC_DIRECTION, "ArcDirection", V1_1, [UBYTE];
    66 => BOUNDING_BOX, "BoundingBox", V1_1, [UINT16_BOX, SINT16_BOX, REAL32_BOX];
    67 => DASH_OFFSET, "DashOffset", V1_1, [UINT16, SINT16, REAL32];
    68 => ELLIPSE_DIMENSION, "EllipseDimension", V1_1, [UBYTE_XY, UINT16_XY, REAL32_XY];
    69 => END_POINT, "EndPoint", V1_1, [UBYTE_XY, UINT16_XY, SINT16_XY, REAL32_XY];
    70 => FILL_MODE, "FillMode", V1_1, [UBYTE];
    71 => LINE_CAP_STYLE, "LineCapStyle", V1_1, [UBYTE];
    72 => LINE_JOIN_STYLE, "LineJoinStyle", V1_1, [UBYTE];
    73 => MITER_LENGTH, "MiterLength", V1_1, [UINT16, SINT16, REAL32];
    74 => LINE_DASH_STYLE, "LineDashStyle", V1_1, [UBYTE_ARRAY, UINT16_ARRAY, SINT16_ARRAY, REAL32_ARRAY];
    75 => PEN_WIDTH, "PenWidth", V1_1, [UBYTE, UINT16, REAL32];
    76 => POINT, "Point", V1_1, [UBYTE_XY, UINT16_XY, SINT16_XY, REAL32_XY];
    77 => NUMBER_OF_POINTS, "NumberOfPoints", V1_1, [UBYTE, UINT16];
    78 => SOLID_LINE, "SolidLine", V1_1, [UBYTE];
    79 => START_POINT, "StartPoint", V1_1, [UBYTE_XY, UINT16_XY, SINT16_XY, REAL32_XY];
    80 => POINT_TYPE, "PointType", V1_1, [UBYTE];
    81 => CONTROL_POINT1, "ControlPoint1", V1_1, [UBYTE_XY, UINT16_XY, SINT16_XY, REAL32_XY];
    82 => CONTROL_POINT2, "ControlPoint2", V1_1, [UBYTE_XY, UINT16_XY, SINT16_XY, REAL32_XY];
    83 => CLIP_REGION, "ClipRegion", V1_1, [UBYTE];
    84 => CLIP_MODE, "ClipMode", V1_1, [UBYTE];
    98 => COLOR_DEPTH, "ColorDepth", V1_1, [UBYTE];
    99 => BLOCK_HEIGHT, "BlockHeight", V1_1, [UINT16];
    100 => COLOR_MAPPING, "ColorMapping", V1_1, [UBYTE];
    101 => COMPRESS_MODE, "CompressMode", V1_1, [UBYTE];
    102 => DESTINATION_BOX, "DestinationBox", V1_1, [UINT16_BOX];
    103 => DESTINATION_SIZE, "DestinationSize", V1_1, [UINT16_XY];
    104 => PATTERN_PERSISTENCE, "PatternPersistence", V1_1, [UBYTE];
    105 => PATTERN_DEFINE_ID, "PatternDefineID", V1_1, [SINT16];
    107 => SOURCE_HEIGHT, "SourceHeight", V1_1, [UINT16];
    108 => SOURCE_WIDTH, "SourceWidth", V1_1, [UINT16];
    109 => START_LINE, "StartLine", V1_1, [UINT16];
    110 => PAD_BYTES_MULTIPLE, "PadBytesMultiple", V2_0, [UBYTE];
    111 => BLOCK_BYTE_LENGTH, "BlockByteLength", V2_0, [UINT32];
    115 => NUMBER_OF_SCAN_LINES, "NumberOfScanLines", V1_1, [UINT16];
    120 => COLOR_TREATMENT, "ColorTreatment", V2_0, [UBYTE];
    129 => COMMENT_DATA, "CommentData", V1_1, [UBYTE_ARRAY, UINT16_ARRAY];
    130 => DATA_ORG, "DataOrg", V1_1, [UBYTE];
    134 => MEASURE, "Measure", V1_1, [UBYTE];
    136 => SOURCE_TYPE, "SourceType", V1_1, [UBYTE];
    137 => UNITS_PER_MEASURE, "UnitsPerMeasure", V1_1, [UINT16_XY, REAL32_XY];
    138 => QUERY_KEY, "QueryKey", V2_0, [UBYTE_ARRAY];
    139 => STREAM_NAME, "StreamName", V1_1, [UBYTE_ARRAY, UINT16_ARRAY];
    140 => STREAM_DATA_LENGTH, "StreamDataLength", V1_1, [UINT32];
    143 => ERROR_REPORT, "ErrorReport", V1_1, [UBYTE];
    145 => VU_EXTENSION, "VUExtension", V3_0, [UINT32];
    146 => VU_DATA_LENGTH, "VUDataLength", V3_0, [UINT32];
    161 => CHAR_ANGLE, "CharAngle", V1_1, [SINT16, REAL32];
    162 => CHAR_CODE, "CharCode", V1_1, [UBYTE, UINT16];
    163 => CHAR_DATA_SIZE, "CharDataSize", V1_1, [UINT16, UINT32];
    164 => CHAR_SCALE, "CharScale", V1_1, [UBYTE_XY, UINT16_XY, REAL32_XY];
    165 => CHAR_SHEAR, "CharShear", V1_1, [UBYTE_XY, UINT16_XY, SINT16_XY, REAL32_XY];
    166 => CHAR_SIZE, "CharSize", V1_1, [UBYTE, UINT16, REAL32];
    167 => FONT_HEADER_LENGTH, "FontHeaderLength", V1_1, [UINT16];
    168 => FONT_NAME, "FontName", V1_1, [UBYTE_ARRAY, UINT16_ARRAY];
    169 => FONT_FORMAT, "FontFormat", V1_1, [UBYTE];
    170 => SYMBOL_SET, "SymbolSet", V1_1, [UINT16];
    171 => TEXT_DATA, "TextData", V1_1, [UBYTE_ARRAY, UINT16_ARRAY];
    172 => CHAR_SUB_MODE_ARRAY, "CharSubModeArray", V1_1, [UBYTE_ARRAY];
    173 => WRITING_MODE, "WritingMode", V2_0, [UBYTE];
    175 => X_SPACING_DATA, "XSpacingData", V1_1, [UBYTE_ARRAY, UINT16_ARRAY, SINT16_ARRAY];
    176 => Y_SPACING_DATA, "YSpacingData", V1_1, [UBYTE_ARRAY, UINT16_ARRAY, SINT16_ARRAY];
    177 => CHAR_BOLD_VALUE, "CharBoldValue", V1_1, [REAL32];
}

static INDEX: LazyLock<Box<[Option<&'static AttributeInfo>]>> = LazyLock::new(|| {
    let mut index = vec![None; MAX_ATTRIBUTE_ID as usize + 1].into_boxed_slice();
    for info in ATTRIBUTES {
        debug_assert!(info.accepts.len() <= MAX_ACCEPTED_TYPES, "{}", info.name);
        index[info.id.0 as usize] = Some(info);
    }
    index
});

/// Look up metadata for an attribute ID.
///
/// Never fails: unknown and out-of-range IDs get the catch-all entry.
pub fn attribute_info(id: AttributeId) -> &'static AttributeInfo {
    INDEX
        .get(id.0 as usize)
        .copied()
        .flatten()
        .unwrap_or(&UNKNOWN_ATTRIBUTE)
}

/// Iterate every known attribute in ID order.
pub fn known_attributes() -> impl Iterator<Item = &'static AttributeInfo> {
    ATTRIBUTES.iter()
}

impl AttributeId {
    /// Symbolic name from the metadata table.
    pub fn name(self) -> &'static str {
        attribute_info(self).name
    }

    /// Whether this ID fits the position index of an attribute set.
    pub const fn is_indexable(self) -> bool {
        self.0 <= MAX_ATTRIBUTE_ID
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = attribute_info(*self);
        if info.is_unknown() {
            write!(f, "attribute #{}", self.0)
        } else {
            f.write_str(info.name)
        }
    }
}
