//! Operator tags.
//!
//! Operator tags occupy `0x41..=0xB9`, with unassigned holes; `0xBA..=0xBF`
//! is reserved for future operators. Each operator carries the protocol
//! level that introduced it and whether embedded data follows its tag.

use crate::model::ProtocolVersion;
use std::fmt;

/// First and last byte of the operator tag range.
pub const OPERATOR_TAGS: std::ops::RangeInclusive<u8> = 0x41..=0xB9;

/// Tags set aside for future operators.
pub const RESERVED_TAGS: std::ops::RangeInclusive<u8> = 0xBA..=0xBF;

/// Whether embedded data follows an operator tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataUse {
    None,
    Required,
    Optional,
}

macro_rules! operators {
    (@data) => { DataUse::None };
    (@data $data:ident) => { DataUse::$data };
    ($($tag:literal => $name:ident, $version:ident $(, $data:ident)?;)*) => {
        /// A PCL XL operator; the discriminant is its wire tag.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Operator {
            $($name = $tag,)*
        }

        impl Operator {
            /// All operators in tag order.
            pub const ALL: &'static [Operator] = &[$(Operator::$name,)*];

            pub const fn from_tag(tag: u8) -> Option<Self> {
                match tag {
                    $($tag => Some(Self::$name),)*
                    _ => None,
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }

            /// Lowest protocol level at which the operator exists.
            pub const fn min_version(self) -> ProtocolVersion {
                match self {
                    $(Self::$name => ProtocolVersion::$version,)*
                }
            }

            pub const fn data_use(self) -> DataUse {
                match self {
                    $(Self::$name => operators!(@data $($data)?),)*
                }
            }
        }
    };
}

operators! {
    0x41 => BeginSession, V1_1;
    0x42 => EndSession, V1_1;
    0x43 => BeginPage, V1_1;
    0x44 => EndPage, V1_1;
    0x46 => VendorUnique, V3_0, Optional;
    0x47 => Comment, V1_1;
    0x48 => OpenDataSource, V1_1;
    0x49 => CloseDataSource, V1_1;
    0x4A => EchoComment, V2_0;
    0x4B => Query, V2_0;
    0x4F => BeginFontHeader, V1_1;
    0x50 => ReadFontHeader, V1_1, Required;
    0x51 => EndFontHeader, V1_1;
    0x52 => BeginChar, V1_1;
    0x53 => ReadChar, V1_1, Required;
    0x54 => EndChar, V1_1;
    0x55 => RemoveFont, V1_1;
    0x56 => SetCharAttributes, V2_0;
    0x57 => SetDefaultGS, V1_1;
    0x58 => SetColorTreatment, V2_0;
    0x5B => BeginStream, V1_1;
    0x5C => ReadStream, V1_1, Required;
    0x5D => EndStream, V1_1;
    0x5E => ExecStream, V1_1;
    0x5F => RemoveStream, V1_1;
    0x60 => PopGS, V1_1;
    0x61 => PushGS, V1_1;
    0x62 => SetClipReplace, V1_1;
    0x63 => SetBrushSource, V1_1;
    0x64 => SetCharAngle, V1_1;
    0x65 => SetCharScale, V1_1;
    0x66 => SetCharShear, V1_1;
    0x67 => SetClipIntersect, V1_1;
    0x68 => SetClipRectangle, V1_1;
    0x69 => SetClipToPage, V1_1;
    0x6A => SetColorSpace, V1_1;
    0x6B => SetCursor, V1_1;
    0x6C => SetCursorRel, V1_1;
    0x6D => SetHalftoneMethod, V1_1;
    0x6E => SetFillMode, V1_1;
    0x6F => SetFont, V1_1;
    0x70 => SetLineDash, V1_1;
    0x71 => SetLineCap, V1_1;
    0x72 => SetLineJoin, V1_1;
    0x73 => SetMiterLimit, V1_1;
    0x74 => SetPageDefaultCTM, V1_1;
    0x75 => SetPageOrigin, V1_1;
    0x76 => SetPageRotation, V1_1;
    0x77 => SetPageScale, V1_1;
    0x78 => SetPaintTxMode, V1_1;
    0x79 => SetPenSource, V1_1;
    0x7A => SetPenWidth, V1_1;
    0x7B => SetROP, V1_1;
    0x7C => SetSourceTxMode, V1_1;
    0x7D => SetCharBoldValue, V1_1;
    0x7F => SetClipMode, V1_1;
    0x80 => SetPathToClip, V1_1;
    0x81 => SetCharSubMode, V1_1;
    0x82 => BeginUserDefinedLineCap, V3_0;
    0x83 => EndUserDefinedLineCap, V3_0;
    0x84 => CloseSubPath, V1_1;
    0x85 => NewPath, V1_1;
    0x86 => PaintPath, V1_1;
    0x91 => ArcPath, V1_1;
    0x93 => BezierPath, V1_1, Optional;
    0x94 => SetAdaptiveHalftoning, V3_0;
    0x95 => BezierRelPath, V1_1, Optional;
    0x96 => Chord, V1_1;
    0x97 => ChordPath, V1_1;
    0x98 => Ellipse, V1_1;
    0x99 => EllipsePath, V1_1;
    0x9B => LinePath, V1_1, Optional;
    0x9D => LineRelPath, V1_1, Optional;
    0x9E => Pie, V1_1;
    0x9F => PiePath, V1_1;
    0xA0 => Rectangle, V1_1;
    0xA1 => RectanglePath, V1_1;
    0xA2 => RoundRectangle, V1_1;
    0xA3 => RoundRectanglePath, V1_1;
    0xA8 => Text, V1_1;
    0xA9 => TextPath, V1_1;
    0xB0 => BeginImage, V1_1;
    0xB1 => ReadImage, V1_1, Required;
    0xB2 => EndImage, V1_1;
    0xB3 => BeginRastPattern, V1_1;
    0xB4 => ReadRastPattern, V1_1, Required;
    0xB5 => EndRastPattern, V1_1;
    0xB6 => BeginScan, V1_1;
    0xB8 => EndScan, V1_1;
    0xB9 => ScanLineRel, V1_1, Required;
}

impl Operator {
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a byte in operator position means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    Operator(Operator),
    /// Inside the operator range but not assigned to any operator.
    Unassigned,
    /// Reserved for future operators.
    Reserved,
    /// Outside both ranges.
    OutOfRange,
}

pub fn classify_tag(tag: u8) -> TagClass {
    if OPERATOR_TAGS.contains(&tag) {
        Operator::from_tag(tag).map_or(TagClass::Unassigned, TagClass::Operator)
    } else if RESERVED_TAGS.contains(&tag) {
        TagClass::Reserved
    } else {
        TagClass::OutOfRange
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip_through_table() {
        for &op in Operator::ALL {
            assert_eq!(Operator::from_tag(op.tag()), Some(op));
            assert!(OPERATOR_TAGS.contains(&op.tag()), "{op}");
        }
    }

    #[test]
    fn test_classify_tag() {
        assert_eq!(
            classify_tag(0x41),
            TagClass::Operator(Operator::BeginSession)
        );
        assert_eq!(classify_tag(0x45), TagClass::Unassigned);
        assert_eq!(classify_tag(0xBC), TagClass::Reserved);
        assert_eq!(classify_tag(0x20), TagClass::OutOfRange);
        assert_eq!(classify_tag(0xC0), TagClass::OutOfRange);
    }

    #[test]
    fn test_data_use() {
        assert_eq!(Operator::ReadImage.data_use(), DataUse::Required);
        assert_eq!(Operator::VendorUnique.data_use(), DataUse::Optional);
        assert_eq!(Operator::BeginImage.data_use(), DataUse::None);
    }
}
