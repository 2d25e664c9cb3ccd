//! Tests for the operator dispatch loop and its handlers.

mod common;

use common::Job;
use pxl_core::attr::{ArrayPayload, Number};
use pxl_core::interp::{
    Event, Interpreter, NullDevice, Operator, ParserState, RecordingDevice,
};
use pxl_core::model::{AttributeId as A, NumericKind, ProtocolVersion, Shape};
use pxl_core::{ErrorKind, InterpreterOptions, PxlError};

fn run(job: &[u8]) -> (RecordingDevice, pxl_core::Result<()>) {
    let mut device = RecordingDevice::new();
    let result = Interpreter::new(&mut device).run(job);
    (device, result)
}

fn run_err(job: &[u8]) -> PxlError {
    run(job).1.unwrap_err()
}

fn uint16_xy(x: u16, y: u16) -> ArrayPayload {
    ArrayPayload::from_numbers(NumericKind::UInt16, &[Number::UInt16(x), Number::UInt16(y)])
}

/// Stored stream `name` whose body is `body`.
fn define_stream(job: Job, name: &[u8], body: &[u8]) -> Job {
    job.ubyte_array(A::STREAM_NAME, name)
        .op(Operator::BeginStream)
        .uint32(A::STREAM_DATA_LENGTH, body.len() as u32)
        .op(Operator::ReadStream)
        .data(body)
        .op(Operator::EndStream)
}

// ============================================================================
// handle_operator
// ============================================================================

#[test]
fn test_operator_by_operator_dispatch() {
    let mut device = RecordingDevice::new();
    let mut interp = Interpreter::new(&mut device);
    interp.set_version(ProtocolVersion::V1_1);

    let set = interp.attributes_mut();
    set.insert_scalar(A::MEASURE, Number::UByte(0));
    set.insert_array(A::UNITS_PER_MEASURE, Shape::Xy, uint16_xy(600, 600));
    interp
        .handle_operator(Operator::BeginSession.tag(), None)
        .unwrap();
    assert_eq!(interp.state(), ParserState::Session);
    assert!(interp.attributes().is_empty());

    // EchoComment needs class 2.0
    let err = interp.handle_operator(0x4A, None).unwrap_err();
    assert!(matches!(
        err,
        PxlError::IllegalOperatorTag {
            tag: 0x4A,
            required: Some(ProtocolVersion::V2_0),
            ..
        }
    ));
    assert_eq!(interp.state(), ParserState::Session);

    interp
        .attributes_mut()
        .insert_scalar(A::ORIENTATION, Number::UByte(1));
    interp
        .handle_operator(Operator::BeginPage.tag(), None)
        .unwrap();

    interp
        .attributes_mut()
        .insert_scalar(A::NULL_PEN, Number::UInt16(0));
    let err = interp
        .handle_operator(Operator::SetPenSource.tag(), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalAttributeDataType);
    assert!(interp.attributes().is_empty());

    interp
        .attributes_mut()
        .insert_scalar(A::NULL_PEN, Number::UByte(0));
    interp
        .handle_operator(Operator::SetPenSource.tag(), None)
        .unwrap();
    assert!(interp.attributes().is_empty());
    // The rejected SetPenSource passed the sequence check and is counted
    assert_eq!(interp.operator_count(), 4);

    assert_eq!(
        device.events().last(),
        Some(&Event::Operator {
            op: Operator::SetPenSource,
            attributes: vec!["NullPen"],
        })
    );
}

#[test]
fn test_operator_tags_gated_by_level() {
    let mut device = NullDevice;
    let mut interp = Interpreter::new(&mut device);
    assert_eq!(interp.version(), ProtocolVersion::V2_0);

    let err = interp
        .handle_operator(Operator::VendorUnique.tag(), None)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "illegal operator tag 0x46 (requires class 3.0, stream is class 2.0)"
    );

    for tag in [0xBC, 0x45, 0x30] {
        let err = interp.handle_operator(tag, None).unwrap_err();
        assert!(
            matches!(err, PxlError::IllegalOperatorTag { required: None, .. }),
            "{tag:#04x}"
        );
    }
    assert_eq!(interp.operator_count(), 0);
}

#[test]
fn test_sequence_checked_before_attributes() {
    let mut device = NullDevice;
    let mut interp = Interpreter::new(&mut device);
    interp
        .attributes_mut()
        .insert_scalar(A::NULL_PEN, Number::UInt16(0));
    let err = interp
        .handle_operator(Operator::SetPenSource.tag(), None)
        .unwrap_err();
    assert!(matches!(
        err,
        PxlError::IllegalOperatorSequence {
            operator: Operator::SetPenSource,
            state: ParserState::Job,
        }
    ));
}

#[test]
fn test_attribute_capture_defers_emptying() {
    let mut device = RecordingDevice::new();
    let mut interp = Interpreter::new(&mut device);
    interp.set_attribute_capture(true);

    let set = interp.attributes_mut();
    set.insert_scalar(A::MEASURE, Number::UByte(0));
    set.insert_array(A::UNITS_PER_MEASURE, Shape::Xy, uint16_xy(300, 300));
    interp
        .handle_operator(Operator::BeginSession.tag(), None)
        .unwrap();
    assert_eq!(interp.attributes().len(), 2);
    assert!(interp.attributes().contains(A::MEASURE));

    interp.set_attribute_capture(false);
    assert!(interp.attributes().is_empty());
}

#[test]
fn test_failed_operator_after_sequence_check_is_counted() {
    let job = Job::new(2, 0)
        .ubyte(A::MEASURE, 0)
        .uint16_xy(A::UNITS_PER_MEASURE, 600, 600)
        .op(Operator::BeginSession)
        .data(b"x")
        .build();
    let mut device = NullDevice;
    let mut interp = Interpreter::new(&mut device);
    let err = interp.run(&job).unwrap_err();
    assert!(matches!(
        err,
        PxlError::UnexpectedData {
            operator: Operator::BeginSession
        }
    ));
    assert_eq!(interp.state(), ParserState::Session);
    assert_eq!(interp.operator_count(), 1);
}

// ============================================================================
// Whole jobs
// ============================================================================

#[test]
fn test_full_job_transcript() {
    let nested = Job::new(2, 0)
        .uint16_xy(A::POINT, 10, 10)
        .op(Operator::SetCursor)
        .build();

    let job = Job::new(2, 0)
        .begin_session()
        .ubyte_array(A::COMMENT_DATA, b"hello")
        .op(Operator::Comment)
        .ubyte_array(A::FONT_NAME, b"Arial")
        .ubyte(A::FONT_FORMAT, 0)
        .op(Operator::BeginFontHeader)
        .uint16(A::FONT_HEADER_LENGTH, 4)
        .op(Operator::ReadFontHeader)
        .data(&[0, 1, 2, 3])
        .op(Operator::EndFontHeader)
        .ubyte_array(A::FONT_NAME, b"Arial")
        .op(Operator::BeginChar)
        .ubyte(A::CHAR_CODE, 65)
        .uint16(A::CHAR_DATA_SIZE, 3)
        .op(Operator::ReadChar)
        .data(&[7, 8, 9])
        .op(Operator::EndChar);
    let job = define_stream(job, b"S1", &nested)
        .begin_page()
        .ubyte(A::GRAY_LEVEL, 128)
        .op(Operator::SetPenSource)
        .uint16_xy(A::POINT, 100, 100)
        .op(Operator::SetCursor)
        .uint16_xy(A::END_POINT, 200, 100)
        .op(Operator::LinePath)
        .ubyte_array(A::STREAM_NAME, b"S1")
        .op(Operator::ExecStream)
        .op(Operator::PaintPath)
        .uint16(A::PAGE_COPIES, 2)
        .end_page()
        .end_session()
        .build();

    let mut device = RecordingDevice::new();
    let mut interp = Interpreter::new(&mut device);
    interp.run(&job).unwrap();
    assert_eq!(interp.page_count(), 1);
    assert_eq!(interp.state(), ParserState::Job);
    // 19 in the job itself plus one from the executed stream
    assert_eq!(interp.operator_count(), 20);

    assert_eq!(device.pages(), 1);
    insta::assert_snapshot!(device.transcript().trim_end(), @r#"
    session 600x600 per inch
    comment "hello"
    font "Arial" format 0 header 4
    glyph "Arial" code 65 len 3
    page portrait LETTER
    SetPenSource GrayLevel
    SetCursor Point
    LinePath EndPoint
    SetCursor Point
    PaintPath
    end page x2
    end session
    "#);
}

#[test]
fn test_pjl_wrapped_job() {
    let body = Job::new(3, 0)
        .begin_session()
        .op(Operator::BeginPage)
        .end_page()
        .end_session()
        .build();
    let mut job = b"\x1b%-12345X@PJL JOB\r\n@PJL ENTER LANGUAGE = PCLXL\n".to_vec();
    job.extend_from_slice(&body);
    job.extend_from_slice(b"\x1b%-12345X@PJL EOJ\n");

    let (device, result) = run(&job);
    result.unwrap();
    // Orientation may be omitted from class 3.0 on
    assert_eq!(device.transcript().lines().nth(1), Some("page default default"));
}

#[test]
fn test_orientation_required_below_3_0() {
    let job = Job::new(2, 1)
        .begin_session()
        .op(Operator::BeginPage)
        .build();
    assert!(matches!(
        run_err(&job),
        PxlError::MissingAttribute {
            attribute: "Orientation"
        }
    ));
}

#[test]
fn test_run_body_without_header() {
    let body = Job::body().begin_session().end_session().build();
    let mut device = RecordingDevice::new();
    let mut interp = Interpreter::new(&mut device);
    interp
        .run_body(&body, pxl_core::parser::Binding::LittleEndian)
        .unwrap();
    assert_eq!(interp.version(), ProtocolVersion::V2_0);
    assert_eq!(device.events().len(), 2);
}

#[test]
fn test_open_scopes_at_end_of_job() {
    let open = Job::new(2, 0).begin_session().begin_page().build();
    let mut device = NullDevice;
    let mut interp = Interpreter::new(&mut device);
    interp.run(&open).unwrap();
    let err = interp.check_complete().unwrap_err();
    assert!(matches!(
        err,
        PxlError::UnclosedScope {
            state: ParserState::Page
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Stream);

    let closed = Job::new(2, 0)
        .begin_session()
        .begin_page()
        .end_page()
        .end_session()
        .build();
    let mut device = NullDevice;
    let mut interp = Interpreter::new(&mut device);
    interp.run(&closed).unwrap();
    interp.check_complete().unwrap();
}

// ============================================================================
// Embedded data
// ============================================================================

#[test]
fn test_missing_data() {
    let job = Job::new(2, 0)
        .begin_session()
        .ubyte_array(A::STREAM_NAME, b"S")
        .op(Operator::BeginStream)
        .uint32(A::STREAM_DATA_LENGTH, 0)
        .op(Operator::ReadStream)
        .build();
    assert!(matches!(
        run_err(&job),
        PxlError::MissingData {
            operator: Operator::ReadStream
        }
    ));
}

#[test]
fn test_unexpected_data() {
    let job = Job::new(2, 0)
        .begin_session()
        .op(Operator::Comment)
        .data(b"x")
        .build();
    assert!(matches!(
        run_err(&job),
        PxlError::UnexpectedData {
            operator: Operator::Comment
        }
    ));
}

#[test]
fn test_data_length_mismatch() {
    let job = Job::new(2, 0)
        .begin_session()
        .ubyte_array(A::STREAM_NAME, b"S")
        .op(Operator::BeginStream)
        .uint32(A::STREAM_DATA_LENGTH, 5)
        .op(Operator::ReadStream)
        .data(b"abc")
        .build();
    assert!(matches!(
        run_err(&job),
        PxlError::DataLengthMismatch {
            declared: 5,
            actual: 3
        }
    ));
}

#[test]
fn test_point_list_length() {
    let ok = Job::new(2, 0)
        .begin_session()
        .begin_page()
        .ubyte(A::NUMBER_OF_POINTS, 2)
        .ubyte(A::POINT_TYPE, 2)
        .op(Operator::LineRelPath)
        .data(&[0; 8])
        .build();
    let (device, result) = run(&ok);
    result.unwrap();
    assert!(device.transcript().contains("LineRelPath data 8\n"));

    let short = Job::new(2, 0)
        .begin_session()
        .begin_page()
        .ubyte(A::NUMBER_OF_POINTS, 2)
        .ubyte(A::POINT_TYPE, 2)
        .op(Operator::LineRelPath)
        .data(&[0; 6])
        .build();
    assert!(matches!(
        run_err(&short),
        PxlError::DataLengthMismatch {
            declared: 8,
            actual: 6
        }
    ));
}

/// BeginImage of a `width` x `height` source at 8 bits gray.
fn begin_image(job: Job, width: u16, height: u16) -> Job {
    job.ubyte(A::COLOR_MAPPING, 0)
        .ubyte(A::COLOR_DEPTH, 2)
        .uint16(A::SOURCE_WIDTH, width)
        .uint16(A::SOURCE_HEIGHT, height)
        .uint16_xy(A::DESTINATION_SIZE, 300, 300)
        .op(Operator::BeginImage)
}

/// ReadImage of one row with BlockByteLength `declared`.
fn read_image(job: Job, declared: u32, row: &[u8]) -> Job {
    job.uint16(A::START_LINE, 0)
        .uint16(A::BLOCK_HEIGHT, 1)
        .ubyte(A::COMPRESS_MODE, 0)
        .uint32(A::BLOCK_BYTE_LENGTH, declared)
        .op(Operator::ReadImage)
        .data(row)
}

#[test]
fn test_image_job() {
    let job = begin_image(Job::new(2, 0).begin_session().begin_page(), 4, 1);
    let job = read_image(job, 4, &[1, 2, 3, 4])
        .op(Operator::EndImage)
        .end_page()
        .end_session()
        .build();
    let (device, result) = run(&job);
    result.unwrap();
    let transcript = device.transcript();
    assert!(transcript.contains("BeginImage "), "{transcript}");
    assert!(transcript.contains("ReadImage data 4\n"), "{transcript}");
}

#[test]
fn test_zero_source_dimension() {
    for (width, height, attribute) in [(0, 1, "SourceWidth"), (4, 0, "SourceHeight")] {
        let job = begin_image(Job::new(2, 0).begin_session().begin_page(), width, height).build();
        let err = run_err(&job);
        assert!(
            matches!(&err, PxlError::IllegalAttributeValue { attribute: a, .. } if *a == attribute),
            "{err}"
        );
    }
}

#[test]
fn test_raster_block_length_mismatch() {
    let job = begin_image(Job::new(2, 0).begin_session().begin_page(), 4, 1);
    let job = read_image(job, 4, &[1, 2, 3]).build();
    assert!(matches!(
        run_err(&job),
        PxlError::DataLengthMismatch {
            declared: 4,
            actual: 3
        }
    ));
}

#[test]
fn test_vendor_unique_data() {
    let with_data = Job::new(3, 0)
        .begin_session()
        .uint32(A::VU_EXTENSION, 7)
        .uint32(A::VU_DATA_LENGTH, 4)
        .op(Operator::VendorUnique)
        .data(b"abcd")
        .uint32(A::VU_EXTENSION, 7)
        .op(Operator::VendorUnique)
        .end_session()
        .build();
    let (device, result) = run(&with_data);
    result.unwrap();
    let transcript = device.transcript();
    assert!(transcript.contains("VendorUnique data 4\n"), "{transcript}");

    let missing = Job::new(3, 0)
        .begin_session()
        .uint32(A::VU_EXTENSION, 7)
        .uint32(A::VU_DATA_LENGTH, 4)
        .op(Operator::VendorUnique)
        .build();
    assert!(matches!(
        run_err(&missing),
        PxlError::MissingData {
            operator: Operator::VendorUnique
        }
    ));

    let unannounced = Job::new(3, 0)
        .begin_session()
        .uint32(A::VU_EXTENSION, 7)
        .op(Operator::VendorUnique)
        .data(b"abcd")
        .build();
    assert!(matches!(
        run_err(&unannounced),
        PxlError::UnexpectedData {
            operator: Operator::VendorUnique
        }
    ));
}

#[test]
fn test_bezier_list_needs_whole_curves() {
    let job = Job::new(2, 0)
        .begin_session()
        .begin_page()
        .ubyte(A::NUMBER_OF_POINTS, 4)
        .ubyte(A::POINT_TYPE, 2)
        .op(Operator::BezierPath)
        .data(&[0; 16])
        .build();
    assert!(matches!(
        run_err(&job),
        PxlError::IllegalAttributeValue {
            attribute: "NumberOfPoints",
            ..
        }
    ));
}

// ============================================================================
// Streams and fonts
// ============================================================================

#[test]
fn test_exec_undefined_stream() {
    let job = Job::new(2, 0)
        .begin_session()
        .begin_page()
        .ubyte_array(A::STREAM_NAME, b"nope")
        .op(Operator::ExecStream)
        .build();
    let err = run_err(&job);
    assert_eq!(err.to_string(), "stream undefined: nope");
}

#[test]
fn test_streams_do_not_outlive_session() {
    let nested = Job::new(2, 0).op(Operator::NewPath).build();
    let job = define_stream(Job::new(2, 0).begin_session(), b"S", &nested)
        .end_session()
        .begin_session()
        .begin_page()
        .ubyte_array(A::STREAM_NAME, b"S")
        .op(Operator::ExecStream)
        .build();
    assert!(matches!(run_err(&job), PxlError::StreamUndefined(_)));
}

#[test]
fn test_self_executing_stream_is_bounded() {
    let nested = Job::new(2, 0)
        .ubyte_array(A::STREAM_NAME, b"loop")
        .op(Operator::ExecStream)
        .build();
    let job = define_stream(Job::new(2, 0).begin_session(), b"loop", &nested)
        .begin_page()
        .ubyte_array(A::STREAM_NAME, b"loop")
        .op(Operator::ExecStream)
        .build();

    let mut device = NullDevice;
    let options = InterpreterOptions::default().with_max_stream_nesting(4);
    let err = Interpreter::with_options(&mut device, options)
        .run(&job)
        .unwrap_err();
    assert!(matches!(err, PxlError::StreamNestingTooDeep(4)));
}

#[test]
fn test_stream_must_close_its_scopes() {
    let nested = Job::new(2, 0).op(Operator::BeginScan).build();
    let job = define_stream(Job::new(2, 0).begin_session(), b"open", &nested)
        .begin_page()
        .ubyte_array(A::STREAM_NAME, b"open")
        .op(Operator::ExecStream)
        .build();
    assert!(matches!(
        run_err(&job),
        PxlError::IllegalOperatorSequence {
            operator: Operator::ExecStream,
            state: ParserState::Scan,
        }
    ));
}

#[test]
fn test_glyph_for_undefined_font() {
    let job = Job::new(2, 0)
        .begin_session()
        .ubyte_array(A::FONT_NAME, b"Courier")
        .op(Operator::BeginChar)
        .build();
    assert!(matches!(run_err(&job), PxlError::FontUndefined(name) if name == "Courier"));
}

#[test]
fn test_remove_font() {
    let job = Job::new(2, 0)
        .begin_session()
        .ubyte_array(A::FONT_NAME, b"F")
        .ubyte(A::FONT_FORMAT, 0)
        .op(Operator::BeginFontHeader)
        .uint16(A::FONT_HEADER_LENGTH, 1)
        .op(Operator::ReadFontHeader)
        .data(&[0])
        .op(Operator::EndFontHeader)
        .ubyte_array(A::FONT_NAME, b"F")
        .op(Operator::RemoveFont)
        .ubyte_array(A::FONT_NAME, b"F")
        .op(Operator::RemoveFont)
        .build();
    let (device, result) = run(&job);
    assert!(matches!(result, Err(PxlError::FontUndefined(_))));
    assert_eq!(
        device.events().last(),
        Some(&Event::RemoveFont("F".into()))
    );
}

#[test]
fn test_stream_redefinition_rejected() {
    let body = Job::new(2, 0).op(Operator::NewPath).build();
    let job = define_stream(Job::new(2, 0).begin_session(), b"S", &body);
    let job = define_stream(job, b"S", &body).build();
    assert!(matches!(
        run_err(&job),
        PxlError::IllegalAttributeValue {
            attribute: "StreamName",
            ..
        }
    ));
}

#[test]
fn test_remove_unknown_stream() {
    let job = Job::new(2, 0)
        .begin_session()
        .ubyte_array(A::STREAM_NAME, b"S")
        .op(Operator::RemoveStream)
        .build();
    assert!(matches!(run_err(&job), PxlError::StreamUndefined(name) if name == "S"));
}

#[test]
fn test_stream_cannot_close_calling_page() {
    let split = Job::new(2, 0)
        .end_page()
        .ubyte(A::ORIENTATION, 1)
        .op(Operator::BeginPage)
        .build();
    let restart = Job::new(2, 0)
        .end_page()
        .end_session()
        .begin_session()
        .begin_page()
        .build();

    for body in [split, restart] {
        let job = define_stream(Job::new(2, 0).begin_session(), b"S", &body)
            .begin_page()
            .ubyte_array(A::STREAM_NAME, b"S")
            .op(Operator::ExecStream)
            .build();
        let mut device = RecordingDevice::new();
        let mut interp = Interpreter::new(&mut device);
        let err = interp.run(&job).unwrap_err();
        assert!(matches!(
            err,
            PxlError::IllegalOperatorSequence {
                operator: Operator::EndPage,
                state: ParserState::Page,
            }
        ));
        assert_eq!(interp.page_count(), 0);
        assert_eq!(interp.state_depth(), 3);
    }
}

#[test]
fn test_stream_scopes_closed_inside_are_allowed() {
    let body = Job::new(2, 0)
        .op(Operator::BeginScan)
        .op(Operator::EndScan)
        .build();
    let job = define_stream(Job::new(2, 0).begin_session(), b"S", &body)
        .begin_page()
        .ubyte_array(A::STREAM_NAME, b"S")
        .op(Operator::ExecStream)
        .end_page()
        .end_session()
        .build();
    let (device, result) = run(&job);
    result.unwrap();
    assert_eq!(device.transcript().matches("end page").count(), 1);
}

#[test]
fn test_stream_version_restored_after_exec() {
    let body = Job::new(3, 0)
        .uint32(A::VU_EXTENSION, 7)
        .op(Operator::VendorUnique)
        .build();
    let job = define_stream(Job::new(2, 0).begin_session(), b"S", &body)
        .begin_page()
        .ubyte_array(A::STREAM_NAME, b"S")
        .op(Operator::ExecStream)
        .op(Operator::VendorUnique)
        .build();

    let mut device = RecordingDevice::new();
    let mut interp = Interpreter::new(&mut device);
    let err = interp.run(&job).unwrap_err();
    assert!(matches!(
        err,
        PxlError::IllegalOperatorTag {
            tag: 0x46,
            declared: ProtocolVersion::V2_0,
            required: Some(ProtocolVersion::V3_0),
        }
    ));
    assert_eq!(interp.version(), ProtocolVersion::V2_0);
    drop(interp);
    assert!(device.transcript().contains("VendorUnique VUExtension\n"));
}
