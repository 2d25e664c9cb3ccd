//! Tests for the operator sequence state machine.

use pxl_core::ErrorKind;
use pxl_core::interp::{Operator, ParserState, StateStack, Transition, transition};

fn stack_in(ops: &[Operator]) -> StateStack {
    let mut stack = StateStack::new();
    for &op in ops {
        stack.apply(op).unwrap();
    }
    stack
}

fn in_page() -> StateStack {
    stack_in(&[Operator::BeginSession, Operator::BeginPage])
}

// ============================================================================
// Scopes
// ============================================================================

#[test]
fn test_begin_end_pairs_round_trip() {
    let pairs = [
        (Operator::BeginFontHeader, Operator::EndFontHeader, ParserState::FontHeader),
        (Operator::BeginChar, Operator::EndChar, ParserState::Char),
        (Operator::BeginStream, Operator::EndStream, ParserState::Stream),
        (Operator::BeginImage, Operator::EndImage, ParserState::Image),
        (Operator::BeginRastPattern, Operator::EndRastPattern, ParserState::RastPattern),
        (Operator::BeginScan, Operator::EndScan, ParserState::Scan),
        (
            Operator::BeginUserDefinedLineCap,
            Operator::EndUserDefinedLineCap,
            ParserState::LineCap,
        ),
    ];

    for (begin, end, state) in pairs {
        let mut stack = in_page();
        assert_eq!(stack.apply(begin).unwrap(), Transition::Push(state));
        assert_eq!(stack.current(), state);
        assert_eq!(stack.depth(), 4);
        assert_eq!(stack.apply(end).unwrap(), Transition::Pop);
        assert_eq!(stack.current(), ParserState::Page, "{end}");
    }
}

#[test]
fn test_full_job_returns_to_job() {
    let stack = stack_in(&[
        Operator::BeginSession,
        Operator::BeginPage,
        Operator::NewPath,
        Operator::EndPage,
        Operator::BeginPage,
        Operator::EndPage,
        Operator::EndSession,
    ]);
    assert_eq!(stack.current(), ParserState::Job);
    assert_eq!(stack.depth(), 1);
}

#[test]
fn test_unmatched_end_rejected() {
    let mut stack = StateStack::new();
    let err = stack.apply(Operator::EndSession).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalOperatorSequence);

    let mut stack = in_page();
    assert!(stack.apply(Operator::EndImage).is_err());
    assert!(stack.apply(Operator::EndSession).is_err());
}

#[test]
fn test_nested_begin_rejected() {
    let mut stack = stack_in(&[Operator::BeginSession]);
    assert!(stack.apply(Operator::BeginSession).is_err());

    let mut stack = in_page();
    stack.apply(Operator::BeginImage).unwrap();
    assert!(stack.apply(Operator::BeginImage).is_err());
    assert!(stack.apply(Operator::BeginStream).is_err());
}

#[test]
fn test_reject_leaves_stack_unchanged() {
    let mut stack = in_page();
    stack.apply(Operator::BeginScan).unwrap();
    let before = stack.frames().to_vec();

    let err = stack.apply(Operator::EndPage).unwrap_err();
    assert_eq!(
        err.to_string(),
        "illegal operator sequence: EndPage in state scan"
    );
    assert_eq!(stack.frames(), &before[..]);
}

// ============================================================================
// State-specific operators
// ============================================================================

#[test]
fn test_exec_stream_only_in_page() {
    assert_eq!(
        transition(ParserState::Page, Operator::ExecStream),
        Transition::ChangeTo(ParserState::Page)
    );
    for state in [
        ParserState::Job,
        ParserState::Session,
        ParserState::Stream,
        ParserState::Image,
    ] {
        assert_eq!(transition(state, Operator::ExecStream), Transition::Reject);
    }
}

#[test]
fn test_drawing_needs_a_page() {
    for op in [Operator::SetCursor, Operator::PaintPath, Operator::Text] {
        assert_eq!(transition(ParserState::Session, op), Transition::Reject, "{op}");
        assert_eq!(
            transition(ParserState::Page, op),
            Transition::ChangeTo(ParserState::Page)
        );
    }
}

#[test]
fn test_line_cap_allows_only_path_construction() {
    let mut stack = in_page();
    stack.apply(Operator::BeginUserDefinedLineCap).unwrap();
    for op in [
        Operator::NewPath,
        Operator::SetCursor,
        Operator::LinePath,
        Operator::BezierPath,
        Operator::CloseSubPath,
    ] {
        stack.apply(op).unwrap();
        assert_eq!(stack.current(), ParserState::LineCap);
    }
    assert!(stack.apply(Operator::Text).is_err());
    assert!(stack.apply(Operator::PaintPath).is_err());
}

#[test]
fn test_session_level_operators() {
    let mut stack = stack_in(&[Operator::BeginSession]);
    for op in [
        Operator::OpenDataSource,
        Operator::CloseDataSource,
        Operator::RemoveStream,
        Operator::SetDefaultGS,
    ] {
        stack.apply(op).unwrap();
        assert_eq!(stack.current(), ParserState::Session);
    }

    let mut stack = in_page();
    assert!(stack.apply(Operator::OpenDataSource).is_err());
}

#[test]
fn test_reset() {
    let mut stack = in_page();
    stack.apply(Operator::BeginChar).unwrap();
    stack.reset();
    assert_eq!(stack.depth(), 1);
    assert_eq!(stack.current(), ParserState::Job);
}
