//! Named stream operators.
//!
//! Handles: BeginStream, ReadStream, EndStream, ExecStream, RemoveStream
//!
//! A stream is captured from ReadStream blocks and stored under its name
//! until removed or the session ends. Executing it runs its operators, which
//! start with their own stream header, at the point of the ExecStream.

use super::{attr_text, check_length, req};
use crate::attr::{AttrSpec, match_empty, match_exact};
use crate::error::{PxlError, Result};
use crate::interp::device::{PxlDevice, lossy};
use crate::interp::interpreter::{Interpreter, StreamCapture};
use crate::model::AttributeId as A;
use bytes::BytesMut;
use tracing::debug;

const STREAM_NAME: &[AttrSpec] = &[req(A::STREAM_NAME)];

const READ_STREAM: &[AttrSpec] = &[req(A::STREAM_DATA_LENGTH)];

impl<D: PxlDevice> Interpreter<'_, D> {
    fn stream_name(&self) -> Result<Vec<u8>> {
        let matched = match_exact(&self.set, STREAM_NAME)?;
        attr_text(matched.require(A::STREAM_NAME)?)
    }

    pub(crate) fn do_begin_stream(&mut self) -> Result<()> {
        let name = self.stream_name()?;
        if self.streams.contains_key(&name) {
            return Err(PxlError::IllegalAttributeValue {
                attribute: A::STREAM_NAME.name(),
                msg: format!("stream {} already defined", lossy(&name)),
            });
        }
        self.stream_capture = Some(StreamCapture {
            name,
            body: BytesMut::new(),
        });
        Ok(())
    }

    pub(crate) fn do_read_stream(&mut self, data: &[u8]) -> Result<()> {
        let matched = match_exact(&self.set, READ_STREAM)?;
        check_length(matched.require(A::STREAM_DATA_LENGTH)?.as_uint()?, data)?;
        if let Some(capture) = self.stream_capture.as_mut() {
            capture.body.extend_from_slice(data);
        }
        Ok(())
    }

    pub(crate) fn do_end_stream(&mut self) -> Result<()> {
        match_empty(&self.set)?;
        if let Some(capture) = self.stream_capture.take() {
            debug!(
                stream = %lossy(&capture.name),
                len = capture.body.len(),
                "stream stored"
            );
            self.streams.insert(capture.name, capture.body.freeze());
        }
        Ok(())
    }

    pub(crate) fn do_remove_stream(&mut self) -> Result<()> {
        let name = self.stream_name()?;
        if self.streams.remove(&name).is_none() {
            return Err(PxlError::StreamUndefined(lossy(&name).to_string()));
        }
        Ok(())
    }

    pub(crate) fn do_exec_stream(&mut self) -> Result<()> {
        let name = self.stream_name()?;
        let Some(body) = self.streams.get(&name).cloned() else {
            return Err(PxlError::StreamUndefined(lossy(&name).to_string()));
        };
        debug!(stream = %lossy(&name), depth = self.stream_depth + 1, "exec stream");
        self.set.empty();
        self.exec_stream(body)
    }
}
