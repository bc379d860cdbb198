//! Length-prefixed framing for the relay wire protocol.
//!
//! Every frame on the wire is a 4-byte big-endian length followed by exactly
//! that many payload bytes. A length of zero is the graceful close signal.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Width of the length field in bytes.
pub const LENGTH_FIELD_LEN: usize = 4;

/// Default upper bound on a single frame's payload (1 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

/// Errors produced while encoding or decoding frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The length prefix exceeds the configured maximum
    #[error("frame length {len} exceeds maximum of {max} bytes")]
    FrameTooLarge { len: usize, max: usize },
}

/// One unit of transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A non-empty text payload
    Message(Bytes),
    /// Zero-length frame sent by a peer that is leaving on purpose
    Close,
}

impl Frame {
    /// Classify a raw payload. An empty payload is the close signal.
    pub fn from_payload(payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        if payload.is_empty() {
            Frame::Close
        } else {
            Frame::Message(payload)
        }
    }

    pub fn payload(&self) -> &[u8] {
        match self {
            Frame::Message(payload) => payload.as_ref(),
            Frame::Close => &[],
        }
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Frame::Close)
    }
}

/// Codec for [`Frame`], usable with `FramedRead` / `FramedWrite`.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_frame_len: usize,
}

impl FrameCodec {
    pub fn new(max_frame_len: usize) -> Self {
        Self { max_frame_len }
    }

    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < LENGTH_FIELD_LEN {
            return Ok(None);
        }

        let mut length_bytes = [0u8; LENGTH_FIELD_LEN];
        length_bytes.copy_from_slice(&src[..LENGTH_FIELD_LEN]);
        let len = u32::from_be_bytes(length_bytes) as usize;

        if len > self.max_frame_len {
            return Err(FrameError::FrameTooLarge {
                len,
                max: self.max_frame_len,
            });
        }

        if src.len() < LENGTH_FIELD_LEN + len {
            src.reserve(LENGTH_FIELD_LEN + len - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_FIELD_LEN);
        let payload = src.split_to(len).freeze();
        Ok(Some(Frame::from_payload(payload)))
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = item.payload();
        if payload.len() > self.max_frame_len {
            return Err(FrameError::FrameTooLarge {
                len: payload.len(),
                max: self.max_frame_len,
            });
        }

        dst.reserve(LENGTH_FIELD_LEN + payload.len());
        dst.put_u32(payload.len() as u32);
        dst.put_slice(payload);
        Ok(())
    }
}
