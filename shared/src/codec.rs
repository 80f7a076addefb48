//! Length-prefixed codec for TCP framing
//!
//! All messages are framed as:
//! ```text
//! [ 4 bytes: length (u32, big-endian) ][ 1 byte: kind ][ N bytes: payload ]
//! ```
//!
//! The length counts the kind byte plus the payload.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Maximum frame size (64 KiB), kind byte included
pub const MAX_FRAME_SIZE: u32 = 64 * 1024;

/// Size of the length prefix
const PREFIX_LEN: usize = 4;

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Frame too large: {0} bytes (max: {MAX_FRAME_SIZE})")]
    FrameTooLarge(usize),

    #[error("Invalid frame length prefix: {0}")]
    InvalidLength(u32),

    #[error("Unknown frame kind: {0:#04x}")]
    UnknownKind(u8),

    #[error("Text frame is not valid UTF-8: {0}")]
    InvalidText(#[from] std::str::Utf8Error),
}

/// What a frame carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// A UTF-8 command token
    Text = 0x01,
    /// Opaque structured data
    Structured = 0x02,
}

impl TryFrom<u8> for FrameKind {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(FrameKind::Text),
            0x02 => Ok(FrameKind::Structured),
            other => Err(CodecError::UnknownKind(other)),
        }
    }
}

/// A single decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub payload: Bytes,
}

impl Frame {
    /// Create a text frame
    pub fn text(token: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Text,
            payload: Bytes::from(token.into()),
        }
    }

    /// Create a structured frame
    pub fn structured(data: impl Into<Bytes>) -> Self {
        Self {
            kind: FrameKind::Structured,
            payload: data.into(),
        }
    }

    /// Borrow the payload as text
    pub fn as_text(&self) -> Result<&str, CodecError> {
        Ok(std::str::from_utf8(&self.payload)?)
    }
}

/// Encode a frame into a length-prefixed byte buffer
pub fn encode(frame: &Frame) -> Result<Bytes, CodecError> {
    let mut buf = BytesMut::new();
    encode_into(frame, &mut buf)?;
    Ok(buf.freeze())
}

/// Encode a frame directly into a provided buffer
pub fn encode_into(frame: &Frame, buf: &mut BytesMut) -> Result<(), CodecError> {
    let body_len = 1 + frame.payload.len();

    if body_len > MAX_FRAME_SIZE as usize {
        return Err(CodecError::FrameTooLarge(body_len));
    }

    buf.reserve(PREFIX_LEN + body_len);
    buf.put_u32(body_len as u32);
    buf.put_u8(frame.kind as u8);
    buf.put_slice(&frame.payload);

    Ok(())
}

/// Try to decode a length-prefixed frame from a buffer
///
/// Returns:
/// - `Ok(Some(frame))` if a complete frame was decoded
/// - `Ok(None)` if more data is needed
/// - `Err(...)` if the data is invalid
pub fn decode(buf: &mut BytesMut) -> Result<Option<Frame>, CodecError> {
    if buf.len() < PREFIX_LEN {
        return Ok(None);
    }

    // Peek at the length prefix without consuming
    let body_len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);

    if body_len == 0 || body_len > MAX_FRAME_SIZE {
        return Err(CodecError::InvalidLength(body_len));
    }

    let total_len = PREFIX_LEN + body_len as usize;
    if buf.len() < total_len {
        return Ok(None);
    }

    buf.advance(PREFIX_LEN);
    let mut body = buf.split_to(body_len as usize);
    let kind = FrameKind::try_from(body.get_u8())?;

    Ok(Some(Frame {
        kind,
        payload: body.freeze(),
    }))
}

/// Decoder state machine for streaming decoding
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Partial frame data being accumulated
    buffer: BytesMut,
}

impl FrameDecoder {
    /// Create a new frame decoder
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(1024),
        }
    }

    /// Add data to the decoder buffer
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode the next frame from the buffer
    ///
    /// Call this repeatedly until it returns `Ok(None)` to drain all complete frames
    pub fn decode_next(&mut self) -> Result<Option<Frame>, CodecError> {
        decode(&mut self.buffer)
    }

    /// Get the current buffer length (for debugging)
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

/// Encoder for building frames
#[derive(Debug, Default)]
pub struct FrameEncoder {
    buffer: BytesMut,
}

impl FrameEncoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(256),
        }
    }

    /// Encode a frame and add to the output buffer
    pub fn encode(&mut self, frame: &Frame) -> Result<(), CodecError> {
        encode_into(frame, &mut self.buffer)
    }

    /// Take the encoded bytes, leaving an empty buffer
    pub fn take(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_frame_layout() {
        let encoded = encode(&Frame::text("stop")).expect("encode failed");

        let len_prefix = u32::from_be_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]);
        assert_eq!(len_prefix as usize, encoded.len() - 4);
        assert_eq!(encoded[4], FrameKind::Text as u8);
        assert_eq!(&encoded[5..], b"stop");

        let mut buf = BytesMut::from(&encoded[..]);
        let decoded = decode(&mut buf).expect("decode failed").expect("no frame");
        assert_eq!(decoded.as_text().unwrap(), "stop");
        assert!(buf.is_empty(), "buffer should be empty after decode");
    }

    #[test]
    fn test_partial_decode() {
        let encoded = encode(&Frame::text("forward")).expect("encode failed");

        let mut buf = BytesMut::from(&encoded[..6]);
        let result = decode(&mut buf).expect("decode should not fail on partial data");
        assert!(result.is_none(), "should return None for partial data");

        // Data not consumed
        assert_eq!(buf.len(), 6);
    }

    #[test]
    fn test_frame_decoder_chunks_and_kinds() {
        let mut encoder = FrameEncoder::new();
        encoder.encode(&Frame::text("left")).unwrap();
        encoder.encode(&Frame::structured(&b"{\"x\":1}"[..])).unwrap();
        let bytes = encoder.take();
        assert!(encoder.is_empty());

        let mut decoder = FrameDecoder::new();
        decoder.extend(&bytes[..3]);
        assert!(decoder.decode_next().expect("decode error").is_none());

        decoder.extend(&bytes[3..]);
        let first = decoder.decode_next().unwrap().expect("first frame");
        let second = decoder.decode_next().unwrap().expect("second frame");
        assert!(decoder.decode_next().unwrap().is_none());
        assert_eq!(decoder.buffer_len(), 0);

        assert_eq!(first, Frame::text("left"));
        assert_eq!(second.kind, FrameKind::Structured);
        assert_eq!(&second.payload[..], b"{\"x\":1}");
    }

    #[test]
    fn test_frame_too_large() {
        let mut buf = BytesMut::new();
        buf.put_u32(MAX_FRAME_SIZE + 1);
        buf.put_bytes(0, 16);

        let result = decode(&mut buf);
        assert!(matches!(result, Err(CodecError::InvalidLength(_))));

        let big = Frame::structured(vec![0u8; MAX_FRAME_SIZE as usize]);
        assert!(matches!(encode(&big), Err(CodecError::FrameTooLarge(_))));
    }

    #[test]
    fn test_zero_length_and_unknown_kind() {
        let mut buf = BytesMut::new();
        buf.put_u32(0);
        assert!(matches!(decode(&mut buf), Err(CodecError::InvalidLength(0))));

        let mut buf = BytesMut::new();
        buf.put_u32(2);
        buf.put_u8(0x7f);
        buf.put_u8(b'x');
        assert!(matches!(decode(&mut buf), Err(CodecError::UnknownKind(0x7f))));
    }

    #[test]
    fn test_invalid_utf8_text() {
        let frame = Frame {
            kind: FrameKind::Text,
            payload: Bytes::from_static(&[0xff, 0xfe]),
        };
        assert!(matches!(frame.as_text(), Err(CodecError::InvalidText(_))));
    }
}
