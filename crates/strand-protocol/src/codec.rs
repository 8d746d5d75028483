use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{StrandMessage, DEFAULT_MAX_MESSAGE_SIZE};

/// Bytes of frame header after the length prefix: tag + checksum.
const HEADER_LEN: usize = 1 + 4;

/// Codec for encoding/decoding Strand protocol messages.
#[derive(Clone, Copy, Debug)]
pub struct StrandCodec {
    max_message_size: usize,
}

impl Default for StrandCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_SIZE)
    }
}

fn be_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_be_bytes(buf)
}

fn truncated(e: std::io::Error, inside: &str) -> ProtocolError {
    match e.kind() {
        ErrorKind::UnexpectedEof => {
            ProtocolError::FramingError(format!("stream ended inside {inside}"))
        }
        _ => e.into(),
    }
}

impl StrandCodec {
    pub fn new(max_message_size: usize) -> Self {
        Self { max_message_size }
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    /// Encode a message with framing:
    /// `[4 bytes len][1 byte tag][4 bytes crc32][payload]`.
    pub fn encode(&self, msg: &StrandMessage) -> ProtocolResult<Vec<u8>> {
        let payload = Self::encode_payload(msg)?;
        self.check_size(payload.len())?;
        let len = u32::try_from(payload.len() + HEADER_LEN).map_err(|_| {
            ProtocolError::MessageTooLarge {
                size: payload.len(),
                max: self.max_message_size,
            }
        })?;
        let mut buf = Vec::with_capacity(4 + HEADER_LEN + payload.len());
        buf.extend_from_slice(&len.to_be_bytes());
        buf.push(msg.type_tag());
        buf.extend_from_slice(&crc32fast::hash(&payload).to_be_bytes());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Decode a framed message. Returns (message, bytes_consumed).
    pub fn decode(&self, data: &[u8]) -> ProtocolResult<(StrandMessage, usize)> {
        if data.len() < 4 + HEADER_LEN {
            return Err(ProtocolError::FramingError("too short".into()));
        }
        let len = be_u32(&data[0..4]) as usize;
        let payload_len = self.payload_len(len)?;
        let total = 4 + len;
        if data.len() < total {
            return Err(ProtocolError::FramingError(format!(
                "incomplete: have {}, need {}",
                data.len(),
                total
            )));
        }
        let msg = Self::open_frame(data[4], be_u32(&data[5..9]), &data[9..9 + payload_len])?;
        Ok((msg, total))
    }

    /// Write one framed message and flush.
    pub async fn write_frame<W>(&self, writer: &mut W, msg: &StrandMessage) -> ProtocolResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        let frame = self.encode(msg)?;
        writer.write_all(&frame).await?;
        writer.flush().await?;
        trace!(kind = msg.type_name(), bytes = frame.len(), "frame written");
        Ok(())
    }

    /// Read one framed message.
    ///
    /// Returns `Ok(None)` if the stream ends cleanly before a new frame
    /// starts. A stream that ends inside a frame is an error.
    pub async fn read_frame<R>(&self, reader: &mut R) -> ProtocolResult<Option<StrandMessage>>
    where
        R: AsyncRead + Unpin,
    {
        let mut prefix = [0u8; 4];
        if reader.read(&mut prefix[..1]).await? == 0 {
            return Ok(None);
        }
        reader
            .read_exact(&mut prefix[1..])
            .await
            .map_err(|e| truncated(e, "length prefix"))?;
        let len = u32::from_be_bytes(prefix) as usize;
        let payload_len = self.payload_len(len)?;

        let mut body = vec![0u8; len];
        reader
            .read_exact(&mut body)
            .await
            .map_err(|e| truncated(e, &format!("{len}-byte frame")))?;
        let msg = Self::open_frame(body[0], be_u32(&body[1..5]), &body[5..5 + payload_len])?;
        trace!(kind = msg.type_name(), bytes = 4 + len, "frame read");
        Ok(Some(msg))
    }

    /// Encode payload only (no framing).
    pub fn encode_payload(msg: &StrandMessage) -> ProtocolResult<Vec<u8>> {
        bincode::serialize(msg).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }

    /// Decode payload only (no framing).
    pub fn decode_payload(data: &[u8]) -> ProtocolResult<StrandMessage> {
        bincode::deserialize(data).map_err(|e| ProtocolError::Deserialization(e.to_string()))
    }

    fn check_size(&self, size: usize) -> ProtocolResult<()> {
        if size > self.max_message_size {
            return Err(ProtocolError::MessageTooLarge {
                size,
                max: self.max_message_size,
            });
        }
        Ok(())
    }

    /// Validate a length prefix and return the payload length it implies.
    fn payload_len(&self, len: usize) -> ProtocolResult<usize> {
        if len < HEADER_LEN {
            return Err(ProtocolError::FramingError(format!(
                "frame length {len} shorter than header"
            )));
        }
        let payload_len = len - HEADER_LEN;
        self.check_size(payload_len)?;
        Ok(payload_len)
    }

    fn open_frame(tag: u8, checksum: u32, payload: &[u8]) -> ProtocolResult<StrandMessage> {
        if !StrandMessage::is_known_tag(tag) {
            return Err(ProtocolError::UnknownMessageType(tag));
        }
        let actual = crc32fast::hash(payload);
        if actual != checksum {
            return Err(ProtocolError::ChecksumMismatch {
                expected: checksum,
                actual,
            });
        }
        let msg = Self::decode_payload(payload)?;
        if msg.type_tag() != tag {
            return Err(ProtocolError::FramingError(format!(
                "tag {tag} does not match {} payload",
                msg.type_name()
            )));
        }
        Ok(msg)
    }
}
