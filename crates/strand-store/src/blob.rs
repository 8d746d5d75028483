use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use strand_crypto::ContentHasher;
use strand_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};

/// Classification of a blob payload. Part of the blob's identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// UTF-8 text.
    Text,
    /// Opaque bytes.
    Binary,
    /// A JSON document.
    Structured,
}

impl ContentType {
    /// The tag written in front of the payload in the canonical encoding.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Binary => "application/octet-stream",
            Self::Structured => "application/json",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "text/plain" => Some(Self::Text),
            "application/octet-stream" => Some(Self::Binary),
            "application/json" => Some(Self::Structured),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The payload of a blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlobContent {
    Text(String),
    Binary(Vec<u8>),
    /// Encoded as compact JSON with object keys in sorted order.
    Structured(serde_json::Value),
}

impl BlobContent {
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Text(_) => ContentType::Text,
            Self::Binary(_) => ContentType::Binary,
            Self::Structured(_) => ContentType::Structured,
        }
    }

    /// The raw payload bytes, without the content-type tag.
    pub fn payload(&self) -> Cow<'_, [u8]> {
        match self {
            Self::Text(text) => Cow::Borrowed(text.as_bytes()),
            Self::Binary(bytes) => Cow::Borrowed(bytes.as_slice()),
            Self::Structured(value) => Cow::Owned(value.to_string().into_bytes()),
        }
    }

    /// Content-addressed id of the blob this content would produce.
    pub fn blob_id(&self) -> ObjectId {
        let payload = self.payload();
        ContentHasher::BLOB.hash_parts(&[self.content_type().tag().as_bytes(), &[0], &payload])
    }
}

impl From<&str> for BlobContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for BlobContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for BlobContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}

impl From<&[u8]> for BlobContent {
    fn from(bytes: &[u8]) -> Self {
        Self::Binary(bytes.to_vec())
    }
}

impl From<serde_json::Value> for BlobContent {
    fn from(value: serde_json::Value) -> Self {
        Self::Structured(value)
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Immutable payload object.
///
/// Canonical encoding: `content-type-tag || 0x00 || payload`. Two blobs with
/// equal payload and classification are the same object; `"a"` as text and
/// `b"a"` as binary are not.
///
/// Serializes as its canonical encoding, so any serde format carries blobs
/// losslessly and the receiver re-derives the id.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Blob {
    content: BlobContent,
    id: ObjectId,
}

impl Blob {
    pub fn new(content: impl Into<BlobContent>) -> Self {
        let content = content.into();
        let id = content.blob_id();
        Self { content, id }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(BlobContent::Text(text.into()))
    }

    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(BlobContent::Binary(bytes.into()))
    }

    pub fn structured(value: serde_json::Value) -> Self {
        Self::new(BlobContent::Structured(value))
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn content(&self) -> &BlobContent {
        &self.content
    }

    pub fn into_content(self) -> BlobContent {
        self.content
    }

    pub fn content_type(&self) -> ContentType {
        self.content.content_type()
    }

    /// The payload as text, if this is a text blob.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            BlobContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Canonical encoding.
    pub fn encode(&self) -> Vec<u8> {
        let tag = self.content_type().tag().as_bytes();
        let payload = self.content.payload();
        let mut out = Vec::with_capacity(tag.len() + 1 + payload.len());
        out.extend_from_slice(tag);
        out.push(0);
        out.extend_from_slice(&payload);
        out
    }

    /// Decode a canonical encoding.
    pub fn decode(data: &[u8]) -> StoreResult<Self> {
        let corrupt = |reason: String| StoreError::CorruptObject {
            id: ContentHasher::BLOB.hash(data),
            reason,
        };
        let split = data
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| corrupt("missing content-type terminator".into()))?;
        let tag = std::str::from_utf8(&data[..split])
            .map_err(|e| corrupt(format!("content-type tag: {e}")))?;
        let payload = &data[split + 1..];
        let content = match ContentType::from_tag(tag) {
            Some(ContentType::Text) => BlobContent::Text(
                String::from_utf8(payload.to_vec()).map_err(|e| corrupt(e.to_string()))?,
            ),
            Some(ContentType::Binary) => BlobContent::Binary(payload.to_vec()),
            Some(ContentType::Structured) => BlobContent::Structured(
                serde_json::from_slice(payload).map_err(|e| corrupt(e.to_string()))?,
            ),
            None => return Err(corrupt(format!("unknown content type {tag:?}"))),
        };
        Ok(Self::new(content))
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.encode())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Blob {
            return Err(StoreError::KindMismatch {
                id: obj.compute_id(),
                expected: ObjectKind::Blob,
                actual: obj.kind,
            });
        }
        Self::decode(&obj.data)
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("id", &self.id)
            .field("content_type", &self.content_type())
            .field("size", &self.content.payload().len())
            .finish()
    }
}

impl From<Blob> for Vec<u8> {
    fn from(blob: Blob) -> Self {
        blob.encode()
    }
}

impl TryFrom<Vec<u8>> for Blob {
    type Error = StoreError;

    fn try_from(data: Vec<u8>) -> Result<Self, Self::Error> {
        Self::decode(&data)
    }
}
