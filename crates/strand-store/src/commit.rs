use std::collections::BTreeMap;
use std::fmt;
use std::iter::Peekable;

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use strand_crypto::ContentHasher;
use strand_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};

/// Flat name-to-blob mapping carried by every commit.
pub type Index = BTreeMap<String, ObjectId>;

/// Immutable snapshot of an index plus authorship and parent links.
///
/// The id is derived from the canonical encoding of every other field:
///
/// ```text
/// parent <hex>\n                 (optional)
/// merge <hex>\n                  (optional, merge commits only)
/// author <author>\n
/// timestamp <unix-secs> <+HHMM>\n
/// committer <committer>\n
/// \0 <message> \0
/// (<name> \0 <blob-hex> \0)*     sorted by name
/// ```
///
/// Commits are never edited. [`Commit::with_parent`] returns a new commit
/// with a new id and leaves the original addressable under its own id.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Commit {
    author: String,
    committer: String,
    timestamp: DateTime<FixedOffset>,
    parent: Option<ObjectId>,
    parent2: Option<ObjectId>,
    message: String,
    index: Index,
    id: ObjectId,
}

impl Commit {
    /// Start building a commit by `author`.
    pub fn builder(author: impl Into<String>) -> CommitBuilder {
        CommitBuilder::new(author)
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn committer(&self) -> &str {
        &self.committer
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Second parent; present only on merge commits.
    pub fn parent2(&self) -> Option<ObjectId> {
        self.parent2
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn is_merge(&self) -> bool {
        self.parent2.is_some()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// A copy of this commit whose first parent is `parent`.
    ///
    /// Every other field is kept, so the result differs from `self` only in
    /// its parent link and, consequently, its id.
    pub fn with_parent(&self, parent: ObjectId) -> Commit {
        let mut commit = self.clone();
        commit.parent = Some(parent);
        commit.id = ContentHasher::COMMIT.hash(&commit.encode());
        commit
    }

    /// Canonical encoding.
    pub fn encode(&self) -> Vec<u8> {
        let mut header = String::new();
        if let Some(parent) = self.parent {
            header.push_str(&format!("parent {parent}\n"));
        }
        if let Some(parent2) = self.parent2 {
            header.push_str(&format!("merge {parent2}\n"));
        }
        header.push_str(&format!("author {}\n", self.author));
        header.push_str(&format!(
            "timestamp {} {}\n",
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        ));
        header.push_str(&format!("committer {}\n", self.committer));

        let mut out = header.into_bytes();
        out.push(0);
        out.extend_from_slice(self.message.as_bytes());
        out.push(0);
        for (name, id) in &self.index {
            out.extend_from_slice(name.as_bytes());
            out.push(0);
            out.extend_from_slice(id.to_hex().as_bytes());
            out.push(0);
        }
        out
    }

    /// Decode a canonical encoding.
    pub fn decode(data: &[u8]) -> StoreResult<Self> {
        let corrupt = |reason: String| StoreError::CorruptObject {
            id: ContentHasher::COMMIT.hash(data),
            reason,
        };

        let header_end = nul_position(data).ok_or_else(|| corrupt("missing header".into()))?;
        let header = std::str::from_utf8(&data[..header_end])
            .map_err(|e| corrupt(format!("header: {e}")))?;
        if !header.ends_with('\n') {
            return Err(corrupt("unterminated header".into()));
        }
        let rest = &data[header_end + 1..];
        let message_end = nul_position(rest).ok_or_else(|| corrupt("missing message".into()))?;
        let message = std::str::from_utf8(&rest[..message_end])
            .map_err(|e| corrupt(format!("message: {e}")))?;
        let entries = &rest[message_end + 1..];

        let mut lines = header.split_terminator('\n').peekable();
        let parent = take_field(&mut lines, "parent")
            .map(ObjectId::from_hex)
            .transpose()
            .map_err(|e| corrupt(format!("parent: {e}")))?;
        let parent2 = take_field(&mut lines, "merge")
            .map(ObjectId::from_hex)
            .transpose()
            .map_err(|e| corrupt(format!("merge: {e}")))?;
        let author = take_field(&mut lines, "author").ok_or_else(|| corrupt("missing author".into()))?;
        let timestamp = take_field(&mut lines, "timestamp")
            .ok_or_else(|| corrupt("missing timestamp".into()))?;
        let timestamp =
            parse_timestamp(timestamp).ok_or_else(|| corrupt(format!("bad timestamp {timestamp:?}")))?;
        let committer =
            take_field(&mut lines, "committer").ok_or_else(|| corrupt("missing committer".into()))?;
        if let Some(extra) = lines.next() {
            return Err(corrupt(format!("unexpected header line {extra:?}")));
        }

        let mut index = Index::new();
        if !entries.is_empty() {
            if entries.last() != Some(&0) {
                return Err(corrupt("unterminated index".into()));
            }
            let fields: Vec<&[u8]> = entries[..entries.len() - 1].split(|b| *b == 0).collect();
            if fields.len() % 2 != 0 {
                return Err(corrupt("odd number of index fields".into()));
            }
            for pair in fields.chunks(2) {
                let name = std::str::from_utf8(pair[0])
                    .map_err(|e| corrupt(format!("index name: {e}")))?;
                let id = std::str::from_utf8(pair[1])
                    .map_err(|e| corrupt(format!("index id: {e}")))
                    .and_then(|hex| {
                        ObjectId::from_hex(hex).map_err(|e| corrupt(format!("index id: {e}")))
                    })?;
                if index.insert(name.to_string(), id).is_some() {
                    return Err(corrupt(format!("duplicate index entry {name:?}")));
                }
            }
        }

        CommitBuilder::new(author)
            .committer(committer)
            .timestamp(timestamp)
            .parent(parent)
            .parent2(parent2)
            .message(message)
            .index(index)
            .build()
            .map_err(|e| corrupt(e.to_string()))
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Commit, self.encode())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Commit {
            return Err(StoreError::KindMismatch {
                id: obj.compute_id(),
                expected: ObjectKind::Commit,
                actual: obj.kind,
            });
        }
        Self::decode(&obj.data)
    }
}

impl fmt::Debug for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commit")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("parent2", &self.parent2)
            .field("author", &self.author)
            .field("message", &self.message)
            .field("entries", &self.index.len())
            .finish()
    }
}

impl From<Commit> for Vec<u8> {
    fn from(commit: Commit) -> Self {
        commit.encode()
    }
}

impl TryFrom<Vec<u8>> for Commit {
    type Error = StoreError;

    fn try_from(data: Vec<u8>) -> Result<Self, Self::Error> {
        Self::decode(&data)
    }
}

fn nul_position(data: &[u8]) -> Option<usize> {
    data.iter().position(|b| *b == 0)
}

fn take_field<'a, I>(lines: &mut Peekable<I>, key: &str) -> Option<&'a str>
where
    I: Iterator<Item = &'a str>,
{
    let line: &'a str = lines.peek().copied()?;
    let value = line.strip_prefix(key)?.strip_prefix(' ')?;
    lines.next();
    Some(value)
}

/// Parse a `timestamp` field, accepting only its canonical spelling.
fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let parsed = DateTime::parse_from_str(value, "%s %z").ok()?;
    (parsed.format("%s %z").to_string() == value).then_some(parsed)
}

// ---------------------------------------------------------------------------
// CommitBuilder
// ---------------------------------------------------------------------------

/// Builder for [`Commit`].
///
/// `build` validates that every field is representable in the canonical
/// encoding and truncates the timestamp to whole seconds.
#[derive(Clone, Debug)]
pub struct CommitBuilder {
    author: String,
    committer: Option<String>,
    timestamp: Option<DateTime<FixedOffset>>,
    parent: Option<ObjectId>,
    parent2: Option<ObjectId>,
    message: String,
    index: Index,
}

impl CommitBuilder {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            committer: None,
            timestamp: None,
            parent: None,
            parent2: None,
            message: String::new(),
            index: Index::new(),
        }
    }

    /// Defaults to the author.
    pub fn committer(mut self, committer: impl Into<String>) -> Self {
        self.committer = Some(committer.into());
        self
    }

    /// Defaults to the current time in UTC.
    pub fn timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn parent(mut self, parent: Option<ObjectId>) -> Self {
        self.parent = parent;
        self
    }

    pub fn parent2(mut self, parent2: Option<ObjectId>) -> Self {
        self.parent2 = parent2;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.index = index;
        self
    }

    pub fn entry(mut self, name: impl Into<String>, blob: ObjectId) -> Self {
        self.index.insert(name.into(), blob);
        self
    }

    pub fn build(self) -> StoreResult<Commit> {
        let committer = self.committer.unwrap_or_else(|| self.author.clone());
        for (field, value) in [("author", &self.author), ("committer", &committer)] {
            if value.contains(['\n', '\0']) {
                return Err(StoreError::InvalidObject(format!(
                    "{field} must not contain newline or NUL"
                )));
            }
        }
        if self.message.contains('\0') {
            return Err(StoreError::InvalidObject(
                "message must not contain NUL".into(),
            ));
        }
        if let Some(name) = self
            .index
            .keys()
            .find(|name| name.is_empty() || name.contains('\0'))
        {
            return Err(StoreError::InvalidObject(format!(
                "invalid index name {name:?}"
            )));
        }
        if self.parent2.is_some() && self.parent.is_none() {
            return Err(StoreError::InvalidObject(
                "merge parent without first parent".into(),
            ));
        }

        let timestamp = self.timestamp.unwrap_or_else(|| Utc::now().into());
        if timestamp.offset().local_minus_utc() % 60 != 0 {
            return Err(StoreError::InvalidObject(
                "timestamp offset must be whole minutes".into(),
            ));
        }
        let timestamp = timestamp.with_nanosecond(0).unwrap_or(timestamp);

        let mut commit = Commit {
            author: self.author,
            committer,
            timestamp,
            parent: self.parent,
            parent2: self.parent2,
            message: self.message,
            index: self.index,
            id: ObjectId::from_hash([0; 32]),
        };
        commit.id = ContentHasher::COMMIT.hash(&commit.encode());
        Ok(commit)
    }
}
