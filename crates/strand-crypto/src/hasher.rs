use strand_types::ObjectId;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"strand-blob-v1"`) that is
/// prepended to every hash computation. A blob and a commit with identical
/// canonical bytes therefore produce different identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for blob objects.
    pub const BLOB: Self = Self {
        domain: "strand-blob-v1",
    };
    /// Hasher for commit objects.
    pub const COMMIT: Self = Self {
        domain: "strand-commit-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash a canonical encoding with domain separation.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        self.hash_parts(&[data])
    }

    /// Hash the concatenation of several slices without materializing it.
    ///
    /// `hash_parts(&[a, b])` equals `hash(&[a, b].concat())`.
    pub fn hash_parts(&self, parts: &[&[u8]]) -> ObjectId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        for part in parts {
            hasher.update(part);
        }
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected object ID.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
