//! Content hashing for change detection.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of raw bytes.
pub fn digest_bytes(raw: &[u8]) -> String {
    format!("{:x}", Sha256::digest(raw))
}

/// Outcome of [`should_upsert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeCheck {
    /// Digest of the bytes just inspected.
    pub digest: String,
    /// False only when a prior digest exists and matches.
    pub changed: bool,
}

/// Decide whether `raw` differs from what was last indexed for `path`.
///
/// Pure: the caller records the new digest only once the record mutation has
/// succeeded, so a file that fails to parse is retried on the next event.
pub fn should_upsert(path: &str, raw: &[u8], prior_digest: Option<&str>) -> ChangeCheck {
    let digest = digest_bytes(raw);
    let changed = prior_digest != Some(digest.as_str());
    tracing::trace!(path, changed, "change check");
    ChangeCheck { digest, changed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_consistent() {
        let content = b"---\ntitle: Hello\n---\nThis is a test.";
        assert_eq!(digest_bytes(content), digest_bytes(content));
    }

    #[test]
    fn test_digest_is_sha256_hex() {
        assert_eq!(
            digest_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_first_sighting_is_a_change() {
        let check = should_upsert("a.md", b"hello", None);
        assert!(check.changed);
        assert_eq!(check.digest.len(), 64);
    }

    #[test]
    fn test_same_bytes_are_unchanged() {
        let first = should_upsert("a.md", b"hello", None);
        let second = should_upsert("a.md", b"hello", Some(&first.digest));
        assert!(!second.changed);
        assert_eq!(first.digest, second.digest);
    }

    #[test]
    fn test_single_byte_difference_is_a_change() {
        let first = should_upsert("a.md", b"hello", None);
        let second = should_upsert("a.md", b"hellp", Some(&first.digest));
        assert!(second.changed);
    }
}
