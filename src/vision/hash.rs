//! Content hashing for photo pairs
//!
//! Detects "nothing changed, skip re-analysis" by hashing the (front, back)
//! image payloads. Determinism is the contract here, not collision
//! resistance - the digest is a cache key, never a security primitive.

use sha2::{Digest, Sha256};
use tracing::warn;

/// Digest backend for [`content_hash_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashBackend {
    /// SHA-256 digest (default)
    #[default]
    Sha256,
    /// Deterministic FNV-1a rolling hash, used when the crypto path is
    /// disabled or unavailable; output carries a `fallback-` prefix so
    /// callers can tell the two apart
    Rolling,
}

/// Hash the front/back payload pair with the default backend
pub fn content_hash(front: &[u8], back: Option<&[u8]>) -> String {
    content_hash_with(front, back, HashBackend::Sha256)
}

/// Hash the front/back payload pair with an explicit backend.
///
/// Same payloads (including an absent back) always yield the same string.
/// This function never fails; the rolling path exists so callers without
/// the crypto backend still get a stable key.
pub fn content_hash_with(front: &[u8], back: Option<&[u8]>, backend: HashBackend) -> String {
    match backend {
        HashBackend::Sha256 => {
            let mut hasher = Sha256::new();
            feed_payloads(&mut hasher, front, back);
            let digest = hasher.finalize();
            hex_string(digest.as_slice())
        }
        HashBackend::Rolling => {
            warn!("content hash using rolling fallback backend");
            format!("fallback-{:016x}", rolling_checksum(front, back))
        }
    }
}

/// Feed both payloads with length framing so (a, b) never collides with a
/// re-split of the same bytes, and "absent back" hashes distinctly from an
/// empty one.
fn feed_payloads(hasher: &mut Sha256, front: &[u8], back: Option<&[u8]>) {
    hasher.update((front.len() as u64).to_be_bytes());
    hasher.update(front);
    match back {
        Some(back) => {
            hasher.update([1u8]);
            hasher.update((back.len() as u64).to_be_bytes());
            hasher.update(back);
        }
        None => hasher.update([0u8]),
    }
}

/// FNV-1a over the framed payload pair
fn rolling_checksum(front: &[u8], back: Option<&[u8]>) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    let mut feed = |bytes: &[u8]| {
        for &b in bytes {
            hash ^= b as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    };

    feed(&(front.len() as u64).to_be_bytes());
    feed(front);
    match back {
        Some(back) => {
            feed(&[1u8]);
            feed(&(back.len() as u64).to_be_bytes());
            feed(back);
        }
        None => feed(&[0u8]),
    }

    hash
}

fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        let front = b"front-bytes";
        let back = b"back-bytes";
        let a = content_hash(front, Some(back));
        let b = content_hash(front, Some(back));
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_changes_with_front() {
        let a = content_hash(b"front-a", Some(b"back"));
        let b = content_hash(b"front-b", Some(b"back"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_changes_with_back() {
        let a = content_hash(b"front", Some(b"back-a"));
        let b = content_hash(b"front", Some(b"back-b"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_absent_back_differs_from_empty_back() {
        let absent = content_hash(b"front", None);
        let empty = content_hash(b"front", Some(b""));
        assert_ne!(absent, empty);
    }

    #[test]
    fn test_rolling_backend_is_stable_and_prefixed() {
        let a = content_hash_with(b"front", Some(b"back"), HashBackend::Rolling);
        let b = content_hash_with(b"front", Some(b"back"), HashBackend::Rolling);
        assert_eq!(a, b);
        assert!(a.starts_with("fallback-"));
    }

    #[test]
    fn test_rolling_backend_distinguishes_payloads() {
        let a = content_hash_with(b"front-a", None, HashBackend::Rolling);
        let b = content_hash_with(b"front-b", None, HashBackend::Rolling);
        assert_ne!(a, b);
    }
}
