//! Content hashing for output names.

/// Hex blake3 digest of `bytes` (64 characters).
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Truncate a hex digest to `len` characters.
pub fn shorten(hash: &str, len: usize) -> &str {
    &hash[..len.min(hash.len())]
}

/// Incremental hash over several named parts.
///
/// Each part is length-prefixed so `("ab", "c")` and `("a", "bc")` differ.
#[derive(Default)]
pub struct BuildHasher {
    inner: blake3::Hasher,
}

impl BuildHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, part: &[u8]) -> &mut Self {
        self.inner.update(&(part.len() as u64).to_le_bytes());
        self.inner.update(part);
        self
    }

    pub fn finish(&self) -> String {
        self.inner.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable() {
        assert_eq!(content_hash(b"fardel"), content_hash(b"fardel"));
        assert_ne!(content_hash(b"fardel"), content_hash(b"fardel!"));
        assert_eq!(content_hash(b"").len(), 64);
    }

    #[test]
    fn shorten_clamps() {
        let hash = content_hash(b"x");
        assert_eq!(shorten(&hash, 8).len(), 8);
        assert_eq!(shorten(&hash, 100), hash);
    }

    #[test]
    fn parts_are_length_prefixed() {
        let a = BuildHasher::new().update(b"ab").update(b"c").finish();
        let b = BuildHasher::new().update(b"a").update(b"bc").finish();
        assert_ne!(a, b);
    }
}
