//! The map hashes each key exactly once, with the caller's hash builder, and
//! files the entry in its lookup table under that 64-bit hash. The table only
//! ever sees those precomputed hashes, so its own hasher can hand them back
//! as-is instead of hashing them a second time.

use std::hash::{BuildHasher, Hasher};

/// Hands back the `KeyHash` written into it as the table hash.
pub(crate) struct NullHasher(u64);

impl Hasher for NullHasher {
    fn write(&mut self, bytes: &[u8]) {
        // table keys arrive through write_u64; bytes are folded little-endian
        // so a raw write of a u64 lands on the same value
        for byte in bytes.iter().rev() {
            self.0 = (self.0 << 8) | u64::from(*byte);
        }
    }

    fn write_u64(&mut self, i: u64) {
        self.0 = i;
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

/// Hash builder for the map's `KeyHash -> bucket` table. Stateless, so
/// every map and every clone of one can share it freely.
#[derive(Clone, Copy, Default)]
pub(crate) struct BuildNullHasher;

impl BuildHasher for BuildNullHasher {
    type Hasher = NullHasher;

    fn build_hasher(&self) -> Self::Hasher {
        NullHasher(0)
    }
}

#[cfg(test)]
mod tests {
    use std::hash::{BuildHasher, Hash, Hasher};

    use super::{BuildNullHasher, NullHasher};

    #[test]
    fn test_hasher() {
        let mut h0 = NullHasher(0);
        h0.write_u64(0xc8c8c8c8);
        assert_eq!(0xc8c8c8c8, h0.finish());

        let mut h1 = NullHasher(0);
        h1.write(&0xc8c8c8c8c8c8c8c8u64.to_le_bytes());
        assert_eq!(0xc8c8c8c8c8c8c8c8, h1.finish());
    }

    #[test]
    fn test_key_hash_passes_through() {
        let mut h = BuildNullHasher.build_hasher();
        0x0123_4567_89ab_cdefu64.hash(&mut h);
        assert_eq!(0x0123_4567_89ab_cdef, h.finish());
    }
}
