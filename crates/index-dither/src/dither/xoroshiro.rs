//! xoroshiro128+ generator with MurmurHash3-finalizer seeding.
//!
//! Fast, non-cryptographic and fully reproducible from a 64-bit seed. Plugs
//! into `rand` through [`RngCore`] and [`SeedableRng`], so `gen_range` and
//! friends work on it directly.

use rand::{Error, RngCore, SeedableRng};

const FALLBACK_SEED: u64 = 0xdead_beef;

/// MurmurHash3 64-bit finalizer (`fmix64`).
#[inline]
pub fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

/// xoroshiro128+ state. Never all zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xoroshiro128Plus {
    s0: u64,
    s1: u64,
}

impl Xoroshiro128Plus {
    /// Seed from one word: `s0 = fmix64(seed)`, `s1 = fmix64(s0)`.
    pub fn new(seed: u64) -> Self {
        let s0 = fmix64(seed);
        let s1 = fmix64(s0);
        Self::from_state(s0, s1)
    }

    /// Use raw state words. An all-zero state is replaced by the fallback seed.
    pub fn from_state(s0: u64, s1: u64) -> Self {
        if s0 == 0 && s1 == 0 {
            let s0 = fmix64(FALLBACK_SEED);
            return Self { s0, s1: fmix64(s0) };
        }
        Self { s0, s1 }
    }
}

impl RngCore for Xoroshiro128Plus {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        let s0 = self.s0;
        let mut s1 = self.s1;
        let result = s0.wrapping_add(s1);
        s1 ^= s0;
        self.s0 = s0.rotate_left(55) ^ s1 ^ (s1 << 14);
        self.s1 = s1.rotate_left(36);
        result
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Xoroshiro128Plus {
    type Seed = [u8; 16];

    fn from_seed(seed: Self::Seed) -> Self {
        let mut lo = [0u8; 8];
        let mut hi = [0u8; 8];
        lo.copy_from_slice(&seed[..8]);
        hi.copy_from_slice(&seed[8..]);
        Self::from_state(u64::from_le_bytes(lo), u64::from_le_bytes(hi))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_fmix64_known_values() {
        assert_eq!(fmix64(0), 0);
        assert_ne!(fmix64(1), 1);
        assert_ne!(fmix64(1), fmix64(2));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Xoroshiro128Plus::seed_from_u64(42);
        let mut b = Xoroshiro128Plus::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = Xoroshiro128Plus::new(1);
        let mut b = Xoroshiro128Plus::new(2);
        let same = (0..32).filter(|_| a.next_u64() == b.next_u64()).count();
        assert!(same < 2);
    }

    #[test]
    fn test_zero_state_uses_fallback() {
        let rng = Xoroshiro128Plus::from_state(0, 0);
        assert_eq!(rng, Xoroshiro128Plus::new(FALLBACK_SEED));
        // Seed 0 hashes to an all-zero state too.
        assert_eq!(Xoroshiro128Plus::new(0), rng);
    }

    #[test]
    fn test_transition() {
        let mut rng = Xoroshiro128Plus::from_state(1, 2);
        assert_eq!(rng.next_u64(), 3);
        let s1 = 2u64 ^ 1;
        assert_eq!(rng.s0, 1u64.rotate_left(55) ^ s1 ^ (s1 << 14));
        assert_eq!(rng.s1, s1.rotate_left(36));
    }

    #[test]
    fn test_fill_bytes_partial_chunk() {
        let mut rng = Xoroshiro128Plus::new(7);
        let mut buf = [0u8; 13];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_gen_range_stays_in_bounds() {
        let mut rng = Xoroshiro128Plus::new(99);
        for _ in 0..1000 {
            let v = rng.gen_range(-5..=5);
            assert!((-5..=5).contains(&v));
        }
    }
}
