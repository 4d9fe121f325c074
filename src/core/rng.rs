//! Deterministic Puzzle RNG
//!
//! Xorshift128 pseudo-random generator over four 32-bit words. Given the
//! same seed bytes, produces an identical draw sequence on all platforms,
//! so a stored seed replays the exact puzzle a session was created with.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Fallback word multiplier used when seed material runs short.
const GOLDEN_RATIO: u32 = 0x9e37_79b9;

/// Domain separator for session seed derivation.
const SEED_DOMAIN: &[u8] = b"BLACKICE_SEED_V1";

/// Seed material for one infiltration session.
///
/// 32 bytes, serialized as lowercase hex. The first 8 bytes double as the
/// public session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed([u8; 32]);

impl Seed {
    /// Wraps raw seed bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Seed(bytes)
    }

    /// Derives a session seed from fresh entropy, the player identity and
    /// the claimed target index.
    ///
    /// The inputs are mixed through SHA-256 under a fixed domain tag, so
    /// two players (or two targets) never share a puzzle even if the
    /// entropy source repeats.
    pub fn derive(entropy: &[u8; 32], player: &[u8; 16], target_index: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(SEED_DOMAIN);
        hasher.update(entropy);
        hasher.update(player);
        hasher.update(target_index.to_le_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Seed(bytes)
    }

    /// Raw seed bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Public session identifier: hex of the first 8 seed bytes.
    ///
    /// Safe to hand to clients. The remaining 24 bytes never leave the
    /// server, so the identifier does not let anyone reconstruct the
    /// puzzle.
    pub fn session_id(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Serialize for Seed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let raw = hex::decode(&text).map_err(serde::de::Error::custom)?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|_| serde::de::Error::custom("seed must be exactly 32 bytes"))?;
        Ok(Seed(bytes))
    }
}

/// Xorshift128 generator.
///
/// # Determinism Guarantee
///
/// All puzzle generation draws from this generator in a fixed order.
/// Changing the order of draws anywhere in generation is a breaking
/// change: stored seeds would replay into different puzzles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRng {
    s: [u32; 4],
}

impl GameRng {
    /// Creates a generator from a session seed.
    pub fn from_seed(seed: &Seed) -> Self {
        Self::from_bytes(seed.as_bytes())
    }

    /// Creates a generator from arbitrary seed material.
    ///
    /// The first 16 bytes become the four state words (little-endian).
    /// Missing words fall back to multiples of a golden-ratio constant,
    /// and an all-zero state is bumped so the generator cannot stall on
    /// its fixed point.
    pub fn from_bytes(material: &[u8]) -> Self {
        let mut s = [0u32; 4];
        for (i, word) in s.iter_mut().enumerate() {
            let offset = i * 4;
            if offset + 4 <= material.len() {
                let mut chunk = [0u8; 4];
                chunk.copy_from_slice(&material[offset..offset + 4]);
                *word = u32::from_le_bytes(chunk);
            } else {
                *word = (i as u32 + 1).wrapping_mul(GOLDEN_RATIO);
            }
        }
        if s == [0, 0, 0, 0] {
            s[0] = 1;
        }
        GameRng { s }
    }

    /// Generates the next raw 32-bit value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut t = self.s[3];
        let s0 = self.s[0];
        self.s[3] = self.s[2];
        self.s[2] = self.s[1];
        self.s[1] = s0;
        t ^= t << 11;
        t ^= t >> 8;
        self.s[0] = t ^ s0 ^ (s0 >> 19);
        self.s[0]
    }

    /// Generates a uniform value in `[min, max]`, both ends inclusive.
    ///
    /// Always consumes exactly one raw draw, even for a degenerate range,
    /// so the stream stays aligned no matter which bounds a call site
    /// passes.
    #[inline]
    pub fn next_range(&mut self, min: u32, max: u32) -> u32 {
        let span = max.saturating_sub(min).saturating_add(1).max(1);
        min + self.next_u32() % span
    }

    /// Shuffles a slice in place using Fisher-Yates.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next_u32() as usize) % (i + 1);
            items.swap(i, j);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_seed() -> Seed {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        Seed::from_bytes(bytes)
    }

    #[test]
    fn test_rng_known_values() {
        let mut rng = GameRng::from_seed(&counting_seed());
        let draws: Vec<u32> = (0..5).map(|_| rng.next_u32()).collect();

        // These values must never change!
        // If they do, stored seeds will replay into different puzzles.
        assert_eq!(
            draws,
            vec![2082146817, 654446275, 270205186, 50464768, 2817343843]
        );
    }

    #[test]
    fn test_short_material_falls_back() {
        let mut rng = GameRng::from_bytes(&[]);
        assert_eq!(rng.next_u32(), 155862621);

        let mut rng = GameRng::from_bytes(&[0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(rng.next_u32(), 1253149745);
    }

    #[test]
    fn test_all_zero_material_does_not_stall() {
        let mut rng = GameRng::from_bytes(&[0u8; 32]);
        assert_eq!(rng.next_u32(), 1);
        assert_eq!(rng.next_u32(), 1);
        assert_eq!(rng.next_u32(), 1);
        assert_eq!(rng.next_u32(), 2056);
    }

    #[test]
    fn test_rng_determinism() {
        let seed = counting_seed();
        let mut rng1 = GameRng::from_seed(&seed);
        let mut rng2 = GameRng::from_seed(&seed);

        for _ in 0..1000 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = GameRng::from_seed(&counting_seed());
        let mut rng2 = GameRng::from_seed(&Seed::from_bytes([0x5A; 32]));

        let left: Vec<u32> = (0..8).map(|_| rng1.next_u32()).collect();
        let right: Vec<u32> = (0..8).map(|_| rng2.next_u32()).collect();
        assert_ne!(left, right);
    }

    #[test]
    fn test_next_range_bounds() {
        let mut rng = GameRng::from_seed(&counting_seed());
        for _ in 0..1000 {
            let val = rng.next_range(3, 9);
            assert!((3..=9).contains(&val));
        }
    }

    #[test]
    fn test_degenerate_range_still_draws() {
        let seed = counting_seed();
        let mut rng1 = GameRng::from_seed(&seed);
        let mut rng2 = GameRng::from_seed(&seed);

        assert_eq!(rng1.next_range(7, 7), 7);
        rng2.next_u32();

        // Both consumed exactly one draw, so the streams stay aligned.
        for _ in 0..32 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_shuffle_determinism() {
        let seed = counting_seed();
        let mut rng1 = GameRng::from_seed(&seed);
        let mut rng2 = GameRng::from_seed(&seed);

        let mut arr1 = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let mut arr2 = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        rng1.shuffle(&mut arr1);
        rng2.shuffle(&mut arr2);
        assert_eq!(arr1, arr2);

        let mut sorted = arr1;
        sorted.sort_unstable();
        assert_eq!(sorted, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_seed_derivation() {
        let entropy = [7u8; 32];
        let player = [1u8; 16];

        let seed1 = Seed::derive(&entropy, &player, 0);
        let seed2 = Seed::derive(&entropy, &player, 0);
        assert_eq!(seed1, seed2);

        // Any input change produces a different seed.
        assert_ne!(seed1, Seed::derive(&entropy, &player, 1));
        assert_ne!(seed1, Seed::derive(&entropy, &[2u8; 16], 0));
        assert_ne!(seed1, Seed::derive(&[8u8; 32], &player, 0));
    }

    #[test]
    fn test_seed_hex_roundtrip() {
        let seed = counting_seed();
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(
            json,
            "\"000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f\""
        );

        let back: Seed = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seed);

        let short: Result<Seed, _> = serde_json::from_str("\"deadbeef\"");
        assert!(short.is_err());
    }

    #[test]
    fn test_session_id_prefix() {
        assert_eq!(counting_seed().session_id(), "0001020304050607");
    }

    #[test]
    fn test_rng_state_roundtrip() {
        let mut rng = GameRng::from_seed(&counting_seed());
        rng.next_u32();
        rng.next_u32();

        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: GameRng = serde_json::from_str(&json).unwrap();
        for _ in 0..16 {
            assert_eq!(rng.next_u32(), restored.next_u32());
        }
    }
}
