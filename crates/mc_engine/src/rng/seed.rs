//! Seed derivation for concurrently created streams.

use super::stream::{NormalMethod, RandomStream};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Weyl sequence increment used by SplitMix64 (odd, so slot offsets never collide).
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// One OS entropy read per process.
static PROCESS_ENTROPY: OnceLock<u64> = OnceLock::new();

/// Number of entropy-based sequences handed out so far.
static SEQUENCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// SplitMix64 output function.
///
/// A bijection on `u64`: distinct inputs give distinct outputs.
///
/// # Examples
///
/// ```rust
/// use mc_engine::rng::splitmix64;
///
/// assert_ne!(splitmix64(0), splitmix64(1));
/// assert_eq!(splitmix64(42), splitmix64(42));
/// ```
#[inline]
pub fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn process_entropy() -> u64 {
    *PROCESS_ENTROPY.get_or_init(|| {
        let mut bytes = [0u8; 8];
        match OsRng.try_fill_bytes(&mut bytes) {
            Ok(()) => u64::from_le_bytes(bytes),
            Err(err) => {
                tracing::warn!(error = %err, "OS entropy unavailable, seeding from clock and pid");
                let nanos = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or_default();
                splitmix64(nanos ^ u64::from(std::process::id()).rotate_left(32))
            }
        }
    })
}

/// Derives decorrelated per-worker seeds from one base seed.
///
/// # Examples
///
/// ```rust
/// use mc_engine::rng::SeedSequence;
///
/// let a = SeedSequence::new(99);
/// let b = SeedSequence::new(99);
/// assert_eq!(a.seed_for(3), b.seed_for(3));
/// assert_ne!(a.seed_for(0), a.seed_for(1));
///
/// // Consecutive draws walk through the slots in order.
/// assert_eq!(a.next_seed(), a.seed_for(0));
/// assert_eq!(a.next_seed(), a.seed_for(1));
/// ```
#[derive(Debug)]
pub struct SeedSequence {
    base: u64,
    next: AtomicU64,
}

impl SeedSequence {
    /// Creates a reproducible sequence from `base`.
    pub fn new(base: u64) -> Self {
        Self {
            base,
            next: AtomicU64::new(0),
        }
    }

    /// Creates a sequence whose base mixes the process entropy with a
    /// process-wide counter, so two sequences created in the same instant
    /// still differ.
    pub fn from_entropy() -> Self {
        let ordinal = SEQUENCE_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::new(splitmix64(process_entropy() ^ splitmix64(ordinal)))
    }

    /// Creates a reproducible sequence when `seed` is given, an entropy-based
    /// one otherwise.
    pub fn from_optional(seed: Option<u64>) -> Self {
        match seed {
            Some(base) => Self::new(base),
            None => Self::from_entropy(),
        }
    }

    /// Returns the base seed.
    #[inline]
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Returns the seed for worker slot `slot`.
    #[inline]
    pub fn seed_for(&self, slot: u64) -> u64 {
        splitmix64(self.base.wrapping_add(slot.wrapping_mul(GOLDEN_GAMMA)))
    }

    /// Returns the seed for the next unused slot.
    #[inline]
    pub fn next_seed(&self) -> u64 {
        let slot = self.next.fetch_add(1, Ordering::Relaxed);
        self.seed_for(slot)
    }

    /// Creates the stream for worker slot `slot`.
    pub fn stream_for(&self, slot: u64, normal_method: NormalMethod) -> RandomStream {
        RandomStream::from_seed(self.seed_for(slot)).with_normal_method(normal_method)
    }
}
