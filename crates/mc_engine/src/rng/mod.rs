//! # Random Number Generation Infrastructure
//!
//! Every worker of a run owns exactly one [`RandomStream`]; streams are never
//! shared between threads.
//!
//! ## Seeding
//!
//! Workers created in the same instant must not end up with correlated
//! streams, so seeds are never read off a clock. A [`SeedSequence`] mixes a
//! base seed with a slot counter through the SplitMix64 finaliser, which is a
//! bijection: distinct slots of one sequence always receive distinct seeds.
//!
//! - `SeedSequence::new(base)`: reproducible, slot `i` always gets the same seed
//! - `SeedSequence::from_entropy()`: base drawn from one process-wide OS entropy
//!   read, combined with a process-wide sequence counter
//!
//! ## Normal Deviates
//!
//! [`NormalMethod::InverseCdf`] (the default) maps an open-interval uniform
//! through the standard normal quantile. [`NormalMethod::Ziggurat`] uses
//! `rand_distr::StandardNormal` instead and is faster.
//!
//! ## Usage Example
//!
//! ```rust
//! use mc_engine::rng::{RandomStream, SeedSequence};
//!
//! let seeds = SeedSequence::new(12345);
//! let mut first = RandomStream::from_seed(seeds.seed_for(0));
//! let mut second = RandomStream::from_seed(seeds.seed_for(1));
//!
//! let u = first.uniform();
//! assert!((0.0..1.0).contains(&u));
//! let _z = second.standard_normal();
//! ```

mod seed;
mod stream;

pub use seed::{splitmix64, SeedSequence};
pub use stream::{NormalMethod, RandomStream};
