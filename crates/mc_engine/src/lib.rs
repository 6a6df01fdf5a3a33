//! # mc_engine: Parallel Monte Carlo Execution Engine
//!
//! ## Engine Role
//!
//! mc_engine owns everything between "estimate this with N trials on P workers"
//! and the aggregated answer:
//! - Independent per-worker random streams with decorrelated seeds (`rng`)
//! - Domain sampling kernels for π, definite integrals and price paths (`kernels`)
//! - Trial partitioning, serial and parallel executors, cancellation (`executor`)
//!
//! ## Execution Protocol
//!
//! ```text
//! Executor::execute(kernel, N)
//! ├── partition(N, P)          -> per-worker trial counts
//! ├── SeedSequence             -> one RandomStream per worker slot
//! ├── dispatch                 -> P tasks on a dedicated pool
//! ├── collect                  -> exactly P messages over a bounded channel
//! └── reduce + finalize        -> ExecutionRecord { aggregate, elapsed }
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use mc_core::types::{TrialCount, WorkerCount};
//! use mc_engine::executor::{CancellationToken, Executor, ExecutorConfig, ParallelExecutor};
//! use mc_engine::kernels::PiKernel;
//!
//! let config = ExecutorConfig::builder().seed(42).build().unwrap();
//! let executor = ParallelExecutor::new(config, WorkerCount::new(4).unwrap()).unwrap();
//!
//! let record = executor
//!     .execute(&PiKernel::new(), TrialCount::new(400_000).unwrap(), &CancellationToken::new())
//!     .unwrap();
//!
//! assert!((record.aggregate().estimate - std::f64::consts::PI).abs() < 0.05);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod executor;
pub mod kernels;
pub mod rng;
