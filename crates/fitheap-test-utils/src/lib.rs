//! Test utilities for fitheap development.
//!
//! - [`workload`]: seeded, reproducible operation sequences.
//! - [`replay`]: drives a [`Heap`](fitheap::Heap) through a workload while
//!   checking its invariants against a shadow model.
//! - [`init_tracing`]: opt-in log output for tests via `RUST_LOG`.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod replay;
pub mod workload;

pub use replay::{LiveAlloc, Replay, ReplayError, ReplayReport};
pub use workload::{Op, WorkloadConfig};

use tracing_subscriber::EnvFilter;

/// Install a test-friendly `tracing` subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
