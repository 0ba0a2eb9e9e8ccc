//! # Morph Notary Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion entry points
//! ├── fixtures/         # Configuration files loaded by the flows
//! └── src/
//!     ├── benchmarks/   # Benchmark bodies
//!     └── integration/  # Whole-request flows through the public API
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p morph-notary-tests
//!
//! # Benchmarks
//! cargo bench -p morph-notary-tests
//! ```

pub mod benchmarks;
pub mod integration;
