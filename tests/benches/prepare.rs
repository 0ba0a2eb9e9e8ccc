//! # Notary Preparator Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | prepare, 21 keys | < 100µs |
//! | skip already handled | < 1µs |

use criterion::{criterion_group, criterion_main};
use morph_notary_tests::benchmarks::prepare::{bench_prepare, bench_primitives, bench_skip_handled};

criterion_group!(benches, bench_prepare, bench_skip_handled, bench_primitives);
criterion_main!(benches);
