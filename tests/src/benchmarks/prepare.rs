//! Preparation throughput against committee size and argument count.

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use morph_notary::adapters::{SharedBlockCounter, StaticAlphabet};
use morph_notary::domain::multisig::alphabet_verification_script;
use morph_notary::domain::opcode::disassemble;
use morph_notary::test_utils::{committee, signature_invocation, RequestBuilder};
use morph_notary::{NotaryPreparator, NotaryPreparatorApi, NotaryRequest};
use std::sync::Arc;
use std::time::Duration;

fn preparator(n: usize) -> NotaryPreparator<StaticAlphabet, SharedBlockCounter> {
    NotaryPreparator::new(StaticAlphabet::new(committee(n)), SharedBlockCounter::new(10))
}

fn request(n: usize, args: usize) -> Arc<NotaryRequest> {
    let values: Vec<i64> = (0..args as i64).map(|i| i * 1_000).collect();
    Arc::new(
        RequestBuilder::new(committee(n))
            .with_invoker(true)
            .int_args(&values)
            .build(),
    )
}

/// Full validation of unsigned requests.
pub fn bench_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("notary-prepare");
    group.measurement_time(Duration::from_secs(5));

    for n in [4, 7, 21] {
        let p = preparator(n);
        let req = request(n, 4);
        group.bench_with_input(BenchmarkId::new("committee", n), &n, |b, _| {
            b.iter(|| black_box(p.prepare(Arc::clone(&req))).is_ok())
        });
    }

    for args in [0, 8, 64] {
        let p = preparator(7);
        let req = request(7, args);
        group.throughput(Throughput::Elements(args as u64));
        group.bench_with_input(BenchmarkId::new("arguments", args), &args, |b, _| {
            b.iter(|| black_box(p.prepare(Arc::clone(&req))).is_ok())
        });
    }

    group.finish();
}

/// Already co-signed requests must be dropped before any hashing.
pub fn bench_skip_handled(c: &mut Criterion) {
    let p = preparator(21);
    let mut signed = (*request(21, 4)).clone();
    signed.main_transaction.scripts[1].invocation_script = signature_invocation(0x77);
    let signed = Arc::new(signed);

    c.bench_function("notary-skip-handled", |b| {
        b.iter(|| black_box(p.prepare(Arc::clone(&signed))).is_err())
    });
}

/// Building blocks: committee script and disassembly.
pub fn bench_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("notary-primitives");

    let keys = committee(21);
    group.bench_function("alphabet_script_21", |b| {
        b.iter(|| black_box(alphabet_verification_script(&keys)))
    });

    let script = request(7, 64).main_transaction.script.clone();
    group.throughput(Throughput::Bytes(script.len() as u64));
    group.bench_function("disassemble_64_args", |b| {
        b.iter(|| black_box(disassemble(&script)))
    });

    group.finish();
}
