//! Benchmarks for listener dispatch and collection churn.
//!
//! Run with: cargo bench -p fxe-observe --bench dispatch_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fxe_observe::{Property, PropertyListener, Sequence, SequenceListener, Vector};
use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

#[derive(Default)]
struct Count(Cell<u64>);

impl PropertyListener<u64> for Count {
    fn on_set(&self, _property: &Property<u64>, value: &u64) {
        self.0.set(self.0.get().wrapping_add(*value));
    }
}

impl SequenceListener<u64> for Count {
    fn on_insert(&self, _sequence: &Sequence<u64>, pos: usize) {
        self.0.set(self.0.get() + pos as u64);
    }
}

fn bench_property_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("property/set");

    for listeners in [0usize, 1, 8, 64] {
        group.throughput(Throughput::Elements(listeners.max(1) as u64));
        let property = Property::new(0u64);
        let counters: Vec<Rc<Count>> = (0..listeners).map(|_| Rc::new(Count::default())).collect();
        for counter in &counters {
            property.add_listener(counter.clone());
        }
        group.bench_with_input(
            BenchmarkId::new("listeners", listeners),
            &listeners,
            |b, _| {
                let mut next = 0u64;
                b.iter(|| {
                    next += 1;
                    black_box(property.set(next))
                })
            },
        );
    }

    group.finish();
}

fn bench_sequence_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence/reconcile");

    for len in [16usize, 128] {
        group.throughput(Throughput::Elements(len as u64));
        let items: Vec<Rc<u64>> = (0..len as u64).map(Rc::new).collect();
        let reversed: Vec<Rc<u64>> = items.iter().rev().cloned().collect();
        let sequence = Sequence::new();
        sequence.add_listener(Rc::new(Count::default()));
        group.bench_with_input(BenchmarkId::new("reverse", len), &len, |b, _| {
            b.iter(|| {
                sequence.reconcile(&reversed);
                sequence.reconcile(&items);
                black_box(sequence.len())
            })
        });
    }

    group.finish();
}

fn bench_vector_push_front(c: &mut Criterion) {
    c.bench_function("vector/push_front_1k", |b| {
        b.iter(|| {
            let keys: Vector<Property<f32>> = Vector::new();
            for i in 0..1_000 {
                keys.push_front(Property::new(i as f32));
            }
            black_box(keys.len())
        })
    });
}

criterion_group!(
    benches,
    bench_property_set,
    bench_sequence_reconcile,
    bench_vector_push_front
);
criterion_main!(benches);
