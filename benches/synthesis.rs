//! Benchmarks for root procedure synthesis.
//!
//! Measures end-to-end synthesis over generated applications:
//! - Single runs for growing numbers of activities, fragments and services
//! - Runs with validation enabled
//! - Batch synthesis of independent applications

extern crate rootsynth;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rootsynth::{
    model::{
        constants::*, CallbackRegistry, ClassTable, Component, ComponentKind, ComponentRegistry, FragmentMap,
        MethodRef,
    },
    synth::{synthesize_batch, DriverCoordinator, SynthesisConfig, SynthesisInput},
};
use std::hint::black_box;

const CALLBACKS: [&str; 4] = [
    "void onClick(android.view.View)",
    "boolean onLongClick(android.view.View)",
    "void onFocusChange(android.view.View,boolean)",
    "void onItemSelected(android.widget.AdapterView,android.view.View,int,long)",
];

/// Builds an application with `n` activities, `n` services, one fragment per activity
/// and an application singleton with an activity-lifecycle listener.
fn generate(n: usize) -> (ClassTable, SynthesisInput) {
    let mut builder = ClassTable::builder()
        .framework()
        .class("bench.App", |c| {
            c.extends(APPLICATION_CLASS)
                .constructor(&[])
                .method(APPLICATION_ONCREATE)
                .method("void onLowMemory()")
        })
        .class("bench.Tracker", |c| {
            c.implements(ACTIVITY_LIFECYCLE_CALLBACKS_INTERFACE)
                .constructor(&[])
                .method(ACTIVITYLIFECYCLECALLBACK_ONACTIVITYRESUMED)
        });

    let mut components = ComponentRegistry::new().with("bench.App", ComponentKind::Application);
    let mut callbacks = CallbackRegistry::new()
        .with("bench.App", MethodRef::new("bench.App", "void onLowMemory()").unwrap())
        .with(
            "bench.App",
            MethodRef::new("bench.Tracker", ACTIVITYLIFECYCLECALLBACK_ONACTIVITYRESUMED).unwrap(),
        );
    let mut fragments = FragmentMap::new();

    for i in 0..n {
        let activity = format!("bench.Activity{i}");
        let fragment = format!("bench.Fragment{i}");
        let service = format!("bench.Service{i}");

        builder = builder
            .class(activity.as_str(), |c| {
                CALLBACKS
                    .iter()
                    .fold(c.extends(ACTIVITY_CLASS).constructor(&[]), |c, m| c.method(m))
                    .method(ACTIVITY_ONCREATE)
                    .method(ACTIVITY_ONRESUME)
            })
            .class(fragment.as_str(), |c| {
                c.extends(FRAGMENT_CLASS).constructor(&[]).method(FRAGMENT_ONCREATEVIEW)
            })
            .class(service.as_str(), |c| {
                c.extends(SERVICE_CLASS)
                    .constructor(&[])
                    .method(SERVICE_ONCREATE)
                    .method(SERVICE_ONBIND)
            });

        components.add(Component::new(activity.as_str(), ComponentKind::Activity));
        components.add(Component::new(service.as_str(), ComponentKind::Service));
        for callback in CALLBACKS {
            callbacks.add(activity.as_str(), MethodRef::new(activity.as_str(), callback).unwrap());
        }
        fragments.add(activity.as_str(), fragment.as_str());
    }

    let table = builder.build().unwrap();
    let input = SynthesisInput::new(components, callbacks).with_fragments(fragments);
    (table, input)
}

/// Benchmark a single synthesis run for growing application sizes.
fn bench_synthesize(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesize");
    for n in [1usize, 10, 100] {
        let (table, input) = generate(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| {
                let mut coordinator = DriverCoordinator::new(&table);
                let main = coordinator.synthesize(black_box(input)).unwrap();
                black_box(main.len())
            });
        });
    }
    group.finish();
}

/// Benchmark synthesis with validation enabled.
fn bench_synthesize_validated(c: &mut Criterion) {
    let (table, input) = generate(50);
    let config = SynthesisConfig::default().with_validation(true);

    c.bench_function("synthesize_validated_50", |b| {
        b.iter(|| {
            let mut coordinator = DriverCoordinator::with_config(&table, config.clone());
            let main = coordinator.synthesize(black_box(&input)).unwrap();
            black_box(main.len())
        });
    });
}

/// Benchmark batch synthesis of independent applications.
fn bench_batch(c: &mut Criterion) {
    let (table, input) = generate(20);
    let inputs = vec![input; 16];
    let config = SynthesisConfig::default();

    c.bench_function("synthesize_batch_16x20", |b| {
        b.iter(|| {
            let outputs = synthesize_batch(&table, &config, black_box(&inputs));
            black_box(outputs.len())
        });
    });
}

criterion_group!(
    benches,
    bench_synthesize,
    bench_synthesize_validated,
    bench_batch
);
criterion_main!(benches);
