use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nf_core::{NewtonParams, Size};
use nf_render::RenderServer;

criterion_main!(benches);
criterion_group!(benches, bench_multithread);

/// Render a few functions over the default window, across thread counts.
pub fn bench_multithread(c: &mut Criterion) {
    let mut group = c.benchmark_group("multithreading-base");

    let size = Size {
        width: 256,
        height: 256,
    };
    // Count pixels:
    group.throughput(criterion::Throughput::Elements(size.area() as u64));
    group.warm_up_time(Duration::from_secs(1));

    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    // Powers of two, up to the core count:
    let thread_range = (0..).map(|x| 1 << x).take_while({
        let x = num_cpus::get().next_power_of_two();
        move |y| (*y <= x)
    });
    for threads in thread_range {
        let exec = RenderServer::with_threads(threads).unwrap();

        for function in ["z**3 - 1", "z**8 + 15*z**4 - 16", "sin(z)"] {
            let params = NewtonParams {
                size,
                ..NewtonParams::new(function)
            };
            group.bench_with_input(BenchmarkId::new(function, threads), &params, |b, input| {
                b.to_async(&rt)
                    .iter_with_large_drop(|| exec.render(black_box(input.clone())))
            });
        }
    }

    group.finish();
}
