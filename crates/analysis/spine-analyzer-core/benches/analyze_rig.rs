//! Full-asset analysis throughput.
//!
//! ```bash
//! cargo bench -p spine-analyzer-core --bench analyze_rig
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spine_analyzer_core::{Analyzer, AnalyzerConfig, RigDefinition, RigModel};

fn hero() -> RigModel {
    let def: RigDefinition = spine_test_fixtures::rigs::load("hero").expect("hero fixture");
    RigModel::new(def)
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_hero");
    for rate in [15.0f32, 30.0, 60.0] {
        let analyzer = Analyzer::new(AnalyzerConfig {
            sample_rate_hz: rate,
            ..AnalyzerConfig::default()
        })
        .expect("valid config");
        let mut model = hero();
        group.bench_with_input(BenchmarkId::from_parameter(rate), &rate, |b, _| {
            b.iter(|| black_box(analyzer.analyze(&mut model, "hero").expect("analysis")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_analyze);
criterion_main!(benches);
