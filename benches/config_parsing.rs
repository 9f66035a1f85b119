//! Benchmark for config parsing performance.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::Path;

fn bench_config_load_from_file(c: &mut Criterion) {
    let config_path = Path::new("scribelink.example.toml");

    c.bench_function("config_parse_from_file", |b| {
        b.iter(|| {
            let config = scribelink::config::ConnectorConfig::load(Some(black_box(config_path)));
            black_box(config)
        });
    });
}

fn bench_config_load_defaults(c: &mut Criterion) {
    c.bench_function("config_parse_defaults_only", |b| {
        b.iter(|| {
            let config = scribelink::config::ConnectorConfig::load(None);
            black_box(config)
        });
    });
}

fn bench_config_toml_parsing(c: &mut Criterion) {
    let toml_content = r#"
[discovery]
max_concurrent = 5
quick_timeout_ms = 3000
probe_timeout_ms = 3000
ports = [11434, 1234, 8080]

[health_check]
enabled = true
interval_seconds = 30
timeout_seconds = 5
failure_threshold = 3

[retry]
max_attempts = 3
base_delay_ms = 1000
max_delay_ms = 8000
backoff_multiplier = 2.0
jitter_max_ms = 250

[generation]
fallback_model = "llama3.2"
timeout_seconds = 30
"#;

    c.bench_function("config_parse_toml_string", |b| {
        b.iter(|| {
            let config: scribelink::config::ConnectorConfig =
                toml::from_str(black_box(toml_content)).unwrap();
            black_box(config)
        });
    });
}

criterion_group!(
    benches,
    bench_config_load_from_file,
    bench_config_load_defaults,
    bench_config_toml_parsing
);
criterion_main!(benches);
