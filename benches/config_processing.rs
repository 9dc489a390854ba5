//! 配置处理基准测试
//!
//! 测试配置解析、验证和目标展开的性能

use criterion::{criterion_group, criterion_main, Criterion};
use http_checker::config::{validate_config, AlertLevel, CheckerConfig, OutputFormat};
use http_checker::health::expand_targets;
use std::hint::black_box;

const CONFIG_TOML: &str = r#"
method = "get"
schemas = ["http", "https"]
base_domains = ["www.example1.com", "www.example2.com", "www.example3.com"]
pages = ["/", "/index.html", "/p/p2", "/health"]
query = "source=monitor"
headers = ["Host: internal.example.com", "X-Env: prod"]
timeout_seconds = 2
expected_codes = [200, 301]
max_concurrency = 8
output_format = "nagios"
alert_level = "warning"
"#;

/// 配置处理基准测试
fn config_processing_benchmark(c: &mut Criterion) {
    c.bench_function("config_deserialization", |b| {
        b.iter(|| {
            let config: CheckerConfig = toml::from_str(black_box(CONFIG_TOML)).unwrap();
            black_box(config.normalized())
        });
    });

    c.bench_function("config_serialization", |b| {
        let config = create_test_config();

        b.iter(|| {
            let toml = toml::to_string(&config).unwrap();
            black_box(toml)
        });
    });

    c.bench_function("config_validation", |b| {
        let config = create_test_config();

        b.iter(|| {
            let result = validate_config(black_box(&config));
            black_box(result)
        });
    });

    c.bench_function("target_expansion", |b| {
        let config = create_test_config();

        b.iter(|| {
            let targets = expand_targets(black_box(&config)).unwrap();
            black_box(targets)
        });
    });
}

/// 创建测试配置
fn create_test_config() -> CheckerConfig {
    CheckerConfig {
        schemas: vec!["http".to_string(), "https".to_string()],
        base_domains: (1..=10).map(|i| format!("www.example{i}.com")).collect(),
        pages: (1..=10).map(|i| format!("/p/page{i}")).collect(),
        query: Some("source=monitor".to_string()),
        headers: vec!["Host: internal.example.com".to_string()],
        expected_codes: vec![200, 301],
        max_concurrency: 8,
        output_format: OutputFormat::Nagios,
        alert_level: AlertLevel::Warning,
        ..Default::default()
    }
}

criterion_group!(benches, config_processing_benchmark);
criterion_main!(benches);
