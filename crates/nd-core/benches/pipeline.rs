use chrono::{Duration, TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use nd_core::{ContentItem, DetectionMode, EngineConfig, NarrativeEngine, Normalizer, Taxonomy};

const TOPICS: &[&str] = &[
    "autonomous agents trade onchain with llm planners",
    "defi lending markets deepen liquidity for stablecoin yield",
    "validators upgrade client software for higher throughput",
    "mobile wallet payments reach merchants in new regions",
    "memecoin launches pump viral community tokens",
    "hackathon teams submit winning consumer projects",
];

fn corpus(n: usize) -> Vec<ContentItem> {
    let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let topic = TOPICS[i % TOPICS.len()];
            let ts = (now - Duration::hours((i % 160) as i64)).to_rfc3339();
            ContentItem::new(i.to_string(), format!("{topic} update {}", i % 7), ts, "twitter")
        })
        .collect()
}

fn engine(mode: DetectionMode) -> NarrativeEngine {
    let config = EngineConfig {
        detection_mode: mode,
        ..Default::default()
    };
    NarrativeEngine::new(config, Taxonomy::builtin()).unwrap()
}

fn bench_normalize(c: &mut Criterion) {
    let normalizer = Normalizer::default();
    let text = "Check https://t.co/x @team: Autonomous agents are winning #hackathons with DeFi yield strategies";
    c.bench_function("normalize_tweet", |b| {
        b.iter(|| normalizer.normalize(black_box(text)))
    });
}

fn bench_content_300(c: &mut Criterion) {
    let items = corpus(300);
    let engine = engine(DetectionMode::Content);
    let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
    c.bench_function("content_pipeline_300", |b| {
        b.iter(|| engine.analyze(black_box(&items), now))
    });
}

fn bench_signal_1000(c: &mut Criterion) {
    let items: Vec<ContentItem> = corpus(1000)
        .into_iter()
        .enumerate()
        .map(|(i, item)| item.with_strength((i % 10) as f64 / 10.0))
        .collect();
    let engine = engine(DetectionMode::Signal);
    let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
    c.bench_function("signal_pipeline_1000", |b| {
        b.iter(|| engine.analyze(black_box(&items), now))
    });
}

criterion_group!(benches, bench_normalize, bench_content_300, bench_signal_1000);
criterion_main!(benches);
