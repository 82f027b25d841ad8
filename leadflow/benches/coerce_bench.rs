//! Benchmarks for response coercion and template rendering.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use leadflow::core::Lead;
use leadflow::llm::coerce_to_mapping;
use leadflow::templates::{fallback_template, TemplateVars};

const PLAIN: &str = r#"{"priority": "High", "score": 8, "reasoning": "CTO at a growing SaaS company"}"#;
const FENCED: &str = "Here you go:\n```json\n{\"priority\": \"High\", \"score\": 8, \"reasoning\": \"CTO at a growing SaaS company\"}\n```\nLet me know!";

fn coerce_benchmark(c: &mut Criterion) {
    c.bench_function("coerce_plain", |b| {
        b.iter(|| coerce_to_mapping(black_box(PLAIN)))
    });

    c.bench_function("coerce_fenced", |b| {
        b.iter(|| coerce_to_mapping(black_box(FENCED)))
    });
}

fn template_benchmark(c: &mut Criterion) {
    let template = fallback_template();
    let lead = Lead::new("Jane Doe", "jane@acme.com", "Acme", "CTO", "SaaS", "50-200");
    let extra = TemplateVars::new();

    c.bench_function("render_fallback", |b| {
        b.iter(|| template.render_for_lead(black_box(&lead), &extra))
    });
}

criterion_group!(benches, coerce_benchmark, template_benchmark);
criterion_main!(benches);
