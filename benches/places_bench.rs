use criterion::{black_box, criterion_group, criterion_main, Criterion};
use places_finder::places::resolver::normalize_extraction;
use places_finder::places::search::parse_search_response;
use places_finder::places::summarizer::{canonical_text, summary_prompt};

fn sample_body(n: usize) -> String {
    let places: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"displayName":{{"text":"Cafe {i}","languageCode":"en"}},"formattedAddress":"{i} Model Town, Jalandhar, Punjab"}}"#
            )
        })
        .collect();
    format!(r#"{{"places":[{}]}}"#, places.join(","))
}

fn criterion_benchmark(c: &mut Criterion) {
    let body = sample_body(20);
    c.bench_function("parse 20 places", |b| b.iter(|| parse_search_response(black_box(&body), 20)));

    let raw = parse_search_response(&body, 5);
    c.bench_function("summary prompt for 5 places", |b| {
        b.iter(|| summary_prompt(&canonical_text(black_box(&raw))))
    });

    c.bench_function("normalize extraction", |b| b.iter(|| normalize_extraction(black_box(" \"New Delhi.\" "))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
