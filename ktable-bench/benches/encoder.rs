//! Encoder and prompt benchmarks.
//!
//! Targets:
//!   encode_chunk_single .............. < 20μs
//!   encode_chunks_page_of_50 ......... < 1ms
//!   encode_attributes_record ......... < 10μs
//!   render_answer_prompt_50_chunks ... < 200μs

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use chrono::{TimeZone, Utc};
use ktable_core::{Chunk, ChunkMetadata, Rule};
use ktable_encoder::{Attributes, encode, to_json_vec};
use ktable_llm::prompt::{self, PromptEngine, PromptId};
use serde::Serialize;
use serde_json::json;

fn make_chunk(i: u32) -> Chunk {
    let mut chunk = Chunk::text(
        format!("chunk-{i}"),
        format!("Paragraph {i}: revenue for the period rose while operating costs were flat."),
    )
    .with_metadata(ChunkMetadata {
        language: Some("en".into()),
        length: Some(78),
        size: Some(80),
        data_source_type: Some("pdf".into()),
        index: Some(u64::from(i)),
        page: Some(i / 10 + 1),
        start: Some(u64::from(i) * 80),
        end: Some(u64::from(i) * 80 + 78),
    })
    .with_embedding((0..384).map(|d| ((i + d) as f32 / 384.0).sin()).collect());
    chunk.created_at = Utc.timestamp_opt(1_700_000_000 + i64::from(i), 0).single();
    chunk.document_id = Some("doc-1".into());
    chunk.workspace_ids = vec!["ws-1".into()];
    chunk.tags.insert("ws-1".into(), vec!["finance".into()]);
    chunk.user_metadata.insert("ws-1".into(), json!({"reviewed": true}));
    chunk
}

#[derive(Debug, Serialize)]
struct CellRecord {
    column_id: String,
    row_id: String,
    answer: Vec<String>,
    verified: bool,
    confidence: f64,
}

fn bench_encode_chunk(c: &mut Criterion) {
    let chunk = make_chunk(7);
    c.bench_function("encode_chunk_single", |b| {
        b.iter(|| black_box(encode(black_box(&chunk))));
    });
}

fn bench_encode_page(c: &mut Criterion) {
    let chunks: Vec<Chunk> = (0..50).map(make_chunk).collect();
    c.bench_function("encode_chunks_page_of_50", |b| {
        b.iter(|| black_box(to_json_vec(black_box(&chunks))));
    });
}

fn bench_encode_attributes(c: &mut Criterion) {
    let record = CellRecord {
        column_id: "c1".into(),
        row_id: "r1".into(),
        answer: vec!["Deloitte".into(), "KPMG".into()],
        verified: true,
        confidence: 0.82,
    };
    c.bench_function("encode_attributes_record", |b| {
        b.iter(|| black_box(encode(&Attributes(black_box(&record)))));
    });
}

fn bench_render_prompt(c: &mut Criterion) {
    let engine = PromptEngine::builtin();
    let chunks: String = (0..50)
        .map(|i| format!("Paragraph {i}: revenue for the period rose while operating costs were flat.\n"))
        .collect();
    let rules = [Rule::must_return(["Deloitte", "KPMG", "EY", "PwC"]), Rule::max_length(2)];

    c.bench_function("render_answer_prompt_50_chunks", |b| {
        b.iter(|| {
            let query = black_box("Who audited the company?");
            let str_line = prompt::str_rule_line(rules.first(), query);
            let int_line = prompt::int_rule_line(rules.get(1));
            let instructions = engine
                .render(PromptId::StrArrayInstructions, &[
                    ("str_rule_line", str_line.as_str()),
                    ("int_rule_line", int_line.as_str()),
                ])
                .unwrap_or_default();
            let rendered = engine
                .render(PromptId::Base, &[
                    ("query", query),
                    ("chunks", chunks.as_str()),
                    ("format_specific_instructions", instructions.as_str()),
                ])
                .unwrap_or_default();
            black_box(rendered);
        });
    });
}

criterion_group!(
    benches,
    bench_encode_chunk,
    bench_encode_page,
    bench_encode_attributes,
    bench_render_prompt,
);
criterion_main!(benches);
