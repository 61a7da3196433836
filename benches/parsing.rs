//! Benchmarks for chatclone parsing and segmentation.
//!
//! Run with: `cargo bench`
//! Run specific group: `cargo bench --bench parsing -- segment`

use std::io::{Cursor, Write};

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use chatclone::parser::ChatExportParser;
use chatclone::payload::{RawTextFormat, TrainingPayload};
use chatclone::roles::RoleMapping;
use chatclone::segment::ConversationSegmenter;

// =============================================================================
// Test Data Generators
// =============================================================================

/// Two-party transcript with a long silence every 50 messages.
fn generate_transcript(count: usize) -> String {
    let mut lines = Vec::with_capacity(count);
    let mut minute = 0usize;
    for i in 0..count {
        let sender = if i % 2 == 0 { "Alice" } else { "Bob" };
        minute += if i % 50 == 0 { 180 } else { 1 };
        let day = 1 + (minute / 1440) % 28;
        let hour = (minute / 60) % 24;
        lines.push(format!(
            "[1/{}/25, {:02}:{:02}:00] {}: Message number {} with a few more words",
            day,
            hour,
            minute % 60,
            sender,
            i
        ));
        if i % 100 == 7 {
            lines.push(format!("[1/{}/25, {:02}:00:00] {}: \u{200E}image omitted", day, hour, sender));
        }
    }
    lines.join("\n")
}

fn generate_archive(count: usize) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("bench_chat.txt", SimpleFileOptions::default())
        .unwrap();
    writer
        .write_all(generate_transcript(count).as_bytes())
        .unwrap();
    writer.finish().unwrap().into_inner()
}

const SIZES: [usize; 4] = [100, 1_000, 10_000, 50_000];

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_parse_transcript(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_transcript");
    let parser = ChatExportParser::new();

    for size in SIZES {
        let text = generate_transcript(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| {
                let export = parser.parse_transcript(black_box(text)).unwrap();
                black_box(export)
            });
        });
    }
    group.finish();
}

fn bench_parse_archive(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_archive");
    let parser = ChatExportParser::new();

    for size in [1_000_usize, 10_000] {
        let archive = generate_archive(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &archive, |b, archive| {
            b.iter(|| {
                let export = parser.parse(black_box(archive)).unwrap();
                black_box(export)
            });
        });
    }
    group.finish();
}

fn bench_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");
    let parser = ChatExportParser::new();
    let segmenter = ConversationSegmenter::new();

    for size in SIZES {
        let export = parser.parse_transcript(&generate_transcript(size)).unwrap();
        let roles = RoleMapping::for_target("Bob", &export.speakers).unwrap();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &export.messages,
            |b, messages| {
                b.iter(|| black_box(segmenter.segment(black_box(messages), &roles)));
            },
        );
    }
    group.finish();
}

fn bench_payload(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload");
    let export = ChatExportParser::new()
        .parse_transcript(&generate_transcript(10_000))
        .unwrap();
    let seg = ConversationSegmenter::new()
        .segment_for_target(&export.messages, "Bob", &export.speakers)
        .unwrap();

    for format in [
        RawTextFormat::Plain,
        RawTextFormat::JsonLines,
        RawTextFormat::JsonBlocks,
    ] {
        group.bench_function(format.to_string(), |b| {
            b.iter(|| {
                let payload = TrainingPayload::from_segmentation("bench", &seg, format).unwrap();
                black_box(payload.to_json().unwrap())
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_transcript,
    bench_parse_archive,
    bench_segment,
    bench_payload
);
criterion_main!(benches);
