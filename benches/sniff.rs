use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use encsniff::{AbortSignal, Encoding, EncodingDetector, Translator, find_line_ending};

const WINDOW: usize = 256 * 1024;

fn samples() -> Vec<(&'static str, Vec<u8>)> {
    let ascii = b"The quick brown fox jumps over the lazy dog.\r\n"
        .repeat(WINDOW / 46 + 1);
    let utf8 = "Gr\u{fc}\u{df}e aus K\u{f6}ln, \u{4e16}\u{754c}!\n"
        .repeat(WINDOW / 32 + 1)
        .into_bytes();
    let mut utf16 = vec![0xFF, 0xFE];
    for unit in "Plain wide text with no terminator "
        .repeat(WINDOW / 70 + 1)
        .encode_utf16()
    {
        utf16.extend_from_slice(&unit.to_le_bytes());
    }
    let latin1 = b"caf\xE9 cr\xE8me br\xFBl\xE9e; ".repeat(WINDOW / 24 + 1);

    vec![
        ("ascii", ascii),
        ("utf8", utf8),
        ("utf16le", utf16),
        ("latin1", latin1),
    ]
}

fn bench_detect(c: &mut Criterion) {
    let detector = EncodingDetector::new();
    let abort = AbortSignal::new();
    let mut group = c.benchmark_group("detect");

    for (name, data) in samples() {
        let window = &data[..data.len().min(WINDOW)];
        group.throughput(Throughput::Bytes(window.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), window, |b, window| {
            b.iter(|| detector.sniff(black_box(window), &abort))
        });
    }

    group.finish();
}

fn bench_line_ending(c: &mut Criterion) {
    let abort = AbortSignal::new();
    let mut utf16 = vec![0xFE, 0xFF];
    for unit in "x".repeat(WINDOW / 2 - 1).encode_utf16() {
        utf16.extend_from_slice(&unit.to_be_bytes());
    }

    c.bench_function("line_ending/utf16be_no_terminator", |b| {
        b.iter(|| find_line_ending(black_box(&utf16), Encoding::Utf16Be, &abort))
    });
}

fn bench_translate(c: &mut Criterion) {
    let text = "Gr\u{fc}\u{df}e aus K\u{f6}ln, \u{4e16}\u{754c}!\n".repeat(4096);
    let mut group = c.benchmark_group("translate");
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("utf8_to_utf16le", |b| {
        b.iter(|| {
            Translator::new(Encoding::Utf8, Encoding::Utf16Le)
                .and_then(|mut t| t.convert_all(black_box(text.as_bytes())))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_detect, bench_line_ending, bench_translate);
criterion_main!(benches);
