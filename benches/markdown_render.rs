use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nimchat::core::decoder::StreamDecoder;
use nimchat::ui::buffer::StyledBuffer;
use nimchat::ui::markdown::MarkdownRenderer;
use nimchat::ui::theme::Theme;

fn make_reply(paragraphs: usize) -> String {
    let prose = "The **quick** brown fox jumps over the lazy dog while **streaming** tokens arrive one by one.\n";
    let code = "```rust\nfn main() {\n    println!(\"hello\");\n}\n```\n";
    let mut reply = String::new();
    for i in 0..paragraphs {
        reply.push_str(prose);
        if i % 4 == 3 {
            reply.push_str(code);
        }
    }
    reply
}

/// Splits `reply` into small deltas the way a streamed answer arrives.
fn make_deltas(reply: &str, size: usize) -> Vec<String> {
    reply
        .chars()
        .collect::<Vec<_>>()
        .chunks(size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn render_stream(deltas: &[String]) -> StyledBuffer {
    let mut decoder = StreamDecoder::new();
    let mut renderer = MarkdownRenderer::new();
    let mut buffer = StyledBuffer::new();
    for delta in deltas {
        for line in decoder.push_content(delta) {
            let _ = renderer.render_line(&mut buffer, &line);
        }
    }
    buffer
}

fn bench_markdown_render(c: &mut Criterion) {
    let theme = Theme::dark_default();

    for &paragraphs in &[50usize, 400usize] {
        let reply = make_reply(paragraphs);
        let deltas = make_deltas(&reply, 6);

        let mut group = c.benchmark_group(format!("markdown_render_paragraphs{}", paragraphs));
        group.throughput(Throughput::Bytes(reply.len() as u64));

        group.bench_function(BenchmarkId::new("decode_and_render", deltas.len()), |b| {
            b.iter(|| render_stream(&deltas))
        });

        let rendered = render_stream(&deltas);
        group.bench_function(BenchmarkId::new("styled_lines", paragraphs), |b| {
            b.iter(|| {
                rendered
                    .styled_lines()
                    .iter()
                    .flatten()
                    .map(|segment| theme.segment_style(&segment.tags))
                    .count()
            })
        });

        group.finish();
    }
}

criterion_group!(benches, bench_markdown_render);
criterion_main!(benches);
