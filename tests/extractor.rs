// Streaming extractor guard rails: plain text passes through untouched, block
// syntax never leaks into display text, and chunked pushes match full rescans.
#[path = "support/common.rs"]
mod common;

use blockfence::{
    BlockExtractor, Extraction, MalformedReason, extract, extract_with_sink, placeholder,
};
use serde_json::json;

use common::{block_text, fenced};

fn mixed_transcript() -> String {
    format!(
        "Intro with `inline` code and ``double`` ticks.\n{}\nBetween blocks.\n```rust\nlet x = 1;\n```\n{}\n{}Tail.",
        block_text("SimpleCard", json!({"title": "Hello"})),
        fenced("{\"id\": \"Broken\""),
        block_text("MetricTile", json!({"label": "Users", "value": 12})),
    )
}

fn push_in_chunks(text: &str, size: usize) -> Extraction {
    let chars: Vec<char> = text.chars().collect();
    let mut extractor = BlockExtractor::with_sink(Vec::new());
    for chunk in chars.chunks(size) {
        extractor.push(&chunk.iter().collect::<String>());
    }
    extractor.snapshot()
}

#[test]
fn text_without_blocks_passes_through() {
    let samples = [
        "",
        "plain words",
        "a ` b `` c",
        "```python\nprint('hi')\n```",
        "````\nquad fence\n````",
        "```ui\nshort tag\n```",
        "```ui-componentry\nlonger tag\n```",
        "emoji 🎉 and ``` fences",
    ];
    for sample in samples {
        let out = extract(sample);
        if out.is_pending {
            // A trailing fence run is withheld until the next character.
            assert!(sample.ends_with('`'), "{sample:?} should not be pending");
            continue;
        }
        assert_eq!(out.display_text, sample);
        assert!(out.completed_blocks.is_empty(), "{sample:?}");
    }
}

#[test]
fn prefix_inside_body_is_pending() {
    let intro = "Before ";
    let block = block_text("SimpleCard", json!({"title": "Hello"}));
    let text = format!("{intro}{block} after");
    let body_start = intro.len() + "```ui-component\n".len();
    let body_end = intro.len() + block.len() - "```".len();

    for cut in body_start..body_end {
        if !text.is_char_boundary(cut) {
            continue;
        }
        let out = extract(&text[..cut]);
        assert!(out.is_pending, "prefix ending at {cut} should be pending");
        assert!(out.completed_blocks.is_empty());
        assert_eq!(out.display_text, intro);
    }

    let done = extract(&text);
    assert!(!done.is_pending);
    assert_eq!(done.completed_blocks.len(), 1);
}

#[test]
fn opening_sequence_is_never_displayed() {
    let text = block_text("SimpleCard", json!({"title": "Hello"}));
    for cut in 0..=text.len() {
        let out = extract(&text[..cut]);
        assert!(
            !out.display_text.contains('`') && !out.display_text.contains("ui-"),
            "prefix {cut} leaked {:?}",
            out.display_text
        );
    }
}

#[test]
fn extraction_is_idempotent() {
    let text = mixed_transcript();
    let first = extract(&text);
    let second = extract(&text);
    assert_eq!(first, second);
    let ids: Vec<_> = first
        .completed_blocks
        .iter()
        .map(|b| b.component_id.as_str())
        .collect();
    assert_eq!(ids, ["SimpleCard", "MetricTile"]);
}

#[test]
fn chunked_pushes_match_full_rescan() {
    let text = mixed_transcript();
    let expected = extract_with_sink(&text, Vec::new());
    for size in 1..=text.chars().count() {
        assert_eq!(push_in_chunks(&text, size), expected, "chunk size {size}");
    }
}

#[test]
fn every_prefix_matches_incremental_state() {
    let text = mixed_transcript();
    let mut extractor = BlockExtractor::with_sink(Vec::new());
    let mut consumed = String::new();
    let final_blocks = extract(&text).completed_blocks;

    for ch in text.chars() {
        let mut buf = [0u8; 4];
        extractor.push(ch.encode_utf8(&mut buf));
        consumed.push(ch);
        let rescan = extract_with_sink(&consumed, Vec::new());
        assert_eq!(extractor.snapshot(), rescan);
        // Completed blocks are stable: each prefix reports a prefix of the
        // final block list.
        assert_eq!(
            rescan.completed_blocks[..],
            final_blocks[..rescan.completed_blocks.len()]
        );
    }
}

#[test]
fn malformed_body_never_reaches_display() {
    let body = "{\"component\": \"SimpleCard\", \"props\": {\"secret\": 42}}";
    let text = format!("start {} end", fenced(body));
    let mut extractor = BlockExtractor::with_sink(Vec::new());
    extractor.push(&text);

    assert!(extractor.completed_blocks().is_empty());
    assert_eq!(extractor.display_text(), "start  end");
    assert!(!extractor.display_text().contains("secret"));
    assert_eq!(extractor.sink().len(), 1);
    assert_eq!(extractor.sink()[0].reason, MalformedReason::MissingId);
}

#[test]
fn hello_world_scenario() {
    let text = "Hello ```ui-component\n{\"id\":\"X\",\"payload\":{\"a\":1}}\n``` world";
    let out = extract(text);
    assert_eq!(out.display_text, format!("Hello {} world", placeholder(0)));
    assert_eq!(out.completed_blocks.len(), 1);
    let block = &out.completed_blocks[0];
    assert_eq!(block.component_id, "X");
    assert_eq!(block.payload["a"], 1);
    assert_eq!(block.source_span, 0);
    assert!(!out.is_pending);
}

#[test]
fn blocks_report_in_closing_order_without_nesting() {
    let text = format!(
        "{} mid {}",
        block_text("A", json!({"n": 1})),
        block_text("B", json!({"n": 2}))
    );
    let out = extract(&text);
    let spans: Vec<_> = out
        .completed_blocks
        .iter()
        .map(|b| (b.component_id.as_str(), b.source_span))
        .collect();
    assert_eq!(spans, [("A", 0), ("B", 1)]);
    assert_eq!(
        out.display_text,
        format!("{} mid {}", placeholder(0), placeholder(1))
    );
}

#[test]
fn fence_inside_json_string_is_body_content() {
    let text = block_text("Code", json!({"snippet": "use `x` or ``y``"}));
    let out = extract(&text);
    assert_eq!(out.completed_blocks.len(), 1);
    assert_eq!(out.completed_blocks[0].payload["snippet"], "use `x` or ``y``");
}

#[test]
fn finish_flushes_trailing_fence_as_text() {
    let mut extractor = BlockExtractor::new();
    extractor.push("closing ```");
    assert!(extractor.is_pending());
    extractor.finish();
    assert!(!extractor.is_pending());
    assert_eq!(extractor.display_text(), "closing ```");
}
