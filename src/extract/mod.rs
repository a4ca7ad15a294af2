//! Streaming extraction of fenced UI blocks.
//!
//! Model output arrives a few characters at a time. `BlockExtractor` walks it
//! one character at a time and sorts every character into display text, a
//! tentative fence/tag prefix, a block body, or a tentative closing fence.
//! Tentative text is withheld until it is either confirmed (and never shown)
//! or proven to be ordinary text (and released verbatim).
//!
//! ```text
//! None ─`─▶ SawOpen(1) ─`─▶ SawOpen(2) ─`─▶ SawOpen(3) ─u─▶ SawTag(1) … SawTag(n-1)
//!                                           ▲   │ `                        │ t
//!                                           └───┘                          ▼
//!   None ◀─``` ─ SawClose(1..2) ◀─`── InBody ◀── whitespace ── ConfirmedOpen
//! ```
//!
//! Any mismatch while opening releases the withheld text and returns to
//! `None`; a mismatch while closing puts the fence characters back into the
//! body. Only one block context exists at a time, so blocks never nest.
//!
//! Two driving styles give identical output: re-run `extract` over the whole
//! text seen so far on every update (simple, quadratic over a long stream), or
//! keep one `BlockExtractor` and `push` each new chunk (linear).

pub mod body;
pub mod placeholder;

pub use body::{LogSink, MalformedBlock, MalformedBlockSink, MalformedReason};
pub use placeholder::{Segment, placeholder, split_display};

use body::parse_block_body;
use serde::Serialize;
use serde_json::{Map, Value};

/// Fence character; three in a row open or close a block.
pub const FENCE: char = '`';
/// Number of fence characters in an opening or closing fence.
pub const FENCE_LEN: u8 = 3;
/// Tag that must follow the opening fence.
pub const BLOCK_TAG: &str = "ui-component";

const TAG: &[u8] = BLOCK_TAG.as_bytes();

/// Recognition stage of the extractor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    None,
    /// Fence characters seen so far (1..=3). Extra fence characters keep
    /// the stage at 3.
    SawOpen(u8),
    /// Tag characters matched so far.
    SawTag(usize),
    /// Tag matched; waiting for the whitespace that ends the opening line.
    ConfirmedOpen,
    InBody,
    /// Closing fence characters seen so far (1..=2).
    SawClose(u8),
}

/// A block as extracted, before validation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RawBlock {
    pub component_id: String,
    pub payload: Map<String, Value>,
    /// Position among the blocks emitted so far; matches the placeholder.
    pub source_span: usize,
}

/// Result of one extraction pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Extraction {
    /// Text safe to show now, with a placeholder per completed block.
    pub display_text: String,
    pub completed_blocks: Vec<RawBlock>,
    /// True while a block might still be arriving.
    pub is_pending: bool,
}

/// Incremental extractor state. Feed chunks with `push`; read results with
/// `snapshot` or the accessors.
#[derive(Debug, Default)]
pub struct BlockExtractor<S: MalformedBlockSink = LogSink> {
    stage: Stage,
    tentative: String,
    body: String,
    display: String,
    blocks: Vec<RawBlock>,
    sink: S,
}

impl BlockExtractor<LogSink> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: MalformedBlockSink> BlockExtractor<S> {
    /// Extractor that reports dropped blocks to `sink`.
    pub fn with_sink(sink: S) -> Self {
        Self {
            stage: Stage::None,
            tentative: String::new(),
            body: String::new(),
            display: String::new(),
            blocks: Vec::new(),
            sink,
        }
    }

    /// Consume the next chunk of model output.
    pub fn push(&mut self, chunk: &str) {
        for ch in chunk.chars() {
            self.step(ch);
        }
    }

    /// End of stream. Withheld opening text that never reached a body is
    /// released as display text; an unclosed body is dropped through the sink.
    pub fn finish(&mut self) {
        match self.stage {
            Stage::None => {}
            Stage::SawOpen(_) | Stage::SawTag(_) | Stage::ConfirmedOpen => {
                let tentative = std::mem::take(&mut self.tentative);
                self.display.push_str(&tentative);
            }
            Stage::InBody | Stage::SawClose(_) => {
                let mut body = std::mem::take(&mut self.body);
                if matches!(self.stage, Stage::SawClose(_)) {
                    body.push_str(&self.tentative);
                }
                self.tentative.clear();
                self.sink.malformed(MalformedBlock {
                    reason: MalformedReason::Unterminated,
                    body: body.trim().to_string(),
                });
            }
        }
        self.stage = Stage::None;
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn display_text(&self) -> &str {
        &self.display
    }

    pub fn completed_blocks(&self) -> &[RawBlock] {
        &self.blocks
    }

    pub fn is_pending(&self) -> bool {
        self.stage != Stage::None
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn snapshot(&self) -> Extraction {
        Extraction {
            display_text: self.display.clone(),
            completed_blocks: self.blocks.clone(),
            is_pending: self.is_pending(),
        }
    }

    pub fn into_extraction(self) -> Extraction {
        let is_pending = self.is_pending();
        Extraction {
            display_text: self.display,
            completed_blocks: self.blocks,
            is_pending,
        }
    }

    fn step(&mut self, ch: char) {
        match self.stage {
            Stage::None => {
                if ch == FENCE {
                    self.tentative.push(ch);
                    self.stage = Stage::SawOpen(1);
                } else {
                    self.display.push(ch);
                }
            }
            Stage::SawOpen(seen) if seen < FENCE_LEN => {
                if ch == FENCE {
                    self.tentative.push(ch);
                    self.stage = Stage::SawOpen(seen + 1);
                } else {
                    self.release(ch);
                }
            }
            Stage::SawOpen(_) => {
                if ch == FENCE {
                    self.tentative.push(ch);
                } else {
                    self.advance_tag(0, ch);
                }
            }
            Stage::SawTag(matched) => self.advance_tag(matched, ch),
            Stage::ConfirmedOpen => {
                if ch.is_whitespace() {
                    self.tentative.clear();
                    self.body.clear();
                    self.stage = Stage::InBody;
                } else {
                    self.release(ch);
                }
            }
            Stage::InBody => {
                if ch == FENCE {
                    self.tentative.push(ch);
                    self.stage = Stage::SawClose(1);
                } else {
                    self.body.push(ch);
                }
            }
            Stage::SawClose(seen) => {
                if ch != FENCE {
                    self.body.push_str(&self.tentative);
                    self.body.push(ch);
                    self.tentative.clear();
                    self.stage = Stage::InBody;
                } else if seen + 1 == FENCE_LEN {
                    self.tentative.clear();
                    self.complete_block();
                    self.stage = Stage::None;
                } else {
                    self.tentative.push(ch);
                    self.stage = Stage::SawClose(seen + 1);
                }
            }
        }
    }

    fn advance_tag(&mut self, matched: usize, ch: char) {
        if TAG.get(matched).is_some_and(|expected| char::from(*expected) == ch) {
            self.tentative.push(ch);
            self.stage = if matched + 1 == TAG.len() {
                Stage::ConfirmedOpen
            } else {
                Stage::SawTag(matched + 1)
            };
        } else {
            self.release(ch);
        }
    }

    /// Withheld text turned out to be ordinary text.
    fn release(&mut self, ch: char) {
        self.display.push_str(&self.tentative);
        self.display.push(ch);
        self.tentative.clear();
        self.stage = Stage::None;
    }

    fn complete_block(&mut self) {
        let body = std::mem::take(&mut self.body);
        let trimmed = body.trim();
        match parse_block_body(trimmed) {
            Ok((component_id, payload)) => {
                let source_span = self.blocks.len();
                tracing::debug!(
                    component_id = component_id.as_str(),
                    source_span,
                    "extracted ui block"
                );
                self.display.push_str(&placeholder(source_span));
                self.blocks.push(RawBlock {
                    component_id,
                    payload,
                    source_span,
                });
            }
            Err(reason) => self.sink.malformed(MalformedBlock {
                reason,
                body: trimmed.to_string(),
            }),
        }
    }
}

/// Extract from the whole text seen so far, logging dropped blocks.
pub fn extract(text: &str) -> Extraction {
    extract_with_sink(text, LogSink)
}

/// Extract from the whole text seen so far, reporting dropped blocks to
/// `sink`.
pub fn extract_with_sink<S: MalformedBlockSink>(text: &str, sink: S) -> Extraction {
    let mut extractor = BlockExtractor::with_sink(sink);
    extractor.push(text);
    extractor.into_extraction()
}
