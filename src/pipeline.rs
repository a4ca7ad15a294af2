//! One stream's path from model text to renderable slots.
//!
//! Chains the extractor, the validator and the registry. The rendering layer
//! takes the resulting `RenderPlan`, splits `display_text` on placeholders and
//! fills each slot from `slots[ordinal]`.

use crate::catalog::Catalog;
use crate::extract::{BlockExtractor, LogSink, MalformedBlockSink};
use crate::registry::ComponentRegistry;
use crate::validate::{BlockRejection, ValidatedBlock, validate_block};
use std::sync::Arc;

/// What the renderer should draw for one block ordinal.
#[derive(Debug)]
pub enum Slot<H> {
    /// Valid block with a resolved handle.
    Ready {
        block: ValidatedBlock,
        handle: Arc<H>,
    },
    /// Valid block whose component could not be resolved; draw a fallback.
    Unresolved { block: ValidatedBlock },
    /// Block failed validation.
    Rejected { rejection: BlockRejection },
}

impl<H> Slot<H> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Slot::Ready { .. })
    }
}

/// Display text plus one slot per placeholder, indexed by ordinal.
#[derive(Debug)]
pub struct RenderPlan<H> {
    pub display_text: String,
    pub is_pending: bool,
    pub slots: Vec<Slot<H>>,
}

pub struct BlockPipeline<H, S: MalformedBlockSink = LogSink> {
    extractor: BlockExtractor<S>,
    catalog: Arc<Catalog>,
    registry: Arc<ComponentRegistry<H>>,
}

impl<H: Send + Sync + 'static> BlockPipeline<H, LogSink> {
    pub fn new(catalog: Arc<Catalog>, registry: Arc<ComponentRegistry<H>>) -> Self {
        Self::with_extractor(BlockExtractor::new(), catalog, registry)
    }
}

impl<H: Send + Sync + 'static, S: MalformedBlockSink> BlockPipeline<H, S> {
    pub fn with_extractor(
        extractor: BlockExtractor<S>,
        catalog: Arc<Catalog>,
        registry: Arc<ComponentRegistry<H>>,
    ) -> Self {
        Self {
            extractor,
            catalog,
            registry,
        }
    }

    /// Feed the next chunk of model output.
    pub fn push(&mut self, chunk: &str) {
        self.extractor.push(chunk);
    }

    /// Mark the end of the stream.
    pub fn finish(&mut self) {
        self.extractor.finish();
    }

    pub fn extractor(&self) -> &BlockExtractor<S> {
        &self.extractor
    }

    /// Swap in a refreshed catalog; later plans validate against it.
    pub fn set_catalog(&mut self, catalog: Arc<Catalog>) {
        self.catalog = catalog;
    }

    /// Validate and resolve every block completed so far.
    pub async fn plan(&self) -> RenderPlan<H> {
        let mut slots = Vec::with_capacity(self.extractor.completed_blocks().len());
        for raw in self.extractor.completed_blocks() {
            let slot = match validate_block(raw, &self.catalog) {
                Ok(block) => match self.registry.resolve_block(&block).await {
                    Some(handle) => Slot::Ready { block, handle },
                    None => Slot::Unresolved { block },
                },
                Err(rejection) => {
                    tracing::debug!(
                        component_id = rejection.component_id(),
                        source_span = raw.source_span,
                        %rejection,
                        "ui block rejected"
                    );
                    Slot::Rejected { rejection }
                }
            };
            slots.push(slot);
        }

        RenderPlan {
            display_text: self.extractor.display_text().to_string(),
            is_pending: self.extractor.is_pending(),
            slots,
        }
    }
}
