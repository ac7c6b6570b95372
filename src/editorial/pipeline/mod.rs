/*!
 * Editorial pipeline for staged suggestion generation.
 *
 * The pipeline processes one draft through four stages, strictly in order:
 * 1. **Style**: derive guidelines from recent published posts
 * 2. **Typo**: spelling, grammar and punctuation
 * 3. **Structure**: organisation of the text
 * 4. **Coherence**: logical flow
 */

pub mod orchestrator;
pub mod stages;
pub mod state;

pub use orchestrator::{
    run_pipeline, EditorialPipeline, PipelineConfig, PipelineProgress, PipelineResult,
};
pub use state::{PipelineState, Stage, StageFailure, StateParts};
