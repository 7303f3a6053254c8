//! Harvesting pipeline
//!
//! One harvest is the resolve+fetch+parse sequence for a single content
//! identifier. The coordinator fans harvests out over a bounded worker pool
//! and aggregates the per-identifier results into a [`HarvestOutcome`].

mod coordinator;
mod harvester;
mod model;
mod resolver;
mod stream;

pub use coordinator::HarvestCoordinator;
pub use harvester::CommentHarvester;
pub use model::{
    CommentRecord, ContentId, ContentResult, HarvestFailure, HarvestOutcome, StreamId,
};
pub use resolver::{resolve, ResolvedContent};
pub use stream::parse_comments;
