//! Block-level diff of two world snapshots into a SCRF container.
//!
//! This crate handles:
//! - Coordinate bounds (`--bounds minX:minY:minZ:maxX:maxY:maxZ`)
//! - The world access traits and an in-memory world
//! - The chunk-by-chunk diff pass and its counters

pub mod bounds;
pub mod engine;
pub mod summary;
pub mod world;

pub use bounds::{BoundsError, ChunkBounds};
pub use engine::{DiffEngine, DiffOptions, DiffOutput, TileComparison};
pub use summary::DiffSummary;
pub use world::{ChunkView, MemoryChunk, MemoryWorld, WorldSource};
