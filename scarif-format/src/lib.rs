//! SCRF world diff container.
//!
//! A SCRF file stores the blocks that differ between two snapshots of the same
//! world, grouped by chunk. Layout (little-endian, everything inside a single
//! Brotli stream, or zlib when asked for):
//! - Header: magic `SCRF`, version, chunk count, id table size
//! - Id table: `(i16 id, NUL-terminated UTF-8 name)` per entry
//! - Chunks: `(i32 x, i32 z, i32 count)` followed by `count` block records

mod block;
mod codec;
mod envelope;
mod error;
mod idmap;
mod pos;
mod structure;

pub use block::{BlockDiff, BlockFlags};
pub use codec::{read_structure, read_structure_with, write_structure};
pub use envelope::{Compression, Envelope};
pub use error::ScarifError;
pub use idmap::IdMap;
pub use pos::{ChunkPos, LocalPos, CHUNK_HEIGHT, CHUNK_WIDTH};
pub use structure::{ChunkDiff, ScarifStructure};

/// Magic bytes at the start of every (decompressed) SCRF stream.
pub const MAGIC: [u8; 4] = *b"SCRF";

/// The only container version this crate reads and writes.
pub const FORMAT_VERSION: i32 = 1;

/// Default compression level (Brotli quality; zlib clamps it to 9).
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 11;

pub type Result<T> = std::result::Result<T, ScarifError>;
