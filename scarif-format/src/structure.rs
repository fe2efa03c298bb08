use std::collections::HashMap;
use std::path::Path;

use crate::{BlockDiff, ChunkPos, Compression, IdMap, LocalPos, FORMAT_VERSION};

/// All diffed blocks of one chunk, in the order they were added.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDiff {
    pub pos: ChunkPos,
    pub blocks: Vec<(LocalPos, BlockDiff)>,
}

/// In-memory SCRF container.
///
/// Chunks keep their first-insertion order and blocks keep their insertion
/// order inside a chunk. Positions are not deduplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct ScarifStructure {
    version: i32,
    id_map: IdMap,
    chunks: Vec<ChunkDiff>,
    index: HashMap<ChunkPos, usize>,
}

impl ScarifStructure {
    /// Empty container embedding the id table of the world the diff describes.
    pub fn new(id_map: IdMap) -> Self {
        Self {
            version: FORMAT_VERSION,
            id_map,
            chunks: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn add(&mut self, chunk: ChunkPos, pos: LocalPos, block: BlockDiff) {
        let slot = match self.index.get(&chunk) {
            Some(&slot) => slot,
            None => {
                self.chunks.push(ChunkDiff {
                    pos: chunk,
                    blocks: Vec::new(),
                });
                self.index.insert(chunk, self.chunks.len() - 1);
                self.chunks.len() - 1
            }
        };
        self.chunks[slot].blocks.push((pos, block));
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn id_map(&self) -> &IdMap {
        &self.id_map
    }

    pub fn set_id_map(&mut self, id_map: IdMap) {
        self.id_map = id_map;
    }

    pub fn chunks(&self) -> impl Iterator<Item = &ChunkDiff> {
        self.chunks.iter()
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&ChunkDiff> {
        self.index.get(&pos).map(|&slot| &self.chunks[slot])
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn block_count(&self) -> usize {
        self.chunks.iter().map(|c| c.blocks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Atomically write the container to `path` (via `<path>.tmp` + rename).
    pub fn save(&self, path: impl AsRef<Path>, compression: Compression) -> crate::Result<()> {
        crate::codec::save_atomic(self, path.as_ref(), compression)
    }

    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        crate::codec::load(path.as_ref())
    }
}
