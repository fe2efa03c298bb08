//! World access used by the diff engine.
//!
//! The on-disk world format is not handled here. Implementations of these
//! traits adapt whatever storage holds the two snapshots:
//! - `MemoryWorld` - chunks held in RAM (for testing/embedding)

use std::collections::HashMap;

use fastnbt::Value;
use scarif_format::{CHUNK_HEIGHT, CHUNK_WIDTH, ChunkPos};

/// Read access to the blocks of one loaded chunk, by chunk-local coordinates
/// (x, z in `0..16`, y in `0..256`).
pub trait ChunkView {
    fn block_id(&self, x: usize, y: usize, z: usize) -> i16;

    fn metadata(&self, x: usize, y: usize, z: usize) -> u8;

    /// Tile entity NBT of the block, if it has one.
    fn tile_entity(&self, x: usize, y: usize, z: usize) -> Option<&Value>;
}

impl<T: ChunkView + ?Sized> ChunkView for &T {
    fn block_id(&self, x: usize, y: usize, z: usize) -> i16 {
        (**self).block_id(x, y, z)
    }

    fn metadata(&self, x: usize, y: usize, z: usize) -> u8 {
        (**self).metadata(x, y, z)
    }

    fn tile_entity(&self, x: usize, y: usize, z: usize) -> Option<&Value> {
        (**self).tile_entity(x, y, z)
    }
}

/// One dimension of a world snapshot.
pub trait WorldSource {
    type Chunk<'a>: ChunkView
    where
        Self: 'a;

    /// Every stored chunk, in storage order.
    fn chunk_positions(&self) -> anyhow::Result<Vec<ChunkPos>>;

    fn chunk_exists(&self, pos: ChunkPos) -> bool;

    /// Load a chunk. The handle is dropped as soon as the chunk is processed.
    fn load_chunk(&self, pos: ChunkPos) -> anyhow::Result<Self::Chunk<'_>>;
}

const BLOCKS_PER_CHUNK: usize = (CHUNK_WIDTH * CHUNK_WIDTH * CHUNK_HEIGHT) as usize;

/// A single chunk stored as flat YZX arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryChunk {
    ids: Vec<i16>,
    metadata: Vec<u8>,
    tiles: HashMap<(usize, usize, usize), Value>,
}

impl MemoryChunk {
    /// Chunk filled with id 0 / metadata 0.
    pub fn new() -> Self {
        Self {
            ids: vec![0; BLOCKS_PER_CHUNK],
            metadata: vec![0; BLOCKS_PER_CHUNK],
            tiles: HashMap::new(),
        }
    }

    #[inline]
    fn index(x: usize, y: usize, z: usize) -> usize {
        (y * CHUNK_WIDTH as usize + z) * CHUNK_WIDTH as usize + x
    }

    pub fn set_block(&mut self, x: usize, y: usize, z: usize, id: i16, metadata: u8) {
        let i = Self::index(x, y, z);
        self.ids[i] = id;
        self.metadata[i] = metadata;
    }

    pub fn set_tile_entity(&mut self, x: usize, y: usize, z: usize, tile: Option<Value>) {
        match tile {
            Some(tile) => {
                self.tiles.insert((x, y, z), tile);
            }
            None => {
                self.tiles.remove(&(x, y, z));
            }
        }
    }

    /// Set every block of layer `y` to `id`.
    pub fn fill_layer(&mut self, y: usize, id: i16) {
        let start = Self::index(0, y, 0);
        let layer = (CHUNK_WIDTH * CHUNK_WIDTH) as usize;
        self.ids[start..start + layer].fill(id);
        self.metadata[start..start + layer].fill(0);
    }
}

impl Default for MemoryChunk {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkView for MemoryChunk {
    fn block_id(&self, x: usize, y: usize, z: usize) -> i16 {
        self.ids[Self::index(x, y, z)]
    }

    fn metadata(&self, x: usize, y: usize, z: usize) -> u8 {
        self.metadata[Self::index(x, y, z)]
    }

    fn tile_entity(&self, x: usize, y: usize, z: usize) -> Option<&Value> {
        self.tiles.get(&(x, y, z))
    }
}

/// In-memory world. Chunks are reported in the order they were first stored.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorld {
    order: Vec<ChunkPos>,
    chunks: HashMap<ChunkPos, MemoryChunk>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_chunk(&mut self, pos: ChunkPos, chunk: MemoryChunk) {
        if self.chunks.insert(pos, chunk).is_none() {
            self.order.push(pos);
        }
    }

    /// Chunk at `pos`, created empty if missing.
    pub fn chunk_mut(&mut self, pos: ChunkPos) -> &mut MemoryChunk {
        if !self.chunks.contains_key(&pos) {
            self.order.push(pos);
        }
        self.chunks.entry(pos).or_default()
    }

    /// Set a block by absolute coordinates, creating its chunk if needed.
    pub fn set_block(&mut self, x: i32, y: usize, z: i32, id: i16, metadata: u8) {
        let pos = ChunkPos::containing(x, z);
        let (lx, lz) = local_xz(x, z);
        self.chunk_mut(pos).set_block(lx, y, lz, id, metadata);
    }

    pub fn set_tile_entity(&mut self, x: i32, y: usize, z: i32, tile: Option<Value>) {
        let pos = ChunkPos::containing(x, z);
        let (lx, lz) = local_xz(x, z);
        self.chunk_mut(pos).set_tile_entity(lx, y, lz, tile);
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn local_xz(x: i32, z: i32) -> (usize, usize) {
    (
        x.rem_euclid(CHUNK_WIDTH) as usize,
        z.rem_euclid(CHUNK_WIDTH) as usize,
    )
}

impl WorldSource for MemoryWorld {
    type Chunk<'a> = &'a MemoryChunk;

    fn chunk_positions(&self) -> anyhow::Result<Vec<ChunkPos>> {
        Ok(self.order.clone())
    }

    fn chunk_exists(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    fn load_chunk(&self, pos: ChunkPos) -> anyhow::Result<Self::Chunk<'_>> {
        self.chunks
            .get(&pos)
            .ok_or_else(|| anyhow::anyhow!("chunk ({}, {}) is not stored", pos.x, pos.z))
    }
}
