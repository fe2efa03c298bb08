use crate::ScarifError;

/// Number of blocks along the X and Z axes of a chunk.
pub const CHUNK_WIDTH: i32 = 16;

/// Number of blocks along the Y axis of a (legacy) chunk.
pub const CHUNK_HEIGHT: i32 = 256;

/// Coordinates for a chunk in the world.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the absolute block column (x, z).
    #[inline]
    pub fn containing(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x.div_euclid(CHUNK_WIDTH),
            z: block_z.div_euclid(CHUNK_WIDTH),
        }
    }

    /// Absolute X of the chunk's first block column. Any `i32` chunk is
    /// valid on disk, so this is widened to `i64`.
    #[inline]
    pub fn min_block_x(&self) -> i64 {
        self.x as i64 * CHUNK_WIDTH as i64
    }

    /// Absolute Z of the chunk's first block column.
    #[inline]
    pub fn min_block_z(&self) -> i64 {
        self.z as i64 * CHUNK_WIDTH as i64
    }
}

/// Block position relative to its owning chunk.
///
/// X and Z are always in `0..16`, so they fit the packed `(x << 4) | z` byte
/// of the wire format without truncation.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct LocalPos {
    x: u8,
    y: u8,
    z: u8,
}

impl LocalPos {
    pub fn new(x: i32, y: i32, z: i32) -> Result<Self, ScarifError> {
        let in_column = (0..CHUNK_WIDTH).contains(&x) && (0..CHUNK_WIDTH).contains(&z);
        if !in_column || !(0..CHUNK_HEIGHT).contains(&y) {
            return Err(ScarifError::LocalOutOfRange { x, y, z });
        }
        Ok(Self {
            x: x as u8,
            y: y as u8,
            z: z as u8,
        })
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    pub fn z(&self) -> u8 {
        self.z
    }

    /// Horizontal position packed as `(x << 4) | z`.
    #[inline]
    pub fn packed_xz(&self) -> u8 {
        ((self.x & 0x0F) << 4) | (self.z & 0x0F)
    }

    /// Inverse of [`LocalPos::packed_xz`].
    #[inline]
    pub fn from_packed(xz: u8, y: u8) -> Self {
        Self {
            x: xz >> 4,
            y,
            z: xz & 0x0F,
        }
    }

    /// Absolute block coordinates inside `chunk`.
    pub fn to_world(&self, chunk: ChunkPos) -> (i64, i32, i64) {
        (
            chunk.min_block_x() + self.x as i64,
            self.y as i32,
            chunk.min_block_z() + self.z as i64,
        )
    }
}
