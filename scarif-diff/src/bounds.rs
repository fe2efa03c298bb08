//! Coordinate box used to restrict a diff to part of the world.

use std::fmt;
use std::str::FromStr;

use scarif_format::{CHUNK_WIDTH, ChunkPos};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoundsError {
    #[error("expected 6 fields \"minX:minY:minZ:maxX:maxY:maxZ\", found {0}")]
    FieldCount(usize),

    #[error("bounds field {field} is not an integer: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("bounds min{axis} ({min}) is greater than max{axis} ({max})")]
    Inverted { axis: char, min: i32, max: i32 },
}

const FIELDS: [&str; 6] = ["minX", "minY", "minZ", "maxX", "maxY", "maxZ"];

/// Inclusive block-coordinate box, or the whole world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBounds {
    area: Option<([i32; 3], [i32; 3])>,
}

impl ChunkBounds {
    /// Bounds that accept every chunk and block.
    pub fn everything() -> Self {
        Self { area: None }
    }

    pub fn new(min: [i32; 3], max: [i32; 3]) -> Result<Self, BoundsError> {
        for (i, axis) in ['X', 'Y', 'Z'].into_iter().enumerate() {
            if min[i] > max[i] {
                return Err(BoundsError::Inverted {
                    axis,
                    min: min[i],
                    max: max[i],
                });
            }
        }
        Ok(Self {
            area: Some((min, max)),
        })
    }

    /// `None` (no `--bounds` given) means the whole world.
    pub fn parse(text: Option<&str>) -> Result<Self, BoundsError> {
        match text {
            Some(text) => text.parse(),
            None => Ok(Self::everything()),
        }
    }

    pub fn is_everything(&self) -> bool {
        self.area.is_none()
    }

    /// Chunk-granularity test: does any block column of `chunk` fall inside
    /// the box horizontally?
    pub fn coarse_contains(&self, chunk: ChunkPos) -> bool {
        let Some((min, max)) = self.area else {
            return true;
        };
        let (x0, z0) = (chunk.min_block_x(), chunk.min_block_z());
        let (x1, z1) = (x0 + CHUNK_WIDTH as i64 - 1, z0 + CHUNK_WIDTH as i64 - 1);
        x1 >= min[0] as i64 && x0 <= max[0] as i64 && z1 >= min[2] as i64 && z0 <= max[2] as i64
    }

    /// Exact test on absolute block coordinates.
    pub fn contains(&self, x: i64, y: i32, z: i64) -> bool {
        let Some((min, max)) = self.area else {
            return true;
        };
        (min[0] as i64..=max[0] as i64).contains(&x)
            && (min[1]..=max[1]).contains(&y)
            && (min[2] as i64..=max[2] as i64).contains(&z)
    }
}

impl Default for ChunkBounds {
    fn default() -> Self {
        Self::everything()
    }
}

impl FromStr for ChunkBounds {
    type Err = BoundsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != FIELDS.len() {
            return Err(BoundsError::FieldCount(parts.len()));
        }

        let mut values = [0i32; 6];
        for (i, part) in parts.iter().enumerate() {
            values[i] = part.trim().parse().map_err(|_| BoundsError::InvalidNumber {
                field: FIELDS[i],
                value: part.to_string(),
            })?;
        }

        Self::new(
            [values[0], values[1], values[2]],
            [values[3], values[4], values[5]],
        )
    }
}

impl fmt::Display for ChunkBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.area {
            None => write!(f, "everything"),
            Some((min, max)) => write!(
                f,
                "{}:{}:{}:{}:{}:{}",
                min[0], min[1], min[2], max[0], max[1], max[2]
            ),
        }
    }
}
