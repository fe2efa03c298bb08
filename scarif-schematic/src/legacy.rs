//! Legacy 12-bit block id storage.
//!
//! Ids are split across two arrays:
//! - `Blocks`: one byte per voxel, bits 0-7
//! - `AddBlocks`: one nibble per voxel, bits 8-11, two voxels per byte
//!
//! Voxel `i` uses byte `i >> 1` of `AddBlocks`: the low nibble when `i` is
//! odd, the high nibble when `i` is even.

/// Largest id the legacy layout can hold.
pub const MAX_LEGACY_ID: u16 = 0x0FFF;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("AddBlocks holds {actual} bytes but {voxels} voxels need at least {needed}")]
pub struct ExtensionTooShort {
    pub voxels: usize,
    pub needed: usize,
    pub actual: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyBlocks {
    blocks: Vec<u8>,
    add: Vec<u8>,
}

impl LegacyBlocks {
    /// Wrap existing arrays. A missing `AddBlocks` array is created zeroed
    /// with `(len >> 1) + 1` bytes.
    pub fn from_parts(blocks: Vec<u8>, add: Option<Vec<u8>>) -> Result<Self, ExtensionTooShort> {
        let add = match add {
            Some(add) => {
                let needed = blocks.len().div_ceil(2);
                if add.len() < needed {
                    return Err(ExtensionTooShort {
                        voxels: blocks.len(),
                        needed,
                        actual: add.len(),
                    });
                }
                add
            }
            None => vec![0; (blocks.len() >> 1) + 1],
        };
        Ok(Self { blocks, add })
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// 12-bit id of voxel `index`.
    #[inline]
    pub fn get(&self, index: usize) -> u16 {
        let add = self.add[index >> 1] as u16;
        let high = if index & 1 == 1 {
            (add & 0x0F) << 8
        } else {
            (add & 0xF0) << 4
        };
        high | self.blocks[index] as u16
    }

    /// Store the low 12 bits of `id` at voxel `index`, leaving the other
    /// voxel sharing the `AddBlocks` byte untouched.
    #[inline]
    pub fn set(&mut self, index: usize, id: u16) {
        self.blocks[index] = (id & 0xFF) as u8;
        let nibble = ((id >> 8) & 0x0F) as u8;
        let add = &mut self.add[index >> 1];
        *add = if index & 1 == 1 {
            (*add & 0xF0) | nibble
        } else {
            (*add & 0x0F) | (nibble << 4)
        };
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>) {
        (self.blocks, self.add)
    }
}
