use fastnbt::Value;

/// Which optional fields follow a block record on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockFlags(u8);

impl BlockFlags {
    pub const NONE: BlockFlags = BlockFlags(0);
    pub const HAS_METADATA: BlockFlags = BlockFlags(0b01);
    pub const HAS_TILE_NBT: BlockFlags = BlockFlags(0b10);

    const ALL: u8 = Self::HAS_METADATA.0 | Self::HAS_TILE_NBT.0;

    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Parse a flag byte read from disk, rejecting unknown bits.
    pub fn from_bits(bits: u8) -> Option<Self> {
        (bits & !Self::ALL == 0).then_some(Self(bits))
    }

    pub fn contains(&self, other: BlockFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for BlockFlags {
    type Output = BlockFlags;

    fn bitor(self, rhs: BlockFlags) -> BlockFlags {
        BlockFlags(self.0 | rhs.0)
    }
}

/// One changed block: the state found in the modified world.
///
/// The flags are computed from the fields when the record is built and cannot
/// be set independently. Metadata `0` is never stored; a tile entity is stored
/// whenever one is present, even an empty compound.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDiff {
    id: i16,
    flags: BlockFlags,
    metadata: u8,
    tile: Option<Value>,
}

impl BlockDiff {
    pub fn new(id: i16, metadata: u8, tile: Option<Value>) -> Self {
        let mut flags = BlockFlags::NONE;
        if metadata != 0 {
            flags = flags | BlockFlags::HAS_METADATA;
        }
        if tile.is_some() {
            flags = flags | BlockFlags::HAS_TILE_NBT;
        }
        Self {
            id,
            flags,
            metadata,
            tile,
        }
    }

    pub fn id(&self) -> i16 {
        self.id
    }

    pub fn flags(&self) -> BlockFlags {
        self.flags
    }

    pub fn metadata(&self) -> u8 {
        self.metadata
    }

    pub fn tile(&self) -> Option<&Value> {
        self.tile.as_ref()
    }
}
