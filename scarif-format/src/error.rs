/// Errors produced while building, encoding or decoding a SCRF container.
#[derive(Debug, thiserror::Error)]
pub enum ScarifError {
    #[error("invalid magic bytes (expected SCRF, found {0:02X?})")]
    InvalidMagic([u8; 4]),

    #[error("unsupported SCRF version {0}")]
    UnsupportedVersion(i32),

    #[error("truncated stream while reading {0}")]
    Truncated(&'static str),

    #[error("negative {what} count: {count}")]
    NegativeCount { what: &'static str, count: i32 },

    #[error("id table name for #{id} is not valid UTF-8")]
    InvalidName { id: i16 },

    #[error("unknown block flag bits {0:#04b}")]
    InvalidFlags(u8),

    #[error("unexpected data after the last chunk record")]
    TrailingData,

    #[error("tile entity NBT error: {0}")]
    Nbt(String),

    #[error("local block position ({x}, {y}, {z}) is outside the 16x16 chunk column")]
    LocalOutOfRange { x: i32, y: i32, z: i32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
