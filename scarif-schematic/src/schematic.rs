//! Legacy (MCEdit) `.schematic` files: a gzip-compressed NBT compound named
//! `Schematic` with `Width`, `Height`, `Length`, `Blocks` and optionally
//! `AddBlocks`. Every other tag is carried through untouched.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fastnbt::{ByteArray, Value};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::legacy::LegacyBlocks;
use crate::repack::Footprint;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

#[derive(Debug, Clone, PartialEq)]
pub struct Schematic {
    root: HashMap<String, Value>,
}

impl Schematic {
    pub fn from_compound(root: HashMap<String, Value>) -> Self {
        Self { root }
    }

    /// Parse schematic NBT, gzip-compressed or raw.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let nbt = if data.starts_with(&GZIP_MAGIC) {
            let mut decompressed = Vec::new();
            GzDecoder::new(data)
                .read_to_end(&mut decompressed)
                .context("decompressing schematic")?;
            decompressed
        } else {
            data.to_vec()
        };

        match fastnbt::from_bytes::<Value>(&nbt).context("parsing schematic NBT")? {
            Value::Compound(root) => Ok(Self { root }),
            _ => anyhow::bail!("Schematic root is not a Compound"),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_bytes(&data).with_context(|| format!("loading schematic {}", path.display()))
    }

    /// Gzip-compressed NBT with root name `Schematic`.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let root = Value::Compound(self.root.clone());
        let nbt = fastnbt::to_bytes_with_opts(&root, fastnbt::SerOpts::new().root_name("Schematic"))
            .context("serializing schematic NBT")?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&nbt)?;
        Ok(encoder.finish()?)
    }

    /// Write to `path` through `<path>.tmp` + rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let bytes = self.to_bytes()?;
        let result = (|| -> Result<()> {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            writer.write_all(&bytes)?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
            fs::rename(&tmp, path)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result.with_context(|| format!("writing schematic {}", path.display()))
    }

    fn dimension(&self, key: &str) -> Result<i32> {
        let value = self
            .root
            .get(key)
            .with_context(|| format!("schematic has no {} tag", key))?;
        let n = value
            .as_i64()
            .with_context(|| format!("schematic {} is not a number", key))?;
        i32::try_from(n).with_context(|| format!("schematic {} out of range: {}", key, n))
    }

    pub fn width(&self) -> Result<i32> {
        self.dimension("Width")
    }

    pub fn height(&self) -> Result<i32> {
        self.dimension("Height")
    }

    pub fn length(&self) -> Result<i32> {
        self.dimension("Length")
    }

    pub fn footprint(&self) -> Result<Footprint> {
        Ok(Footprint {
            length: self.length()?,
            width: self.width()?,
        })
    }

    fn byte_array(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.root.get(key) {
            None => Ok(None),
            Some(Value::ByteArray(array)) => Ok(Some(array.iter().map(|&b| b as u8).collect())),
            Some(other) => anyhow::bail!("schematic {} is not a byte array: {:?}", key, other),
        }
    }

    /// `Blocks` + `AddBlocks` as a 12-bit id array.
    pub fn legacy_blocks(&self) -> Result<LegacyBlocks> {
        let blocks = self
            .byte_array("Blocks")?
            .context("schematic has no Blocks tag")?;
        let add = self.byte_array("AddBlocks")?;
        Ok(LegacyBlocks::from_parts(blocks, add)?)
    }

    /// Replace `Blocks` and `AddBlocks` (always written, even if absent before).
    pub fn set_legacy_blocks(&mut self, blocks: LegacyBlocks) {
        let (blocks, add) = blocks.into_parts();
        self.root.insert("Blocks".to_string(), byte_array(blocks));
        self.root.insert("AddBlocks".to_string(), byte_array(add));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }
}

fn byte_array(bytes: Vec<u8>) -> Value {
    Value::ByteArray(ByteArray::new(bytes.into_iter().map(|b| b as i8).collect()))
}
