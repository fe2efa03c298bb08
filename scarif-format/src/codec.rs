//! Binary encoding of [`ScarifStructure`].
//!
//! The whole payload, magic included, sits inside one compressed stream
//! (see [`Envelope`]). Counts and coordinates are little-endian `i32`, block
//! ids are `i16`.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use fastnbt::Value;

use crate::{
    BlockDiff, BlockFlags, ChunkPos, Compression, Envelope, IdMap, LocalPos, Result, ScarifError,
    ScarifStructure, FORMAT_VERSION, MAGIC,
};

/// Encode `scrf` into `out`, returning the inner writer once the compressed
/// stream is finished.
pub fn write_structure<W: Write>(scrf: &ScarifStructure, out: W, compression: Compression) -> Result<W> {
    let payload = encode_payload(scrf)?;
    Ok(compression
        .envelope
        .compress(&payload, out, compression.level)?)
}

fn encode_payload(scrf: &ScarifStructure) -> Result<Vec<u8>> {
    let mut f = Vec::new();

    f.write_all(&MAGIC)?;
    f.write_all(&scrf.version().to_le_bytes())?;
    f.write_all(&count(scrf.chunk_count(), "chunk")?.to_le_bytes())?;
    f.write_all(&count(scrf.id_map().len(), "id table")?.to_le_bytes())?;

    for (id, name) in scrf.id_map().iter() {
        f.write_all(&id.to_le_bytes())?;
        f.write_all(name.as_bytes())?;
        f.write_all(&[0])?;
    }

    for chunk in scrf.chunks() {
        f.write_all(&chunk.pos.x.to_le_bytes())?;
        f.write_all(&chunk.pos.z.to_le_bytes())?;
        f.write_all(&count(chunk.blocks.len(), "block")?.to_le_bytes())?;

        for (pos, block) in &chunk.blocks {
            f.write_all(&[pos.packed_xz(), pos.y()])?;
            f.write_all(&block.id().to_le_bytes())?;
            f.write_all(&[block.flags().bits()])?;

            if block.flags().contains(BlockFlags::HAS_METADATA) {
                f.write_all(&[block.metadata()])?;
            }
            if let Some(tile) = block.tile() {
                let nbt = fastnbt::to_bytes(tile).map_err(|e| ScarifError::Nbt(e.to_string()))?;
                f.write_all(&count(nbt.len(), "tile nbt byte")?.to_le_bytes())?;
                f.write_all(&nbt)?;
            }
        }
    }

    Ok(f)
}

/// Decode a complete SCRF stream, detecting its envelope from the first
/// bytes. Magic and version are checked before any count is trusted; the
/// stream must end right after the last chunk.
pub fn read_structure<R: Read>(mut input: R) -> Result<ScarifStructure> {
    let mut raw = Vec::new();
    input.read_to_end(&mut raw)?;
    read_structure_with(raw.as_slice(), Envelope::detect(&raw))
}

/// Like [`read_structure`] with a known envelope.
pub fn read_structure_with<R: Read>(input: R, envelope: Envelope) -> Result<ScarifStructure> {
    let mut f = Input(BufReader::new(envelope.decoder(input)));

    let magic: [u8; 4] = f.array("magic")?;
    if magic != MAGIC {
        return Err(ScarifError::InvalidMagic(magic));
    }
    let version = f.i32("version")?;
    if version != FORMAT_VERSION {
        return Err(ScarifError::UnsupportedVersion(version));
    }

    let chunk_count = f.count("chunk")?;
    let id_count = f.count("id table")?;

    let mut id_map = IdMap::new();
    for _ in 0..id_count {
        let id = f.i16("id table entry")?;
        let name = f.c_string("id table name")?;
        let name = String::from_utf8(name).map_err(|_| ScarifError::InvalidName { id })?;
        id_map.insert(id, name);
    }

    let mut scrf = ScarifStructure::new(id_map);
    for _ in 0..chunk_count {
        let chunk = ChunkPos::new(f.i32("chunk x")?, f.i32("chunk z")?);
        let block_count = f.count("block")?;

        for _ in 0..block_count {
            let [xz, y] = f.array("block position")?;
            let id = f.i16("block id")?;
            let [bits] = f.array("block flags")?;
            let flags = BlockFlags::from_bits(bits).ok_or(ScarifError::InvalidFlags(bits))?;

            let metadata = if flags.contains(BlockFlags::HAS_METADATA) {
                f.array::<1>("block metadata")?[0]
            } else {
                0
            };
            let tile = if flags.contains(BlockFlags::HAS_TILE_NBT) {
                Some(f.tile()?)
            } else {
                None
            };

            scrf.add(chunk, LocalPos::from_packed(xz, y), BlockDiff::new(id, metadata, tile));
        }
    }

    if f.0.read(&mut [0u8; 1])? != 0 {
        return Err(ScarifError::TrailingData);
    }

    Ok(scrf)
}

pub(crate) fn save_atomic(scrf: &ScarifStructure, path: &Path, compression: Compression) -> Result<()> {
    let tmp = tmp_path(path);
    let result = (|| -> Result<()> {
        let writer = write_structure(scrf, BufWriter::new(File::create(&tmp)?), compression)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        fs::rename(&tmp, path)?;
        Ok(())
    })();

    match &result {
        Ok(()) => log::debug!(
            "Wrote {} chunks / {} blocks to {} ({})",
            scrf.chunk_count(),
            scrf.block_count(),
            path.display(),
            compression.envelope
        ),
        Err(_) => {
            // partial file is never valid
            let _ = fs::remove_file(&tmp);
        }
    }
    result
}

pub(crate) fn load(path: &Path) -> Result<ScarifStructure> {
    read_structure(File::open(path)?)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn count(len: usize, what: &'static str) -> Result<i32> {
    i32::try_from(len).map_err(|_| {
        ScarifError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("too many {what} entries for the SCRF format: {len}"),
        ))
    })
}

struct Input<R>(R);

impl<R: Read> Input<R> {
    fn array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.0.read_exact(&mut buf).map_err(|e| eof(e, what))?;
        Ok(buf)
    }

    fn i16(&mut self, what: &'static str) -> Result<i16> {
        Ok(i16::from_le_bytes(self.array(what)?))
    }

    fn i32(&mut self, what: &'static str) -> Result<i32> {
        Ok(i32::from_le_bytes(self.array(what)?))
    }

    fn count(&mut self, what: &'static str) -> Result<i32> {
        let count = self.i32(what)?;
        if count < 0 {
            return Err(ScarifError::NegativeCount { what, count });
        }
        Ok(count)
    }

    fn c_string(&mut self, what: &'static str) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        loop {
            match self.array::<1>(what)? {
                [0] => return Ok(bytes),
                [b] => bytes.push(b),
            }
        }
    }

    fn tile(&mut self) -> Result<Value> {
        let len = self.count("tile nbt byte")? as u64;
        let mut nbt = Vec::new();
        (&mut self.0).take(len).read_to_end(&mut nbt)?;
        if (nbt.len() as u64) < len {
            return Err(ScarifError::Truncated("tile nbt"));
        }
        fastnbt::from_bytes(&nbt).map_err(|e| ScarifError::Nbt(e.to_string()))
    }
}

fn eof(e: io::Error, what: &'static str) -> ScarifError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        ScarifError::Truncated(what)
    } else {
        ScarifError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn stone_map() -> IdMap {
        [(1, "minecraft:stone"), (54, "minecraft:chest")].into_iter().collect()
    }

    fn raw(scrf: &ScarifStructure) -> Vec<u8> {
        encode_payload(scrf).unwrap()
    }

    fn compress(bytes: &[u8]) -> Vec<u8> {
        Envelope::Brotli.compress(bytes, Vec::new(), 5).unwrap()
    }

    #[test]
    fn test_empty_layout() {
        let scrf = ScarifStructure::new(IdMap::new());
        let bytes = raw(&scrf);
        assert_eq!(&bytes[0..4], b"SCRF");
        assert_eq!(&bytes[4..8], &1i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &0i32.to_le_bytes());
        assert_eq!(&bytes[12..16], &0i32.to_le_bytes());
        assert_eq!(bytes.len(), 16);
    }

    #[test]
    fn test_block_record_layout() {
        let mut scrf = ScarifStructure::new([(1, "a")].into_iter().collect());
        scrf.add(
            ChunkPos::new(-2, 3),
            LocalPos::new(15, 200, 1).unwrap(),
            BlockDiff::new(-5, 4, None),
        );
        let bytes = raw(&scrf);

        // header
        assert_eq!(&bytes[8..12], &1i32.to_le_bytes());
        assert_eq!(&bytes[12..16], &1i32.to_le_bytes());
        // id table: i16 id, "a", NUL
        assert_eq!(&bytes[16..20], &[1, 0, b'a', 0]);
        // chunk header
        assert_eq!(&bytes[20..24], &(-2i32).to_le_bytes());
        assert_eq!(&bytes[24..28], &3i32.to_le_bytes());
        assert_eq!(&bytes[28..32], &1i32.to_le_bytes());
        // xz, y, id, flags, metadata
        assert_eq!(bytes[32], 0xF1);
        assert_eq!(bytes[33], 200);
        assert_eq!(&bytes[34..36], &(-5i16).to_le_bytes());
        assert_eq!(bytes[36], 0b01);
        assert_eq!(bytes[37], 4);
        assert_eq!(bytes.len(), 38);
    }

    #[test]
    fn test_tile_payload_is_length_prefixed() {
        let tile = Value::Compound(HashMap::from([(
            "id".to_string(),
            Value::String("Chest".to_string()),
        )]));
        let nbt = fastnbt::to_bytes(&tile).unwrap();

        let mut scrf = ScarifStructure::new(stone_map());
        scrf.add(ChunkPos::new(0, 0), LocalPos::new(0, 0, 0).unwrap(), BlockDiff::new(54, 0, Some(tile)));
        let bytes = raw(&scrf);

        let record = bytes.len() - nbt.len() - 4 - 5;
        assert_eq!(bytes[record + 4], 0b10);
        assert_eq!(&bytes[record + 5..record + 9], &(nbt.len() as i32).to_le_bytes());
        assert_eq!(&bytes[record + 9..], nbt.as_slice());
    }

    #[test]
    fn test_round_trip() {
        let chest = Value::Compound(HashMap::from([
            ("id".to_string(), Value::String("Chest".to_string())),
            ("x".to_string(), Value::Int(17)),
        ]));

        let mut scrf = ScarifStructure::new(stone_map());
        scrf.add(ChunkPos::new(1, -1), LocalPos::new(1, 2, 3).unwrap(), BlockDiff::new(1, 0, None));
        scrf.add(ChunkPos::new(0, 7), LocalPos::new(15, 255, 15).unwrap(), BlockDiff::new(1, 3, None));
        scrf.add(ChunkPos::new(1, -1), LocalPos::new(0, 64, 0).unwrap(), BlockDiff::new(54, 2, Some(chest)));
        scrf.add(
            ChunkPos::new(1, -1),
            LocalPos::new(0, 65, 0).unwrap(),
            BlockDiff::new(54, 0, Some(Value::Compound(HashMap::new()))),
        );

        for envelope in [Envelope::Brotli, Envelope::Zlib] {
            let bytes = write_structure(&scrf, Vec::new(), Compression::new(envelope, 9)).unwrap();
            assert_eq!(Envelope::detect(&bytes), envelope);
            assert_eq!(read_structure(bytes.as_slice()).unwrap(), scrf);
            assert_eq!(read_structure_with(bytes.as_slice(), envelope).unwrap(), scrf);
        }
    }

    #[test]
    fn test_default_output_is_brotli() {
        let mut scrf = ScarifStructure::new(stone_map());
        scrf.add(ChunkPos::new(3, 4), LocalPos::new(5, 6, 7).unwrap(), BlockDiff::new(54, 2, None));

        let bytes = write_structure(&scrf, Vec::new(), Compression::default()).unwrap();
        let mut payload = Vec::new();
        brotli::BrotliDecompress(&mut bytes.as_slice(), &mut payload).unwrap();
        assert_eq!(payload, raw(&scrf));
    }

    #[test]
    fn test_reads_hand_built_brotli_stream() {
        // one chunk at (-1, 2) holding stone at local (3, 70, 9)
        let mut payload = Vec::new();
        payload.extend_from_slice(b"SCRF");
        for n in [1i32, 1, 1] {
            payload.extend_from_slice(&n.to_le_bytes());
        }
        payload.extend_from_slice(&1i16.to_le_bytes());
        payload.extend_from_slice(b"minecraft:stone\0");
        for n in [-1i32, 2, 1] {
            payload.extend_from_slice(&n.to_le_bytes());
        }
        payload.extend_from_slice(&[0x39, 70, 1, 0, 0]);

        let mut params = brotli::enc::BrotliEncoderParams::default();
        params.quality = 11;
        let mut bytes = Vec::new();
        brotli::enc::BrotliCompress(&mut payload.as_slice(), &mut bytes, &params).unwrap();

        let decoded = read_structure(bytes.as_slice()).unwrap();
        assert_eq!(decoded.id_map().get(1), Some("minecraft:stone"));
        let chunk = decoded.chunk(ChunkPos::new(-1, 2)).unwrap();
        assert_eq!(
            chunk.blocks,
            vec![(LocalPos::new(3, 70, 9).unwrap(), BlockDiff::new(1, 0, None))]
        );
    }

    #[test]
    fn test_zlib_level_is_clamped() {
        let scrf = ScarifStructure::new(stone_map());
        let bytes = write_structure(&scrf, Vec::new(), Compression::new(Envelope::Zlib, 11)).unwrap();
        assert_eq!(read_structure(bytes.as_slice()).unwrap(), scrf);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let bytes = compress(b"SCRX\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00");
        match read_structure(bytes.as_slice()) {
            Err(ScarifError::InvalidMagic(m)) => assert_eq!(&m, b"SCRX"),
            other => panic!("expected InvalidMagic, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_version() {
        let bytes = compress(b"SCRF\x02\x00\x00\x00\xFF\xFF\xFF\x7F\x00\x00\x00\x00");
        assert!(matches!(
            read_structure(bytes.as_slice()),
            Err(ScarifError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn test_rejects_truncated_and_trailing() {
        let mut scrf = ScarifStructure::new(stone_map());
        scrf.add(ChunkPos::new(0, 0), LocalPos::new(0, 0, 0).unwrap(), BlockDiff::new(1, 1, None));
        let full = raw(&scrf);

        let cut = compress(&full[..full.len() - 1]);
        assert!(matches!(
            read_structure(cut.as_slice()),
            Err(ScarifError::Truncated(_))
        ));

        let mut longer = full.clone();
        longer.push(0);
        let longer = compress(&longer);
        assert!(matches!(
            read_structure(longer.as_slice()),
            Err(ScarifError::TrailingData)
        ));
    }

    #[test]
    fn test_rejects_negative_count_and_unknown_flags() {
        let bytes = compress(b"SCRF\x01\x00\x00\x00\xFF\xFF\xFF\xFF\x00\x00\x00\x00");
        assert!(matches!(
            read_structure(bytes.as_slice()),
            Err(ScarifError::NegativeCount { what: "chunk", count: -1 })
        ));

        let mut scrf = ScarifStructure::new(IdMap::new());
        scrf.add(ChunkPos::new(0, 0), LocalPos::new(0, 0, 0).unwrap(), BlockDiff::new(1, 0, None));
        let mut bytes = raw(&scrf);
        let flags_at = bytes.len() - 1;
        bytes[flags_at] = 0b100;
        assert!(matches!(
            read_structure(compress(&bytes).as_slice()),
            Err(ScarifError::InvalidFlags(0b100))
        ));
    }
}
