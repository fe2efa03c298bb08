/// Integration test: containers survive a trip through a real file, for
/// varying chunk and block counts, and a failed save leaves nothing behind.
use std::collections::HashMap;

use fastnbt::Value;
use scarif_format::{BlockDiff, ChunkPos, Compression, Envelope, IdMap, LocalPos, ScarifError, ScarifStructure};

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("scarif_test_{}_{}.scrf", name, std::process::id()))
}

/// Deterministic LCG so every run builds the same containers.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

fn build(chunks: usize, blocks_per_chunk: usize, seed: u64) -> ScarifStructure {
    let mut rng = Lcg(seed);
    let map: IdMap = (0..40i16).map(|id| (id, format!("test:block_{id}"))).collect();
    let mut scrf = ScarifStructure::new(map);

    for c in 0..chunks {
        let pos = ChunkPos::new(c as i32 - 3, (rng.next() % 64) as i32 - 32);
        for _ in 0..blocks_per_chunk {
            let local = LocalPos::new(
                (rng.next() % 16) as i32,
                (rng.next() % 256) as i32,
                (rng.next() % 16) as i32,
            )
            .unwrap();
            let tile = (rng.next() % 4 == 0).then(|| {
                Value::Compound(HashMap::from([
                    ("id".to_string(), Value::String("Sign".to_string())),
                    ("Text1".to_string(), Value::String(format!("line {}", rng.next()))),
                ]))
            });
            let block = BlockDiff::new((rng.next() % 40) as i16, (rng.next() % 3) as u8, tile);
            scrf.add(pos, local, block);
        }
    }
    scrf
}

#[test]
fn test_file_round_trip_grid() {
    for (chunks, blocks) in [(0, 0), (1, 0), (1, 1), (3, 17), (12, 200)] {
        let scrf = build(chunks, blocks, (chunks * 1000 + blocks) as u64);
        let path = temp_path(&format!("grid_{chunks}_{blocks}"));

        scrf.save(&path, Compression::default()).unwrap();
        let loaded = ScarifStructure::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.chunk_count(), scrf.chunk_count());
        let original: Vec<_> = scrf.chunks().collect();
        let decoded: Vec<_> = loaded.chunks().collect();
        assert_eq!(original, decoded, "chunks={chunks} blocks={blocks}");
        assert_eq!(loaded.id_map(), scrf.id_map());
    }
}

#[test]
fn test_save_leaves_no_temp_file() {
    let scrf = build(2, 5, 7);
    let path = temp_path("no_tmp");
    scrf.save(&path, Compression::new(Envelope::Zlib, 1)).unwrap();

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    assert!(!std::path::Path::new(&tmp).exists());
    assert!(path.exists());
    // zlib files are picked up without being told
    assert_eq!(ScarifStructure::load(&path).unwrap(), scrf);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_save_into_missing_directory_fails() {
    let scrf = build(1, 1, 1);
    let path = std::env::temp_dir()
        .join("scarif_missing_dir_for_test")
        .join("out.scrf");
    assert!(matches!(scrf.save(&path, Compression::default()), Err(ScarifError::Io(_))));
    assert!(!path.exists());
}

#[test]
fn test_load_garbage_is_an_error() {
    let path = temp_path("garbage");
    std::fs::write(&path, b"definitely not a SCRF file").unwrap();
    assert!(ScarifStructure::load(&path).is_err());
    std::fs::remove_file(&path).unwrap();
}
