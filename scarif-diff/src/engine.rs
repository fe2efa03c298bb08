use anyhow::{Context, Result};
use fastnbt::Value;
use scarif_format::{BlockDiff, CHUNK_HEIGHT, CHUNK_WIDTH, IdMap, LocalPos, ScarifStructure};

use crate::bounds::ChunkBounds;
use crate::summary::DiffSummary;
use crate::world::{ChunkView, WorldSource};

/// How tile entities of the two worlds are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TileComparison {
    /// Equal when both are absent or both hold the same NBT tree.
    #[default]
    Content,
    /// Equal only when both are absent: any present tile entity counts as
    /// changed. Reproduces diffs written by older SCRF tools.
    Identity,
}

impl TileComparison {
    fn equal(self, a: Option<&Value>, b: Option<&Value>) -> bool {
        match self {
            TileComparison::Content => a == b,
            TileComparison::Identity => a.is_none() && b.is_none(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiffOptions {
    pub bounds: ChunkBounds,
    pub tiles: TileComparison,
}

/// Result of a diff pass.
#[derive(Debug)]
pub struct DiffOutput {
    pub structure: ScarifStructure,
    pub summary: DiffSummary,
}

/// Compares a modified world against its baseline, block by block.
///
/// Blocks are compared by name through each world's own id mapping, so the
/// two worlds may number their blocks differently. A voxel whose id is
/// missing from its mapping cannot be compared and is treated as unchanged
/// (it is only counted in [`DiffSummary::unresolved_blocks`]).
pub struct DiffEngine<'a> {
    baseline_map: &'a IdMap,
    modified_map: &'a IdMap,
    options: DiffOptions,
}

impl<'a> DiffEngine<'a> {
    pub fn new(baseline_map: &'a IdMap, modified_map: &'a IdMap, options: DiffOptions) -> Self {
        Self {
            baseline_map,
            modified_map,
            options,
        }
    }

    pub fn run<B, M>(&self, baseline: &B, modified: &M) -> Result<DiffOutput>
    where
        B: WorldSource,
        M: WorldSource,
    {
        self.run_with_progress(baseline, modified, |_| {})
    }

    /// Like [`DiffEngine::run`], calling `progress` after every chunk.
    pub fn run_with_progress<B, M, F>(&self, baseline: &B, modified: &M, mut progress: F) -> Result<DiffOutput>
    where
        B: WorldSource,
        M: WorldSource,
        F: FnMut(&DiffSummary),
    {
        let positions = modified
            .chunk_positions()
            .context("listing chunks of the modified world")?;

        let mut structure = ScarifStructure::new(self.modified_map.clone());
        let mut summary = DiffSummary {
            total_chunks: positions.len(),
            ..Default::default()
        };

        log::info!(
            "Diffing {} chunks (bounds: {}, tiles: {:?})",
            positions.len(),
            self.options.bounds,
            self.options.tiles
        );

        for pos in positions {
            summary.visited_chunks += 1;

            if !baseline.chunk_exists(pos) || !self.options.bounds.coarse_contains(pos) {
                summary.skipped_chunks += 1;
                progress(&summary);
                continue;
            }
            summary.processed_chunks += 1;

            let chunk = modified
                .load_chunk(pos)
                .with_context(|| format!("loading modified chunk ({}, {})", pos.x, pos.z))?;
            let base = baseline
                .load_chunk(pos)
                .with_context(|| format!("loading baseline chunk ({}, {})", pos.x, pos.z))?;

            let blocks_before = summary.diffed_blocks;

            for y in 0..CHUNK_HEIGHT {
                for x in 0..CHUNK_WIDTH {
                    for z in 0..CHUNK_WIDTH {
                        let (wx, wz) = (pos.min_block_x() + x as i64, pos.min_block_z() + z as i64);
                        if !self.options.bounds.contains(wx, y, wz) {
                            continue;
                        }

                        let (ux, uy, uz) = (x as usize, y as usize, z as usize);
                        let id = chunk.block_id(ux, uy, uz);
                        let id_base = base.block_id(ux, uy, uz);

                        let (Some(name), Some(name_base)) =
                            (self.modified_map.get(id), self.baseline_map.get(id_base))
                        else {
                            summary.unresolved_blocks += 1;
                            continue;
                        };

                        let metadata = chunk.metadata(ux, uy, uz);
                        let tile = chunk.tile_entity(ux, uy, uz);
                        let tile_equal = self
                            .options
                            .tiles
                            .equal(tile, base.tile_entity(ux, uy, uz));

                        if name == name_base && metadata == base.metadata(ux, uy, uz) && tile_equal {
                            continue;
                        }

                        if !tile_equal {
                            summary.diffed_tiles += 1;
                        }
                        summary.diffed_blocks += 1;
                        structure.add(pos, LocalPos::new(x, y, z)?, BlockDiff::new(id, metadata, tile.cloned()));
                    }
                }
            }

            if summary.diffed_blocks != blocks_before {
                summary.diffed_chunks += 1;
            }

            log::debug!(
                "Chunk ({}, {}): {} diffed blocks",
                pos.x,
                pos.z,
                summary.diffed_blocks - blocks_before
            );
            progress(&summary);
        }

        if summary.unresolved_blocks > 0 {
            log::warn!(
                "{} blocks had ids missing from an id mapping and were treated as unchanged",
                summary.unresolved_blocks
            );
        }
        log::info!(
            "Diff done: {} blocks in {} chunks ({} tile entities)",
            summary.diffed_blocks,
            summary.diffed_chunks,
            summary.diffed_tiles
        );

        Ok(DiffOutput { structure, summary })
    }
}
