use scarif_format::IdMap;

use crate::legacy::LegacyBlocks;
use crate::translate::{TranslationError, Translator};

/// Schematic voxel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl std::fmt::Display for BlockCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Recover the coordinate of a flat schematic index (X fastest, then Z,
/// then Y). Both divisions use `width`, exactly as legacy tools do, so the
/// result is only exact for square footprints.
pub fn recover_position(index: usize, length: i32, width: i32) -> Option<BlockCoord> {
    if length <= 0 || width <= 0 {
        return None;
    }
    let (index, length, width) = (index as i64, length as i64, width as i64);
    let x = index % length;
    let z = ((index - x) / width) % length;
    let y = (((index - x) / width) - z) / length;
    Some(BlockCoord {
        x: x as i32,
        y: y as i32,
        z: z as i32,
    })
}

/// A voxel whose id could not be translated. It kept its low byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationFailure {
    pub index: usize,
    pub position: Option<BlockCoord>,
    pub error: TranslationError,
}

impl std::fmt::Display for TranslationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{} at {}", self.error, pos),
            None => write!(f, "{} at index {}", self.error, self.index),
        }
    }
}

/// Outcome of a repack pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepackReport {
    pub total_blocks: usize,
    pub translated_blocks: usize,
    pub failures: Vec<TranslationFailure>,
}

impl RepackReport {
    pub fn failed_blocks(&self) -> usize {
        self.failures.len()
    }

    pub fn generate_report(&self) -> String {
        let mut report = format!(
            "Schematic Translation Report\n\
             ============================\n\
             Total Blocks     : {}\n\
             Translated Blocks: {}\n\
             Failed Blocks    : {}\n",
            self.total_blocks,
            self.translated_blocks,
            self.failed_blocks(),
        );
        for failure in &self.failures {
            report.push_str(&format!("Failed ID: {}\n", failure));
        }
        report
    }
}

/// Schematic footprint used to recover failure coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub length: i32,
    pub width: i32,
}

/// Translates every voxel of `blocks` from `source` ids to `target` ids in
/// place.
///
/// A voxel that cannot be translated keeps its low byte, gets a zero high
/// nibble and is listed in the report; the pass always runs to the end.
/// `progress` is called with `(done, total)` every `progress_every` voxels
/// and once at the end.
pub fn repack<F>(
    blocks: &mut LegacyBlocks,
    source: &IdMap,
    target: &IdMap,
    footprint: Footprint,
    progress_every: usize,
    mut progress: F,
) -> RepackReport
where
    F: FnMut(usize, usize),
{
    let translator = Translator::new(source, target);
    let total = blocks.len();
    let mut report = RepackReport {
        total_blocks: total,
        ..Default::default()
    };

    for index in 0..total {
        let old_id = blocks.get(index);
        let new_id = match translator.translate(old_id as i16) {
            Ok(id) => {
                report.translated_blocks += 1;
                id as u16
            }
            Err(error) => {
                let failure = TranslationFailure {
                    index,
                    position: recover_position(index, footprint.length, footprint.width),
                    error,
                };
                log::debug!("Failed ID: {}", failure);
                report.failures.push(failure);
                old_id & 0xFF
            }
        };
        blocks.set(index, new_id);

        if progress_every > 0 && index % progress_every == 0 {
            progress(index + 1, total);
        }
    }
    progress(total, total);

    if !report.failures.is_empty() {
        log::warn!("{} of {} blocks could not be translated", report.failures.len(), total);
    }
    report
}
