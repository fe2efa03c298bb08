//! Translating legacy schematics between two id mappings.
//!
//! Block ids are compared by name: each id is looked up in the source
//! mapping and replaced by the id carrying the same name in the target
//! mapping. Ids that cannot be translated are reported, not fatal.

pub mod legacy;
pub mod repack;
pub mod schematic;
pub mod translate;

pub use legacy::{ExtensionTooShort, LegacyBlocks, MAX_LEGACY_ID};
pub use repack::{BlockCoord, Footprint, RepackReport, TranslationFailure, recover_position, repack};
pub use schematic::Schematic;
pub use translate::{TranslationError, Translator};

use scarif_format::IdMap;

/// Translate the blocks of `schematic` in place.
pub fn translate_schematic<F>(
    schematic: &mut Schematic,
    source: &IdMap,
    target: &IdMap,
    progress: F,
) -> anyhow::Result<RepackReport>
where
    F: FnMut(usize, usize),
{
    let footprint = schematic.footprint()?;
    let mut blocks = schematic.legacy_blocks()?;

    log::info!(
        "Translating {} blocks ({}x{} footprint)",
        blocks.len(),
        footprint.width,
        footprint.length
    );
    let report = repack(&mut blocks, source, target, footprint, 10_000, progress);
    schematic.set_legacy_blocks(blocks);

    Ok(report)
}
