/// Counters of a diff pass, updated after every chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    /// Chunks stored in the modified world.
    pub total_chunks: usize,
    /// Chunks looked at so far (processed + skipped).
    pub visited_chunks: usize,
    pub processed_chunks: usize,
    /// Missing from the baseline or outside the bounds.
    pub skipped_chunks: usize,
    /// Processed chunks with at least one diffed block.
    pub diffed_chunks: usize,
    pub diffed_blocks: usize,
    /// Diffed blocks whose tile entity differed.
    pub diffed_tiles: usize,
    /// Voxels skipped because an id had no name in its world's mapping.
    pub unresolved_blocks: usize,
}

impl DiffSummary {
    pub fn remaining_chunks(&self) -> usize {
        self.total_chunks.saturating_sub(self.visited_chunks)
    }

    /// Fraction of chunks visited, in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        if self.total_chunks == 0 {
            1.0
        } else {
            self.visited_chunks as f32 / self.total_chunks as f32
        }
    }

    pub fn generate_report(&self) -> String {
        format!(
            "SCRF Diff Report\n\
             ================\n\
             Total Chunks     : {}\n\
             Remaining Chunks : {}\n\
             Processed Chunks : {}\n\
             Skipped Chunks   : {}\n\
             Diffed Chunks    : {}\n\
             Diffed Blocks    : {}\n\
             Diffed TEs       : {}\n\
             Unresolved Blocks: {}\n",
            self.total_chunks,
            self.remaining_chunks(),
            self.processed_chunks,
            self.skipped_chunks,
            self.diffed_chunks,
            self.diffed_blocks,
            self.diffed_tiles,
            self.unresolved_blocks,
        )
    }
}
