//! Execution options shared by the per-cell stages

use rainsite_parallel::{ProcessingMode, TiledProcessor};

/// Default height of a row-band tile
pub const DEFAULT_TILE_ROWS: usize = 256;

/// How a per-cell stage splits and schedules its work.
///
/// Neither field affects results: every stage produces bit-identical
/// output for any mode and tile height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    pub mode: ProcessingMode,
    pub tile_rows: usize,
}

impl Execution {
    pub fn new(mode: ProcessingMode, tile_rows: usize) -> Self {
        Self { mode, tile_rows }
    }

    /// Single-threaded execution with default tiling
    pub fn sequential() -> Self {
        Self::new(ProcessingMode::Sequential, DEFAULT_TILE_ROWS)
    }

    pub(crate) fn processor(&self, rows: usize, cols: usize) -> TiledProcessor {
        TiledProcessor::new(rows, cols, self.tile_rows, self.mode)
    }
}

impl Default for Execution {
    fn default() -> Self {
        Self::new(ProcessingMode::Parallel, DEFAULT_TILE_ROWS)
    }
}
