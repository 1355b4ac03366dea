//! Tiled processing for per-cell raster stages
//!
//! A raster is cut into horizontal bands of whole rows. Each band owns a
//! contiguous, disjoint slice of the row-major output buffer, so tiles are
//! computed without locks and the only synchronization point is the final
//! collect.

use crate::strategy::ProcessingMode;
use rayon::prelude::*;

/// A band of consecutive rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Position of this tile in the layout (top to bottom)
    pub index: usize,
    /// First source row covered by this tile
    pub row_offset: usize,
    /// Number of rows in this tile
    pub rows: usize,
    /// Number of columns (always the full raster width)
    pub cols: usize,
}

impl Tile {
    /// Source rows covered by this tile
    pub fn row_range(&self) -> std::ops::Range<usize> {
        self.row_offset..self.row_offset + self.rows
    }

    /// Number of cells in this tile
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert a tile-local linear offset to source (row, col)
    pub fn to_source_coords(&self, offset: usize) -> (usize, usize) {
        (self.row_offset + offset / self.cols, offset % self.cols)
    }
}

/// Partition of a raster into disjoint row-band tiles
#[derive(Debug, Clone)]
pub struct TileLayout {
    rows: usize,
    cols: usize,
    tile_rows: usize,
    tiles: Vec<Tile>,
}

impl TileLayout {
    /// Create a layout of bands `tile_rows` high (the last band may be shorter).
    pub fn new(rows: usize, cols: usize, tile_rows: usize) -> Self {
        let tile_rows = tile_rows.max(1);
        let mut tiles = Vec::with_capacity(rows.div_ceil(tile_rows));
        let mut row_offset = 0;
        while row_offset < rows {
            let band = tile_rows.min(rows - row_offset);
            tiles.push(Tile {
                index: tiles.len(),
                row_offset,
                rows: band,
                cols,
            });
            row_offset += band;
        }

        Self {
            rows,
            cols,
            tile_rows,
            tiles,
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Total number of cells covered
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    fn chunk_len(&self) -> usize {
        (self.tile_rows * self.cols).max(1)
    }
}

/// Processor running a per-tile closure over a layout
#[derive(Debug, Clone)]
pub struct TiledProcessor {
    layout: TileLayout,
    mode: ProcessingMode,
}

impl TiledProcessor {
    /// Create a new tiled processor
    pub fn new(rows: usize, cols: usize, tile_rows: usize, mode: ProcessingMode) -> Self {
        Self {
            layout: TileLayout::new(rows, cols, tile_rows),
            mode,
        }
    }

    pub fn layout(&self) -> &TileLayout {
        &self.layout
    }

    /// Allocate a row-major buffer filled with `fill` and let `f` write each
    /// tile's disjoint slice of it.
    ///
    /// `f` receives the tile and its output slice (`tile.len()` cells) and
    /// returns a per-tile summary. Summaries come back in tile order, so the
    /// outcome is identical for every processing mode.
    pub fn generate<U, A, F>(&self, fill: U, f: F) -> (Vec<U>, Vec<A>)
    where
        U: Clone + Send,
        A: Send,
        F: Fn(&Tile, &mut [U]) -> A + Sync + Send,
    {
        let mut output = vec![fill; self.layout.cell_count()];
        let summaries = self.process(&mut output, f);
        (output, summaries)
    }

    /// Run `f` over the tiles of an existing row-major buffer.
    pub fn process<U, A, F>(&self, output: &mut [U], f: F) -> Vec<A>
    where
        U: Send,
        A: Send,
        F: Fn(&Tile, &mut [U]) -> A + Sync + Send,
    {
        debug_assert_eq!(output.len(), self.layout.cell_count());
        let chunk = self.layout.chunk_len();
        let tiles = self.layout.tiles();

        match self.mode {
            ProcessingMode::Sequential => output
                .chunks_mut(chunk)
                .zip(tiles.iter())
                .map(|(slice, tile)| f(tile, slice))
                .collect(),
            ProcessingMode::Parallel | ProcessingMode::ParallelWith(_) => self.mode.install(|| {
                output
                    .par_chunks_mut(chunk)
                    .zip(tiles.par_iter())
                    .map(|(slice, tile)| f(tile, slice))
                    .collect()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_covers_every_row_once() {
        let layout = TileLayout::new(100, 7, 32);
        let tiles = layout.tiles();
        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles[0].row_range(), 0..32);
        assert_eq!(tiles[3].row_range(), 96..100);

        let mut covered = vec![0u8; 100];
        for tile in tiles {
            for r in tile.row_range() {
                covered[r] += 1;
            }
        }
        assert!(covered.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_zero_tile_rows_is_clamped() {
        let layout = TileLayout::new(3, 3, 0);
        assert_eq!(layout.tiles().len(), 3);
    }

    #[test]
    fn test_tile_local_coordinates() {
        let tile = Tile {
            index: 1,
            row_offset: 10,
            rows: 4,
            cols: 5,
        };
        assert_eq!(tile.to_source_coords(0), (10, 0));
        assert_eq!(tile.to_source_coords(7), (11, 2));
    }

    #[test]
    fn test_generate_is_mode_independent() {
        let run = |mode| {
            TiledProcessor::new(37, 11, 5, mode).generate(0usize, |tile, out| {
                for (offset, cell) in out.iter_mut().enumerate() {
                    let (r, c) = tile.to_source_coords(offset);
                    *cell = r * 11 + c;
                }
                tile.index
            })
        };

        let (seq, seq_tiles) = run(ProcessingMode::Sequential);
        let (par, par_tiles) = run(ProcessingMode::Parallel);
        let (pool, pool_tiles) = run(ProcessingMode::ParallelWith(3));

        assert_eq!(seq, (0..37 * 11).collect::<Vec<_>>());
        assert_eq!(seq, par);
        assert_eq!(seq, pool);
        assert_eq!(seq_tiles, (0..8).collect::<Vec<_>>());
        assert_eq!(seq_tiles, par_tiles);
        assert_eq!(seq_tiles, pool_tiles);
    }
}
