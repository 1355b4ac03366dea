//! # RainSite Parallel
//!
//! Parallel processing strategies for per-cell raster stages.
//!
//! This crate provides:
//! - Processing modes (sequential, global pool, dedicated pool)
//! - Row-band tiling with disjoint output slices, so parallel results are
//!   bit-identical to sequential ones

pub mod strategy;
pub mod tiled;

pub use strategy::ProcessingMode;
pub use tiled::{Tile, TileLayout, TiledProcessor};
