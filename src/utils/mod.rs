//! Utility module with helper functions
//!
//! This module provides:
//! - Configuration handling
//! - Generator save/load and artifact naming
//! - Sample-grid visualization

pub mod config;
mod artifacts;
mod grid;

pub use config::Config;
pub use artifacts::{
    epoch_snapshot_path, final_snapshot_path, generator_path, load_generator, save_generator,
    GENERATOR_FILE,
};
pub use grid::{make_grid, save_grid, GRID_PADDING};
