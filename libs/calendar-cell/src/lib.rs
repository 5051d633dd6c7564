pub mod grid;
pub mod models;

pub use grid::{generate, hour_rows, month_grid, month_grid_of, navigate, week_grid, year_grid};
pub use models::*;
