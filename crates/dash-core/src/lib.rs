pub mod config;
pub mod id;
pub mod model;
pub mod placement;
pub mod resize;

pub use config::CanvasConfig;
pub use id::WidgetId;
pub use model::*;
pub use placement::{
    SNAP_UNIT, clamp_to_viewport, enforce_no_straddle, find_optimal_position, has_overlap,
    overlaps_any, snap_to_grid, straddles_any, straddles_boundary,
};
pub use resize::resize_geometry;
