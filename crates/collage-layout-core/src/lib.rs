//! Core library for composing input images into a single collage canvas.
//!
//! - Calculators: `RandomCalculator` (rejection sampling + canvas-size
//!   bisection) and `TileInOrderCalculator` (row/column tiling with a
//!   search over the fixed canvas dimension)
//! - `balance` recenters placed images within their surrounding whitespace
//! - Geometry algebra for ImageMagick-style crop/scale/padding strings
//! - Data model is serde-serializable; decoding pixels and rendering the
//!   finished layout live in consumer crates.
//!
//! Quick example:
//! ```ignore
//! use collage_layout_core::prelude::*;
//! use std::sync::Arc;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(LayoutConfig::builder().padding("2%".parse()?).build());
//! let layout = ImageLayout::new(config, vec![
//!     ("a.png".into(), Dims::new(1024.0, 768.0)),
//!     ("b.png".into(), Dims::new(800.0, 600.0)),
//! ]);
//! let packed = TileInOrderCalculator.calculate_positions(&layout)?;
//! # Ok(()) }
//! ```

pub mod balance;
pub mod calculator;
pub mod config;
pub mod error;
pub mod geometry;
pub mod init;
pub mod layout;

pub use balance::*;
pub use calculator::*;
pub use config::*;
pub use error::*;
pub use geometry::*;
pub use init::*;
pub use layout::*;

/// Convenience prelude for common types and functions.
/// Importing `collage_layout_core::prelude::*` brings the primary APIs into
/// scope.
pub mod prelude {
    pub use crate::balance::balance;
    pub use crate::calculator::{PositionCalculator, RandomCalculator, TileInOrderCalculator};
    pub use crate::config::{
        BalancerConfig, LayoutConfig, LayoutConfigBuilder, RandomConfig, ScaleToMin, TileConfig,
        UniformConfig,
    };
    pub use crate::error::{CollageError, Result};
    pub use crate::geometry::{
        scale_and_crop, Axis, Dims, Geometry, Measure, ScalingMode, Unit,
    };
    pub use crate::init::{DimensionInitializer, PassThrough, Uniform};
    pub use crate::layout::{overlap, ImageId, ImageInfo, ImageLayout};
}
