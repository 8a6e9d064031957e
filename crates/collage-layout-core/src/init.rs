//! Dimension initializers set per-image cropping and scaling before any
//! position calculation runs.

use crate::error::Result;
use crate::geometry::Measure;
use crate::layout::{ImageId, ImageLayout};

pub trait DimensionInitializer {
    fn initialize_dimensions(&self, layout: &mut ImageLayout) -> Result<()>;
}

/// Sends every image through at its intrinsic size.
pub struct PassThrough;

impl DimensionInitializer for PassThrough {
    fn initialize_dimensions(&self, _layout: &mut ImageLayout) -> Result<()> {
        Ok(())
    }
}

/// Applies the configured uniform cropping and scaling geometries to every
/// image. With `scale_to_min` set, the scaling's width/height are overridden
/// by the smallest intrinsic extent on the selected axes.
pub struct Uniform;

impl DimensionInitializer for Uniform {
    fn initialize_dimensions(&self, layout: &mut ImageLayout) -> Result<()> {
        let uniform = layout.config().uniform.clone();
        let cropping = uniform.cropping;
        let mut scaling = uniform.scaling;
        if let Some(to_min) = uniform.scale_to_min {
            let mut min_width = f64::INFINITY;
            let mut min_height = f64::INFINITY;
            for &img in layout.images() {
                let intrinsic = layout.info_of(img).intrinsic;
                if to_min.x {
                    min_width = min_width.min(intrinsic.x);
                }
                if to_min.y {
                    min_height = min_height.min(intrinsic.y);
                }
            }
            if min_width.is_finite() {
                scaling.width = Some(Measure::px(min_width));
            }
            if min_height.is_finite() {
                scaling.height = Some(Measure::px(min_height));
            }
        }
        let ids: Vec<ImageId> = layout.images().to_vec();
        for img in ids {
            let _ = layout.set_cropping(img, cropping);
            let _ = layout.set_scaling(img, scaling);
        }
        Ok(())
    }
}
