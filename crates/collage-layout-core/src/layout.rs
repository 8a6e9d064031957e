use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::geometry::{scale_and_crop, Dims, Geometry, Unit};

/// Identifier assigned to an input image at ingest, dense from zero and
/// stable for the lifetime of a layout.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ImageId(pub usize);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable metadata about one input image. The core never dereferences
/// `path`; decoding pixels is the renderer's business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub id: ImageId,
    pub path: PathBuf,
    /// Pixel size as decoded from the source file; never modified here.
    pub intrinsic: Dims,
}

/// The layout of a collage under construction: per-image scaling, cropping,
/// derived on-canvas dimensions and (once calculated) positions, plus the
/// canvas size.
///
/// Cloning a layout copies every per-image table but shares the immutable
/// `info` metadata and configuration, so position calculators can duplicate
/// cheaply while they search.
#[derive(Clone)]
pub struct ImageLayout {
    canvas: Dims,
    config: Arc<LayoutConfig>,
    images: Vec<ImageId>,
    info: Arc<Vec<ImageInfo>>,
    dimensions: Vec<Dims>,
    scaling: Vec<Geometry>,
    cropping: Vec<Geometry>,
    positions: Vec<Option<Dims>>,
}

impl ImageLayout {
    /// Ingests image metadata, assigning identifiers in input order. Every
    /// image starts with empty scaling/cropping and its intrinsic size.
    pub fn new(config: Arc<LayoutConfig>, sources: Vec<(PathBuf, Dims)>) -> Self {
        let info: Vec<ImageInfo> = sources
            .into_iter()
            .enumerate()
            .map(|(i, (path, intrinsic))| ImageInfo {
                id: ImageId(i),
                path,
                intrinsic,
            })
            .collect();
        let n = info.len();
        Self {
            canvas: Dims::ZERO,
            config,
            images: (0..n).map(ImageId).collect(),
            dimensions: info.iter().map(|i| i.intrinsic).collect(),
            info: Arc::new(info),
            scaling: vec![Geometry::empty(); n],
            cropping: vec![Geometry::empty(); n],
            positions: vec![None; n],
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub(crate) fn replace_config(&mut self, config: Arc<LayoutConfig>) {
        self.config = config;
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn positioned_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_some()).count()
    }

    pub fn canvas_size(&self) -> Dims {
        self.canvas
    }

    pub fn set_canvas_size(&mut self, size: Dims) {
        self.canvas = size;
    }

    /// Image identifiers in stable input order.
    pub fn images(&self) -> &[ImageId] {
        &self.images
    }

    pub fn info_of(&self, id: ImageId) -> &ImageInfo {
        &self.info[id.0]
    }

    /// On-canvas size of the image after scaling and cropping.
    pub fn dimensions_of(&self, id: ImageId) -> Dims {
        self.dimensions[id.0]
    }

    pub fn scaling_of(&self, id: ImageId) -> Geometry {
        self.scaling[id.0]
    }

    pub fn cropping_of(&self, id: ImageId) -> Geometry {
        self.cropping[id.0]
    }

    pub fn position_of(&self, id: ImageId) -> Option<Dims> {
        self.positions[id.0]
    }

    /// Places the image and reports the first positioned neighbor whose
    /// padded rectangle overlaps it. The position is kept even on collision;
    /// the caller retries or undoes.
    pub fn set_position(&mut self, id: ImageId, position: Dims) -> Option<ImageId> {
        self.positions[id.0] = Some(position);
        self.test_collision(id)
    }

    /// Replaces the image's scaling geometry and rederives its dimensions.
    pub fn set_scaling(&mut self, id: ImageId, geometry: Geometry) -> Option<ImageId> {
        self.scaling[id.0] = geometry;
        self.refresh_dimensions(id);
        if self.positions[id.0].is_some() {
            None
        } else {
            self.test_collision(id)
        }
    }

    /// Replaces the image's cropping geometry and rederives its dimensions.
    pub fn set_cropping(&mut self, id: ImageId, geometry: Geometry) -> Option<ImageId> {
        self.cropping[id.0] = geometry;
        self.refresh_dimensions(id);
        if self.positions[id.0].is_some() {
            None
        } else {
            self.test_collision(id)
        }
    }

    fn refresh_dimensions(&mut self, id: ImageId) {
        self.dimensions[id.0] = scale_and_crop(
            self.info[id.0].intrinsic,
            &self.cropping[id.0],
            &self.scaling[id.0],
        );
    }

    pub fn clear_positions(&mut self) {
        for p in self.positions.iter_mut() {
            *p = None;
        }
    }

    /// Resets scaling and cropping to empty and dimensions to intrinsic.
    pub fn clear_dimensions(&mut self) {
        for (i, info) in self.info.iter().enumerate() {
            self.scaling[i] = Geometry::empty();
            self.cropping[i] = Geometry::empty();
            self.dimensions[i] = info.intrinsic;
        }
    }

    /// A copy whose per-image tables are independent; `info` stays shared.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// The first positioned image other than `id` whose padded rectangle
    /// overlaps `id`'s (an unpositioned `id` is tested at the origin).
    pub fn test_collision(&self, id: ImageId) -> Option<ImageId> {
        let pos = self.positions[id.0].unwrap_or_default();
        let dims = self.dimensions[id.0];
        let pad = self.padding_of(id);
        for &other in &self.images {
            if other == id || self.positions[other.0].is_none() {
                continue;
            }
            let ov = overlap_rects(
                pos,
                dims,
                pad,
                self.positions[other.0].unwrap_or_default(),
                self.dimensions[other.0],
                self.padding_of(other),
            );
            if ov.x > 0.0 && ov.y > 0.0 {
                return Some(other);
            }
        }
        None
    }

    /// Whitespace kept around the image during placement, per axis. A
    /// padding geometry with no size means no padding.
    pub fn padding_of(&self, id: ImageId) -> Dims {
        let padding = &self.config.padding;
        if !padding.has_size() {
            return Dims::ZERO;
        }
        padding.scale(self.dimensions_of(id))
    }

    /// Whether padding scales with image size (percent units) rather than
    /// being a fixed pixel margin.
    pub fn padding_is_relative(&self) -> bool {
        let padding = &self.config.padding;
        padding.has_size() && padding.unit() == Unit::Percent
    }

    /// Smallest and largest single-axis extent over all images.
    pub fn dimension_extremes(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &img in &self.images {
            let dims = self.dimensions_of(img);
            min = min.min(dims.min_axis());
            max = max.max(dims.max_axis());
        }
        (min, max)
    }

    /// Per-axis minima, maxima and sums of image dimensions, optionally
    /// padded on both sides.
    pub fn size_range(&self, with_padding: bool) -> (Dims, Dims, Dims) {
        let mut minima = Dims::ZERO;
        let mut maxima = Dims::ZERO;
        let mut sums = Dims::ZERO;
        for &img in &self.images {
            let mut dims = self.dimensions_of(img);
            if with_padding {
                let pad = self.padding_of(img);
                dims.x += 2.0 * pad.x;
                dims.y += 2.0 * pad.y;
            }
            sums.x += dims.x;
            sums.y += dims.y;
            if minima.x == 0.0 || dims.x < minima.x {
                minima.x = dims.x;
            }
            if maxima.x == 0.0 || dims.x > maxima.x {
                maxima.x = dims.x;
            }
            if minima.y == 0.0 || dims.y < minima.y {
                minima.y = dims.y;
            }
            if maxima.y == 0.0 || dims.y > maxima.y {
                maxima.y = dims.y;
            }
        }
        (minima, maxima, sums)
    }

    /// The configured target aspect ratio, or the mean of per-image `x/y`
    /// ratios when none is configured.
    pub fn auto_aspect_ratio(&self) -> f64 {
        let (ratio, _) = self.config.aspect_target();
        if ratio != 0.0 {
            return ratio;
        }
        let sum: f64 = self
            .images
            .iter()
            .map(|&img| {
                let dims = self.dimensions_of(img);
                dims.x / dims.y
            })
            .sum();
        sum / self.images.len() as f64
    }
}

/// Signed 2-D overlap of the padded rectangles of two images. A collision is
/// a positive overlap on both axes; either component `<= 0` means the pair
/// is clear of each other.
pub fn overlap(layout: &ImageLayout, a: ImageId, b: ImageId) -> Dims {
    overlap_rects(
        layout.position_of(a).unwrap_or_default(),
        layout.dimensions_of(a),
        layout.padding_of(a),
        layout.position_of(b).unwrap_or_default(),
        layout.dimensions_of(b),
        layout.padding_of(b),
    )
}

fn overlap_rects(p1: Dims, d1: Dims, q1: Dims, p2: Dims, d2: Dims, q2: Dims) -> Dims {
    let ox = (p1.x + d1.x + q1.x - (p2.x - q2.x)).min(p2.x + d2.x + q2.x - (p1.x - q1.x));
    let oy = (p1.y + d1.y + q1.y - (p2.y - q2.y)).min(p2.y + d2.y + q2.y - (p1.y - q1.y));
    Dims::new(ox, oy)
}
