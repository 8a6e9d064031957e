use serde::{Deserialize, Serialize};

use crate::geometry::{Dims, Geometry};

/// Knobs for the randomized position calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomConfig {
    /// PRNG seed; negative means a time-based seed.
    #[serde(default = "default_seed")]
    pub seed: i64,
    /// How many times to retry one candidate canvas size.
    #[serde(default = "default_max_layout_tries")]
    pub max_layout_tries: u32,
    /// How many positions to sample for one image before giving up.
    #[serde(default = "default_max_image_tries")]
    pub max_image_tries: u32,
    /// Stop bisecting once the remaining range is within this factor of the
    /// target canvas width.
    #[serde(default = "default_size_tolerance")]
    pub size_tolerance: f64,
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            max_layout_tries: default_max_layout_tries(),
            max_image_tries: default_max_image_tries(),
            size_tolerance: default_size_tolerance(),
        }
    }
}

/// Knobs for the whitespace balancer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancerConfig {
    /// Balance passes per axis; zero skips balancing entirely.
    #[serde(default = "default_balance_iterations")]
    pub max_iterations: u32,
    /// An axis converges once the worst imbalance drops below this factor
    /// of the image's slack.
    #[serde(default = "default_balance_tolerance")]
    pub tolerance: f64,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_balance_iterations(),
            tolerance: default_balance_tolerance(),
        }
    }
}

/// Knobs for the tile-in-order position calculator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileConfig {
    /// Tile images in exact input order instead of sorting by size.
    #[serde(default)]
    pub exact_order: bool,
    /// Flow images into columns (fixed canvas height) instead of rows.
    #[serde(default)]
    pub columns: bool,
}

/// Axes selected for scale-to-minimum initialization.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScaleToMin {
    pub x: bool,
    pub y: bool,
}

/// Uniform cropping/scaling applied by the dimension initializer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UniformConfig {
    #[serde(default)]
    pub cropping: Geometry,
    #[serde(default)]
    pub scaling: Geometry,
    /// Scale every image down to the smallest intrinsic extent on the
    /// selected axes.
    #[serde(default)]
    pub scale_to_min: Option<ScaleToMin>,
}

/// Configuration shared by a layout and the calculators operating on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Minimum acceptable output size; a zero component is unbounded.
    #[serde(default)]
    pub min_canvas_size: Dims,
    /// Maximum acceptable output size; a zero component is unbounded.
    #[serde(default)]
    pub max_canvas_size: Dims,
    /// Target `width/height` of the output, as a geometry. `!` (aspect
    /// preservation off) marks the ratio a strict requirement rather than a
    /// preference.
    #[serde(default)]
    pub aspect_ratio: Geometry,
    /// Whitespace margin kept around each image during placement.
    #[serde(default)]
    pub padding: Geometry,
    #[serde(default)]
    pub random: RandomConfig,
    #[serde(default)]
    pub tile: TileConfig,
    #[serde(default)]
    pub balancer: BalancerConfig,
    #[serde(default)]
    pub uniform: UniformConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_canvas_size: Dims::ZERO,
            max_canvas_size: Dims::ZERO,
            aspect_ratio: Geometry::empty(),
            padding: Geometry::empty(),
            random: RandomConfig::default(),
            tile: TileConfig::default(),
            balancer: BalancerConfig::default(),
            uniform: UniformConfig::default(),
        }
    }
}

impl LayoutConfig {
    /// The target aspect ratio as `(ratio, strict)`. The ratio is zero when
    /// unset (no width/height, or a zero height).
    pub fn aspect_target(&self) -> (f64, bool) {
        let geom = &self.aspect_ratio;
        let ratio = match (geom.width, geom.height) {
            (Some(w), Some(h)) if h.value != 0.0 => w.value / h.value,
            _ => 0.0,
        };
        (ratio, !geom.preserve_aspect)
    }

    /// Create a fluent builder for `LayoutConfig`.
    pub fn builder() -> LayoutConfigBuilder {
        LayoutConfigBuilder::new()
    }
}

fn default_seed() -> i64 {
    -1
}
fn default_max_layout_tries() -> u32 {
    25
}
fn default_max_image_tries() -> u32 {
    100
}
fn default_size_tolerance() -> f64 {
    0.1
}
fn default_balance_iterations() -> u32 {
    4
}
fn default_balance_tolerance() -> f64 {
    0.01
}

/// Builder for [`LayoutConfig`] for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct LayoutConfigBuilder {
    cfg: LayoutConfig,
}

impl LayoutConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: LayoutConfig::default(),
        }
    }
    pub fn min_canvas_size(mut self, v: Dims) -> Self {
        self.cfg.min_canvas_size = v;
        self
    }
    pub fn max_canvas_size(mut self, v: Dims) -> Self {
        self.cfg.max_canvas_size = v;
        self
    }
    pub fn aspect_ratio(mut self, v: Geometry) -> Self {
        self.cfg.aspect_ratio = v;
        self
    }
    pub fn padding(mut self, v: Geometry) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn seed(mut self, v: i64) -> Self {
        self.cfg.random.seed = v;
        self
    }
    pub fn max_layout_tries(mut self, v: u32) -> Self {
        self.cfg.random.max_layout_tries = v;
        self
    }
    pub fn max_image_tries(mut self, v: u32) -> Self {
        self.cfg.random.max_image_tries = v;
        self
    }
    pub fn size_tolerance(mut self, v: f64) -> Self {
        self.cfg.random.size_tolerance = v;
        self
    }
    pub fn balance_iterations(mut self, v: u32) -> Self {
        self.cfg.balancer.max_iterations = v;
        self
    }
    pub fn balance_tolerance(mut self, v: f64) -> Self {
        self.cfg.balancer.tolerance = v;
        self
    }
    pub fn exact_order(mut self, v: bool) -> Self {
        self.cfg.tile.exact_order = v;
        self
    }
    pub fn columns(mut self, v: bool) -> Self {
        self.cfg.tile.columns = v;
        self
    }
    pub fn uniform_cropping(mut self, v: Geometry) -> Self {
        self.cfg.uniform.cropping = v;
        self
    }
    pub fn uniform_scaling(mut self, v: Geometry) -> Self {
        self.cfg.uniform.scaling = v;
        self
    }
    pub fn scale_to_min(mut self, x: bool, y: bool) -> Self {
        self.cfg.uniform.scale_to_min = Some(ScaleToMin { x, y });
        self
    }
    pub fn build(self) -> LayoutConfig {
        self.cfg
    }
}
