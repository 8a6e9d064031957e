use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CollageError;

/// Axis selector: `X` is the horizontal axis, `Y` the vertical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The other axis.
    #[inline]
    pub fn flip(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// An `(x, y)` pair of floats representing a size or a coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dims {
    pub x: f64,
    pub y: f64,
}

impl Dims {
    pub const ZERO: Dims = Dims { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component along the given axis.
    #[inline]
    pub fn dim(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Sets the component along the given axis.
    #[inline]
    pub fn set_dim(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.x * self.y
    }

    #[inline]
    pub fn min_axis(&self) -> f64 {
        self.x.min(self.y)
    }

    #[inline]
    pub fn max_axis(&self) -> f64 {
        self.x.max(self.y)
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", fmt_float(self.x), fmt_float(self.y))
    }
}

/// Parses `N`, `NxM`, `N,M`, `Nx` or `xM` (an absent component is zero; a
/// single number is used for both axes).
impl FromStr for Dims {
    type Err = CollageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dims(s).ok_or_else(|| CollageError::MalformedDims(s.to_string()))
    }
}

/// Units carried by a [`Measure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Pixels,
    Percent,
}

/// A unit-bearing image measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub value: f64,
    pub unit: Unit,
}

impl Measure {
    pub fn px(value: f64) -> Self {
        Self {
            value,
            unit: Unit::Pixels,
        }
    }

    pub fn percent(value: f64) -> Self {
        Self {
            value,
            unit: Unit::Percent,
        }
    }

    /// The measurement in pixels, resolved against a full extent.
    #[inline]
    pub fn resolve(&self, full: f64) -> f64 {
        match self.unit {
            Unit::Pixels => self.value,
            Unit::Percent => full * self.value / 100.0,
        }
    }
}

/// When a scaling geometry applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMode {
    /// Always scale, no matter the size of the image being scaled.
    Always,
    /// Scale only if the image is larger than the given size (`>`).
    DownOnly,
    /// Scale only if the image is smaller than the given size (`<`).
    UpOnly,
}

/// An image operation (cropping, scaling, padding) parsed from an
/// ImageMagick-style geometry string `[W][xH][±X±Y][%][!][<>]`.
///
/// `%` applies percent units to all four scalars, `!` disables aspect
/// preservation, `<`/`>` restrict scaling direction. Any scalar may be
/// absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Crop-box width, or the horizontal extent of a scaled image.
    pub width: Option<Measure>,
    /// Crop-box height, or the vertical extent of a scaled image.
    pub height: Option<Measure>,
    /// Horizontal offset of the upper-left corner of the crop-box.
    pub x: Option<Measure>,
    /// Vertical offset of the upper-left corner of the crop-box.
    pub y: Option<Measure>,
    /// Scaling keeps the original aspect ratio when set.
    pub preserve_aspect: bool,
    pub scaling: ScalingMode,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::empty()
    }
}

impl Geometry {
    /// A geometry with every scalar absent.
    pub fn empty() -> Self {
        Self {
            width: None,
            height: None,
            x: None,
            y: None,
            preserve_aspect: true,
            scaling: ScalingMode::Always,
        }
    }

    /// An exact pixel geometry `WxH!` that scales to the given size
    /// regardless of aspect ratio.
    pub fn exact(width: f64, height: f64) -> Self {
        Self {
            width: Some(Measure::px(width)),
            height: Some(Measure::px(height)),
            preserve_aspect: false,
            ..Self::empty()
        }
    }

    pub fn has_width(&self) -> bool {
        self.width.is_some()
    }

    pub fn has_height(&self) -> bool {
        self.height.is_some()
    }

    pub fn has_size(&self) -> bool {
        self.has_width() || self.has_height()
    }

    pub fn has_x(&self) -> bool {
        self.x.is_some()
    }

    pub fn has_y(&self) -> bool {
        self.y.is_some()
    }

    pub fn has_offset(&self) -> bool {
        self.has_x() || self.has_y()
    }

    /// The unit shared by the present scalars (parsing applies one unit to
    /// all four). Pixels when every scalar is absent.
    pub fn unit(&self) -> Unit {
        self.width
            .or(self.height)
            .or(self.x)
            .or(self.y)
            .map(|m| m.unit)
            .unwrap_or(Unit::Pixels)
    }

    /// The offset of this geometry relative to an image of the given size,
    /// clamped to `[0, full]` per axis. An absent offset resolves to zero.
    pub fn offset(&self, full: Dims) -> Dims {
        let x = self
            .x
            .map(|m| m.resolve(full.x).clamp(0.0, full.x))
            .unwrap_or(0.0);
        let y = self
            .y
            .map(|m| m.resolve(full.y).clamp(0.0, full.y))
            .unwrap_or(0.0);
        Dims::new(x, y)
    }

    /// The size of an image of the given size cropped by this geometry:
    /// the largest box starting at [`Geometry::offset`] that fits both the
    /// declared size and the remainder of the image. Without an offset the
    /// image passes through unchanged.
    pub fn crop(&self, full: Dims) -> Dims {
        if !self.has_offset() {
            return full;
        }
        let top_left = self.offset(full);
        let x = match self.width {
            Some(m) => m.resolve(full.x).min(full.x - top_left.x),
            None => full.x - top_left.x,
        };
        let y = match self.height {
            Some(m) => m.resolve(full.y).min(full.y - top_left.y),
            None => full.y - top_left.y,
        };
        Dims::new(x, y)
    }

    /// The size of an image of the given size scaled by this geometry.
    ///
    /// With aspect preservation a single present dimension drives both axes
    /// and two present dimensions scale to fit (the smaller constraint
    /// wins). Without preservation each present axis is set independently
    /// and absent axes pass through. [`ScalingMode`] does not short-circuit
    /// here; callers compare sizes when they need to honor `<`/`>`.
    pub fn scale(&self, full: Dims) -> Dims {
        let unit = match (self.width, self.height) {
            (Some(w), Some(h)) if w.unit != h.unit => return full,
            (Some(w), _) => w.unit,
            (None, Some(h)) => h.unit,
            (None, None) => return full,
        };
        if !self.preserve_aspect {
            let x = self.width.map(|m| m.resolve(full.x)).unwrap_or(full.x);
            let y = self.height.map(|m| m.resolve(full.y)).unwrap_or(full.y);
            return Dims::new(x, y);
        }
        match unit {
            Unit::Percent => {
                let factor = match (self.width, self.height) {
                    (Some(w), Some(h)) => w.value.min(h.value),
                    (Some(w), None) => w.value,
                    (None, Some(h)) => h.value,
                    (None, None) => unreachable!(),
                } / 100.0;
                Dims::new(full.x * factor, full.y * factor)
            }
            Unit::Pixels => {
                let aspect = full.x / full.y;
                match (self.width, self.height) {
                    (None, Some(h)) => Dims::new(aspect * h.value, h.value),
                    (Some(w), None) => Dims::new(w.value, w.value / aspect),
                    (Some(w), Some(h)) => Dims::new(
                        w.value.min(h.value * aspect),
                        h.value.min(w.value / aspect),
                    ),
                    (None, None) => unreachable!(),
                }
            }
        }
    }
}

/// Applies `scaling` then `cropping` to an image of the given size.
pub fn scale_and_crop(original: Dims, cropping: &Geometry, scaling: &Geometry) -> Dims {
    cropping.crop(scaling.scale(original))
}

impl FromStr for Geometry {
    type Err = CollageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_geometry(s).ok_or_else(|| CollageError::MalformedGeometry(s.to_string()))
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(w) = self.width {
            write!(f, "{}", fmt_float(w.value))?;
        }
        if let Some(h) = self.height {
            write!(f, "x{}", fmt_float(h.value))?;
        }
        if let Some(x) = self.x {
            if x.value >= 0.0 {
                write!(f, "+")?;
            }
            write!(f, "{}", fmt_float(x.value))?;
        }
        if let Some(y) = self.y {
            // a bare sign marks the absent x offset so the string re-parses
            if self.x.is_none() {
                write!(f, "+")?;
            }
            if y.value >= 0.0 {
                write!(f, "+")?;
            }
            write!(f, "{}", fmt_float(y.value))?;
        }
        if self.unit() == Unit::Percent {
            write!(f, "%")?;
        }
        if !self.preserve_aspect {
            write!(f, "!")?;
        }
        match self.scaling {
            ScalingMode::DownOnly => write!(f, ">")?,
            ScalingMode::UpOnly => write!(f, "<")?,
            ScalingMode::Always => {}
        }
        Ok(())
    }
}

fn fmt_float(value: f64) -> String {
    if value.fract().abs() < 1e-5 {
        format!("{}", value.trunc() as i64)
    } else {
        format!("{:.6}", value)
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn done(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn digits(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos > start
    }

    /// A non-negative integer, `None` when no digits follow.
    fn integer(&mut self) -> Option<f64> {
        let start = self.pos;
        if !self.digits() {
            return None;
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()
            .and_then(|t| t.parse().ok())
    }

    /// A non-negative decimal number (`digits[.digits]`), `None` when no
    /// digits follow. A trailing dot is left unconsumed.
    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        if !self.digits() {
            return None;
        }
        if self.peek() == Some(b'.') {
            let dot = self.pos;
            self.pos += 1;
            if !self.digits() {
                self.pos = dot;
            }
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()
            .and_then(|t| t.parse().ok())
    }

    /// A `+` or `-`, returned as a factor.
    fn sign(&mut self) -> Option<f64> {
        if self.eat(b'+') {
            Some(1.0)
        } else if self.eat(b'-') {
            Some(-1.0)
        } else {
            None
        }
    }
}

fn parse_geometry(s: &str) -> Option<Geometry> {
    if s.is_empty() {
        return None;
    }
    let mut c = Cursor::new(s);
    let width = c.number();
    let height = if c.eat(b'x') { c.number() } else { None };
    let mut offsets = [None, None];
    for slot in offsets.iter_mut() {
        match c.sign() {
            // a sign with no digits marks an absent offset
            Some(sign) => *slot = c.number().map(|n| sign * n),
            None => break,
        }
    }
    let unit = if c.eat(b'%') {
        Unit::Percent
    } else {
        Unit::Pixels
    };
    let preserve_aspect = !c.eat(b'!');
    let scaling = if c.eat(b'<') {
        ScalingMode::UpOnly
    } else if c.eat(b'>') {
        ScalingMode::DownOnly
    } else {
        ScalingMode::Always
    };
    if !c.done() {
        return None;
    }
    let measure = |v: f64| Measure { value: v, unit };
    Some(Geometry {
        width: width.map(measure),
        height: height.map(measure),
        x: offsets[0].map(measure),
        y: offsets[1].map(measure),
        preserve_aspect,
        scaling,
    })
}

fn parse_dims(s: &str) -> Option<Dims> {
    if s.is_empty() {
        return None;
    }
    let mut c = Cursor::new(s);
    let first = c.integer();
    let separated = c.eat(b'x') || c.eat(b',');
    let second = if separated { c.integer() } else { None };
    if !c.done() {
        return None;
    }
    match (first, separated, second) {
        (Some(x), false, _) => Some(Dims::new(x, x)),
        (Some(x), true, Some(y)) => Some(Dims::new(x, y)),
        (Some(x), true, None) => Some(Dims::new(x, 0.0)),
        (None, true, Some(y)) => Some(Dims::new(0.0, y)),
        (None, true, None) => Some(Dims::ZERO),
        (None, false, _) => None,
    }
}
