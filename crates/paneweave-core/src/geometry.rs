#![forbid(unsafe_code)]

//! Geometric primitives.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected rectangle construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("bounds width must be non-negative, got {width}")]
    NegativeWidth { width: i32 },
    #[error("bounds height must be non-negative, got {height}")]
    NegativeHeight { height: i32 },
}

/// An immutable rectangle in pixel coordinates.
///
/// Origin is top-left; `right()` and `bottom()` are exclusive edges.
/// Width and height are validated non-negative at construction, so every
/// `Bounds` value in circulation is well formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawBounds")]
pub struct Bounds {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

#[derive(Deserialize)]
struct RawBounds {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl TryFrom<RawBounds> for Bounds {
    type Error = GeometryError;

    fn try_from(raw: RawBounds) -> Result<Self, Self::Error> {
        Self::new(raw.x, raw.y, raw.width, raw.height)
    }
}

impl Bounds {
    /// Create a rectangle, rejecting negative sizes.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Result<Self, GeometryError> {
        if width < 0 {
            return Err(GeometryError::NegativeWidth { width });
        }
        if height < 0 {
            return Err(GeometryError::NegativeHeight { height });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Create a rectangle with negative sizes clamped to zero.
    #[must_use]
    pub const fn saturating(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }

    /// Create a rectangle at the origin with the given size.
    #[must_use]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::saturating(0, 0, width, height)
    }

    #[inline]
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Area in pixels.
    #[inline]
    #[must_use]
    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Check if the rectangle has zero area.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check whether two rectangles share any area.
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    /// Overlapping region of two rectangles, `None` if they don't overlap.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Self::saturating(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Check whether `other` lies entirely within this rectangle.
    #[must_use]
    pub const fn contains_bounds(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}
