//! A few useful geometric types

use crate::Error;
use nalgebra::Vector2;
use rand::Rng;

pub type Point2D = Vector2<f64>;

/// Axis-aligned rectangle from which random centroids and points are drawn.
///
/// Both ranges are half-open (`min..max`) and must be non-empty and finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min_x: -1.0,
            max_x: 1.0,
            min_y: -1.0,
            max_y: 1.0,
        }
    }
}

impl Bounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Result<Self, Error> {
        for (min, max) in [(min_x, max_x), (min_y, max_y)] {
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(Error::InvalidBounds { min, max });
            }
        }
        Ok(Self {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    /// Lower end of the x range.
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Upper end of the x range, excluded from sampling.
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Lower end of the y range.
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    /// Upper end of the y range, excluded from sampling.
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether `point` lies in the closed rectangle.
    pub fn contains(&self, point: &Point2D) -> bool {
        self.min_x <= point.x
            && point.x <= self.max_x
            && self.min_y <= point.y
            && point.y <= self.max_y
    }

    /// Draws a point uniformly at random, with independent draws per axis.
    pub fn sample<R>(&self, rng: &mut R) -> Point2D
    where
        R: Rng + ?Sized,
    {
        Point2D::new(
            rng.gen_range(self.min_x..self.max_x),
            rng.gen_range(self.min_y..self.max_y),
        )
    }

    /// Maps `point` into the unit square, `p_min` going to `(0, 0)` and
    /// `p_max` to `(1, 1)`.
    ///
    /// Points outside of the rectangle map outside of the unit square.
    pub fn normalize(&self, point: &Point2D) -> Point2D {
        Point2D::new(
            (point.x - self.min_x) / self.width(),
            (point.y - self.min_y) / self.height(),
        )
    }
}

/// Generates `count` points uniformly distributed in `bounds`.
pub fn uniform_points<R>(rng: &mut R, bounds: &Bounds, count: usize) -> Vec<Point2D>
where
    R: Rng + ?Sized,
{
    (0..count).map(|_| bounds.sample(rng)).collect()
}
