use crate::shape::Shape;

/// decides whether a shape may live in the store. implemented by `Bounds` and by any
/// `Fn(&Shape) -> bool`, so callers can pass a closure for ad-hoc regions.
pub trait InBounds {
    fn admits(&self, shape: &Shape) -> bool;
}

impl<F> InBounds for F
where
    F: Fn(&Shape) -> bool,
{
    fn admits(&self, shape: &Shape) -> bool {
        self(shape)
    }
}

/// axis-aligned region in store coordinates, checked per vertex with a small tolerance
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub tolerance: f64,
}

impl Bounds {
    pub const DEFAULT_TOLERANCE: f64 = 1e-6;

    /// canvas-style region `[0, width] x [0, height]`
    pub fn canvas(width: f64, height: f64) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: width,
            max_y: height,
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl InBounds for Bounds {
    fn admits(&self, shape: &Shape) -> bool {
        let t = self.tolerance;
        shape.points().iter().all(|p| {
            p.x >= self.min_x - t && p.y >= self.min_y - t && p.x <= self.max_x + t && p.y <= self.max_y + t
        })
    }
}
