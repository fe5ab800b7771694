use crate::{Interval, Vec3};

/// Axis-aligned bounding box, one `Interval` per axis.
///
/// Used to accumulate the extents of a vertex cloud (mesh bounds). Boxes
/// built from points are padded so no axis has zero thickness.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

/// Minimum extent along any axis.
const MIN_THICKNESS: f32 = 0.0001;

impl Aabb {
    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let mut aabb = Self {
            x: Interval::new(a.x.min(b.x), a.x.max(b.x)),
            y: Interval::new(a.y.min(b.y), a.y.max(b.y)),
            z: Interval::new(a.z.min(b.z), a.z.max(b.z)),
        };
        aabb.pad_to_minimums();
        aabb
    }

    /// Tight bounds of a point cloud. `None` when there are no points.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self::from_points(min, max))
    }

    /// Corner with the smallest coordinates.
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Corner with the largest coordinates.
    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> f32 {
        (self.max() - self.min()).length()
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        if self.x.size() < MIN_THICKNESS {
            self.x = self.x.expand(MIN_THICKNESS);
        }
        if self.y.size() < MIN_THICKNESS {
            self.y = self.y.expand(MIN_THICKNESS);
        }
        if self.z.size() < MIN_THICKNESS {
            self.z = self.z.expand(MIN_THICKNESS);
        }
    }
}
