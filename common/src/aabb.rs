use cgmath::Point3;

/// Axis-aligned box given by its minimum and maximum corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

fn component_min(a: Point3<f32>, b: Point3<f32>) -> Point3<f32> {
    Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
}

fn component_max(a: Point3<f32>, b: Point3<f32>) -> Point3<f32> {
    Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Smallest box holding every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |aabb, point| aabb.expand(point)))
    }

    /// The eight corners; bit 0 of the index picks max x, bit 1 max y, bit 2 max z.
    pub fn corners(&self) -> [Point3<f32>; 8] {
        std::array::from_fn(|i| {
            Point3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    pub fn expand(&self, point: Point3<f32>) -> Self {
        Self::new(component_min(self.min, point), component_max(self.max, point))
    }

    pub fn merge(&self, other: &Aabb) -> Self {
        Self::new(
            component_min(self.min, other.min),
            component_max(self.max, other.max),
        )
    }

    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            0.5 * (self.min.x + self.max.x),
            0.5 * (self.min.y + self.max.y),
            0.5 * (self.min.z + self.max.z),
        )
    }

    /// Edge lengths along x, y and z.
    pub fn size(&self) -> (f32, f32, f32) {
        (
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_spans_all_inputs() {
        let aabb = Aabb::from_points([
            Point3::new(1.0, -2.0, 0.5),
            Point3::new(-1.0, 3.0, 0.0),
            Point3::new(0.0, 0.0, 4.0),
        ])
        .unwrap();

        assert_eq!(aabb.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 3.0, 4.0));
    }

    #[test]
    fn test_single_point_is_degenerate_box() {
        let point = Point3::new(2.0, 3.0, 4.0);
        let aabb = Aabb::from_points([point]).unwrap();

        assert_eq!(aabb, Aabb::new(point, point));
        assert_eq!(aabb.size(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_no_points_no_box() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_corners_cover_both_extremes() {
        let aabb = Aabb::new(Point3::new(0.0, 1.0, 2.0), Point3::new(3.0, 4.0, 5.0));
        let corners = aabb.corners();

        assert_eq!(corners[0], aabb.min);
        assert_eq!(corners[7], aabb.max);
        assert_eq!(corners[5], Point3::new(3.0, 1.0, 5.0));
        assert_eq!(Aabb::from_points(corners), Some(aabb));
    }

    #[test]
    fn test_center_and_size() {
        let aabb = Aabb::new(Point3::new(-2.0, 0.0, 1.0), Point3::new(2.0, 4.0, 7.0));

        assert_eq!(aabb.center(), Point3::new(0.0, 2.0, 4.0));
        assert_eq!(aabb.size(), (4.0, 4.0, 6.0));
    }

    #[test]
    fn test_merge_disjoint_boxes() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(5.0, -2.0, 0.5), Point3::new(6.0, -1.0, 3.0));

        let merged = a.merge(&b);
        assert_eq!(merged.min, Point3::new(0.0, -2.0, 0.0));
        assert_eq!(merged.max, Point3::new(6.0, 1.0, 3.0));
        assert_eq!(b.merge(&a), merged);
    }
}
