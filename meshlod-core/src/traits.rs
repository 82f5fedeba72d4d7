//! Core traits for meshlod

use crate::{mesh::*, point::*};

/// Trait for objects with a spatial extent
pub trait Bounded {
    /// Get the axis-aligned bounding box of the object as `(min, max)`
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        Point3f::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }
}

/// Bounding box of a set of points; the origin for an empty set
pub fn bounding_box_of<'a, I>(points: I) -> (Point3f, Point3f)
where
    I: IntoIterator<Item = &'a Point3f>,
{
    let mut iter = points.into_iter();
    let Some(first) = iter.next() else {
        return (Point3f::origin(), Point3f::origin());
    };

    let mut min = *first;
    let mut max = *first;
    for p in iter {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);

        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }

    (min, max)
}

impl Bounded for IndexedMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounding_box_of(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_bounds() {
        let mesh = IndexedMesh::from_triangles(
            vec![
                Point3f::new(-1.0, 0.0, 2.0),
                Point3f::new(3.0, 1.0, 0.0),
                Point3f::new(0.0, -2.0, 1.0),
            ],
            &[[0, 1, 2]],
        );
        let (min, max) = mesh.bounding_box();
        assert_eq!(min, Point3f::new(-1.0, -2.0, 0.0));
        assert_eq!(max, Point3f::new(3.0, 1.0, 2.0));
        assert_eq!(mesh.center(), Point3f::new(1.0, -0.5, 1.0));
    }

    #[test]
    fn test_empty_bounds() {
        let mesh = IndexedMesh::new();
        assert_eq!(mesh.bounding_box(), (Point3f::origin(), Point3f::origin()));
    }
}
