use glam::{Mat4, Vec3};

/// Axis-aligned bounding box in world or local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl BoundingBox {
    /// Box spanning two corners.
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Tightest box around `points`, `None` when empty.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |b, p| Self {
            min: b.min.min(p),
            max: b.max.max(p),
        }))
    }

    /// Smallest box containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Union two optional boxes.
    #[must_use]
    pub fn union_opt(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (a, None) => a,
            (None, b) => b,
        }
    }

    /// Axis-aligned box around this box's transformed corners.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners = (0..8).map(|i| {
            Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        });
        Self::from_points(corners.map(|c| matrix.transform_point3(c)))
            .unwrap_or(*self)
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half of the diagonal length.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.min.distance(self.max) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_and_optional_union() {
        let a = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        let b = BoundingBox::new(Vec3::splat(-1.0), Vec3::splat(0.5));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::splat(-1.0));
        assert_eq!(u.max, Vec3::ONE);
        assert_eq!(BoundingBox::union_opt(None, Some(a)), Some(a));
        assert_eq!(BoundingBox::union_opt(None, None), None);
    }

    #[test]
    fn transform_translates_and_rotates() {
        let b = BoundingBox::new(Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0));
        let moved = b.transformed(&Mat4::from_translation(Vec3::X * 5.0));
        assert_eq!(moved.min, Vec3::new(5.0, 0.0, 0.0));
        let turned =
            b.transformed(&Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2));
        assert!((turned.max.y - 2.0).abs() < 1e-5);
        assert!((turned.min.x + 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_points_have_no_box() {
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }
}
