use bevy::math::Affine3A;
use bevy::prelude::*;

/// Axis-aligned bounds in a model's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl ModelBounds {
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for point in points {
            bounds.include(point);
        }
        Some(bounds)
    }

    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Bounds of this box after `transform`, re-fitted around all eight corners.
    pub fn transformed(&self, transform: &Affine3A) -> Self {
        let corners = (0..8).map(|i| {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            transform.transform_point3(corner)
        });
        // Eight corners always yield a box.
        Self::from_points(corners).unwrap_or(*self)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }
}

/// Pivot transform that re-centres a model on its bounds and, when
/// `fit_extent` is set, uniformly scales its largest dimension to it.
pub fn centering_transform(bounds: Option<ModelBounds>, fit_extent: Option<f32>) -> Transform {
    let Some(bounds) = bounds else {
        return Transform::IDENTITY;
    };

    let scale = match fit_extent {
        Some(extent) if bounds.max_dimension() > f32::EPSILON => extent / bounds.max_dimension(),
        _ => 1.0,
    };

    Transform {
        translation: -bounds.center() * scale,
        rotation: Quat::IDENTITY,
        scale: Vec3::splat(scale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centering_moves_bounds_centre_to_origin() {
        let bounds = ModelBounds::from_points([Vec3::new(2.0, 0.0, -1.0), Vec3::new(4.0, 6.0, 1.0)]);
        let pivot = centering_transform(bounds, None);

        let centred = pivot.transform_point(bounds.unwrap().center());
        assert!(centred.length() < 1e-5);
        assert_eq!(pivot.scale, Vec3::ONE);
    }

    #[test]
    fn fit_extent_scales_largest_dimension() {
        let bounds = ModelBounds::from_points([Vec3::ZERO, Vec3::new(1.0, 4.0, 2.0)]);
        let pivot = centering_transform(bounds, Some(20.0));

        assert!((pivot.scale.x - 5.0).abs() < 1e-5);
        let top = pivot.transform_point(Vec3::new(0.5, 4.0, 1.0));
        assert!((top.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn empty_model_keeps_identity_pivot() {
        assert_eq!(centering_transform(None, Some(20.0)), Transform::IDENTITY);
        let flat = ModelBounds::from_points([Vec3::ONE]);
        assert_eq!(centering_transform(flat, Some(20.0)).scale, Vec3::ONE);
    }

    #[test]
    fn transformed_bounds_follow_translation_and_scale() {
        let bounds = ModelBounds::from_points([Vec3::splat(-1.0), Vec3::splat(1.0)]).unwrap();
        let affine = Transform::from_xyz(3.0, 0.0, 0.0)
            .with_scale(Vec3::splat(2.0))
            .compute_affine();

        let moved = bounds.transformed(&affine);
        assert!((moved.min - Vec3::new(1.0, -2.0, -2.0)).length() < 1e-5);
        assert!((moved.max - Vec3::new(5.0, 2.0, 2.0)).length() < 1e-5);
    }
}
