//! Bounding volumes.

use cgmath::{InnerSpace, Vector3};

/// Axis-aligned bounding box. A freshly created box is empty (invalid) until
/// the first point is added.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Vector3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Vector3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn add_point(&mut self, point: [f32; 3]) {
        let [x, y, z] = point.map(f64::from);
        self.min = Vector3::new(self.min.x.min(x), self.min.y.min(y), self.min.z.min(z));
        self.max = Vector3::new(self.max.x.max(x), self.max.y.max(y), self.max.z.max(z));
    }

    pub fn center(&self) -> Vector3<f64> {
        (self.min + self.max) * 0.5
    }

    /// Sphere around the box: box center, half the diagonal as radius. An
    /// empty box gives an invalid sphere.
    pub fn to_sphere(&self) -> BoundingSphere {
        if !self.is_valid() {
            return BoundingSphere::invalid();
        }
        BoundingSphere {
            center: self.center(),
            radius: (self.max - self.min).magnitude() * 0.5,
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vector3<f64>,
    pub radius: f64,
}

impl BoundingSphere {
    pub fn invalid() -> Self {
        Self {
            center: Vector3::new(0.0, 0.0, 0.0),
            radius: -1.0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.radius >= 0.0
    }
}
