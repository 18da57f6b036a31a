// Shared geometry: collider shape descriptors and overlap helpers

use glam::Vec2;
use parry2d::math::Isometry;
use parry2d::query::intersection_test;
use parry2d::shape::{Ball, Cuboid};

/// Geometry descriptor for a single collider, defined in entity-local space
/// with the entity facing right. Mirroring handles the facing-left case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Circle centered at `center` (entity-local coordinates)
    Circle { center: Vec2, radius: f32 },
    /// Oriented box centered at `center` with the given half extents,
    /// rotated by `angle` radians
    Box {
        center: Vec2,
        half_extents: Vec2,
        angle: f32,
    },
}

impl ColliderShape {
    /// Reflect this shape about the entity's vertical axis.
    ///
    /// Geometry is authored once for a right-facing entity; a facing-left
    /// entity attaches the mirrored shapes instead.
    pub fn mirrored(&self) -> Self {
        match *self {
            Self::Circle { center, radius } => Self::Circle {
                center: Vec2::new(-center.x, center.y),
                radius,
            },
            Self::Box {
                center,
                half_extents,
                angle,
            } => Self::Box {
                center: Vec2::new(-center.x, center.y),
                half_extents,
                angle: -angle,
            },
        }
    }

    /// Axis-aligned bounding box of this shape, offset by `origin`.
    pub fn aabb(&self, origin: Vec2) -> Rect {
        match *self {
            Self::Circle { center, radius } => {
                let c = origin + center;
                Rect {
                    min: c - Vec2::splat(radius),
                    max: c + Vec2::splat(radius),
                }
            }
            Self::Box {
                center,
                half_extents,
                angle,
            } => {
                // Extent of a rotated box projected onto the world axes
                let (sin, cos) = angle.sin_cos();
                let ex = half_extents.x * cos.abs() + half_extents.y * sin.abs();
                let ey = half_extents.x * sin.abs() + half_extents.y * cos.abs();
                let c = origin + center;
                Rect {
                    min: c - Vec2::new(ex, ey),
                    max: c + Vec2::new(ex, ey),
                }
            }
        }
    }
}

/// Axis-aligned rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Smallest rectangle containing both `self` and `other`
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }
}

/// Test whether a circle overlaps an axis-aligned rectangle.
///
/// Used by the damage pass, which deliberately bypasses the physics engine's
/// contact reporting.
pub fn circle_overlaps_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let ball = Ball::new(radius);
    let he = rect.half_extents();
    let cuboid = Cuboid::new(parry2d::math::Vector::new(he.x, he.y));
    let ball_pos = Isometry::translation(center.x, center.y);
    let rect_center = rect.center();
    let cuboid_pos = Isometry::translation(rect_center.x, rect_center.y);
    intersection_test(&ball_pos, &ball, &cuboid_pos, &cuboid).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_mirror_round_trip() {
        let shape = ColliderShape::Circle {
            center: Vec2::new(0.4, -0.2),
            radius: 0.3,
        };
        assert_eq!(shape.mirrored().mirrored(), shape);
    }

    #[test]
    fn test_box_mirror_round_trip() {
        let shape = ColliderShape::Box {
            center: Vec2::new(-0.1, 0.5),
            half_extents: Vec2::new(0.25, 0.5),
            angle: 0.7,
        };
        assert_eq!(shape.mirrored().mirrored(), shape);
    }

    #[test]
    fn test_mirror_flips_x() {
        let shape = ColliderShape::Circle {
            center: Vec2::new(0.4, 0.2),
            radius: 0.3,
        };
        match shape.mirrored() {
            ColliderShape::Circle { center, radius } => {
                assert_eq!(center, Vec2::new(-0.4, 0.2));
                assert_eq!(radius, 0.3);
            }
            _ => panic!("shape kind changed under mirroring"),
        }
    }

    #[test]
    fn test_circle_rect_overlap() {
        let rect = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 1.0));
        assert!(circle_overlaps_rect(Vec2::new(1.0, 0.5), 0.2, &rect));
        // Overlapping across the right edge
        assert!(circle_overlaps_rect(Vec2::new(2.3, 0.5), 0.4, &rect));
        // Clearly separated
        assert!(!circle_overlaps_rect(Vec2::new(4.0, 0.5), 0.5, &rect));
        // Near the corner but outside the corner radius
        assert!(!circle_overlaps_rect(Vec2::new(2.4, 1.4), 0.5, &rect));
    }

    #[test]
    fn test_box_aabb_rotation() {
        let shape = ColliderShape::Box {
            center: Vec2::ZERO,
            half_extents: Vec2::new(1.0, 0.0),
            angle: std::f32::consts::FRAC_PI_2,
        };
        let aabb = shape.aabb(Vec2::ZERO);
        // A horizontal segment rotated 90 degrees spans vertically
        assert!((aabb.max.y - 1.0).abs() < 1e-5);
        assert!(aabb.max.x.abs() < 1e-5);
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Rect::new(Vec2::new(-1.0, 0.5), Vec2::new(0.5, 2.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec2::new(-1.0, 0.0));
        assert_eq!(u.max, Vec2::new(1.0, 2.0));
    }
}
