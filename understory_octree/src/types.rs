// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and the epsilon-tolerant predicates used by the octree.
//!
//! Every predicate takes an `eps` that widens the test: a larger `eps` can only
//! turn a `false` into a `true`, never the other way around.

use glam::DVec3;

/// Axis-aligned bounding box in 3D, stored as center and half extents.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3D {
    /// Center of the box.
    pub center: DVec3,
    /// Half of the box size along each axis.
    pub half_extents: DVec3,
}

impl Aabb3D {
    /// Create a new AABB from its center and half extents.
    pub const fn new(center: DVec3, half_extents: DVec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Create an AABB spanning the `min` and `max` corners.
    pub fn from_min_max(min: DVec3, max: DVec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    /// Smallest AABB containing all `points`, or `None` if there are none.
    pub fn from_points<I: IntoIterator<Item = DVec3>>(points: I) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let (min, max) = it.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self::from_min_max(min, max))
    }

    /// Minimum corner.
    pub fn min(&self) -> DVec3 {
        self.center - self.half_extents
    }

    /// Maximum corner.
    pub fn max(&self) -> DVec3 {
        self.center + self.half_extents
    }

    /// Same center, half extents scaled by `factor`.
    pub fn inflated(&self, factor: f64) -> Self {
        Self::new(self.center, self.half_extents * factor)
    }

    /// Same center, half extents grown by `margin` on every axis.
    pub fn expanded(&self, margin: f64) -> Self {
        Self::new(self.center, self.half_extents + DVec3::splat(margin))
    }

    /// Whether `p` lies inside the box widened by `eps`.
    pub fn contains_point(&self, p: DVec3, eps: f64) -> bool {
        (p - self.center)
            .abs()
            .cmple(self.half_extents + DVec3::splat(eps))
            .all()
    }

    /// Whether the two boxes overlap once their gap is allowed to be up to `eps`.
    pub fn intersects(&self, other: &Self, eps: f64) -> bool {
        (self.center - other.center)
            .abs()
            .cmple(self.half_extents + other.half_extents + DVec3::splat(eps))
            .all()
    }

    /// Whether the plane passes within `eps` of the box.
    pub fn intersects_plane(&self, plane: &Plane, eps: f64) -> bool {
        let reach = self.half_extents.dot(plane.normal.abs());
        (plane.normal.dot(self.center) + plane.offset).abs() <= reach + eps * plane.normal.length()
    }

    /// Whether the segment `a`..`b` touches the box widened by `eps`.
    ///
    /// Separating axis test over the three box axes and the three cross
    /// products of the segment direction with them.
    pub fn intersects_segment(&self, a: DVec3, b: DVec3, eps: f64) -> bool {
        let e = self.half_extents + DVec3::splat(eps);
        let d = (b - a) * 0.5;
        let m = (a + b) * 0.5 - self.center;
        let ad = d.abs();
        if !m.abs().cmple(e + ad).all() {
            return false;
        }
        // Guard the cross axes against a segment (nearly) parallel to a box axis.
        let ad = ad + DVec3::splat(PARALLEL_GUARD);
        (m.y * d.z - m.z * d.y).abs() <= e.y * ad.z + e.z * ad.y
            && (m.z * d.x - m.x * d.z).abs() <= e.x * ad.z + e.z * ad.x
            && (m.x * d.y - m.y * d.x).abs() <= e.x * ad.y + e.y * ad.x
    }

    /// Whether the triangle touches the box widened by `eps`.
    ///
    /// Separating axis test: the three box axes, the triangle normal, and the
    /// nine cross products of box axes with triangle edges. Axes are left
    /// unnormalized; both projections scale by the same length.
    pub fn intersects_triangle(&self, tri: [DVec3; 3], eps: f64) -> bool {
        let h = self.half_extents + DVec3::splat(eps);
        let v = [
            tri[0] - self.center,
            tri[1] - self.center,
            tri[2] - self.center,
        ];

        let lo = v[0].min(v[1]).min(v[2]);
        let hi = v[0].max(v[1]).max(v[2]);
        if !lo.cmple(h).all() || !hi.cmpge(-h).all() {
            return false;
        }

        let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];
        let normal = edges[0].cross(edges[1]);
        if normal.dot(v[0]).abs() > h.dot(normal.abs()) {
            return false;
        }

        for edge in edges {
            for axis in [DVec3::X, DVec3::Y, DVec3::Z] {
                let sep = axis.cross(edge);
                let p = [sep.dot(v[0]), sep.dot(v[1]), sep.dot(v[2])];
                let p_lo = p[0].min(p[1]).min(p[2]);
                let p_hi = p[0].max(p[1]).max(p[2]);
                let r = h.dot(sep.abs());
                if p_lo > r || p_hi < -r {
                    return false;
                }
            }
        }
        true
    }
}

/// A line segment between two points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    /// First endpoint.
    pub a: DVec3,
    /// Second endpoint.
    pub b: DVec3,
}

impl Segment {
    /// Create a segment from its endpoints.
    pub const fn new(a: DVec3, b: DVec3) -> Self {
        Self { a, b }
    }

    /// Bounding box of the segment.
    pub fn aabb(&self) -> Aabb3D {
        Aabb3D::from_min_max(self.a.min(self.b), self.a.max(self.b))
    }

    /// Squared distance from `p` to the closest point of the segment.
    pub fn distance_squared_to_point(&self, p: DVec3) -> f64 {
        let ab = self.b - self.a;
        let len2 = ab.length_squared();
        if len2 <= f64::MIN_POSITIVE {
            return (p - self.a).length_squared();
        }
        let t = ((p - self.a).dot(ab) / len2).clamp(0.0, 1.0);
        (self.a + ab * t - p).length_squared()
    }

    /// Squared distance between the closest points of two segments.
    pub fn distance_squared_to_segment(&self, other: &Self) -> f64 {
        let d1 = self.b - self.a;
        let d2 = other.b - other.a;
        let r = self.a - other.a;
        let a = d1.length_squared();
        let e = d2.length_squared();
        let f = d2.dot(r);

        if a <= f64::MIN_POSITIVE && e <= f64::MIN_POSITIVE {
            return r.length_squared();
        }
        let (s, t) = if a <= f64::MIN_POSITIVE {
            (0.0, (f / e).clamp(0.0, 1.0))
        } else {
            let c = d1.dot(r);
            if e <= f64::MIN_POSITIVE {
                ((-c / a).clamp(0.0, 1.0), 0.0)
            } else {
                let b = d1.dot(d2);
                let denom = a * e - b * b;
                // Parallel segments: any s works, start from the first endpoint.
                let s = if denom > 0.0 {
                    ((b * f - c * e) / denom).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let t = (b * s + f) / e;
                if t < 0.0 {
                    ((-c / a).clamp(0.0, 1.0), 0.0)
                } else if t > 1.0 {
                    (((b - c) / a).clamp(0.0, 1.0), 1.0)
                } else {
                    (s, t)
                }
            }
        };
        (self.a + d1 * s - (other.a + d2 * t)).length_squared()
    }
}

/// A plane `normal · x + offset = 0` with unit normal.
///
/// Degenerate input (collinear points) yields a zero normal; every distance to
/// such a plane is zero, so plane tests stay conservative.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    /// Unit normal, or zero for a degenerate plane.
    pub normal: DVec3,
    /// Offset along the normal.
    pub offset: f64,
}

impl Plane {
    /// Plane through a point with the given (not necessarily unit) normal.
    pub fn from_point_normal(point: DVec3, normal: DVec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            normal,
            offset: -normal.dot(point),
        }
    }

    /// Plane through three points, oriented counter-clockwise.
    pub fn from_points(a: DVec3, b: DVec3, c: DVec3) -> Self {
        Self::from_point_normal(a, (b - a).cross(c - a))
    }

    /// Best-fit plane of a polygon loop using Newell's method.
    pub fn from_polygon(points: &[DVec3]) -> Self {
        if points.is_empty() {
            return Self {
                normal: DVec3::ZERO,
                offset: 0.0,
            };
        }
        let mut normal = DVec3::ZERO;
        let mut centroid = DVec3::ZERO;
        for (i, &cur) in points.iter().enumerate() {
            let next = points[(i + 1) % points.len()];
            normal.x += (cur.y - next.y) * (cur.z + next.z);
            normal.y += (cur.z - next.z) * (cur.x + next.x);
            normal.z += (cur.x - next.x) * (cur.y + next.y);
            centroid += cur;
        }
        Self::from_point_normal(centroid / points.len() as f64, normal)
    }

    /// Signed distance from `p` to the plane.
    pub fn signed_distance(&self, p: DVec3) -> f64 {
        self.normal.dot(p) + self.offset
    }
}

// Added to direction magnitudes on cross-product axes.
const PARALLEL_GUARD: f64 = 1e-12;
