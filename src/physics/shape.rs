//! Closed polygon outlines used as body templates.

use glam::Vec2;

use crate::error::{KinematicsError, Result};
use crate::math::{centroid, signed_area, Vec2Ext};

/// Area below which a polygon is treated as degenerate.
const DEGENERATE_AREA: f32 = 1e-6;
/// Points closer than this are considered the same point.
const DISTINCT_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone)]
struct PendingShape {
    points: Vec<Vec2>,
    center: bool,
}

/// An ordered closed polygon (implicit edge from the last point to the first).
///
/// Shapes are authored with the `begin` / `add` / `end` protocol or one of the
/// factory constructors, and are immutable afterwards except by rebuilding.
/// A completed shape always has at least 3 distinct, non-collinear points.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    points: Vec<Vec2>,
    pending: Option<PendingShape>,
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl Shape {
    /// An empty shape, ready for [`Shape::begin`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a shape from a list of points in one go.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Result<Self> {
        let mut shape = Self::new();
        shape.begin(false)?;
        for p in points {
            shape.add(p)?;
        }
        shape.end()?;
        Ok(shape)
    }

    /// Axis-aligned rectangle centered at the origin, wound clockwise.
    pub fn rectangle(width: f32, height: f32) -> Result<Self> {
        for d in [width, height] {
            if !(d > 0.0 && d.is_finite()) {
                return Err(KinematicsError::InvalidDimension(d));
            }
        }
        let hw = width * 0.5;
        let hh = height * 0.5;
        Self::from_points([
            Vec2::new(-hw, hh),
            Vec2::new(hw, hh),
            Vec2::new(hw, -hh),
            Vec2::new(-hw, -hh),
        ])
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`, wound clockwise.
    pub fn regular_polygon(sides: usize, radius: f32) -> Result<Self> {
        if sides < 3 {
            return Err(KinematicsError::InvalidSegmentCount(sides));
        }
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(KinematicsError::InvalidDimension(radius));
        }
        let step = -std::f32::consts::TAU / sides as f32;
        Self::from_points((0..sides).map(|i| Vec2::new(radius, 0.0).rotated(step * i as f32)))
    }

    /// Start (re)building the shape. With `center`, points are shifted so the
    /// centroid lands on the origin when [`Shape::end`] is called.
    pub fn begin(&mut self, center: bool) -> Result<()> {
        if self.pending.is_some() {
            return Err(KinematicsError::ShapeAlreadyBegun);
        }
        self.pending = Some(PendingShape {
            points: Vec::with_capacity(16),
            center,
        });
        Ok(())
    }

    pub fn add(&mut self, point: Vec2) -> Result<()> {
        let pending = self
            .pending
            .as_mut()
            .ok_or(KinematicsError::ShapeNotBegun)?;
        pending.points.push(point);
        Ok(())
    }

    /// Finish the build started by [`Shape::begin`].
    ///
    /// On failure the open build is discarded and the previous outline is kept.
    pub fn end(&mut self) -> Result<()> {
        let pending = self.pending.take().ok_or(KinematicsError::ShapeNotBegun)?;
        validate_outline(&pending.points)?;

        self.points = pending.points;
        if pending.center {
            self.center_at_zero();
        }
        Ok(())
    }

    /// True while a `begin` has not been matched by `end`.
    pub fn is_building(&self) -> bool {
        self.pending.is_some()
    }

    #[inline]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    #[inline]
    pub(crate) fn points_mut(&mut self) -> &mut [Vec2] {
        &mut self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Unweighted mean of the points.
    pub fn center(&self) -> Vec2 {
        centroid(&self.points)
    }

    /// Shift all points so the centroid is at the origin.
    pub fn center_at_zero(&mut self) {
        let c = self.center();
        for p in &mut self.points {
            *p -= c;
        }
    }

    /// Copy of this shape recentered on the origin.
    pub fn centered(&self) -> Shape {
        let mut shape = Shape {
            points: self.points.clone(),
            pending: None,
        };
        shape.center_at_zero();
        shape
    }

    /// Signed area; positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f32 {
        signed_area(&self.points)
    }

    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// Scale, rotate, then translate every point.
    pub fn transformed(&self, position: Vec2, angle: f32, scale: Vec2) -> Vec<Vec2> {
        transform_points(&self.points, position, angle, scale)
    }
}

/// Scale, rotate (counter-clockwise, radians), then translate `points`.
pub fn transform_points(points: &[Vec2], position: Vec2, angle: f32, scale: Vec2) -> Vec<Vec2> {
    points
        .iter()
        .map(|&p| (p * scale).rotated(angle) + position)
        .collect()
}

fn validate_outline(points: &[Vec2]) -> Result<()> {
    let mut distinct: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if !distinct
            .iter()
            .any(|q| q.distance_squared(p) <= DISTINCT_EPSILON * DISTINCT_EPSILON)
        {
            distinct.push(p);
        }
    }
    if distinct.len() < 3 {
        return Err(KinematicsError::TooFewPoints {
            found: distinct.len(),
        });
    }
    if signed_area(points).abs() <= DEGENERATE_AREA {
        return Err(KinematicsError::DegenerateShape);
    }
    Ok(())
}
