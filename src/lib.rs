//! kinematics2d
//!
//! A 2D physics core for deformable polygon bodies made of point masses.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **math** - `Vec2` helpers (rotation, winding, angles) on top of glam
//! 2. **error** - construction-time errors
//! 3. **physics** - shapes, point masses, springs, bodies and chains, plus the
//!    controller that runs broadphase, narrowphase and contact resolution
//!
//! ```no_run
//! use kinematics2d::{Body, ControllerConfig, KinematicsController, Shape};
//! use kinematics2d::glam::Vec2;
//!
//! # fn main() -> kinematics2d::Result<()> {
//! let mut controller = KinematicsController::new(ControllerConfig {
//!     gravity: Vec2::new(0.0, -9.81),
//!     ..Default::default()
//! });
//! controller.add_body(Body::new_static(&Shape::rectangle(20.0, 1.0)?)?);
//! let ball = controller.add_body(
//!     Body::new_spring(&Shape::regular_polygon(16, 0.5)?, 1.0, 150.0, 2.0, 150.0, 2.0)?
//!         .with_position(Vec2::new(0.0, 3.0)),
//! );
//! for _ in 0..120 {
//!     controller.step(1.0 / 60.0);
//! }
//! println!("{}", controller.body(ball).map(|b| b.position()).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod math;
pub mod physics;

pub use error::{KinematicsError, Result};

pub use math::{centroid, signed_area, wrap_angle, Vec2Ext};

pub use physics::aabb::Aabb;
pub use physics::bitmask::Bitmask;
pub use physics::body::{Body, BodyKind, ClosestEdge, EdgeHit, SpringSet};
pub use physics::chain::Chain;
pub use physics::contact::{CollisionInfo, ContactInfo};
pub use physics::point_mass::PointMass;
pub use physics::shape::Shape;
pub use physics::spring::{spring_force, Spring};
pub use physics::{BodyHandle, ChainHandle, ControllerConfig, KinematicsController};

// Re-export glam for convenience
pub use glam;
