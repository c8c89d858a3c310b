//! Scene setup helpers shared by the physics benchmarks.

use glam::Vec2;
use kinematics2d::{Body, ControllerConfig, KinematicsController, Shape};

/// Gravity used by every benchmark scene.
pub const GRAVITY: Vec2 = Vec2::new(0.0, -9.81);

fn config() -> ControllerConfig {
    ControllerConfig {
        gravity: GRAVITY,
        ..Default::default()
    }
}

/// Static floor plus `n` plain squares stacked in loose columns above it.
pub fn setup_box_scene(n: usize) -> anyhow::Result<KinematicsController> {
    let mut controller = KinematicsController::new(config());
    let width = (n as f32).sqrt().ceil().max(1.0) * 1.5;
    controller.add_body(
        Body::new_static(&Shape::rectangle(width + 4.0, 1.0)?)?
            .with_position(Vec2::new(0.0, -0.5)),
    );

    let square = Shape::rectangle(1.0, 1.0)?;
    let columns = (n as f32).sqrt().ceil().max(1.0) as usize;
    for i in 0..n {
        let x = (i % columns) as f32 * 1.5 - width * 0.5;
        let y = (i / columns) as f32 * 1.2 + 1.0;
        controller.add_body(Body::new(&square, 1.0)?.with_position(Vec2::new(x, y)));
    }
    controller.initialize();
    Ok(controller)
}

/// Like [`setup_box_scene`] but with shape-matched spring polygons.
pub fn setup_soft_scene(n: usize, sides: usize) -> anyhow::Result<KinematicsController> {
    let mut controller = KinematicsController::new(config());
    let width = (n as f32).sqrt().ceil().max(1.0) * 1.5;
    controller.add_body(
        Body::new_static(&Shape::rectangle(width + 4.0, 1.0)?)?
            .with_position(Vec2::new(0.0, -0.5)),
    );

    let ball = Shape::regular_polygon(sides, 0.5)?;
    let columns = (n as f32).sqrt().ceil().max(1.0) as usize;
    for i in 0..n {
        let x = (i % columns) as f32 * 1.5 - width * 0.5;
        let y = (i / columns) as f32 * 1.2 + 1.0;
        controller.add_body(
            Body::new_spring(&ball, 1.0, 150.0, 2.0, 150.0, 2.0)?.with_position(Vec2::new(x, y)),
        );
    }
    controller.initialize();
    Ok(controller)
}

/// `n` squares spread far apart: exercises the bitmask rejection path.
pub fn setup_sparse_scene(n: usize) -> anyhow::Result<KinematicsController> {
    let mut controller = KinematicsController::new(ControllerConfig::default());
    let extent = n as f32 * 10.0;
    controller.set_world_limits(Vec2::splat(-extent), Vec2::splat(extent));

    let square = Shape::rectangle(1.0, 1.0)?;
    for i in 0..n {
        let t = i as f32;
        let position = Vec2::new(
            (t * 7.3) % (2.0 * extent) - extent,
            (t * 13.1) % (2.0 * extent) - extent,
        );
        controller.add_body(Body::new(&square, 1.0)?.with_position(position));
    }
    Ok(controller)
}

/// A polygon sunk into a wide floor, ready for narrowphase queries.
pub fn setup_contact_pair(sides: usize) -> anyhow::Result<(Body, Body)> {
    let floor =
        Body::new_static(&Shape::rectangle(20.0, 1.0)?)?.with_position(Vec2::new(0.0, -0.5));
    let body = Body::new(&Shape::regular_polygon(sides, 0.5)?, 1.0)?
        .with_position(Vec2::new(0.0, 0.45));
    Ok((floor, body))
}
