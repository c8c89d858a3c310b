//! Headless drop scene: a floor, a few soft and hard bodies, and a rope.
//!
//! Run with `RUST_LOG=debug` to see the controller's tracing events.

use glam::Vec2;
use kinematics2d::{Body, Chain, ControllerConfig, KinematicsController, Shape};

const FRAMES: usize = 240;
const FRAME_TIME: f64 = 1.0 / 60.0;

struct DropScene {
    controller: KinematicsController,
    tracked: Vec<(&'static str, kinematics2d::BodyHandle)>,
    rope: kinematics2d::ChainHandle,
}

impl DropScene {
    fn new() -> anyhow::Result<Self> {
        let mut controller = KinematicsController::new(ControllerConfig {
            gravity: Vec2::new(0.0, -9.81),
            ..Default::default()
        });

        // Floor and a tilted ramp
        controller.add_body(
            Body::new_static(&Shape::rectangle(24.0, 1.0)?)?.with_position(Vec2::new(0.0, -0.5)),
        );
        let ramp = Shape::from_points([
            Vec2::new(-8.0, 4.0),
            Vec2::new(-3.0, 1.5),
            Vec2::new(-3.0, 1.0),
            Vec2::new(-8.0, 3.5),
        ])?;
        controller.add_body(Body::new_static(&ramp)?);

        let mut tracked = Vec::new();
        tracked.push((
            "box",
            controller.add_body(
                Body::new(&Shape::rectangle(1.0, 1.0)?, 1.0)?.with_position(Vec2::new(2.0, 3.0)),
            ),
        ));
        tracked.push((
            "ball",
            controller.add_body(
                Body::new_spring(&Shape::regular_polygon(16, 0.6)?, 1.0, 150.0, 2.0, 150.0, 2.0)?
                    .with_position(Vec2::new(-6.0, 6.0)),
            ),
        ));
        tracked.push((
            "balloon",
            controller.add_body(
                Body::new_pressure(
                    &Shape::regular_polygon(12, 0.8)?,
                    0.5,
                    20.0,
                    80.0,
                    1.0,
                    0.0,
                    0.0,
                )?
                .with_position(Vec2::new(5.0, 5.0)),
            ),
        ));

        let rope = controller.add_chain(Chain::new(
            Vec2::new(-2.0, 8.0),
            Vec2::new(4.0, 8.0),
            12,
            40.0,
            0.5,
            0.05,
        )?);

        Ok(Self {
            controller,
            tracked,
            rope,
        })
    }

    fn run(&mut self) {
        for frame in 0..FRAMES {
            self.controller.step(FRAME_TIME);
            if frame % 60 == 59 {
                self.report(frame + 1);
            }
        }
    }

    fn report(&self, frame: usize) {
        for (name, handle) in &self.tracked {
            if let Some(body) = self.controller.body(*handle) {
                log::info!(
                    "frame {frame:>4} {name:<8} position = ({:>6.2}, {:>6.2}) angle = {:>6.2}",
                    body.position().x,
                    body.position().y,
                    body.angle()
                );
            }
        }
        if let Some(rope) = self.controller.chain(self.rope) {
            let lowest = rope
                .point_masses()
                .iter()
                .map(|pm| pm.position.y)
                .fold(f32::INFINITY, f32::min);
            log::info!("frame {frame:>4} rope     lowest y = {lowest:>6.2}");
        }
        log::info!(
            "frame {frame:>4} contacts = {}, deep = {}",
            self.controller.collisions().len(),
            self.controller.penetration_count()
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let mut scene = DropScene::new()?;
    scene.run();
    Ok(())
}
