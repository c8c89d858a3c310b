//! 2D point-mass physics: deformable bodies, springs, chains and contacts.
//!
//! # Architecture
//!
//! [`KinematicsController::update`] runs one tick in a fixed order:
//!
//! 1. Update every body (aggregate push, shape matching, internal forces,
//!    gravity, integration, AABB) and recompute its grid bitmasks
//! 2. Update every chain
//! 3. Broadphase: bitmask filter, then AABB overlap
//! 4. Narrowphase in both orders for each candidate pair
//! 5. Resolve every contact (positional correction + impulses)
//! 6. Re-aggregate body position, velocity and force
//!
//! Bodies and chains live as components in a [`hecs::World`] owned by the
//! controller and are addressed by [`BodyHandle`] / [`ChainHandle`].

pub mod aabb;
pub mod bitmask;
pub mod body;
pub mod broadphase;
pub mod chain;
pub mod contact;
pub mod narrowphase;
pub mod point_mass;
pub mod shape;
pub mod solver;
pub mod spring;

use glam::Vec2;
use tracing::{debug, trace};

use self::aabb::Aabb;
use self::body::Body;
use self::broadphase::WorldGrid;
use self::chain::Chain;
use self::contact::CollisionInfo;
use self::solver::{resolve_contact, Resolution, SolverParams};

/// Placement attempts per body in [`KinematicsController::move_distant_bodies`].
const MAX_PLACEMENT_ATTEMPTS: usize = 32;

/// Stable reference to a body registered with a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(hecs::Entity);

impl BodyHandle {
    pub fn entity(self) -> hecs::Entity {
        self.0
    }
}

/// Stable reference to a chain registered with a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainHandle(hecs::Entity);

impl ChainHandle {
    pub fn entity(self) -> hecs::Entity {
        self.0
    }
}

/// Configuration for the simulation.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Acceleration applied to every finite point mass. Default: (0, 0).
    pub gravity: Vec2,
    /// Tangential impulse multiplier. Default: 0.5.
    pub friction: f32,
    /// Restitution-like multiplier, not clamped; above 1 adds energy. Default: 0.5.
    pub elasticity: f32,
    /// Contacts deeper than this are skipped and counted. Default: 0.3.
    pub deep_penetration_threshold: f32,
    /// Extra push when one side of a contact is immovable. Default: 0.001.
    pub penetration_slop: f32,
    /// Fixed timestep used by [`KinematicsController::step`] in seconds. Default: 1/60.
    pub fixed_timestep: f64,
    /// Maximum number of fixed steps per `step` call. Default: 4.
    pub max_substeps: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::ZERO,
            friction: 0.5,
            elasticity: 0.5,
            deep_penetration_threshold: 0.3,
            penetration_slop: 0.001,
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 4,
        }
    }
}

impl ControllerConfig {
    fn solver_params(&self) -> SolverParams {
        SolverParams {
            friction: self.friction,
            elasticity: self.elasticity,
            deep_penetration_threshold: self.deep_penetration_threshold,
            penetration_slop: self.penetration_slop,
        }
    }
}

type OverlapHook = Box<dyn FnMut(BodyHandle, BodyHandle) + Send>;
type ContactHook = Box<dyn FnMut(&CollisionInfo) + Send>;
type PenetrationHook = Box<dyn FnMut(f32, BodyHandle, BodyHandle) + Send>;

/// Notification callbacks. They observe the step and never alter it.
#[derive(Default)]
struct Hooks {
    aabb_overlap: Option<OverlapHook>,
    contact: Option<ContactHook>,
    penetration: Option<PenetrationHook>,
}

/// The simulation driver: owns all bodies and chains and advances them.
pub struct KinematicsController {
    config: ControllerConfig,
    world: hecs::World,
    grid: WorldGrid,
    initialized: bool,
    accumulator: f64,
    collisions: Vec<CollisionInfo>,
    penetration_count: usize,
    hooks: Hooks,
}

impl Default for KinematicsController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl KinematicsController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            world: hecs::World::new(),
            grid: WorldGrid::default(),
            initialized: false,
            accumulator: 0.0,
            collisions: Vec::new(),
            penetration_count: 0,
            hooks: Hooks::default(),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ControllerConfig {
        &mut self.config
    }

    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        let points = body.point_count();
        let is_static = body.is_static();
        let handle = BodyHandle(self.world.spawn((body,)));
        debug!(?handle, points, is_static, "body added");
        handle
    }

    /// Unregister a body and hand it back. Returns `None` for unknown handles.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        let body = self.world.remove_one::<Body>(handle.0).ok()?;
        if self.world.despawn(handle.0).is_ok() {
            debug!(?handle, "body removed");
        }
        Some(body)
    }

    pub fn add_chain(&mut self, chain: Chain) -> ChainHandle {
        let points = chain.point_masses().len();
        let handle = ChainHandle(self.world.spawn((chain,)));
        debug!(?handle, points, "chain added");
        handle
    }

    pub fn remove_chain(&mut self, handle: ChainHandle) -> Option<Chain> {
        let chain = self.world.remove_one::<Chain>(handle.0).ok()?;
        if self.world.despawn(handle.0).is_ok() {
            debug!(?handle, "chain removed");
        }
        Some(chain)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<hecs::Ref<'_, Body>> {
        self.world.get::<&Body>(handle.0).ok()
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<hecs::RefMut<'_, Body>> {
        self.world.get::<&mut Body>(handle.0).ok()
    }

    pub fn chain(&self, handle: ChainHandle) -> Option<hecs::Ref<'_, Chain>> {
        self.world.get::<&Chain>(handle.0).ok()
    }

    pub fn chain_mut(&mut self, handle: ChainHandle) -> Option<hecs::RefMut<'_, Chain>> {
        self.world.get::<&mut Chain>(handle.0).ok()
    }

    pub fn body_handles(&self) -> Vec<BodyHandle> {
        self.world
            .query::<&Body>()
            .iter()
            .map(|(entity, _)| BodyHandle(entity))
            .collect()
    }

    pub fn chain_handles(&self) -> Vec<ChainHandle> {
        self.world
            .query::<&Chain>()
            .iter()
            .map(|(entity, _)| ChainHandle(entity))
            .collect()
    }

    pub fn body_count(&self) -> usize {
        self.world.query::<&Body>().iter().count()
    }

    /// Set the world bounds used by the broadphase grid.
    pub fn set_world_limits(&mut self, min: Vec2, max: Vec2) {
        self.grid = WorldGrid::new(min, max);
        self.initialized = true;
        debug!(%min, %max, cell = %self.grid.cell(), "world limits set");
    }

    /// Derive the world bounds from the static bodies (always including the
    /// origin) and settle those bodies. Runs on the first `update` unless
    /// limits were set explicitly.
    pub fn initialize(&mut self) {
        let mut bounds = Aabb::new(Vec2::ZERO, Vec2::ZERO);
        for (_, body) in self.world.query_mut::<&mut Body>() {
            if !body.is_static() {
                continue;
            }
            body.update(0.0, Vec2::ZERO);
            bounds.merge(body.aabb());
        }
        self.set_world_limits(bounds.min, bounds.max);
    }

    pub fn world_aabb(&self) -> &Aabb {
        self.grid.aabb()
    }

    pub fn cell_size(&self) -> Vec2 {
        self.grid.cell()
    }

    /// Contacts generated by the last `update`.
    pub fn collisions(&self) -> &[CollisionInfo] {
        &self.collisions
    }

    /// Contacts skipped as too deep during the last `update`.
    pub fn penetration_count(&self) -> usize {
        self.penetration_count
    }

    pub fn on_aabb_overlap(&mut self, hook: impl FnMut(BodyHandle, BodyHandle) + Send + 'static) {
        self.hooks.aabb_overlap = Some(Box::new(hook));
    }

    pub fn on_contact(&mut self, hook: impl FnMut(&CollisionInfo) + Send + 'static) {
        self.hooks.contact = Some(Box::new(hook));
    }

    /// Called with `(penetration, vertex body, edge body)` for each contact
    /// skipped as too deep.
    pub fn on_penetration(&mut self, hook: impl FnMut(f32, BodyHandle, BodyHandle) + Send + 'static) {
        self.hooks.penetration = Some(Box::new(hook));
    }

    pub fn clear_hooks(&mut self) {
        self.hooks = Hooks::default();
    }

    /// Advance the simulation by `delta_time` seconds using fixed steps.
    pub fn step(&mut self, delta_time: f64) {
        self.accumulator += delta_time;

        let mut substeps = 0u32;
        while self.accumulator >= self.config.fixed_timestep && substeps < self.config.max_substeps
        {
            self.update(self.config.fixed_timestep as f32);
            self.accumulator -= self.config.fixed_timestep;
            substeps += 1;
        }

        // Clamp accumulator to avoid spiral of death
        if self.accumulator > self.config.fixed_timestep * self.config.max_substeps as f64 {
            self.accumulator = 0.0;
        }
    }

    /// Advance the simulation by exactly `elapsed` seconds.
    pub fn update(&mut self, elapsed: f32) {
        if !self.initialized {
            self.initialize();
        }

        self.penetration_count = 0;
        self.collisions.clear();

        let gravity = self.config.gravity;
        let grid = self.grid;
        for (_, body) in self.world.query_mut::<&mut Body>() {
            body.update(elapsed, gravity);
            grid.update_bitmask(body);
        }
        for (_, chain) in self.world.query_mut::<&mut Chain>() {
            chain.update(elapsed, gravity);
        }

        let pairs = self.grid.find_pairs(&self.world);
        self.detect_contacts(&pairs);

        let params = self.config.solver_params();
        let collisions = std::mem::take(&mut self.collisions);
        for info in &collisions {
            if let Some(hook) = self.hooks.contact.as_mut() {
                hook(info);
            }
            if self.resolve(info, &params) == Some(Resolution::DeepPenetration) {
                self.penetration_count += 1;
                if let Some(hook) = self.hooks.penetration.as_mut() {
                    hook(info.penetration, info.body_a, info.body_b);
                }
            }
        }
        self.collisions = collisions;

        for (_, body) in self.world.query_mut::<&mut Body>() {
            body.update_aggregate();
        }

        trace!(
            pairs = pairs.len(),
            contacts = self.collisions.len(),
            deep = self.penetration_count,
            "step complete"
        );
        if self.penetration_count > 0 {
            debug!(count = self.penetration_count, "deep penetrations skipped");
        }
    }

    fn detect_contacts(&mut self, pairs: &[(hecs::Entity, hecs::Entity)]) {
        let threshold = self.config.deep_penetration_threshold;
        for &(entity_a, entity_b) in pairs {
            let (handle_a, handle_b) = (BodyHandle(entity_a), BodyHandle(entity_b));
            if let Some(hook) = self.hooks.aabb_overlap.as_mut() {
                hook(handle_a, handle_b);
            }

            let (Ok(body_a), Ok(body_b)) = (
                self.world.get::<&Body>(entity_a),
                self.world.get::<&Body>(entity_b),
            ) else {
                continue;
            };

            self.collisions.extend(
                narrowphase::intersects(&body_b, &body_a, threshold)
                    .into_iter()
                    .map(|contact| CollisionInfo::new(handle_a, handle_b, contact)),
            );
            self.collisions.extend(
                narrowphase::intersects(&body_a, &body_b, threshold)
                    .into_iter()
                    .map(|contact| CollisionInfo::new(handle_b, handle_a, contact)),
            );
        }
    }

    /// Copy the contact's point masses out, resolve, and write them back.
    fn resolve(&mut self, info: &CollisionInfo, params: &SolverParams) -> Option<Resolution> {
        let (mut a, mut b1, mut b2) = {
            let vertex_body = self.world.get::<&Body>(info.body_a.0).ok()?;
            let edge_body = self.world.get::<&Body>(info.body_b.0).ok()?;
            let a = *vertex_body.point_masses().get(info.point_mass_a)?;
            let b1 = *edge_body.point_masses().get(info.point_mass_b)?;
            let b2 = *edge_body.point_masses().get(info.point_mass_c)?;
            (a, b1, b2)
        };

        let result = resolve_contact(&info.contact(), &mut a, &mut b1, &mut b2, params);
        if matches!(result, Resolution::Resolved | Resolution::Separating) {
            if let Ok(mut body) = self.world.get::<&mut Body>(info.body_a.0) {
                body.point_masses_mut()[info.point_mass_a] = a;
            }
            if let Ok(mut body) = self.world.get::<&mut Body>(info.body_b.0) {
                let point_masses = body.point_masses_mut();
                point_masses[info.point_mass_b] = b1;
                point_masses[info.point_mass_c] = b2;
            }
        }
        Some(result)
    }

    /// First body whose outline contains `point`.
    pub fn body_at_point(&self, point: Vec2) -> Option<BodyHandle> {
        self.world
            .query::<&Body>()
            .iter()
            .find(|(_, body)| body.aabb().contains(point) && body.contains(point))
            .map(|(entity, _)| BodyHandle(entity))
    }

    pub fn is_point_inside_any_body(&self, point: Vec2) -> bool {
        self.body_at_point(point).is_some()
    }

    /// Move every dynamic body farther than `far` from `position` to a free
    /// spot in the ring between `near` and `far`.
    ///
    /// `sample` must yield values in [0, 1). Bodies for which no free spot is
    /// found after a bounded number of attempts stay where they are.
    pub fn move_distant_bodies(
        &mut self,
        position: Vec2,
        near: f32,
        far: f32,
        mut sample: impl FnMut() -> f32,
    ) {
        let distant: Vec<hecs::Entity> = self
            .world
            .query::<&Body>()
            .iter()
            .filter(|(_, body)| !body.is_static() && body.position().distance(position) > far)
            .map(|(entity, _)| entity)
            .collect();

        for entity in distant {
            let target = (0..MAX_PLACEMENT_ATTEMPTS)
                .map(|_| ring_point(position, near, far, &mut sample))
                .find(|&candidate| !self.is_point_inside_any_body(candidate));

            let Some(target) = target else {
                debug!(?entity, "no free spot found for distant body");
                continue;
            };
            if let Ok(mut body) = self.world.get::<&mut Body>(entity) {
                body.set_position(target);
                body.update(0.0, Vec2::ZERO);
            }
        }
    }
}

fn ring_point(center: Vec2, near: f32, far: f32, sample: &mut impl FnMut() -> f32) -> Vec2 {
    let direction = Vec2::new(sample() - 0.5, sample() - 0.5).normalize_or(Vec2::X);
    center + direction * (near + (far - near) * sample())
}
