//! Physics engine
//!
//! Owns the broad-phase structures, listeners and trigger state, and steps
//! every top-level body once per [`PhysicsEngine::update`]. Entities and
//! terrain are borrowed from the caller for the duration of each call.
//!
//! Per tick: rebuild the spatial grid if stale, sweep the pair cache if due,
//! then for each entity integrate kinematics, resolve entity contacts and
//! resolve terrain contacts, and finally refresh trigger inside-sets.

use super::collision::{CollisionEvent, CollisionKind, Ray};
use super::error::PhysicsError;
use super::events::{CollisionDispatcher, ListenerId};
use super::kinematics::{self, StepContext};
use super::narrow_phase::{self, SphereState};
use super::raycast::{self, RaycastOptions, RaycastResult};
use super::settings::{PhysicsConfig, QualitySettings, QualityTier};
use super::stats::PhysicsStats;
use super::terrain_collision;
use super::trigger::{TriggerEvent, TriggerShape, TriggerVolume};
use crate::config::Config;
use crate::ecs::components::PhysicsBody;
use crate::ecs::{Entity, PhysicsScene};
use crate::foundation::math::{utils, Axis, Vec3};
use crate::foundation::time::{SimClock, Stopwatch};
use crate::spatial::{CollisionPairCache, GridEntry, SpatialHashGrid};
use crate::terrain::{TerrainQuery, VoxelVolume};
use std::collections::HashMap;
use std::path::Path;

/// Collision and rigid-motion engine for a voxel world
#[derive(Debug)]
pub struct PhysicsEngine {
    config: PhysicsConfig,
    quality: QualitySettings,
    clock: SimClock,
    grid: SpatialHashGrid,
    pair_cache: CollisionPairCache,
    dispatcher: CollisionDispatcher,
    triggers: HashMap<Entity, TriggerVolume>,
    stats: PhysicsStats,
}

impl PhysicsEngine {
    /// Create an engine from a validated configuration
    pub fn new(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        let quality = config.quality_settings();
        log::info!(
            "Physics engine created: quality={}, cell={}, gravity={}",
            config.quality,
            quality.cell_size,
            config.gravity
        );

        Ok(Self {
            grid: SpatialHashGrid::new(quality.cell_size),
            pair_cache: CollisionPairCache::new(quality.pair_cache_timeout_ms),
            config,
            quality,
            clock: SimClock::new(),
            dispatcher: CollisionDispatcher::new(),
            triggers: HashMap::new(),
            stats: PhysicsStats::default(),
        })
    }

    /// Create an engine from a `.toml` or `.ron` config file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, PhysicsError> {
        let path = path.as_ref();
        let config = PhysicsConfig::load_from_file(path)?;
        log::info!("Loaded physics config from {}", path.display());
        Self::new(config)
    }

    /// Active configuration
    pub const fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Active quality tier
    pub const fn quality(&self) -> QualityTier {
        self.config.quality
    }

    /// Switch quality tier; the grid is rebuilt on the next tick
    pub fn set_quality(&mut self, tier: QualityTier) {
        self.config.quality = tier;
        self.quality = tier.settings();
        self.grid.set_cell_size(self.quality.cell_size);
        self.pair_cache.set_timeout_ms(self.quality.pair_cache_timeout_ms);
        log::info!("Physics quality set to {tier} (cell size {})", self.quality.cell_size);
    }

    /// Switch quality tier by name (`low`, `medium`, `high`)
    pub fn set_quality_by_name(&mut self, name: &str) -> Result<(), PhysicsError> {
        let tier = name.parse()?;
        self.set_quality(tier);
        Ok(())
    }

    /// Performance counters
    pub const fn stats(&self) -> &PhysicsStats {
        &self.stats
    }

    /// Zero all performance counters
    pub fn reset_stats(&mut self) {
        self.stats = PhysicsStats::default();
    }

    /// Simulation time in milliseconds
    pub const fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Advance the simulation by `elapsed_ms`
    ///
    /// Non-finite or non-positive elapsed times are ignored. The integration
    /// step is clamped to `max_timestep_ms`. Terrain-dependent work (gravity,
    /// terrain collision) is skipped until `terrain` reports ready.
    pub fn update(
        &mut self,
        scene: &mut dyn PhysicsScene,
        terrain: Option<&dyn VoxelVolume>,
        elapsed_ms: f32,
    ) {
        if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            log::trace!("Ignoring tick with elapsed time {elapsed_ms}");
            return;
        }

        self.clock.advance(elapsed_ms);
        let now = self.clock.now_ms();
        let dt = elapsed_ms.min(self.config.max_timestep_ms) / 1000.0;
        let terrain = TerrainQuery::new(terrain);

        self.rebuild_grid_if_stale(scene, now);
        if let Some(evicted) = self
            .pair_cache
            .maybe_sweep(now, f64::from(self.config.cache_sweep_interval_ms))
        {
            if evicted > 0 {
                log::debug!("Pair cache sweep evicted {evicted} entries ({} left)", self.pair_cache.len());
            }
        }

        for entity in scene.entities() {
            if !scene.is_top_level(entity) || scene.body(entity).is_none() {
                continue;
            }
            self.integrate_entity(scene, &terrain, entity, dt);
            self.resolve_entity_contacts(scene, entity, now);
            self.resolve_terrain_contacts(scene, &terrain, entity);
        }

        self.refresh_triggers(scene);
        self.stats.ticks += 1;
    }

    fn rebuild_grid_if_stale(&mut self, scene: &dyn PhysicsScene, now: f64) {
        if !self.grid.needs_rebuild(now, self.quality.grid_rebuild_interval_ms) {
            return;
        }

        let stopwatch = Stopwatch::start_new();
        let entries: Vec<GridEntry> = scene
            .entities()
            .into_iter()
            .filter(|&entity| scene.is_top_level(entity))
            .filter_map(|entity| {
                let body = scene.body(entity)?;
                if !body.is_collidable() {
                    return None;
                }
                Some(GridEntry {
                    entity,
                    position: scene.world_position(entity)?,
                    radius: body.radius,
                })
            })
            .collect();
        self.grid.rebuild(entries, now);

        self.stats.grid_rebuilds += 1;
        self.stats.last_grid_rebuild_ms = stopwatch.elapsed_millis();
        log::debug!(
            "Spatial grid rebuilt: {} entities in {} cells ({:.3} ms)",
            self.grid.entity_count(),
            self.grid.cell_count(),
            self.stats.last_grid_rebuild_ms
        );
    }

    fn integrate_entity(
        &self,
        scene: &mut dyn PhysicsScene,
        terrain: &TerrainQuery<'_>,
        entity: Entity,
        dt: f32,
    ) {
        let Some(position) = scene.local_position(entity) else {
            return;
        };
        let exempt = scene.is_exempt(entity);
        let grounded = terrain.is_grounded(position, self.config.ground_probe);

        let Some(body) = scene.body_mut(entity) else {
            return;
        };
        let context = StepContext {
            grounded,
            gravity_active: body.has_gravity && !exempt && terrain.is_ready(),
        };
        let new_position = kinematics::integrate(body, position, context, &self.config, dt);

        if new_position != position {
            scene.set_local_position(entity, new_position);
            scene.mark_dirty(entity);
        }
    }

    /// Brute-force candidate set matching what the grid indexes
    fn top_level_entities(scene: &dyn PhysicsScene) -> Vec<Entity> {
        let mut entities = scene.entities();
        entities.retain(|&entity| scene.is_top_level(entity));
        entities
    }

    fn sphere_state(scene: &dyn PhysicsScene, entity: Entity) -> Option<SphereState> {
        let body = scene.body(entity)?;
        Some(SphereState {
            entity,
            position: scene.world_position(entity)?,
            radius: body.radius,
            velocity: body.velocity,
        })
    }

    fn resolve_entity_contacts(&mut self, scene: &mut dyn PhysicsScene, entity: Entity, now: f64) {
        if scene.is_exempt(entity) || !scene.body(entity).is_some_and(PhysicsBody::is_collidable) {
            return;
        }
        let Some(position) = scene.world_position(entity) else {
            return;
        };

        let candidates = if self.grid.is_empty() {
            Self::top_level_entities(&*scene)
        } else {
            self.grid.query_nearby(position)
        };

        for other in candidates {
            if other == entity {
                continue;
            }
            if self.pair_cache.should_skip(entity, other, now) {
                self.stats.cache_skips += 1;
                continue;
            }
            if !narrow_phase::should_test_pair(&*scene, entity, other) {
                continue;
            }
            self.pair_cache.record(entity, other, now);
            self.stats.collision_checks += 1;

            let (Some(a), Some(b)) = (
                Self::sphere_state(&*scene, entity),
                Self::sphere_state(&*scene, other),
            ) else {
                continue;
            };
            let physical = !scene.body(entity).is_some_and(PhysicsBody::is_trigger)
                && !scene.body(other).is_some_and(PhysicsBody::is_trigger);

            let Some(contact) =
                narrow_phase::resolve_sphere_pair(&a, &b, self.config.restitution, physical)
            else {
                continue;
            };
            self.stats.collisions += 1;

            if physical {
                let correction = contact.position_a - a.position;
                if let Some(local) = scene.local_position(entity) {
                    scene.set_local_position(entity, local + correction);
                    scene.mark_dirty(entity);
                }
                if let Some(body) = scene.body_mut(entity) {
                    body.velocity = contact.velocity_a;
                }
                if let Some(body) = scene.body_mut(other) {
                    body.velocity = contact.velocity_b;
                }
            }

            for event in contact.events(&a, &b) {
                self.dispatch(&*scene, &event);
            }
        }
    }

    fn resolve_terrain_contacts(
        &mut self,
        scene: &mut dyn PhysicsScene,
        terrain: &TerrainQuery<'_>,
        entity: Entity,
    ) {
        if !terrain.is_ready() || scene.is_exempt(entity) {
            return;
        }
        let Some(position) = scene.local_position(entity) else {
            return;
        };
        let Some(body) = scene.body_mut(entity) else {
            return;
        };
        if body.is_trigger() {
            return;
        }

        let resolution = terrain_collision::resolve_terrain(
            terrain,
            body,
            position,
            self.config.terrain_restitution,
            self.config.bounce_threshold,
        );
        if !resolution.corrected() {
            return;
        }

        self.stats.terrain_contacts += u64::from(resolution.contacts);
        scene.set_local_position(entity, resolution.position);
        scene.mark_dirty(entity);

        if let Some(floor) = resolution.floor {
            let event = CollisionEvent::with_terrain(
                entity,
                floor.position,
                floor.normal,
                floor.velocity,
                floor.force,
            );
            self.dispatch(&*scene, &event);
        }
    }

    /// Deliver an event to listeners and let triggers react to it
    fn dispatch(&mut self, scene: &dyn PhysicsScene, event: &CollisionEvent) {
        self.dispatcher.dispatch(event);

        if event.kind != CollisionKind::Entity {
            return;
        }
        let (Some(trigger), Some(other)) = (self.triggers.get_mut(&event.entity), event.other) else {
            return;
        };
        if let (Some(origin), Some(position)) =
            (scene.world_position(event.entity), scene.world_position(other))
        {
            trigger.on_contact(other, position - origin);
        }
    }

    fn refresh_triggers(&mut self, scene: &dyn PhysicsScene) {
        let mut vanished = Vec::new();
        for (&entity, trigger) in &mut self.triggers {
            match scene.world_position(entity) {
                Some(origin) => {
                    trigger.refresh(|other| scene.world_position(other).map(|p| p - origin));
                }
                None => {
                    trigger.refresh(|_| None);
                    vanished.push(entity);
                }
            }
        }
        for entity in vanished {
            log::debug!("Dropping trigger {entity:?}: entity no longer exists");
            self.triggers.remove(&entity);
        }
    }

    /// Cast a ray against terrain and entity spheres
    ///
    /// Unready or absent terrain is skipped. A miss reports
    /// `distance == max_distance`.
    pub fn raycast(
        &mut self,
        scene: &dyn PhysicsScene,
        terrain: Option<&dyn VoxelVolume>,
        origin: Vec3,
        direction: Vec3,
        options: &RaycastOptions,
    ) -> RaycastResult {
        self.stats.raycasts += 1;
        let max_distance = options
            .max_distance
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(self.config.ray_max_distance);
        let ray = Ray::new(origin, direction);
        if !utils::is_finite(&ray.origin) {
            return RaycastResult::miss(&ray, max_distance);
        }

        let terrain_hit = if options.ignore_terrain {
            None
        } else {
            TerrainQuery::new(terrain)
                .ready_volume()
                .and_then(|volume| raycast::cast_terrain(volume, &ray, max_distance))
        };

        let entity_hit = if options.ignore_entities {
            None
        } else {
            let candidates = if self.grid.is_empty() {
                None
            } else {
                self.grid.query_ray(ray.origin, ray.direction, max_distance)
            };
            let candidates = candidates.unwrap_or_else(|| Self::top_level_entities(scene));
            raycast::cast_entities(scene, candidates, &ray, max_distance, options)
        };

        raycast::merge_hits(&ray, max_distance, terrain_hit, entity_hit)
    }

    /// Move an entity by `delta`, one axis at a time, stopping at terrain
    ///
    /// An axis whose move would put the body inside solid terrain is skipped
    /// and its velocity component zeroed. Exempt entities, bodiless entities
    /// and entities in unready terrain move freely. Returns the displacement
    /// actually applied.
    pub fn apply_movement(
        &mut self,
        scene: &mut dyn PhysicsScene,
        terrain: Option<&dyn VoxelVolume>,
        entity: Entity,
        delta: Vec3,
    ) -> Vec3 {
        let (Some(local), Some(world)) = (scene.local_position(entity), scene.world_position(entity))
        else {
            return Vec3::zeros();
        };
        if !utils::is_finite(&delta) {
            log::warn!("Ignoring non-finite movement {delta:?} for {entity:?}");
            return Vec3::zeros();
        }

        let terrain = TerrainQuery::new(terrain);
        let body = scene
            .body(entity)
            .filter(|body| body.is_collidable())
            .cloned();
        let applied = match body {
            Some(body) if terrain.is_ready() && !scene.is_exempt(entity) => {
                let mut applied = Vec3::zeros();
                let mut current = world;
                for axis in Axis::ALL {
                    let i = axis.index();
                    if delta[i] == 0.0 {
                        continue;
                    }
                    let mut candidate = current;
                    candidate[i] += delta[i];
                    if terrain_collision::body_overlaps_terrain(&terrain, &body, candidate) {
                        if let Some(body) = scene.body_mut(entity) {
                            body.velocity[i] = 0.0;
                        }
                    } else {
                        current = candidate;
                        applied[i] = delta[i];
                    }
                }
                applied
            }
            _ => delta,
        };

        if applied != Vec3::zeros() {
            scene.set_local_position(entity, local + applied);
            scene.mark_dirty(entity);
        }
        applied
    }

    /// Overwrite an entity's velocity; returns `false` without a body
    pub fn set_velocity(&mut self, scene: &mut dyn PhysicsScene, entity: Entity, velocity: Vec3) -> bool {
        self.update_body(scene, entity, |body| body.set_velocity(velocity))
    }

    /// Add to an entity's velocity; returns `false` without a body
    pub fn add_velocity(&mut self, scene: &mut dyn PhysicsScene, entity: Entity, delta: Vec3) -> bool {
        self.update_body(scene, entity, |body| body.add_velocity(delta))
    }

    /// Zero an entity's velocity; returns `false` without a body
    pub fn stop(&mut self, scene: &mut dyn PhysicsScene, entity: Entity) -> bool {
        self.update_body(scene, entity, PhysicsBody::stop)
    }

    /// Push every body within `radius` of `center` outward
    ///
    /// With `falloff` the impulse shrinks linearly to zero at the edge.
    /// Exempt entities and triggers are unaffected. Returns how many bodies
    /// were pushed.
    pub fn apply_radial_force(
        &mut self,
        scene: &mut dyn PhysicsScene,
        center: Vec3,
        radius: f32,
        strength: f32,
        falloff: bool,
    ) -> usize {
        if radius <= 0.0 || !radius.is_finite() || !strength.is_finite() {
            return 0;
        }

        let mut affected = 0;
        for entity in scene.entities() {
            if !scene.is_top_level(entity) || scene.is_exempt(entity) {
                continue;
            }
            let Some(position) = scene.world_position(entity) else {
                continue;
            };
            let offset = position - center;
            let distance = offset.magnitude();
            if distance > radius {
                continue;
            }
            let Some(body) = scene.body_mut(entity) else {
                continue;
            };
            if body.is_trigger() {
                continue;
            }

            let scale = if falloff { 1.0 - distance / radius } else { 1.0 };
            body.add_velocity(utils::normalize_or_up(offset) * strength * scale);
            affected += 1;
        }
        log::debug!("Radial force at {center:?} (r={radius}) pushed {affected} bodies");
        affected
    }

    /// Entities with a body whose position lies within `radius` of `center`, nearest first
    pub fn find_entities_in_radius(&self, scene: &dyn PhysicsScene, center: Vec3, radius: f32) -> Vec<Entity> {
        let mut found: Vec<(Entity, f32)> = scene
            .entities()
            .into_iter()
            .filter(|&entity| scene.body(entity).is_some())
            .filter_map(|entity| {
                let distance = (scene.world_position(entity)? - center).magnitude();
                (distance <= radius).then_some((entity, distance))
            })
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1));
        found.into_iter().map(|(entity, _)| entity).collect()
    }

    /// Whether an entity stands on solid terrain
    pub fn is_grounded(
        &self,
        scene: &dyn PhysicsScene,
        terrain: Option<&dyn VoxelVolume>,
        entity: Entity,
    ) -> bool {
        scene
            .world_position(entity)
            .is_some_and(|position| {
                TerrainQuery::new(terrain).is_grounded(position, self.config.ground_probe)
            })
    }

    /// Attach or replace an entity's physics body
    pub fn configure_entity(&mut self, scene: &mut dyn PhysicsScene, entity: Entity, body: PhysicsBody) -> bool {
        let attached = scene.set_body(entity, body);
        if attached {
            log::debug!("Configured physics body for {entity:?}");
        } else {
            log::warn!("Cannot configure physics for missing entity {entity:?}");
        }
        attached
    }

    /// Mutate an entity's physics body in place; returns `false` without a body
    pub fn update_body(
        &mut self,
        scene: &mut dyn PhysicsScene,
        entity: Entity,
        f: impl FnOnce(&mut PhysicsBody),
    ) -> bool {
        scene.body_mut(entity).map(f).is_some()
    }

    /// Listen for collision events about one entity
    pub fn add_collision_listener(
        &mut self,
        entity: Entity,
        listener: impl FnMut(&CollisionEvent) + 'static,
    ) -> ListenerId {
        self.dispatcher.add_entity_listener(entity, Box::new(listener))
    }

    /// Listen for every collision event
    pub fn add_global_listener(&mut self, listener: impl FnMut(&CollisionEvent) + 'static) -> ListenerId {
        self.dispatcher.add_global_listener(Box::new(listener))
    }

    /// Remove a collision listener
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.dispatcher.remove_listener(id)
    }

    /// Turn an entity into a trigger volume
    ///
    /// Replaces its body with a static `TRIGGER`-layer body sized to the
    /// shape's bounding radius. Returns `false` for missing entities.
    pub fn add_trigger(
        &mut self,
        scene: &mut dyn PhysicsScene,
        entity: Entity,
        shape: TriggerShape,
        listener: impl FnMut(TriggerEvent) + 'static,
    ) -> bool {
        let body = PhysicsBody::new(shape.bounding_radius()).as_trigger();
        if !scene.set_body(entity, body) {
            log::warn!("Cannot add trigger to missing entity {entity:?}");
            return false;
        }
        self.triggers.insert(entity, TriggerVolume::new(shape, Box::new(listener)));
        log::debug!("Trigger {entity:?} added with {shape:?}");
        true
    }

    /// Stop treating an entity as a trigger; no exit events are fired
    pub fn remove_trigger(&mut self, entity: Entity) -> bool {
        self.triggers.remove(&entity).is_some()
    }

    /// Entities currently inside a trigger
    pub fn entities_inside(&self, trigger: Entity) -> Vec<Entity> {
        self.triggers
            .get(&trigger)
            .map(|volume| volume.inside().collect())
            .unwrap_or_default()
    }

    /// Drop all engine state about an entity that is being removed from the scene
    pub fn forget_entity(&mut self, entity: Entity) {
        self.dispatcher.forget_entity(entity);
        self.triggers.remove(&entity);
        for trigger in self.triggers.values_mut() {
            trigger.forget(entity);
        }
        self.pair_cache.forget(entity);
    }
}
