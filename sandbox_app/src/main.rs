//! Voxel physics sandbox
//!
//! Builds a small walled arena, drops a crowd of random bodies into it next
//! to a trigger pad, and steps the engine headlessly while logging contacts,
//! trigger activity and performance counters.
//!
//! Usage: `voxel_sandbox [config.toml|config.ron] [--quality low|medium|high] [--ticks N]`

use rand::Rng;
use std::cell::Cell;
use std::rc::Rc;
use voxel_physics::prelude::*;

const ARENA_SIZE: usize = 48;
const TICK_MS: f32 = 16.0;
const DEFAULT_TICKS: u32 = 600;
const CROWD_SIZE: usize = 40;

/// Command line options
struct Options {
    config_path: Option<String>,
    quality: Option<String>,
    ticks: u32,
}

impl Options {
    fn from_args() -> Result<Self, Box<dyn std::error::Error>> {
        let mut options = Self { config_path: None, quality: None, ticks: DEFAULT_TICKS };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--quality" => options.quality = Some(args.next().ok_or("--quality needs a value")?),
                "--ticks" => options.ticks = args.next().ok_or("--ticks needs a value")?.parse()?,
                _ => options.config_path = Some(arg),
            }
        }
        Ok(options)
    }
}

struct SandboxApp {
    engine: PhysicsEngine,
    world: World,
    terrain: DenseVolume,
    player: Entity,
    pad: Entity,
    impacts: Rc<Cell<u32>>,
    pad_visits: Rc<Cell<u32>>,
}

impl SandboxApp {
    fn new(options: &Options) -> Result<Self, Box<dyn std::error::Error>> {
        log::info!("Creating sandbox...");
        let mut engine = match &options.config_path {
            Some(path) => PhysicsEngine::from_config_file(path)?,
            None => PhysicsEngine::new(PhysicsConfig::default())?,
        };
        if let Some(quality) = &options.quality {
            engine.set_quality_by_name(quality)?;
        }

        let terrain = Self::build_arena();
        let mut world = World::new();

        let player = world.create_entity_with_kind(EntityKind::Player, Vec3::new(8.5, 6.0, 8.5));
        engine.configure_entity(
            &mut world,
            player,
            PhysicsBody::new(0.4)
                .with_height(1.8)
                .with_layers(CollisionLayers::PLAYER, CollisionLayers::ALL),
        );

        let impacts = Rc::new(Cell::new(0));
        let counter = Rc::clone(&impacts);
        engine.add_collision_listener(player, move |event| {
            if event.kind == CollisionKind::Terrain && event.force > 1.0 {
                log::info!("Player landed hard (force {:.2})", event.force);
            }
            counter.set(counter.get() + 1);
        });

        let pad = world.create_entity_with_kind(EntityKind::Trigger, Vec3::new(24.0, 2.0, 24.0));
        let pad_visits = Rc::new(Cell::new(0));
        let visits = Rc::clone(&pad_visits);
        engine.add_trigger(
            &mut world,
            pad,
            TriggerShape::Cylinder { radius: 4.0, half_height: 1.0 },
            move |event| match event {
                TriggerEvent::Enter(entity) => {
                    visits.set(visits.get() + 1);
                    log::info!("{entity:?} stepped onto the pad");
                }
                TriggerEvent::Exit(entity) => log::info!("{entity:?} left the pad"),
                TriggerEvent::Stay(_) => {}
            },
        );

        let mut app = Self { engine, world, terrain, player, pad, impacts, pad_visits };
        app.spawn_crowd(CROWD_SIZE);
        Ok(app)
    }

    /// Floor slab, perimeter walls and a low ledge
    fn build_arena() -> DenseVolume {
        let max = ARENA_SIZE as i32 - 1;
        let mut terrain = DenseVolume::new(ARENA_SIZE, ARENA_SIZE, ARENA_SIZE);
        terrain.fill_box([0, 0, 0], [max, 0, max], 1);
        terrain.fill_box([0, 1, 0], [max, 4, 0], 2);
        terrain.fill_box([0, 1, max], [max, 4, max], 2);
        terrain.fill_box([0, 1, 0], [0, 4, max], 2);
        terrain.fill_box([max, 1, 0], [max, 4, max], 2);
        terrain.fill_box([12, 1, 30], [20, 1, 34], 3);
        terrain
    }

    fn spawn_crowd(&mut self, count: usize) {
        let mut rng = rand::thread_rng();
        let span = ARENA_SIZE as f32 - 4.0;
        for _ in 0..count {
            let position = Vec3::new(
                rng.gen_range(2.0..span),
                rng.gen_range(3.0..12.0),
                rng.gen_range(2.0..span),
            );
            let velocity = Vec3::new(rng.gen_range(-4.0..4.0), 0.0, rng.gen_range(-4.0..4.0));
            let entity = self.world.create_entity_at(position);
            self.engine.configure_entity(
                &mut self.world,
                entity,
                PhysicsBody::new(rng.gen_range(0.3..0.8)).with_velocity(velocity),
            );
        }
        log::info!("Spawned {count} bodies");
    }

    fn run(&mut self, ticks: u32) {
        log::info!("Running {ticks} ticks (terrain still loading for the first 30)");
        for tick in 0..ticks {
            // Simulates streaming: gravity stays off until the volume is ready
            if tick == 30 {
                self.terrain.set_ready(true);
                log::info!("Terrain ready");
            }
            if tick == ticks / 2 {
                self.detonate();
            }

            self.engine.update(&mut self.world, Some(&self.terrain), TICK_MS);
            self.world.take_dirty();

            if tick % 120 == 0 {
                self.report(tick);
            }
        }
        self.report(ticks);
    }

    fn detonate(&mut self) {
        let center = Vec3::new(24.0, 1.0, 24.0);
        let pushed = self.engine.apply_radial_force(&mut self.world, center, 10.0, 12.0, true);
        log::info!("Explosion at {center:?} pushed {pushed} bodies");

        let probe = self.engine.raycast(
            &self.world,
            Some(&self.terrain),
            Vec3::new(24.0, 20.0, 24.0),
            Vec3::new(0.0, -1.0, 0.0),
            &RaycastOptions::new(),
        );
        log::info!(
            "Probe ray: hit={} distance={:.2} entity={:?} voxel={:?}",
            probe.hit,
            probe.distance,
            probe.entity,
            probe.voxel_value
        );
    }

    fn report(&self, tick: u32) {
        let grounded = self.engine.is_grounded(&self.world, Some(&self.terrain), self.player);
        let nearby = self
            .engine
            .find_entities_in_radius(&self.world, Vec3::new(24.0, 1.0, 24.0), 6.0);
        log::info!(
            "tick {tick}: player grounded={grounded} impacts={} pad visits={} inside pad={} near centre={}",
            self.impacts.get(),
            self.pad_visits.get(),
            self.engine.entities_inside(self.pad).len(),
            nearby.len()
        );
        log::info!("stats: {}", self.engine.stats());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting voxel physics sandbox");
    let options = Options::from_args()?;
    let mut app = SandboxApp::new(&options)?;
    app.run(options.ticks);
    log::info!("Sandbox finished");
    Ok(())
}
