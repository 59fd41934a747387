//! Trigger volume enter/stay/exit scenarios

use super::*;
use crate::ecs::EntityKind;
use crate::physics::{TriggerEvent, TriggerShape};
use std::cell::RefCell;
use std::rc::Rc;

struct Recorded {
    events: Vec<(TriggerEvent, f32)>,
}

fn box_trigger(engine: &mut PhysicsEngine, world: &mut World) -> (Entity, Rc<RefCell<Vec<TriggerEvent>>>) {
    let trigger = world.create_entity_with_kind(EntityKind::Trigger, Vec3::zeros());
    let log: Rc<RefCell<Vec<TriggerEvent>>> = Rc::default();
    let sink = Rc::clone(&log);
    assert!(engine.add_trigger(
        world,
        trigger,
        TriggerShape::Box { half_extents: Vec3::new(1.0, 1.0, 1.0) },
        move |event| sink.borrow_mut().push(event),
    ));
    (trigger, log)
}

/// Step until `done` holds, recording each new trigger event with the visitor's x at that tick
fn run_until(
    engine: &mut PhysicsEngine,
    world: &mut World,
    visitor: Entity,
    log: &Rc<RefCell<Vec<TriggerEvent>>>,
    recorded: &mut Recorded,
    done: impl Fn(f32) -> bool,
) {
    for _ in 0..1000 {
        let seen = log.borrow().len();
        engine.update(world, None, 16.0);
        let x = position_of(world, visitor).x;
        for event in &log.borrow()[seen..] {
            recorded.events.push((*event, x));
        }
        if done(x) {
            return;
        }
    }
    panic!("visitor never reached its destination");
}

#[test]
fn test_box_trigger_enter_and_exit_once() {
    init_logging();
    let mut engine = frictionless_engine();
    let mut world = World::new();
    let (trigger, log) = box_trigger(&mut engine, &mut world);

    let visitor = spawn(
        &mut engine,
        &mut world,
        Vec3::new(3.0, 0.0, 0.0),
        PhysicsBody::new(0.25).with_velocity(Vec3::new(-2.0, 0.0, 0.0)),
    );

    let mut recorded = Recorded { events: Vec::new() };
    run_until(&mut engine, &mut world, visitor, &log, &mut recorded, |x| x <= 0.0);
    assert_eq!(engine.entities_inside(trigger), vec![visitor]);

    engine.set_velocity(&mut world, visitor, Vec3::new(2.0, 0.0, 0.0));
    run_until(&mut engine, &mut world, visitor, &log, &mut recorded, |x| x >= 3.0);
    assert!(engine.entities_inside(trigger).is_empty());

    let enters: Vec<f32> = recorded
        .events
        .iter()
        .filter(|(event, _)| matches!(event, TriggerEvent::Enter(_)))
        .map(|(_, x)| *x)
        .collect();
    let exits: Vec<f32> = recorded
        .events
        .iter()
        .filter(|(event, _)| matches!(event, TriggerEvent::Exit(_)))
        .map(|(_, x)| *x)
        .collect();

    assert_eq!(enters.len(), 1);
    assert_eq!(exits.len(), 1);
    assert!(enters[0] <= 1.0);
    assert!(exits[0] > 1.0);

    // The visitor was never pushed by the trigger
    assert_eq!(world.body(visitor).unwrap().velocity, Vec3::new(2.0, 0.0, 0.0));
}

#[test]
fn test_stay_fires_every_tick_while_inside() {
    let mut engine = frictionless_engine();
    let mut world = World::new();
    let (_, log) = box_trigger(&mut engine, &mut world);
    let resident = spawn(&mut engine, &mut world, Vec3::new(0.5, 0.0, 0.0), PhysicsBody::new(0.25));

    for _ in 0..5 {
        engine.update(&mut world, None, 16.0);
    }

    let log = log.borrow();
    assert_eq!(log.first(), Some(&TriggerEvent::Enter(resident)));
    // Stay fires from the entry tick onwards
    assert_eq!(log.iter().filter(|e| matches!(e, TriggerEvent::Stay(_))).count(), 5);
}

#[test]
fn test_removed_entity_exits() {
    let mut engine = frictionless_engine();
    let mut world = World::new();
    let (trigger, log) = box_trigger(&mut engine, &mut world);
    let resident = spawn(&mut engine, &mut world, Vec3::zeros(), PhysicsBody::new(0.25));

    engine.update(&mut world, None, 16.0);
    assert_eq!(engine.entities_inside(trigger), vec![resident]);

    world.remove_entity(resident);
    engine.update(&mut world, None, 16.0);

    assert_eq!(log.borrow().last(), Some(&TriggerEvent::Exit(resident)));
    assert!(engine.entities_inside(trigger).is_empty());
}

#[test]
fn test_trigger_ignores_spawn_markers() {
    let mut engine = frictionless_engine();
    let mut world = World::new();
    let (trigger, log) = box_trigger(&mut engine, &mut world);
    let marker = world.create_entity_with_kind(EntityKind::SpawnMarker, Vec3::zeros());
    engine.configure_entity(&mut world, marker, PhysicsBody::new(0.25));

    engine.update(&mut world, None, 16.0);
    assert!(log.borrow().is_empty());
    assert!(engine.entities_inside(trigger).is_empty());
}
