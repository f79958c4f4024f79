use std::time::Duration;

use particle_sketch::{
    AttractorSet, AttractorSource, Execution, InputEvent, InputSettings, Layout, Mode, Particle,
    PointerSource, ResetPolicy, SimulationParams, Simulator, Sketch, SketchConfig, Stats, TimeStep,
    Viewport, step,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Viewport wide enough that gravity is not scaled down
pub fn desktop() -> Viewport {
    Viewport::new(1000.0, 600.0)
}

/// Parameters used by the worked example: G = 100, dt = 0.1
pub fn example_params() -> SimulationParams {
    SimulationParams {
        gravity: 100.0,
        dt: 0.1,
        ..Default::default()
    }
}

pub fn simulator(params: SimulationParams, viewport: Viewport, count: usize) -> Simulator {
    Simulator::new(params, viewport, count, AttractorSet::new(2))
}

pub fn press(sim: &mut Simulator, source: AttractorSource, x: f32, y: f32, power: f32) {
    let a = sim.attractors_mut().get_mut(source).unwrap();
    a.position = cgmath::vec2(x, y);
    a.set_power(power);
}

fn assert_close(a: f32, b: f32, tol: f32) {
    assert!((a - b).abs() <= tol, "expected {} ~ {}", a, b);
}

// ==================================================================================
// Worked example
// ==================================================================================

#[test]
fn example_particles_accelerate_toward_attractor() {
    let params = example_params();
    let mut particles = vec![
        Particle::at_rest(cgmath::vec2(0.0, 0.0)),
        Particle::at_rest(cgmath::vec2(10.0, 0.0)),
        Particle::at_rest(cgmath::vec2(20.0, 0.0)),
    ];
    let mut attractors = AttractorSet::new(0);
    let a = attractors.get_mut(AttractorSource::Mouse).unwrap();
    a.position = cgmath::vec2(10.0, 0.0);
    a.set_power(1.0);

    step(&mut particles, &attractors, &params, desktop(), params.dt);

    // |dv| = power * G * dt = 10, then pulling drag 0.93^0.1
    let expected_speed = 10.0 * 0.93f32.powf(0.1);
    assert!(particles[0].velocity.x > 0.0);
    assert_close(particles[0].velocity.x, expected_speed, 1e-3);
    assert_close(particles[0].position.x, expected_speed * 0.1, 1e-4);

    assert!(particles[2].velocity.x < 0.0);
    assert_close(particles[2].velocity.x, -expected_speed, 1e-3);

    // coincident particle: clamped distance, zero offset -> no force
    assert!(particles[1].is_finite());
    assert_eq!(particles[1].velocity, cgmath::vec2(0.0, 0.0));
    assert_eq!(particles[1].position, cgmath::vec2(10.0, 0.0));

    for p in &particles {
        assert_eq!(p.velocity.y, 0.0);
    }
}

// ==================================================================================
// Finiteness
// ==================================================================================

#[test]
fn attractor_on_particle_stays_finite() {
    let mut sim = simulator(example_params(), desktop(), 50);
    let home = sim.home(7);
    press(&mut sim, AttractorSource::Mouse, home.x, home.y, 1.0);

    for _ in 0..200 {
        sim.step();
        assert!(sim.particles().iter().all(Particle::is_finite));
    }
}

#[test]
fn nearly_coincident_attractor_does_not_explode() {
    let params = example_params();
    let mut particles = vec![Particle::at_rest(cgmath::vec2(10.0 + 1e-6, 5.0))];
    let mut attractors = AttractorSet::new(0);
    let a = attractors.get_mut(AttractorSource::Touch).unwrap();
    a.position = cgmath::vec2(10.0, 5.0);
    a.set_power(1.0);

    step(&mut particles, &attractors, &params, desktop(), params.dt);

    assert!(particles[0].is_finite());
    assert!(particles[0].velocity.x.abs() < 1e-3);
}

#[test]
fn non_finite_particle_is_reset_to_home() {
    let mut sim = simulator(example_params(), desktop(), 20);
    sim.particles_mut()[3].position = cgmath::vec2(f32::NAN, 1.0);
    sim.particles_mut()[4].velocity = cgmath::vec2(f32::INFINITY, 0.0);

    sim.step();

    for i in [3, 4] {
        assert_eq!(sim.particles()[i].position, sim.home(i));
        assert_eq!(sim.particles()[i].velocity, cgmath::vec2(0.0, 0.0));
    }
}

// ==================================================================================
// Boundedness and reset determinism
// ==================================================================================

#[test]
fn particles_stay_in_bounds_under_random_input() {
    let mut rng = StdRng::seed_from_u64(11);
    let viewport = Viewport::new(800.0, 500.0);
    let params = SimulationParams {
        gravity: 40.0,
        layout: Layout::Scatter { seed: 5 },
        reset: ResetPolicy::Bounds,
        ..Default::default()
    };
    let mut sim = simulator(params, viewport, 500);

    for frame in 0..300 {
        if frame % 10 == 0 {
            // attractors may sit outside the viewport and fling particles past the edge
            let x = rng.gen_range(-200.0..1000.0);
            let y = rng.gen_range(-200.0..700.0);
            let power = if rng.gen_bool(0.7) { rng.gen_range(0.0..3.0) } else { 0.0 };
            press(&mut sim, AttractorSource::Mouse, x, y, power);
            press(&mut sim, AttractorSource::Tracker(0), y, x, power * 0.5);
        }
        sim.step();
        for p in sim.particles() {
            assert!(viewport.contains(p.position), "frame {}: {:?}", frame, p);
        }
    }
}

#[test]
fn reset_returns_to_same_home_from_any_exit() {
    let mut sim = simulator(example_params(), desktop(), 30);
    let i = 12;
    let home = sim.home(i);

    for displaced in [
        cgmath::vec2(-50.0, 300.0),
        cgmath::vec2(5000.0, 300.0),
        cgmath::vec2(500.0, -100.0),
        cgmath::vec2(500.0, 700.0),
    ] {
        let p = &mut sim.particles_mut()[i];
        p.position = displaced;
        p.velocity = cgmath::vec2(3.0, -7.0);

        sim.step();

        let p = sim.particles()[i];
        assert_eq!(p.position, home);
        assert_eq!(p.velocity, cgmath::vec2(0.0, 0.0));
        assert_eq!(p.age, 0);
    }
}

#[test]
fn lifetime_policy_recycles_in_bounds_particles() {
    let params = SimulationParams {
        reset: ResetPolicy::Lifetime { max_age: 5 },
        ..Default::default()
    };
    let mut sim = simulator(params, desktop(), 4);
    press(&mut sim, AttractorSource::Mouse, 100.0, 100.0, 1.0);

    for _ in 0..5 {
        sim.step();
    }
    assert!(sim.particles().iter().all(|p| p.age == 5));
    assert_ne!(sim.particles()[0].position, sim.home(0));

    sim.step();
    for (i, p) in sim.particles().iter().enumerate() {
        assert_eq!(p.age, 0);
        assert_eq!(p.position, sim.home(i));
    }
}

#[test]
fn never_policy_lets_particles_leave() {
    let params = SimulationParams {
        reset: ResetPolicy::Never,
        ..Default::default()
    };
    let mut sim = simulator(params, desktop(), 1);
    sim.particles_mut()[0].position = cgmath::vec2(-100.0, -100.0);
    sim.step();
    assert_eq!(sim.particles()[0].position, cgmath::vec2(-100.0, -100.0));
}

#[test]
fn shrinking_viewport_resets_outside_particles() {
    let mut sim = simulator(SimulationParams::default(), desktop(), 10);
    let small = Viewport::new(400.0, 300.0);
    sim.resize(small);
    sim.step();
    for (i, p) in sim.particles().iter().enumerate() {
        assert!(small.contains(p.position));
        assert!(small.contains(sim.home(i)));
    }
}

// ==================================================================================
// Drag regimes
// ==================================================================================

#[test]
fn inertial_drag_strictly_decreases_speed() {
    let params = SimulationParams {
        dt: 0.5,
        ..Default::default()
    };
    let mut sim = simulator(params, Viewport::new(1.0e6, 1.0e6), 1);
    sim.particles_mut()[0].velocity = cgmath::vec2(10.0, -4.0);
    let factor = params.inertial_drag.powf(params.dt);
    assert!(factor < 1.0);

    let mut speed = sim.particles()[0].speed_squared().sqrt();
    let mut steps = 0;
    while speed > 1e-3 {
        sim.step();
        let next = sim.particles()[0].speed_squared().sqrt();
        assert!(next < speed);
        assert_close(next / speed, factor, 1e-4);
        speed = next;
        steps += 1;
        assert!(steps < 1000, "speed never decayed");
    }
    assert_eq!(sim.mode(), Mode::Inertial);
}

#[test]
fn activating_attractor_uses_pulling_drag_in_same_frame() {
    let params = SimulationParams::default();
    let mut sim = simulator(params, Viewport::new(1000.0, 1000.0), 1);
    assert_eq!(sim.particles()[0].position, cgmath::vec2(500.0, 500.0));

    sim.step();
    assert_eq!(sim.mode(), Mode::Inertial);

    press(&mut sim, AttractorSource::Mouse, 600.0, 500.0, 1.0);
    sim.step();
    assert_eq!(sim.mode(), Mode::Pulling);

    // dv = power * gravity * dt along +x, damped by the pulling constant
    let expected = params.gravity * params.dt * params.pulling_drag.powf(params.dt);
    let p = sim.particles()[0];
    assert_close(p.velocity.x, expected, 1e-5);
    assert_close(p.position.x, 500.0 + expected * params.dt, 1e-3);
}

// ==================================================================================
// Workers
// ==================================================================================

#[test]
fn workers_match_serial_execution() {
    let params = SimulationParams {
        layout: Layout::Scatter { seed: 99 },
        reset: ResetPolicy::BoundsOrLifetime { max_age: 40 },
        ..Default::default()
    };
    let mut serial = simulator(params, desktop(), 1001);
    let mut parallel = simulator(params, desktop(), 1001)
        .with_execution(Execution::Workers { count: 3 })
        .unwrap();
    assert_eq!(parallel.execution(), Execution::Workers { count: 3 });

    for sim in [&mut serial, &mut parallel] {
        press(sim, AttractorSource::Mouse, 250.0, 150.0, 2.0);
        press(sim, AttractorSource::Tracker(1), 750.0, 450.0, 0.5);
    }
    for _ in 0..100 {
        serial.step();
        parallel.step();
    }
    assert_eq!(serial.particles(), parallel.particles());
}

#[test]
fn empty_population_steps_cleanly() {
    let mut sim = simulator(SimulationParams::default(), desktop(), 0)
        .with_execution(Execution::Workers { count: 2 })
        .unwrap();
    press(&mut sim, AttractorSource::Mouse, 1.0, 1.0, 1.0);
    sim.step();
    assert!(sim.is_empty());
    assert_eq!(Stats::compute(sim.particles()), Stats::default());
}

// ==================================================================================
// Sketch
// ==================================================================================

#[test]
fn pointer_pulls_population_toward_it() {
    let config = SketchConfig {
        viewport: desktop(),
        population: particle_sketch::PopulationConfig { count: Some(200) },
        ..Default::default()
    };
    let mut sketch = Sketch::from_config(&config).unwrap();
    let before = sketch.stats().mean();

    sketch.handle(&InputEvent::PointerDown {
        source: PointerSource::Mouse,
        position: cgmath::vec2(500.0, 100.0),
    });
    for _ in 0..20 {
        assert!(sketch.tick(Duration::from_millis(16)));
    }
    let pulled = sketch.stats().mean();
    assert!(pulled.y < before.y, "{:?} -> {:?}", before, pulled);
    assert!(sketch.stats().is_finite());

    sketch.handle(&InputEvent::PointerUp { source: PointerSource::Mouse });
    sketch.tick(Duration::from_millis(16));
    assert_eq!(sketch.simulator().mode(), Mode::Inertial);
}

#[test]
fn restart_lays_particles_out_again() {
    let mut sketch = Sketch::new(
        simulator(SimulationParams::default(), desktop(), 64),
        InputSettings::default(),
        TimeStep::Fixed,
    );
    sketch.handle(&InputEvent::PointerDown {
        source: PointerSource::Touch,
        position: cgmath::vec2(10.0, 10.0),
    });
    for _ in 0..10 {
        sketch.tick(Duration::from_millis(16));
    }
    sketch.restart();

    assert!(!sketch.simulator().attractors().any_active());
    for (i, p) in sketch.particles().iter().enumerate() {
        assert_eq!(*p, Particle::at_rest(sketch.simulator().home(i)));
    }
}
