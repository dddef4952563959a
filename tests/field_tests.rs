//! Integration tests for the headless scene.
//!
//! These drive the public API the way the window loop does, without a GPU.

use particle_field::prelude::*;
use rand::rngs::mock::StepRng;

fn config(points: usize, segments: usize) -> FieldConfig {
    FieldConfig::new()
        .with_point_count(points)
        .with_segment_count(segments)
}

// ============================================================================
// Counts and invariants
// ============================================================================

#[test]
fn test_counts_fixed_for_any_n() {
    for n in [0, 1, 3, 1500] {
        let mut ctx = SpawnContext::seeded(n as u64);
        let mut scene = SceneHost::new(&config(n, 10), &mut ctx, None);

        for frame in 0..30 {
            scene.tick(frame as f32 / 60.0);
        }

        let points = scene.points();
        assert_eq!(points.len(), n);
        assert_eq!(points.positions().len(), n);
        assert_eq!(points.colors().len(), n);
        assert_eq!(points.sizes().len(), n);
    }
}

#[test]
fn test_default_counts() {
    let mut ctx = SpawnContext::seeded(1);
    let scene = SceneHost::new(&FieldConfig::default(), &mut ctx, None);
    assert_eq!(scene.points().len(), 1500);
    assert_eq!(scene.connectors().len(), 100);
}

#[test]
fn test_color_and_size_invariants() {
    let mut ctx = SpawnContext::seeded(99);
    let scene = SceneHost::new(&config(5000, 0), &mut ctx, None);

    for (color, size) in scene.points().colors().iter().zip(scene.points().sizes()) {
        assert_eq!(color.x, 0.0);
        assert!(color.y >= 0.8 && color.y <= 1.0);
        assert!(color.z >= 0.8 && color.z <= 1.0);
        assert!(*size >= 0.5 && *size <= 2.5);
    }
}

#[test]
fn test_segments_unchanged_by_ticks() {
    let mut ctx = SpawnContext::seeded(5);
    let mut scene = SceneHost::new(&config(10, 150), &mut ctx, None);
    let before: Vec<Segment> = scene.connectors().segments().to_vec();

    for frame in 0..500 {
        scene.tick(frame as f32 * 0.033);
    }

    assert_eq!(scene.connectors().segments(), before.as_slice());
}

#[test]
fn test_connector_rotation_from_time() {
    let mut ctx = SpawnContext::seeded(6);
    let mut scene = SceneHost::new(&config(1, 5), &mut ctx, None);

    // Irregular frame times, then a jump back to a known time.
    for t in [0.1, 0.7, 3.3, 12.0, 40.5] {
        scene.tick(t);
    }
    scene.tick(20.0);

    let rotation = scene.connectors().rotation();
    assert!((rotation.y - 0.2).abs() < 1e-6);
    assert!((rotation.x - 2.0_f32.sin() * 0.1).abs() < 1e-6);
}

// ============================================================================
// Seeding
// ============================================================================

#[test]
fn test_same_seed_same_layout() {
    let a = SceneHost::new(&config(64, 16), &mut SpawnContext::seeded(7), None);
    let b = SceneHost::new(&config(64, 16), &mut SpawnContext::seeded(7), None);
    assert_eq!(a.points().positions(), b.points().positions());
    assert_eq!(a.connectors().segments(), b.connectors().segments());
}

#[test]
fn test_different_seed_different_layout() {
    let a = SceneHost::new(&config(64, 16), &mut SpawnContext::seeded(7), None);
    let b = SceneHost::new(&config(64, 16), &mut SpawnContext::seeded(8), None);
    assert_ne!(a.points().positions(), b.points().positions());
}

#[test]
fn test_injected_generator() {
    // A constant generator yields 0.0 for every sample.
    let mut ctx = SpawnContext::new(StepRng::new(0, 0));
    let cloud = PointCloud::generate(3, &mut ctx);

    for (position, (color, size)) in cloud
        .positions()
        .iter()
        .zip(cloud.colors().iter().zip(cloud.sizes()))
    {
        assert_eq!(*position, Vec3::new(-15.0, -15.0, -7.5));
        assert_eq!(*color, Vec3::new(0.0, 0.8, 0.8));
        assert_eq!(*size, 0.5);
    }
}

// ============================================================================
// Pointer
// ============================================================================

#[test]
fn test_headless_scene_does_not_fail() {
    let mut ctx = SpawnContext::seeded(11);
    let mut scene = SceneHost::new(&config(200, 20), &mut ctx, None);
    assert!(!scene.has_pointer_listener());
    scene.advance();
    assert_eq!(scene.points().len(), 200);
}

#[test]
fn test_scene_owns_one_listener() {
    let events = PointerEvents::new();
    let first = SceneHost::new(&config(4, 1), &mut SpawnContext::seeded(1), Some(&events));
    let second = SceneHost::new(&config(4, 1), &mut SpawnContext::seeded(2), Some(&events));
    assert_eq!(events.listener_count(), 2);

    drop(first);
    assert_eq!(events.listener_count(), 1);
    drop(second);
    assert_eq!(events.listener_count(), 0);
}

#[test]
fn test_pointer_pulls_nearby_points() {
    let events = PointerEvents::new();
    events.set_window_size(1280, 720);
    let mut scene = SceneHost::new(&config(3000, 0), &mut SpawnContext::seeded(12), Some(&events));

    // Cursor in the middle of the window: the pointer projects to the origin.
    events.dispatch_client(Vec2::new(640.0, 360.0));

    let near_before: Vec<(usize, f32)> = scene
        .points()
        .positions()
        .iter()
        .enumerate()
        .filter_map(|(i, p)| {
            let d = p.truncate().length();
            (d > 0.5 && d < 2.5).then_some((i, d))
        })
        .collect();
    assert!(!near_before.is_empty());

    scene.tick(0.0);

    for (i, before) in near_before {
        let after = scene.points().positions()[i].truncate().length();
        assert!(after < before, "point {} moved from {} to {}", i, before, after);
    }
}

#[test]
fn test_scenario_three_points_far_pointer() {
    let mut ctx = SpawnContext::seeded(2024);
    let mut scene = SceneHost::new(&config(3, 0), &mut ctx, None);
    scene.set_pointer(PointerState::new(Vec2::new(50.0, 50.0)));
    let initial = scene.points().positions().to_vec();

    scene.tick(1.0);

    for (i, (before, after)) in initial.iter().zip(scene.points().positions()).enumerate() {
        let i = i as f32;
        let dx = (0.3 + 0.02 * i).cos() * 0.001;
        let dy = (0.5 + 0.01 * i).sin() * 0.002;
        assert!((after.x - (before.x + dx)).abs() < 1e-6);
        assert!((after.y - (before.y + dy)).abs() < 1e-6);
        assert_eq!(after.z, before.z);
    }
}
