//! Unit tests for the geometry module.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use bevy::math::{Vec2, Vec3};

use super::*;

fn approx(a: Vec2, b: Vec2) -> bool {
    a.distance(b) < 1e-2
}

#[test]
fn test_rotate_point_quarter_turn() {
    let rotated = rotate_point(Vec2::new(2.0, 1.0), Vec2::new(1.0, 1.0), FRAC_PI_2);
    assert!(approx(rotated, Vec2::new(1.0, 2.0)));
}

#[test]
fn test_to_local_inverts_rotation() {
    let center = Vec2::new(10.0, -4.0);
    let world = rotate_point(center + Vec2::new(3.0, 1.0), center, 0.7);
    assert!(approx(to_local(world, center, 0.7), Vec2::new(3.0, 1.0)));
}

#[test]
fn test_snap_angle_to_eighth_turns() {
    let increment = 22.5_f32.to_radians();
    let snapped = snap_angle(40.0_f32.to_radians(), increment);
    assert!((snapped - FRAC_PI_4).abs() < 1e-5);
    assert_eq!(snap_angle(0.3, 0.0), 0.3);
}

#[test]
fn test_normalize_angle_range() {
    assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-4);
    assert!((normalize_angle(-FRAC_PI_2 - 2.0 * PI) + FRAC_PI_2).abs() < 1e-4);
}

#[test]
fn test_bounds_of_points() {
    assert_eq!(bounds_of(&[]), None);
    let (min, max) = bounds_of(&[Vec2::new(1.0, 5.0), Vec2::new(-2.0, 3.0)]).unwrap();
    assert_eq!(min, Vec2::new(-2.0, 3.0));
    assert_eq!(max, Vec2::new(1.0, 5.0));
}

#[test]
fn test_distance_to_segment() {
    let a = Vec2::ZERO;
    let b = Vec2::new(10.0, 0.0);
    assert!((distance_to_segment(Vec2::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-5);
    assert!((distance_to_segment(Vec2::new(-4.0, 0.0), a, b) - 4.0).abs() < 1e-5);
}

#[test]
fn test_screen_aligned_camera_is_identity() {
    let camera = CameraState::screen_aligned(Vec2::new(800.0, 600.0));
    let plane = MarkupPlane::default();
    let mapper = CoordinateMapper::new(&camera, &plane);

    let p = Vec2::new(120.0, 45.0);
    assert!(approx(mapper.markup_to_client(p).unwrap(), p));
    assert!(approx(mapper.client_to_markup(p).unwrap(), p));
}

#[test]
fn test_round_trip_under_zoom() {
    let camera = CameraState::orthographic_2d(Vec2::new(30.0, -20.0), 0.25, Vec2::new(640.0, 480.0));
    let plane = MarkupPlane::default();
    let mapper = CoordinateMapper::new(&camera, &plane);

    let p = Vec2::new(37.5, 12.0);
    let client = mapper.markup_to_client(p).unwrap();
    assert!(approx(mapper.client_to_markup(client).unwrap(), p));

    // 4 client pixels per markup unit
    assert!((mapper.markup_to_client_distance(1.0).unwrap() - 4.0).abs() < 1e-3);
    assert!((mapper.client_to_markup_distance(8.0).unwrap() - 2.0).abs() < 1e-3);
}

#[test]
fn test_sizes_are_non_negative() {
    let camera = CameraState::screen_aligned(Vec2::new(400.0, 400.0));
    let plane = MarkupPlane::default();
    let mapper = CoordinateMapper::new(&camera, &plane);

    let size = mapper.markup_to_client_size(Vec2::new(-10.0, -5.0)).unwrap();
    assert!(approx(size, Vec2::new(10.0, 5.0)));
    let size = mapper.client_to_markup_size(Vec2::new(30.0, 12.0)).unwrap();
    assert!(approx(size, Vec2::new(30.0, 12.0)));
}

#[test]
fn test_zero_viewport_yields_none() {
    let camera = CameraState::screen_aligned(Vec2::new(0.0, 600.0));
    let plane = MarkupPlane::default();
    let mapper = CoordinateMapper::new(&camera, &plane);

    assert!(mapper.is_degenerate());
    assert_eq!(mapper.markup_to_client(Vec2::ONE), None);
    assert_eq!(mapper.client_to_markup(Vec2::ONE), None);
    assert_eq!(mapper.client_to_markup_distance(3.0), None);
}

#[test]
fn test_perspective_round_trip() {
    let viewport = Vec2::new(1024.0, 768.0);
    let camera = CameraState::perspective(
        Vec3::new(0.0, 0.0, 50.0),
        Vec3::ZERO,
        Vec3::Y,
        60.0_f32.to_radians(),
        viewport,
    );
    let plane = MarkupPlane::default();
    let mapper = CoordinateMapper::new(&camera, &plane);

    // Plane origin sits at the center of the view
    assert!(approx(mapper.markup_to_client(Vec2::ZERO).unwrap(), viewport * 0.5));

    let p = Vec2::new(4.0, -7.5);
    let client = mapper.markup_to_client(p).unwrap();
    let back = mapper.client_to_markup(client).unwrap();
    assert!(back.distance(p) < 0.05);
}

#[test]
fn test_affine_matches_point_mapping() {
    let camera = CameraState::orthographic_2d(Vec2::new(5.0, 5.0), 0.5, Vec2::new(300.0, 200.0));
    let plane = MarkupPlane::default();
    let mapper = CoordinateMapper::new(&camera, &plane);

    let affine = mapper.markup_to_client_affine().unwrap();
    let p = Vec2::new(-3.0, 9.0);
    assert!(approx(affine.transform_point2(p), mapper.markup_to_client(p).unwrap()));
}
