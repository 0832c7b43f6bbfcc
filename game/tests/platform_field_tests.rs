use std::f64::consts::TAU;

use stairjump::config::{CourseConfig, PlatformSpec};
use stairjump::platform::{PlatformField, Point, START_PLATFORM};

fn expected_y(spec: &PlatformSpec, t: f64) -> f64 {
    spec.base_y + spec.amplitude * (TAU * spec.frequency_hz * t).sin()
}

#[test]
fn positions_are_pure_function_of_elapsed_time() {
    let course = CourseConfig::default();
    let mut field = PlatformField::from_course(&course);

    for step in 0..240 {
        let t = field.elapsed();
        for (i, spec) in course.platforms.iter().enumerate() {
            let pos = field.position_of(i as i32);
            assert_eq!(pos.x, spec.x);
            assert_eq!(pos.y, expected_y(spec, t), "platform {i} at step {step}");
        }
        field.advance_time(1.0 / 60.0);
    }
}

#[test]
fn identical_dt_sequences_replay_identically() {
    let course = CourseConfig::default();
    let mut a = PlatformField::from_course(&course);
    let mut b = PlatformField::from_course(&course);
    let dts = [0.016, 0.017, 0.05, 0.001, 0.033];

    for _ in 0..50 {
        for dt in dts {
            a.advance_time(dt);
            b.advance_time(dt);
        }
        assert_eq!(a.positions(), b.positions());
    }
}

#[test]
fn start_platform_never_moves() {
    let course = CourseConfig::default();
    let mut field = PlatformField::from_course(&course);
    let start = field.position_of(START_PLATFORM);
    assert_eq!(start, Point::new(course.start.x, course.start.y));

    field.advance_time(3.7);
    assert_eq!(field.position_of(START_PLATFORM), start);
    assert_eq!(field.center_x(START_PLATFORM), course.start.x);
}

#[test]
fn platforms_are_ordered_by_x_and_indexed_in_jump_order() {
    let course = CourseConfig {
        platforms: vec![
            PlatformSpec::new(300.0, 100.0, 1.0, 10.0),
            PlatformSpec::new(100.0, 200.0, 1.0, 10.0),
            PlatformSpec::new(200.0, 150.0, 1.0, 10.0),
        ],
        ..CourseConfig::default()
    };
    let field = PlatformField::from_course(&course);

    let xs: Vec<f64> = field.platforms().iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![100.0, 200.0, 300.0]);
    for (i, p) in field.platforms().iter().enumerate() {
        assert_eq!(p.index, i);
    }
}

#[test]
fn contains_covers_start_and_stairs_only() {
    let field = PlatformField::from_course(&CourseConfig::default());
    assert_eq!(field.count(), 5);
    assert!(field.contains(START_PLATFORM));
    assert!(field.contains(0));
    assert!(field.contains(4));
    assert!(!field.contains(5));
    assert!(!field.contains(-2));
}

#[test]
fn center_x_adds_half_the_platform_width() {
    let course = CourseConfig::default();
    let field = PlatformField::from_course(&course);
    assert_eq!(field.center_x(0), 100.0 + course.platform_width / 2.0);
}

#[test]
fn reset_time_returns_to_initial_positions() {
    let mut field = PlatformField::from_course(&CourseConfig::default());
    let initial = field.positions();
    field.advance_time(1.234);
    assert_ne!(field.positions(), initial);
    field.reset_time();
    assert_eq!(field.positions(), initial);
}
