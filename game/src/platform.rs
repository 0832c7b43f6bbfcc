use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::config::CourseConfig;

/// Index of the fixed start platform the player stands on after a reset.
pub const START_PLATFORM: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One oscillating stair. `x` and `amplitude` never change after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub index: usize,
    pub x: f64,
    pub base_y: f64,
    pub amplitude: f64,
    pub frequency_hz: f64,
}

impl Platform {
    /// Top edge of the platform at session time `t` (screen y grows downward).
    pub fn y_at(&self, t: f64) -> f64 {
        self.base_y + self.amplitude * (TAU * self.frequency_hz * t).sin()
    }

    pub fn position_at(&self, t: f64) -> Point {
        Point::new(self.x, self.y_at(t))
    }
}

#[derive(Debug, Clone)]
pub struct PlatformField {
    platforms: Vec<Platform>,
    start: Point,
    width: f64,
    height: f64,
    elapsed: f64,
}

impl PlatformField {
    /// Builds the field from a course, sorting stairs by ascending `x` so
    /// index order is jump order.
    pub fn from_course(course: &CourseConfig) -> Self {
        let mut specs = course.platforms.clone();
        specs.sort_by(|a, b| a.x.total_cmp(&b.x));
        let platforms = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| Platform {
                index,
                x: spec.x,
                base_y: spec.base_y,
                amplitude: spec.amplitude,
                frequency_hz: spec.frequency_hz,
            })
            .collect();

        Self {
            platforms,
            start: Point::new(course.start.x, course.start.y),
            width: course.platform_width,
            height: course.platform_height,
            elapsed: 0.0,
        }
    }

    pub fn advance_time(&mut self, dt: f64) {
        self.elapsed += dt;
    }

    pub fn reset_time(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn count(&self) -> usize {
        self.platforms.len()
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn platform_width(&self) -> f64 {
        self.width
    }

    pub fn platform_height(&self) -> f64 {
        self.height
    }

    pub fn start(&self) -> Point {
        self.start
    }

    /// True for [`START_PLATFORM`] and every index in `0..count()`.
    pub fn contains(&self, index: i32) -> bool {
        index == START_PLATFORM || (index >= 0 && (index as usize) < self.platforms.len())
    }

    /// Current top-left of stair `index`; [`START_PLATFORM`] is fixed.
    ///
    /// # Panics
    ///
    /// If `index` is neither [`START_PLATFORM`] nor below [`count`](Self::count).
    pub fn position_of(&self, index: i32) -> Point {
        if index == START_PLATFORM {
            return self.start;
        }
        let Ok(i) = usize::try_from(index) else {
            panic!("platform index {index} out of range");
        };
        self.platforms[i].position_at(self.elapsed)
    }

    /// Horizontal center of stair `index`. The start platform is a point, so
    /// its center is its own `x`.
    pub fn center_x(&self, index: i32) -> f64 {
        let pos = self.position_of(index);
        if index == START_PLATFORM {
            pos.x
        } else {
            pos.x + self.width / 2.0
        }
    }

    /// Current positions of every stair, in index order.
    pub fn positions(&self) -> Vec<Point> {
        self.platforms
            .iter()
            .map(|p| p.position_at(self.elapsed))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_height_follows_sine() {
        let p = Platform {
            index: 0,
            x: 10.0,
            base_y: 100.0,
            amplitude: 20.0,
            frequency_hz: 1.0,
        };
        assert_eq!(p.y_at(0.0), 100.0);
        assert!((p.y_at(0.25) - 120.0).abs() < 1e-9);
        assert!((p.y_at(0.75) - 80.0).abs() < 1e-9);
    }
}
