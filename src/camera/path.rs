//! Keyframed camera fly-through.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera path file contents: a flat `[x, y, z, x, y, z, ..]` array of
/// eye positions sampled evenly over the path duration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraPathData {
    /// Flat eye positions.
    #[serde(rename = "CameraPath", default)]
    pub camera_path: Vec<f32>,
    /// Number of sampled points in `camera_path`.
    #[serde(rename = "NumberOfPoints", default)]
    pub number_of_points: usize,
}

/// Bracketing keyframes for a path time: `(bottom, top, proportion)`,
/// where `proportion` is the weight of `bottom`.
pub type TimeFrame = (usize, usize, f32);

/// Looping path of eye positions. The camera looks at the upcoming
/// keyframe while travelling between two keyframes.
#[derive(Debug, Clone)]
pub struct CameraPath {
    points: Vec<Vec3>,
    duration: f32,
    time: f32,
}

impl CameraPath {
    /// Build a path from file data. Points beyond `number_of_points` or a
    /// trailing partial triple are ignored.
    #[must_use]
    pub fn new(data: &CameraPathData, duration: f32) -> Self {
        let points: Vec<Vec3> = data
            .camera_path
            .chunks_exact(3)
            .take(data.number_of_points)
            .map(Vec3::from_slice)
            .collect();
        if points.len() != data.number_of_points {
            log::warn!(
                "camera path declares {} points but carries {}",
                data.number_of_points,
                points.len()
            );
        }
        Self {
            points,
            duration,
            time: 0.0,
        }
    }

    /// Number of keyframes.
    #[must_use]
    pub fn number_of_time_frames(&self) -> usize {
        self.points.len()
    }

    /// Path loop duration.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Change the loop duration, keeping the current time in range.
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration;
        self.set_time(self.time);
    }

    /// Current path time.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Set the path time, clamped to `[0, duration]`.
    pub fn set_time(&mut self, time: f32) {
        self.time = time.clamp(0.0, self.duration.max(0.0));
    }

    /// Advance the path time, wrapping past the end of the loop.
    pub fn advance(&mut self, delta: f32) {
        if self.duration <= 0.0 {
            self.time = 0.0;
            return;
        }
        let mut time = self.time + delta;
        if time > self.duration {
            time %= self.duration;
        }
        self.time = time.max(0.0);
    }

    /// Keyframes bracketing the current time.
    ///
    /// `None` for an empty path.
    #[must_use]
    pub fn current_time_frame(&self) -> Option<TimeFrame> {
        let n = self.points.len();
        match n {
            0 => None,
            1 => Some((0, 0, 0.0)),
            _ => {
                let last = n - 1;
                let current = if self.duration > 0.0 {
                    (self.time / self.duration * last as f32)
                        .clamp(0.0, last as f32)
                } else {
                    0.0
                };
                let bottom = current.floor() as usize;
                let top = current.ceil() as usize;
                if bottom == top {
                    if bottom == last {
                        Some((bottom - 1, top, 0.0))
                    } else {
                        Some((bottom, top + 1, 1.0))
                    }
                } else {
                    Some((bottom, top, 1.0 - (current - bottom as f32)))
                }
            }
        }
    }

    /// Jump to a (fractional) keyframe index.
    pub fn set_current_time_frame(&mut self, frame: f32) {
        let n = self.points.len();
        if n >= 2 {
            self.set_time(self.duration * frame / (n - 1) as f32);
        }
    }

    /// Eye position and look-at target for the current time.
    #[must_use]
    pub fn pose(&self) -> Option<(Vec3, Vec3)> {
        let (bottom, top, proportion) = self.current_time_frame()?;
        let bottom_pos = *self.points.get(bottom)?;
        let top_pos = *self.points.get(top)?;
        let eye = proportion * bottom_pos + (1.0 - proportion) * top_pos;
        Some((eye, top_pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: usize) -> CameraPath {
        let data = CameraPathData {
            camera_path: (0..n)
                .flat_map(|i| [i as f32 * 10.0, 0.0, 0.0])
                .collect(),
            number_of_points: n,
        };
        CameraPath::new(&data, 3000.0)
    }

    #[test]
    fn time_frames_bracket_current_time() {
        let mut p = path(4);
        p.set_time(1500.0);
        let (bottom, top, proportion) = p.current_time_frame().unwrap();
        assert_eq!((bottom, top), (1, 2));
        assert!((proportion - 0.5).abs() < 1e-6);
        let (eye, target) = p.pose().unwrap();
        assert!((eye.x - 15.0).abs() < 1e-4);
        assert_eq!(target.x, 20.0);
    }

    #[test]
    fn exact_frames_look_forward_except_at_end() {
        let mut p = path(4);
        p.set_time(0.0);
        assert_eq!(p.current_time_frame(), Some((0, 1, 1.0)));
        p.set_time(3000.0);
        assert_eq!(p.current_time_frame(), Some((2, 3, 0.0)));
        assert_eq!(p.pose().unwrap().0.x, 30.0);
    }

    #[test]
    fn two_point_path_interpolates() {
        let mut p = path(2);
        p.set_time(750.0);
        let (bottom, top, proportion) = p.current_time_frame().unwrap();
        assert_eq!((bottom, top), (0, 1));
        assert!((proportion - 0.75).abs() < 1e-6);
    }

    #[test]
    fn single_and_empty_paths() {
        assert_eq!(path(1).current_time_frame(), Some((0, 0, 0.0)));
        assert!(path(0).current_time_frame().is_none());
        assert!(path(0).pose().is_none());
    }

    #[test]
    fn advance_wraps_and_set_time_clamps() {
        let mut p = path(3);
        p.advance(2500.0);
        p.advance(1000.0);
        assert!((p.time() - 500.0).abs() < 1e-3);
        p.set_time(-5.0);
        assert_eq!(p.time(), 0.0);
        p.set_time(9000.0);
        assert_eq!(p.time(), 3000.0);
        p.set_current_time_frame(1.0);
        assert!((p.time() - 1500.0).abs() < 1e-3);
    }
}
