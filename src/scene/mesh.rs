use glam::Vec3;

use super::bounds::BoundingBox;

/// Two morph frames bracketing a point on the timeline, with the weight of
/// each. A single entry when the time lands exactly on a frame.
pub type FrameWeights = Vec<(usize, f32)>;

/// Frames and weights for local `time` on a `duration`-long timeline
/// sampled by `frames` evenly spaced frames.
///
/// The bottom frame gets `1 - fraction`, the top frame `fraction`. An empty
/// timeline yields no weights; a degenerate duration pins frame 0.
#[must_use]
pub fn frame_weights(time: f32, duration: f32, frames: usize) -> FrameWeights {
    if frames == 0 {
        return Vec::new();
    }
    if frames == 1 || duration <= 0.0 {
        return vec![(0, 1.0)];
    }
    let last = (frames - 1) as f32;
    let current = (time / duration * last).clamp(0.0, last);
    let bottom = current.floor();
    let top = current.ceil();
    let proportion = 1.0 - (current - bottom);
    if bottom == top {
        vec![(bottom as usize, 1.0)]
    } else {
        vec![(bottom as usize, proportion), (top as usize, 1.0 - proportion)]
    }
}

/// Vertex data for a surface, point cloud or line set whose vertices (and
/// optionally colours) morph over time.
///
/// `morph_targets` holds one full position frame per time sample; when it
/// is empty the base `positions` are static. `morph_colors`, when present,
/// holds one colour frame per time sample and must match the vertex count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphGeometry {
    /// Base vertex positions.
    pub positions: Vec<Vec3>,
    /// Triangle (or segment, for lines) indices; empty means non-indexed.
    pub indices: Vec<u32>,
    /// Per-vertex normals, possibly empty.
    pub normals: Vec<Vec3>,
    /// Static per-vertex colours, possibly empty.
    pub colors: Vec<Vec3>,
    /// Position frames sampled across the timeline.
    pub morph_targets: Vec<Vec<Vec3>>,
    /// Colour frames sampled across the timeline.
    pub morph_colors: Vec<Vec<Vec3>>,
}

fn blend(frames: &[Vec<Vec3>], weights: &[(usize, f32)]) -> Option<Vec<Vec3>> {
    let (&(first, _), _) = weights.split_first()?;
    let len = frames.get(first)?.len();
    let mut out = vec![Vec3::ZERO; len];
    for &(frame, weight) in weights {
        let Some(values) = frames.get(frame) else {
            continue;
        };
        for (acc, v) in out.iter_mut().zip(values) {
            *acc += *v * weight;
        }
    }
    Some(out)
}

impl MorphGeometry {
    /// Static geometry from positions and triangle indices.
    #[must_use]
    pub fn from_triangles(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            ..Self::default()
        }
    }

    /// Number of vertices in the base frame.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of position frames, zero for static geometry.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.morph_targets.len()
    }

    /// Whether per-frame colours are present.
    #[must_use]
    pub fn has_morph_colors(&self) -> bool {
        !self.morph_colors.is_empty()
    }

    /// Morph target influences at `time`.
    #[must_use]
    pub fn influences(&self, time: f32, duration: f32) -> FrameWeights {
        frame_weights(time, duration, self.frame_count())
    }

    /// Vertex positions at `time`.
    #[must_use]
    pub fn positions_at(&self, time: f32, duration: f32) -> Vec<Vec3> {
        blend(&self.morph_targets, &self.influences(time, duration))
            .unwrap_or_else(|| self.positions.clone())
    }

    /// Vertex colours at `time`: blended colour frames when present,
    /// otherwise the static colours.
    #[must_use]
    pub fn colors_at(&self, time: f32, duration: f32) -> Vec<Vec3> {
        let weights = frame_weights(time, duration, self.morph_colors.len());
        blend(&self.morph_colors, &weights).unwrap_or_else(|| self.colors.clone())
    }

    /// Local-space bounds at `time`.
    ///
    /// With active morph frames this is the influence-weighted sum of each
    /// frame's bounds, otherwise the bounds of the base positions.
    #[must_use]
    pub fn bounding_box(&self, time: f32, duration: f32) -> Option<BoundingBox> {
        let mut min = Vec3::ZERO;
        let mut max = Vec3::ZERO;
        let mut found = false;
        for (frame, weight) in self.influences(time, duration) {
            if weight <= 0.0 {
                continue;
            }
            let Some(b) = self
                .morph_targets
                .get(frame)
                .and_then(|f| BoundingBox::from_points(f.iter().copied()))
            else {
                continue;
            };
            min += b.min * weight;
            max += b.max * weight;
            found = true;
        }
        if found {
            return Some(BoundingBox::new(min, max));
        }
        BoundingBox::from_points(self.positions.iter().copied())
    }
}
