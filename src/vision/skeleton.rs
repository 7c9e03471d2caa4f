use serde::Deserialize;

/// Landmark indices in the MediaPipe hand model convention.
///
/// See: <https://google.github.io/mediapipe/solutions/hands.html>
pub mod landmarks {
    /// Index finger knuckle.
    pub const INDEX_FINGER_MCP: usize = 5;
    /// Index fingertip.
    pub const INDEX_FINGER_TIP: usize = 8;
    /// Middle finger knuckle.
    pub const MIDDLE_FINGER_MCP: usize = 9;
    /// Middle fingertip.
    pub const MIDDLE_FINGER_TIP: usize = 12;
    /// Ring finger knuckle.
    pub const RING_FINGER_MCP: usize = 13;
    /// Ring fingertip.
    pub const RING_FINGER_TIP: usize = 16;
    /// Pinky knuckle.
    pub const PINKY_MCP: usize = 17;
    /// Pinky fingertip.
    pub const PINKY_TIP: usize = 20;
}

/// Number of landmarks in a full hand skeleton.
pub const KEYPOINT_COUNT: usize = 21;

/// A single hand landmark in normalized image coordinates.
///
/// `x` and `y` are in `[0, 1]` relative to the frame; `y` grows downward, so a
/// raised fingertip has a *smaller* `y` than its knuckle. `z` is depth relative
/// to the wrist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Keypoint {
    /// Normalized horizontal position.
    pub x: f32,
    /// Normalized vertical position (grows downward).
    pub y: f32,
    /// Depth relative to the wrist.
    pub z: f32,
}

/// One detected hand: all 21 landmarks in MediaPipe order.
#[derive(Debug, Clone, PartialEq)]
pub struct HandSkeleton {
    /// Landmarks indexed by the constants in [`landmarks`].
    pub keypoints: [Keypoint; KEYPOINT_COUNT],
}

impl HandSkeleton {
    /// Build a skeleton from a landmark list, rejecting anything that is not
    /// exactly 21 points.
    pub fn from_keypoints(points: Vec<Keypoint>) -> Option<Self> {
        let keypoints: [Keypoint; KEYPOINT_COUNT] = points.try_into().ok()?;
        Some(Self { keypoints })
    }
}
