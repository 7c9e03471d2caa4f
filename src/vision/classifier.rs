use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::skeleton::{HandSkeleton, landmarks};

/// Gesture vocabulary the game understands.
///
/// The serialized names (`"peace"`, `"open_hand"`, ...) are both the wire
/// format and the on-disk chart format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    /// No hand detected, or the hand matches no known gesture.
    #[default]
    None,
    /// Index and middle fingers raised, ring and pinky folded.
    Peace,
    /// Only the index finger raised.
    Index,
    /// All four fingers folded.
    Fist,
    /// All four fingers raised.
    OpenHand,
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gesture::None => "none",
            Gesture::Peace => "peace",
            Gesture::Index => "index",
            Gesture::Fist => "fist",
            Gesture::OpenHand => "open_hand",
        };
        f.write_str(name)
    }
}

/// Classify a detected hand into a gesture.
///
/// The rules only look at the four non-thumb fingers and compare each tip to
/// its knuckle on the vertical axis (smaller `y` means raised). An absent hand
/// classifies as [`Gesture::None`].
pub fn classify(skeleton: Option<&HandSkeleton>) -> Gesture {
    let Some(hand) = skeleton else {
        return Gesture::None;
    };

    let extended = [
        finger_extended(hand, landmarks::INDEX_FINGER_TIP, landmarks::INDEX_FINGER_MCP),
        finger_extended(hand, landmarks::MIDDLE_FINGER_TIP, landmarks::MIDDLE_FINGER_MCP),
        finger_extended(hand, landmarks::RING_FINGER_TIP, landmarks::RING_FINGER_MCP),
        finger_extended(hand, landmarks::PINKY_TIP, landmarks::PINKY_MCP),
    ];

    match extended {
        [true, true, false, false] => Gesture::Peace,
        [true, false, false, false] => Gesture::Index,
        [false, false, false, false] => Gesture::Fist,
        [true, true, true, true] => Gesture::OpenHand,
        _ => Gesture::None,
    }
}

/// A finger counts as extended when its tip sits above its knuckle; a tip at
/// or below knuckle height is curled.
fn finger_extended(hand: &HandSkeleton, tip: usize, knuckle: usize) -> bool {
    hand.keypoints[tip].y < hand.keypoints[knuckle].y
}
