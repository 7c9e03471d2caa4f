//! Hand-geometry domain: the landmark skeleton model and the gesture classifier.

pub mod classifier;
pub mod skeleton;

pub use self::classifier::{Gesture, classify};
pub use self::skeleton::{HandSkeleton, Keypoint};
