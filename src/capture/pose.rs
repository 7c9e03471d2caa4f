use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use super::frame::Frame;
use crate::vision::{HandSkeleton, Keypoint};

/// Hands below this detection score are discarded.
const MIN_CONFIDENCE: f32 = 0.5;

/// Errors produced while starting the pose sidecar.
#[derive(Debug, Error)]
pub enum PoseError {
    /// The sidecar process could not be started.
    #[error("failed to spawn pose model process")]
    Spawn(#[source] std::io::Error),
    /// The sidecar never reported it was ready.
    #[error("pose model did not complete its handshake: {0}")]
    Handshake(String),
}

/// A hand-landmark estimator fed one frame at a time.
///
/// Inference is best effort: a failed detection yields no hands rather than
/// an error, so a flaky model never stops the capture loop.
pub trait HandPoseModel: Send {
    /// Detect hands in the frame, returning zero or more skeletons.
    fn infer(&mut self, frame: &Frame) -> Vec<HandSkeleton>;
}

#[derive(Debug, Deserialize)]
struct KeypointJson {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Deserialize)]
struct HandJson {
    #[allow(dead_code)]
    handedness: String,
    score: f32,
    landmarks: Vec<KeypointJson>,
}

#[derive(Debug, Deserialize)]
struct DetectionResult {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Pose model bridged to a Python MediaPipe sidecar over pipes.
///
/// Protocol: the sidecar prints a single `READY` line once the model is
/// loaded, then for every frame we write a 12-byte little-endian header
/// (width, height, channels) followed by the raw rgb24 bytes, and read one
/// JSON line of detections back.
pub struct LandmarkBridge {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl LandmarkBridge {
    /// Start the sidecar script and wait for its `READY` handshake.
    pub fn spawn(python: &str, script: &Path) -> Result<Self, PoseError> {
        let mut child = Command::new(python)
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(PoseError::Spawn)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PoseError::Handshake("sidecar has no stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PoseError::Handshake("sidecar has no stdout".into()))?;
        let mut stdout = BufReader::new(stdout);

        let mut line = String::new();
        stdout
            .read_line(&mut line)
            .map_err(|err| PoseError::Handshake(err.to_string()))?;
        if line.trim() != "READY" {
            return Err(PoseError::Handshake(format!(
                "expected READY, got {:?}",
                line.trim()
            )));
        }

        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }

    fn exchange(&mut self, frame: &Frame) -> std::io::Result<String> {
        self.stdin.write_all(&frame.width.to_le_bytes())?;
        self.stdin.write_all(&frame.height.to_le_bytes())?;
        self.stdin.write_all(&3u32.to_le_bytes())?;
        self.stdin.write_all(&frame.rgb)?;
        self.stdin.flush()?;

        let mut line = String::new();
        self.stdout.read_line(&mut line)?;
        Ok(line)
    }
}

impl HandPoseModel for LandmarkBridge {
    fn infer(&mut self, frame: &Frame) -> Vec<HandSkeleton> {
        let line = match self.exchange(frame) {
            Ok(line) => line,
            Err(err) => {
                warn!("pose sidecar exchange failed: {err}");
                return Vec::new();
            }
        };

        let result: DetectionResult = match serde_json::from_str(&line) {
            Ok(result) => result,
            Err(err) => {
                warn!("pose sidecar produced unparsable output: {err}");
                return Vec::new();
            }
        };

        if let Some(error) = result.error {
            warn!("pose sidecar reported an error: {error}");
            return Vec::new();
        }

        result
            .hands
            .into_iter()
            .filter(|hand| hand.score >= MIN_CONFIDENCE)
            .filter_map(|hand| {
                let keypoints = hand
                    .landmarks
                    .into_iter()
                    .map(|point| Keypoint {
                        x: point.x,
                        y: point.y,
                        z: point.z,
                    })
                    .collect();
                HandSkeleton::from_keypoints(keypoints)
            })
            .collect()
    }
}

impl Drop for LandmarkBridge {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_json_parses_hands_and_scores() {
        let landmarks: Vec<String> = (0..21)
            .map(|i| format!(r#"{{"x": 0.{i}, "y": 0.5, "z": 0.0}}"#))
            .collect();
        let line = format!(
            r#"{{"hands": [{{"handedness": "Right", "score": 0.92, "landmarks": [{}]}}], "error": null}}"#,
            landmarks.join(",")
        );

        let result: DetectionResult = serde_json::from_str(&line).unwrap();
        assert_eq!(result.hands.len(), 1);
        assert!(result.error.is_none());
        assert_eq!(result.hands[0].landmarks.len(), 21);
        assert!(result.hands[0].score > MIN_CONFIDENCE);
    }

    #[test]
    fn detection_json_tolerates_missing_fields() {
        let result: DetectionResult = serde_json::from_str("{}").unwrap();
        assert!(result.hands.is_empty());
        assert!(result.error.is_none());
    }

    #[test]
    fn detection_json_carries_error_messages() {
        let result: DetectionResult =
            serde_json::from_str(r#"{"hands": [], "error": "model not loaded"}"#).unwrap();
        assert_eq!(result.error.as_deref(), Some("model not loaded"));
    }
}
