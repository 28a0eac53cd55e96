// src/lib.rs
//! Rule-based fingerspelling letter classification over 21-keypoint
//! hand poses.
//!
//! The core is [`Classifier`]: a pure, stateless per-frame function
//! from one hand's keypoints to a letter or no-match. Temporal
//! smoothing lives in [`LetterAccumulator`], an explicit state object
//! the caller owns and threads through each frame.

pub mod classifier;
pub mod debounce;
pub mod hand;
pub mod session;

pub use classifier::{Classifier, Letter, Thresholds};
pub use debounce::{AccumulatorConfig, LetterAccumulator};
pub use hand::{ExtensionPolicy, FingerState, HandPose, Keypoint, PoseError};
pub use session::{FrameSample, SessionExporter};
