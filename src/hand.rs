// src/hand.rs - Hand pose data model and finger geometry
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// MediaPipe hand landmark indices
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// A valid hand pose always has exactly this many keypoints.
pub const LANDMARK_COUNT: usize = 21;

#[derive(Debug, Error)]
pub enum PoseError {
    #[error("expected {LANDMARK_COUNT} keypoints, got {0}")]
    WrongCount(usize),
    #[error("keypoint {0} has a non-finite coordinate")]
    NonFinite(usize),
}

/// One tracked joint of a hand, in the detector's coordinate space.
///
/// All thresholds in this crate assume coordinates normalized to [0, 1]
/// with y growing downward (image convention). Callers feeding pixel
/// coordinates must normalize before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Keypoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            name: None,
        }
    }

    pub fn point2(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn point3(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// Euclidean distance between two keypoints in the image plane.
pub fn planar_distance(a: &Keypoint, b: &Keypoint) -> f64 {
    (a.point2() - b.point2()).norm()
}

/// A validated 21-keypoint snapshot of one hand for one frame.
#[derive(Debug, Clone)]
pub struct HandPose {
    keypoints: Vec<Keypoint>,
}

impl HandPose {
    /// Validates the raw keypoint sequence. Anything other than exactly
    /// 21 finite keypoints is rejected; classification is never attempted
    /// on a malformed pose.
    pub fn try_new(keypoints: Vec<Keypoint>) -> Result<Self, PoseError> {
        if keypoints.len() != LANDMARK_COUNT {
            return Err(PoseError::WrongCount(keypoints.len()));
        }
        for (i, kp) in keypoints.iter().enumerate() {
            if !kp.x.is_finite() || !kp.y.is_finite() || !kp.z.is_finite() {
                return Err(PoseError::NonFinite(i));
            }
        }
        Ok(Self { keypoints })
    }

    pub fn kp(&self, index: usize) -> &Keypoint {
        &self.keypoints[index]
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn tip_distance(&self, a: usize, b: usize) -> f64 {
        planar_distance(self.kp(a), self.kp(b))
    }

    /// Average bend angle of each finger in degrees, thumb first.
    /// Straight fingers report near zero, a full curl approaches 180.
    pub fn finger_curls(&self) -> [f64; 5] {
        [
            self.curl_angle(THUMB_CMC, THUMB_MCP, THUMB_IP, THUMB_TIP),
            self.curl_angle(INDEX_MCP, INDEX_PIP, INDEX_DIP, INDEX_TIP),
            self.curl_angle(MIDDLE_MCP, MIDDLE_PIP, MIDDLE_DIP, MIDDLE_TIP),
            self.curl_angle(RING_MCP, RING_PIP, RING_DIP, RING_TIP),
            self.curl_angle(PINKY_MCP, PINKY_PIP, PINKY_DIP, PINKY_TIP),
        ]
    }

    fn curl_angle(&self, mcp: usize, pip: usize, dip: usize, tip: usize) -> f64 {
        let v1 = self.kp(pip).point3() - self.kp(mcp).point3();
        let v2 = self.kp(dip).point3() - self.kp(pip).point3();
        let v3 = self.kp(tip).point3() - self.kp(dip).point3();

        let angle1 = angle_between(&v1, &v2);
        let angle2 = angle_between(&v2, &v3);

        ((angle1 + angle2) / 2.0).to_degrees()
    }
}

fn angle_between(v1: &Vector3<f64>, v2: &Vector3<f64>) -> f64 {
    let mag1 = v1.norm();
    let mag2 = v2.norm();
    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }
    (v1.dot(v2) / (mag1 * mag2)).clamp(-1.0, 1.0).acos()
}

/// How to decide whether a finger counts as "extended".
///
/// The two policies diverge for hands rotated relative to the camera: a
/// finger pointing straight down is extended under `VerticalDistance`
/// but curled under `TipAboveBase`. The default is `VerticalDistance`,
/// which keeps the downward-pointing letters (P, Q) reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtensionPolicy {
    /// Absolute vertical distance between tip and base exceeds the
    /// threshold, regardless of direction.
    #[default]
    VerticalDistance,
    /// Same distance test, but the tip must additionally sit no more
    /// than a small slack below its base.
    TipAboveBase,
}

/// Extended/curled flag per finger, derived fresh on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerState {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    pub fn derive(
        pose: &HandPose,
        policy: ExtensionPolicy,
        min_extension: f64,
        slack: f64,
    ) -> Self {
        let extended = |base: usize, tip: usize| -> bool {
            let base = pose.kp(base);
            let tip = pose.kp(tip);
            let displaced = (tip.y - base.y).abs() > min_extension;
            match policy {
                ExtensionPolicy::VerticalDistance => displaced,
                ExtensionPolicy::TipAboveBase => displaced && tip.y < base.y + slack,
            }
        };

        Self {
            thumb: extended(THUMB_CMC, THUMB_TIP),
            index: extended(INDEX_MCP, INDEX_TIP),
            middle: extended(MIDDLE_MCP, MIDDLE_TIP),
            ring: extended(RING_MCP, RING_TIP),
            pinky: extended(PINKY_MCP, PINKY_TIP),
        }
    }

    /// True when none of the four non-thumb fingers is extended.
    pub fn fingers_closed(&self) -> bool {
        !self.index && !self.middle && !self.ring && !self.pinky
    }

    pub fn extended_count(&self) -> usize {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|&&f| f)
            .count()
    }

    /// Matches the four non-thumb fingers against an expected pattern.
    pub fn matches(&self, index: bool, middle: bool, ring: bool, pinky: bool) -> bool {
        self.index == index && self.middle == middle && self.ring == ring && self.pinky == pinky
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(x: f64, y: f64) -> Keypoint {
        Keypoint::new(x, y)
    }

    #[test]
    fn rejects_wrong_keypoint_count() {
        for count in [0, 5, 20, 22] {
            let pts = vec![kp(0.5, 0.5); count];
            match HandPose::try_new(pts) {
                Err(PoseError::WrongCount(n)) => assert_eq!(n, count),
                other => panic!("expected WrongCount, got {:?}", other),
            }
        }
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let mut pts = vec![kp(0.5, 0.5); LANDMARK_COUNT];
        pts[7].y = f64::NAN;
        match HandPose::try_new(pts) {
            Err(PoseError::NonFinite(i)) => assert_eq!(i, 7),
            other => panic!("expected NonFinite, got {:?}", other),
        }
    }

    #[test]
    fn planar_distance_ignores_z() {
        let mut a = kp(0.0, 0.0);
        let mut b = kp(0.3, 0.4);
        a.z = 5.0;
        b.z = -5.0;
        assert!((planar_distance(&a, &b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn tip_distance_matches_planar_distance() {
        let mut pts = vec![kp(0.5, 0.5); LANDMARK_COUNT];
        pts[THUMB_TIP] = kp(0.38, 0.65);
        pts[INDEX_TIP] = kp(0.44, 0.42);
        let pose = HandPose::try_new(pts).unwrap();
        let direct = planar_distance(pose.kp(THUMB_TIP), pose.kp(INDEX_TIP));
        assert_eq!(pose.tip_distance(THUMB_TIP, INDEX_TIP), direct);
    }

    #[test]
    fn extended_count_tallies_all_five_fingers() {
        let state = FingerState {
            thumb: true,
            index: false,
            middle: true,
            ring: false,
            pinky: true,
        };
        assert_eq!(state.extended_count(), 3);
        assert!(!state.fingers_closed());
    }

    #[test]
    fn extension_policies_diverge_on_downward_finger() {
        // Index finger pointing straight down: far from its base but
        // below it.
        let mut pts = vec![kp(0.5, 0.5); LANDMARK_COUNT];
        pts[INDEX_MCP] = kp(0.44, 0.60);
        pts[INDEX_TIP] = kp(0.44, 0.75);
        let pose = HandPose::try_new(pts).unwrap();

        let loose = FingerState::derive(&pose, ExtensionPolicy::VerticalDistance, 0.1, 0.02);
        let strict = FingerState::derive(&pose, ExtensionPolicy::TipAboveBase, 0.1, 0.02);

        assert!(loose.index);
        assert!(!strict.index);
    }

    #[test]
    fn extension_boundary_is_exclusive() {
        // Displacement exactly at the threshold does not count as
        // extended; only strictly greater does.
        let make = |tip_y: f64| {
            let mut pts = vec![kp(0.5, 0.5); LANDMARK_COUNT];
            pts[INDEX_MCP] = kp(0.44, 0.60);
            pts[INDEX_TIP] = kp(0.44, tip_y);
            HandPose::try_new(pts).unwrap()
        };
        let derive = |pose: &HandPose| {
            FingerState::derive(pose, ExtensionPolicy::VerticalDistance, 0.1, 0.02).index
        };

        assert!(!derive(&make(0.51))); // boundary - eps
        assert!(!derive(&make(0.50))); // exactly at threshold
        assert!(derive(&make(0.4999))); // boundary + eps
    }
}
