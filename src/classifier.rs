// src/classifier.rs - Ordered rule cascade mapping a hand pose to a letter
use crate::hand::{
    ExtensionPolicy, FingerState, HandPose, Keypoint, INDEX_MCP, INDEX_PIP,
    INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, PINKY_DIP, PINKY_MCP, PINKY_TIP, RING_MCP, RING_TIP,
    THUMB_MCP, THUMB_TIP, WRIST,
};
use serde::Serialize;
use std::fmt;

/// One of the 26 fingerspelling letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Letter {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
}

impl Letter {
    pub fn as_char(self) -> char {
        (b'A' + self as u8) as char
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Named threshold constants for every geometric refinement in the
/// cascade, expressed in normalized [0, 1] keypoint units. Swapping
/// this set out is how alternative tunings are A/B tested without
/// touching the rule order.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Minimum tip-to-base vertical displacement for a finger to count
    /// as extended.
    pub min_extension: f64,
    /// How far a tip may sit below its base under the `TipAboveBase`
    /// policy.
    pub extension_slack: f64,
    /// A tolerates the thumb this far above its knuckle before the
    /// pose stops reading as a resting fist.
    pub thumb_raise_slack: f64,
    /// Thumb and index tips closer than this form the O loop; it also
    /// separates A and E from O.
    pub touch_radius: f64,
    /// Thumb-to-fingertip contact for the pinch letters D and F.
    pub pinch_radius: f64,
    /// Maximum index/middle tip separation for U.
    pub together_max: f64,
    /// Maximum gap between neighbouring fingertips for B.
    pub adjacent_max: f64,
    /// Minimum separation for the spread letters K, L and V.
    pub spread_min: f64,
    /// Index/middle tips within this vertical band count as level (H).
    pub level_max: f64,
    /// Minimum horizontal displacement for the sideways letters G, H
    /// and K.
    pub sideways_min: f64,
    /// Index/middle tips with a horizontal gap under this count as
    /// crossed (R), in addition to a true ordering inversion.
    pub cross_max: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_extension: 0.1,
            extension_slack: 0.02,
            thumb_raise_slack: 0.05,
            touch_radius: 0.05,
            pinch_radius: 0.06,
            together_max: 0.05,
            adjacent_max: 0.06,
            spread_min: 0.08,
            level_max: 0.05,
            sideways_min: 0.1,
            cross_max: 0.015,
        }
    }
}

/// Stateless per-frame letter classifier.
///
/// Rules are evaluated strictly top to bottom and the first full match
/// wins, so several letters that share a finger-extension pattern
/// (H, K, R, U, V all use index+middle) are disambiguated by their
/// geometric refinements and by rule order. The order is part of the
/// contract: changing it changes results for borderline poses.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    thresholds: Thresholds,
    policy: ExtensionPolicy,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ExtensionPolicy) -> Self {
        Self {
            thresholds: Thresholds::default(),
            policy,
        }
    }

    pub fn with_thresholds(thresholds: Thresholds, policy: ExtensionPolicy) -> Self {
        Self { thresholds, policy }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn finger_state(&self, pose: &HandPose) -> FingerState {
        FingerState::derive(
            pose,
            self.policy,
            self.thresholds.min_extension,
            self.thresholds.extension_slack,
        )
    }

    /// Lenient entry point: structurally invalid input degrades to
    /// no-match instead of an error.
    pub fn classify_keypoints(&self, keypoints: &[Keypoint]) -> Option<Letter> {
        let pose = HandPose::try_new(keypoints.to_vec()).ok()?;
        self.classify(&pose)
    }

    /// Runs the cascade over a validated pose. Returns `None` when no
    /// rule matches; ambiguity never degrades to a guess.
    pub fn classify(&self, pose: &HandPose) -> Option<Letter> {
        let th = &self.thresholds;
        let f = self.finger_state(pose);

        let wrist = pose.kp(WRIST);
        let thumb_tip = pose.kp(THUMB_TIP);
        let thumb_mcp = pose.kp(THUMB_MCP);
        let idx_mcp = pose.kp(INDEX_MCP);
        let idx_pip = pose.kp(INDEX_PIP);
        let idx_tip = pose.kp(INDEX_TIP);
        let mid_mcp = pose.kp(MIDDLE_MCP);
        let mid_tip = pose.kp(MIDDLE_TIP);
        let ring_mcp = pose.kp(RING_MCP);
        let ring_tip = pose.kp(RING_TIP);
        let pinky_mcp = pose.kp(PINKY_MCP);
        let pinky_dip = pose.kp(PINKY_DIP);
        let pinky_tip = pose.kp(PINKY_TIP);

        // A - closed fist, thumb resting at the side of the fingers.
        // The thumb must not point upward, sit buried under the curled
        // fingers (that is M/N territory) or touch the index tip (O).
        if f.fingers_closed()
            && !f.thumb
            && thumb_tip.y >= thumb_mcp.y - th.thumb_raise_slack
            && !(thumb_tip.y > idx_tip.y && thumb_tip.y > mid_tip.y)
            && pose.tip_distance(THUMB_TIP, INDEX_TIP) > th.touch_radius
        {
            return Some(Letter::A);
        }

        // B - four fingers up with no large spread, thumb tucked
        if !f.thumb
            && f.matches(true, true, true, true)
            && pose.tip_distance(INDEX_TIP, MIDDLE_TIP) < th.adjacent_max
            && pose.tip_distance(MIDDLE_TIP, RING_TIP) < th.adjacent_max
        {
            return Some(Letter::B);
        }

        // C - open curved shape, all four fingertips swept inward past
        // their knuckles. Extension flags are not constrained: a wide C
        // can hold the tips far enough below the knuckles to read as
        // extended.
        if !f.thumb
            && idx_tip.x < idx_mcp.x
            && mid_tip.x < mid_mcp.x
            && ring_tip.x < ring_mcp.x
            && pinky_tip.x < pinky_mcp.x
        {
            return Some(Letter::C);
        }

        // D - index up, thumb pinched against the middle fingertip
        if !f.thumb
            && f.matches(true, false, false, false)
            && pose.tip_distance(THUMB_TIP, MIDDLE_TIP) < th.pinch_radius
        {
            return Some(Letter::D);
        }

        // E - fingertips folded down past their knuckles, thumb across
        if f.thumb
            && f.fingers_closed()
            && idx_tip.y > idx_mcp.y
            && mid_tip.y > mid_mcp.y
            && ring_tip.y > ring_mcp.y
            && pose.tip_distance(THUMB_TIP, INDEX_TIP) > th.touch_radius
        {
            return Some(Letter::E);
        }

        // F - index curled onto the thumb, other three up
        if !f.thumb
            && !f.index
            && f.middle
            && f.ring
            && f.pinky
            && pose.tip_distance(THUMB_TIP, INDEX_TIP) < th.pinch_radius
        {
            return Some(Letter::F);
        }

        // G - index alone, pointing sideways from the wrist
        if !f.thumb
            && f.matches(true, false, false, false)
            && (idx_tip.x - wrist.x).abs() > th.sideways_min
        {
            return Some(Letter::G);
        }

        // H - index and middle as a level sideways pair
        if !f.thumb
            && f.matches(true, true, false, false)
            && (idx_tip.y - mid_tip.y).abs() < th.level_max
            && (idx_tip.x - idx_mcp.x).abs() > th.sideways_min
        {
            return Some(Letter::H);
        }

        // I - pinky alone
        if !f.thumb && f.matches(false, false, false, true) {
            return Some(Letter::I);
        }

        // J - hooked pinky. A motion letter; this static approximation
        // is shadowed by I above and kept for the canonical rule order.
        if !f.thumb && f.matches(false, false, false, true) && pinky_tip.y < pinky_dip.y {
            return Some(Letter::J);
        }

        // K - index and middle spread apart, leaning sideways
        if !f.thumb
            && f.matches(true, true, false, false)
            && (idx_tip.x - mid_tip.x).abs() > th.spread_min
            && (idx_tip.x - idx_mcp.x).abs() > th.sideways_min
        {
            return Some(Letter::K);
        }

        // L - index and thumb at a right angle
        if f.thumb
            && f.matches(true, false, false, false)
            && (idx_tip.x - thumb_tip.x).abs() > th.spread_min
            && (idx_tip.y - thumb_tip.y).abs() > th.spread_min
        {
            return Some(Letter::L);
        }

        // M - three fingers folded over the thumb
        if f.fingers_closed()
            && thumb_tip.y > idx_tip.y
            && thumb_tip.y > mid_tip.y
            && thumb_tip.y > ring_tip.y
        {
            return Some(Letter::M);
        }

        // N - two fingers folded over the thumb, ring/pinky free
        if !f.index && !f.middle && thumb_tip.y > idx_tip.y && thumb_tip.y > mid_tip.y {
            return Some(Letter::N);
        }

        // O - thumb and index tips closing a loop
        if pose.tip_distance(THUMB_TIP, INDEX_TIP) < th.touch_radius {
            return Some(Letter::O);
        }

        // P - index and middle dropped below the wrist
        if !f.thumb
            && f.matches(true, true, false, false)
            && idx_tip.y > wrist.y
            && mid_tip.y > wrist.y
        {
            return Some(Letter::P);
        }

        // Q - index dropped below the wrist
        if !f.thumb && f.matches(true, false, false, false) && idx_tip.y > wrist.y {
            return Some(Letter::Q);
        }

        // R - index and middle crossed: tip order inverted relative to
        // the knuckles, or a near-zero horizontal gap
        if !f.thumb && f.matches(true, true, false, false) {
            let tip_gap = idx_tip.x - mid_tip.x;
            let base_gap = idx_mcp.x - mid_mcp.x;
            if tip_gap * base_gap < 0.0 || tip_gap.abs() < th.cross_max {
                return Some(Letter::R);
            }
        }

        // S - fist with the thumb wrapped across the front of the
        // fingers, below the knuckle line
        if f.thumb
            && f.fingers_closed()
            && thumb_tip.x > idx_tip.x
            && thumb_tip.x < ring_tip.x
            && thumb_tip.y > idx_mcp.y
        {
            return Some(Letter::S);
        }

        // T - thumb above the wrist, tucked between index and middle
        if f.thumb
            && f.fingers_closed()
            && thumb_tip.y < wrist.y
            && thumb_tip.x > idx_tip.x
            && thumb_tip.x < mid_tip.x
        {
            return Some(Letter::T);
        }

        // U - index and middle vertical and together
        if !f.thumb
            && f.matches(true, true, false, false)
            && pose.tip_distance(INDEX_TIP, MIDDLE_TIP) < th.together_max
        {
            return Some(Letter::U);
        }

        // V - index and middle vertical and spread
        if !f.thumb
            && f.matches(true, true, false, false)
            && pose.tip_distance(INDEX_TIP, MIDDLE_TIP) > th.spread_min
        {
            return Some(Letter::V);
        }

        // W - index, middle and ring up
        if !f.thumb && f.matches(true, true, true, false) {
            return Some(Letter::W);
        }

        // X - fist with the index hooked below its middle joint
        if !f.thumb && f.fingers_closed() && idx_tip.y > idx_pip.y {
            return Some(Letter::X);
        }

        // Y - thumb and pinky out
        if f.thumb && f.matches(false, false, false, true) {
            return Some(Letter::Y);
        }

        // Z - index alone. A motion letter; without a trajectory this
        // static fallback catches what G, Q and D above did not.
        if !f.thumb && f.matches(true, false, false, false) {
            return Some(Letter::Z);
        }

        None
    }
}
