// src/debounce.rs - Temporal smoothing of per-frame classifications
use crate::classifier::Letter;
use std::collections::VecDeque;
use tracing::debug;

const RECENT_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
pub struct AccumulatorConfig {
    /// Identical non-null classifications required back to back before
    /// a letter is committed.
    pub min_consecutive: usize,
    /// Seconds that must pass before the same letter may be committed
    /// again, so a held sign does not emit duplicates.
    pub repeat_cooldown: f64,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            min_consecutive: 15,
            repeat_cooldown: 1.5,
        }
    }
}

/// Per-session letter accumulator owned by the caller.
///
/// The classifier itself is stateless; this object carries the only
/// cross-frame state, so independent hand-tracking sessions each hold
/// their own accumulator and cannot interfere. The caller must feed
/// frames serially per accumulator.
#[derive(Debug, Clone, Default)]
pub struct LetterAccumulator {
    config: AccumulatorConfig,
    streak_letter: Option<Letter>,
    streak: usize,
    last_commit: Option<(Letter, f64)>,
    transcript: String,
    recent: VecDeque<Letter>,
}

impl LetterAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AccumulatorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Feeds one frame's classification. `now` is the frame timestamp
    /// in seconds; timestamps must be monotonically non-decreasing.
    /// Returns the letter committed on this frame, if any.
    pub fn push(&mut self, observed: Option<Letter>, now: f64) -> Option<Letter> {
        let letter = match observed {
            Some(letter) => letter,
            None => {
                self.streak_letter = None;
                self.streak = 0;
                return None;
            }
        };

        if self.streak_letter == Some(letter) {
            self.streak += 1;
        } else {
            self.streak_letter = Some(letter);
            self.streak = 1;
        }

        if self.streak < self.config.min_consecutive {
            return None;
        }

        if let Some((last, committed_at)) = self.last_commit {
            if last == letter && now - committed_at < self.config.repeat_cooldown {
                // Sign is still being held; wait out the cooldown.
                return None;
            }
        }

        self.last_commit = Some((letter, now));
        self.streak_letter = None;
        self.streak = 0;
        self.transcript.push(letter.as_char());
        if self.recent.len() == RECENT_CAPACITY {
            self.recent.pop_front();
        }
        self.recent.push_back(letter);
        debug!(letter = %letter, at = now, "committed letter");

        Some(letter)
    }

    /// Text committed so far this session.
    pub fn text(&self) -> &str {
        &self.transcript
    }

    /// The last few committed letters, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = Letter> + '_ {
        self.recent.iter().copied()
    }

    pub fn backspace(&mut self) {
        self.transcript.pop();
        self.recent.pop_back();
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
        self.recent.clear();
        self.streak_letter = None;
        self.streak = 0;
        self.last_commit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acc(min_consecutive: usize, repeat_cooldown: f64) -> LetterAccumulator {
        LetterAccumulator::with_config(AccumulatorConfig {
            min_consecutive,
            repeat_cooldown,
        })
    }

    /// Feeds `letter` for `frames` frames at 30 fps starting at `t0`,
    /// returning commits and the timestamp after the run.
    fn feed(
        acc: &mut LetterAccumulator,
        letter: Option<Letter>,
        frames: usize,
        t0: f64,
    ) -> (Vec<Letter>, f64) {
        let mut commits = Vec::new();
        let mut t = t0;
        for _ in 0..frames {
            if let Some(c) = acc.push(letter, t) {
                commits.push(c);
            }
            t += 1.0 / 30.0;
        }
        (commits, t)
    }

    #[test]
    fn commits_after_min_consecutive_frames() {
        let mut acc = acc(15, 1.5);
        let (commits, _) = feed(&mut acc, Some(Letter::A), 14, 0.0);
        assert!(commits.is_empty());
        assert_eq!(acc.push(Some(Letter::A), 14.0 / 30.0), Some(Letter::A));
        assert_eq!(acc.text(), "A");
    }

    #[test]
    fn interruption_resets_the_streak() {
        let mut acc = acc(5, 1.5);
        let (commits, t) = feed(&mut acc, Some(Letter::B), 4, 0.0);
        assert!(commits.is_empty());
        // One dropped frame forces a fresh run.
        acc.push(None, t);
        let (commits, _) = feed(&mut acc, Some(Letter::B), 4, t + 0.033);
        assert!(commits.is_empty());
        assert_eq!(acc.text(), "");
    }

    #[test]
    fn different_letter_resets_the_streak() {
        let mut acc = acc(5, 1.5);
        feed(&mut acc, Some(Letter::C), 4, 0.0);
        let (commits, _) = feed(&mut acc, Some(Letter::D), 5, 0.2);
        assert_eq!(commits, vec![Letter::D]);
        assert_eq!(acc.text(), "D");
    }

    #[test]
    fn held_sign_commits_again_only_after_cooldown() {
        let mut acc = acc(3, 1.0);
        // Holding A: first commit lands on the third frame.
        let (commits, t) = feed(&mut acc, Some(Letter::A), 20, 0.0);
        // 20 frames span 0.63s; the cooldown blocks any repeat.
        assert_eq!(commits, vec![Letter::A]);
        // Still holding past the cooldown: exactly one more commit.
        let (commits, _) = feed(&mut acc, Some(Letter::A), 15, t + 1.0);
        assert_eq!(commits.len(), 1);
        assert_eq!(acc.text(), "AA");
    }

    #[test]
    fn different_letter_is_not_subject_to_cooldown() {
        let mut acc = acc(3, 5.0);
        let (commits, t) = feed(&mut acc, Some(Letter::A), 3, 0.0);
        assert_eq!(commits, vec![Letter::A]);
        let (commits, _) = feed(&mut acc, Some(Letter::B), 3, t);
        assert_eq!(commits, vec![Letter::B]);
        assert_eq!(acc.text(), "AB");
    }

    #[test]
    fn transcript_editing() {
        let mut acc = acc(1, 0.0);
        acc.push(Some(Letter::H), 0.0);
        acc.push(Some(Letter::I), 0.1);
        acc.push(Some(Letter::J), 0.2);
        assert_eq!(acc.text(), "HIJ");
        acc.backspace();
        assert_eq!(acc.text(), "HI");
        assert_eq!(acc.recent().collect::<Vec<_>>(), vec![Letter::H, Letter::I]);
        acc.clear();
        assert_eq!(acc.text(), "");
        assert_eq!(acc.recent().count(), 0);
    }

    #[test]
    fn recent_ring_is_bounded() {
        let mut acc = acc(1, 0.0);
        for i in 0..20 {
            acc.push(Some(Letter::A), i as f64);
        }
        assert_eq!(acc.recent().count(), RECENT_CAPACITY);
    }
}
