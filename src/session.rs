// src/session.rs - Per-session recording and export of classification results
use crate::classifier::Letter;
use crate::hand::{FingerState, HandPose};
use anyhow::Result;
use chrono::Local;
use csv::Writer;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// One frame's observation as recorded for export.
#[derive(Debug, Clone)]
pub struct FrameSample {
    pub timestamp: f64,
    pub fingers: Option<FingerState>,
    pub curls_deg: Option<[f64; 5]>,
    pub letter: Option<Letter>,
    pub committed: Option<Letter>,
}

impl FrameSample {
    /// Builds a sample from a frame with a detected hand.
    pub fn detected(
        timestamp: f64,
        pose: &HandPose,
        fingers: FingerState,
        letter: Option<Letter>,
        committed: Option<Letter>,
    ) -> Self {
        Self {
            timestamp,
            fingers: Some(fingers),
            curls_deg: Some(pose.finger_curls()),
            letter,
            committed,
        }
    }

    /// Builds a sample for a frame with no usable hand pose.
    pub fn missed(timestamp: f64) -> Self {
        Self {
            timestamp,
            fingers: None,
            curls_deg: None,
            letter: None,
            committed: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct FrameRecord {
    frame: u32,
    timestamp: f64,
    hand_detected: bool,
    letter: Option<char>,
    committed: Option<char>,

    thumb_extended: Option<bool>,
    index_extended: Option<bool>,
    middle_extended: Option<bool>,
    ring_extended: Option<bool>,
    pinky_extended: Option<bool>,

    thumb_curl_deg: Option<f64>,
    index_curl_deg: Option<f64>,
    middle_curl_deg: Option<f64>,
    ring_curl_deg: Option<f64>,
    pinky_curl_deg: Option<f64>,
}

pub struct SessionExporter {
    output_dir: PathBuf,
    session_name: String,
    samples: Vec<FrameSample>,
}

impl SessionExporter {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
            samples: Vec::new(),
        }
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn add_sample(&mut self, sample: FrameSample) {
        self.samples.push(sample);
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self
            .output_dir
            .join(&self.session_name)
            .join("classification.csv");

        if let Some(parent) = csv_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(&csv_path)?;
        let mut writer = Writer::from_writer(file);

        for (i, sample) in self.samples.iter().enumerate() {
            writer.serialize(self.create_record(i as u32, sample))?;
        }

        writer.flush()?;
        Ok(csv_path)
    }

    fn create_record(&self, frame: u32, sample: &FrameSample) -> FrameRecord {
        let f = sample.fingers;
        let curls = sample.curls_deg;

        FrameRecord {
            frame,
            timestamp: sample.timestamp,
            hand_detected: f.is_some(),
            letter: sample.letter.map(Letter::as_char),
            committed: sample.committed.map(Letter::as_char),
            thumb_extended: f.map(|f| f.thumb),
            index_extended: f.map(|f| f.index),
            middle_extended: f.map(|f| f.middle),
            ring_extended: f.map(|f| f.ring),
            pinky_extended: f.map(|f| f.pinky),
            thumb_curl_deg: curls.map(|c| c[0]),
            index_curl_deg: curls.map(|c| c[1]),
            middle_curl_deg: curls.map(|c| c[2]),
            ring_curl_deg: curls.map(|c| c[3]),
            pinky_curl_deg: curls.map(|c| c[4]),
        }
    }

    pub fn generate_report(&self, transcript: &str) -> Result<PathBuf> {
        let report_path = self
            .output_dir
            .join(&self.session_name)
            .join("report.html");

        if let Some(parent) = report_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&report_path, self.create_html_report(transcript))?;
        Ok(report_path)
    }

    fn create_html_report(&self, transcript: &str) -> String {
        let total_frames = self.samples.len();
        let detected = self.samples.iter().filter(|s| s.fingers.is_some()).count();
        let matched = self.samples.iter().filter(|s| s.letter.is_some()).count();

        let mut counts: HashMap<char, usize> = HashMap::new();
        for sample in &self.samples {
            if let Some(letter) = sample.committed {
                *counts.entry(letter.as_char()).or_insert(0) += 1;
            }
        }
        let mut counts: Vec<(char, usize)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let letter_rows: String = counts
            .iter()
            .map(|(letter, n)| {
                format!(
                    r#"        <div class="stat-item">
            <span class="stat-label">{}</span>
            <span class="stat-value">{} committed</span>
        </div>
"#,
                    letter, n
                )
            })
            .collect();

        let detection_rate = if total_frames == 0 {
            0.0
        } else {
            detected as f64 / total_frames as f64 * 100.0
        };
        let match_rate = if detected == 0 {
            0.0
        } else {
            matched as f64 / detected as f64 * 100.0
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>Fingerspelling Session Report - {name}</title>
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 40px; background: #f5f5f5; }}
        h1 {{ color: #333; }}
        .stats {{ background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        .stat-item {{ margin: 10px 0; }}
        .stat-label {{ font-weight: bold; color: #666; }}
        .stat-value {{ color: #4682EA; font-size: 1.2em; }}
        .transcript {{ font-size: 1.5em; letter-spacing: 0.15em; color: #222; }}
    </style>
</head>
<body>
    <h1>Fingerspelling Session Report</h1>
    <div class="stats">
        <h2>Session: {name}</h2>
        <div class="stat-item">
            <span class="stat-label">Total Frames:</span>
            <span class="stat-value">{total}</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Hand Detection Rate:</span>
            <span class="stat-value">{detection_rate:.1}%</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Letter Match Rate:</span>
            <span class="stat-value">{match_rate:.1}%</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Transcript:</span>
            <span class="transcript">{transcript}</span>
        </div>
{letter_rows}    </div>
</body>
</html>
"#,
            name = self.session_name,
            total = total_frames,
            detection_rate = detection_rate,
            match_rate = match_rate,
            transcript = transcript,
            letter_rows = letter_rows,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::hand::Keypoint;

    fn sample_pose() -> HandPose {
        let pts = (0..21)
            .map(|i| Keypoint::new(0.4 + i as f64 * 0.01, 0.5 + i as f64 * 0.01))
            .collect();
        HandPose::try_new(pts).unwrap()
    }

    fn temp_output_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("signspeak_{}_{}", label, std::process::id()))
    }

    #[test]
    fn exports_one_csv_row_per_sample() {
        let out = temp_output_dir("csv");
        let mut exporter = SessionExporter::new(&out, Some("csv_test".to_string()));

        let pose = sample_pose();
        let fingers = Classifier::new().finger_state(&pose);
        exporter.add_sample(FrameSample::detected(0.0, &pose, fingers, None, None));
        exporter.add_sample(FrameSample::missed(0.033));
        exporter.add_sample(FrameSample::detected(
            0.066,
            &pose,
            fingers,
            Some(Letter::A),
            Some(Letter::A),
        ));

        let path = exporter.export_csv().unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        // Header plus three data rows.
        assert_eq!(contents.lines().count(), 4);
        assert!(contents.lines().next().unwrap().contains("hand_detected"));

        std::fs::remove_dir_all(&out).ok();
    }

    #[test]
    fn report_counts_committed_letters() {
        let out = temp_output_dir("report");
        let mut exporter = SessionExporter::new(&out, Some("report_test".to_string()));

        let pose = sample_pose();
        let fingers = Classifier::new().finger_state(&pose);
        for letter in [Some(Letter::H), Some(Letter::I), None] {
            exporter.add_sample(FrameSample::detected(0.0, &pose, fingers, letter, letter));
        }

        let path = exporter.generate_report("HI").unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("HI"));
        assert!(html.contains("1 committed"));
        assert!(html.contains("report_test"));

        std::fs::remove_dir_all(&out).ok();
    }
}
