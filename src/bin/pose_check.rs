// src/bin/pose_check.rs - Inspect a single pose file against the classifier
use signspeak::{Classifier, ExtensionPolicy, HandPose, Keypoint};

fn main() {
    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("Usage: pose_check <pose.json>");
            eprintln!("  pose.json holds a 21-element keypoint array:");
            eprintln!("  [{{\"x\": 0.5, \"y\": 0.8}}, ...]");
            std::process::exit(2);
        }
    };

    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("✗ Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let keypoints: Vec<Keypoint> = match serde_json::from_str(&data) {
        Ok(kps) => kps,
        Err(e) => {
            eprintln!("✗ Failed to parse keypoints: {}", e);
            std::process::exit(1);
        }
    };

    println!("Checking pose with {} keypoints...\n", keypoints.len());

    let pose = match HandPose::try_new(keypoints) {
        Ok(pose) => {
            println!("✓ Pose structure valid");
            pose
        }
        Err(e) => {
            println!("✗ Invalid pose: {}", e);
            std::process::exit(1);
        }
    };

    for (label, policy) in [
        ("vertical-distance", ExtensionPolicy::VerticalDistance),
        ("tip-above-base", ExtensionPolicy::TipAboveBase),
    ] {
        let classifier = Classifier::with_policy(policy);
        let fingers = classifier.finger_state(&pose);

        println!("\nExtension policy: {}", label);
        for (finger, extended) in [
            ("thumb", fingers.thumb),
            ("index", fingers.index),
            ("middle", fingers.middle),
            ("ring", fingers.ring),
            ("pinky", fingers.pinky),
        ] {
            println!("  {} {}", if extended { "✓" } else { "✗" }, finger);
        }
        println!("  {} of 5 extended", fingers.extended_count());

        match classifier.classify(&pose) {
            Some(letter) => println!("  => letter {}", letter),
            None => println!("  => no match"),
        }
    }
}
