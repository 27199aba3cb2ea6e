//! Parsing of the line-oriented reply protocol into verdicts.

use std::path::PathBuf;

/// Outcome of one analysis call.
#[derive(Debug, Clone, PartialEq)]
pub struct VibeVerdict {
    pub is_vibing: bool,
    /// Always within 0..=100.
    pub confidence: u8,
    pub movement_detected: bool,
    /// Relayed as-is from the reply; "UNKNOWN" when absent.
    pub energy_level: String,
    pub description: String,
    pub raw_response: String,
}

/// Per-frame verdict paired with the frame it came from.
#[derive(Debug, Clone)]
pub struct FrameVerdict {
    pub path: PathBuf,
    pub verdict: VibeVerdict,
}

/// Aggregate over the per-frame verdicts of a capture sequence.
#[derive(Debug, Clone)]
pub struct SequenceSummary {
    pub total_images: usize,
    pub vibing_images: usize,
    pub vibing_percentage: f64,
    pub average_confidence: f64,
    pub overall_vibing: bool,
    pub frames: Vec<FrameVerdict>,
}

impl SequenceSummary {
    /// Aggregate per-frame verdicts; at least half vibing carries the sequence.
    /// Returns `None` for an empty input.
    pub fn from_frames(frames: Vec<FrameVerdict>) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        let total_images = frames.len();
        let vibing_images = frames.iter().filter(|f| f.verdict.is_vibing).count();
        let vibing_percentage = (vibing_images as f64 / total_images as f64) * 100.0;
        let average_confidence = frames
            .iter()
            .map(|f| f.verdict.confidence as f64)
            .sum::<f64>()
            / total_images as f64;

        Some(Self {
            total_images,
            vibing_images,
            vibing_percentage,
            average_confidence,
            overall_vibing: vibing_percentage >= 50.0,
            frames,
        })
    }
}

/// Either analysis shape, depending on mode and frame count.
#[derive(Debug, Clone)]
pub enum AnalysisReport {
    /// One request covering the whole sequence.
    Temporal(VibeVerdict),
    /// One request per frame plus an aggregate.
    PerFrame(SequenceSummary),
}

/// Pull the labelled fields out of a reply. Unknown lines are ignored so
/// chatty models still parse; missing fields keep their defaults.
pub fn parse_verdict(raw: &str) -> VibeVerdict {
    let mut is_vibing = false;
    let mut confidence: u8 = 0;
    let mut movement_detected = false;
    let mut energy_level = String::from("UNKNOWN");
    let mut description = String::new();

    for line in raw.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("VIBING:") {
            is_vibing = rest.to_uppercase().contains("YES");
        } else if let Some(rest) = line.strip_prefix("CONFIDENCE:") {
            confidence = parse_confidence(rest);
        } else if let Some(rest) = line.strip_prefix("MOVEMENT_DETECTED:") {
            movement_detected = rest.to_uppercase().contains("YES");
        } else if let Some(rest) = line.strip_prefix("ENERGY_LEVEL:") {
            let level = rest.trim();
            if !level.is_empty() {
                energy_level = level.to_string();
            }
        } else if let Some(rest) = line.strip_prefix("DESCRIPTION:") {
            description = rest.trim().to_string();
        }
    }

    VibeVerdict {
        is_vibing,
        confidence,
        movement_detected,
        energy_level,
        description,
        raw_response: raw.to_string(),
    }
}

/// All digits in the value joined together, clamped to 100. A confidence
/// line with no digits at all falls back to 50.
fn parse_confidence(rest: &str) -> u8 {
    let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 50;
    }
    // An all-digit string only fails to parse by overflowing u32.
    digits.parse::<u32>().map_or(100, |value| value.min(100)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame(vibing: bool, confidence: u8) -> FrameVerdict {
        FrameVerdict {
            path: PathBuf::from("frame.jpg"),
            verdict: VibeVerdict {
                is_vibing: vibing,
                confidence,
                movement_detected: false,
                energy_level: "UNKNOWN".to_string(),
                description: String::new(),
                raw_response: String::new(),
            },
        }
    }

    #[test]
    fn test_parse_well_formed_reply() {
        let raw = "VIBING: YES\nCONFIDENCE: 85\nDESCRIPTION: Arms raised, clearly dancing.";
        let verdict = parse_verdict(raw);
        assert!(verdict.is_vibing);
        assert_eq!(verdict.confidence, 85);
        assert_eq!(verdict.description, "Arms raised, clearly dancing.");
        assert_eq!(verdict.raw_response, raw);
    }

    #[test]
    fn test_parse_temporal_fields() {
        let raw = "VIBING: NO\nCONFIDENCE: 40\nMOVEMENT_DETECTED: YES\nENERGY_LEVEL: MEDIUM\nDESCRIPTION: Some swaying.";
        let verdict = parse_verdict(raw);
        assert!(!verdict.is_vibing);
        assert_eq!(verdict.confidence, 40);
        assert!(verdict.movement_detected);
        assert_eq!(verdict.energy_level, "MEDIUM");
    }

    #[test]
    fn test_parse_lowercase_yes() {
        let verdict = parse_verdict("VIBING: yes\nCONFIDENCE: 70");
        assert!(verdict.is_vibing);
    }

    #[test]
    fn test_parse_empty_reply_keeps_defaults() {
        let verdict = parse_verdict("The model rambled with no structure at all.");
        assert!(!verdict.is_vibing);
        assert_eq!(verdict.confidence, 0);
        assert!(!verdict.movement_detected);
        assert_eq!(verdict.energy_level, "UNKNOWN");
        assert_eq!(verdict.description, "");
    }

    #[test]
    fn test_confidence_with_percent_sign() {
        assert_eq!(parse_verdict("CONFIDENCE: 85%").confidence, 85);
    }

    #[test]
    fn test_confidence_without_digits_falls_back() {
        assert_eq!(parse_verdict("CONFIDENCE: quite high").confidence, 50);
    }

    #[test]
    fn test_confidence_above_range_clamped() {
        assert_eq!(parse_verdict("CONFIDENCE: 150").confidence, 100);
    }

    #[test]
    fn test_confidence_oversized_digit_run_clamps() {
        assert_eq!(parse_verdict("CONFIDENCE: 99999999999").confidence, 100);
        assert_eq!(
            parse_verdict("CONFIDENCE: 999999999999999999999999999999").confidence,
            100
        );
    }

    #[test]
    fn test_indented_lines_still_parse() {
        let verdict = parse_verdict("  VIBING: YES\n  CONFIDENCE: 60");
        assert!(verdict.is_vibing);
        assert_eq!(verdict.confidence, 60);
    }

    #[test]
    fn test_half_vibing_carries_sequence() {
        let summary =
            SequenceSummary::from_frames(vec![frame(true, 80), frame(false, 20), frame(true, 60), frame(false, 40)])
                .unwrap();
        assert_eq!(summary.total_images, 4);
        assert_eq!(summary.vibing_images, 2);
        assert!((summary.vibing_percentage - 50.0).abs() < f64::EPSILON);
        assert!(summary.overall_vibing, "exactly half still counts");
        assert!((summary.average_confidence - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_minority_vibing_does_not_carry() {
        let summary =
            SequenceSummary::from_frames(vec![frame(true, 90), frame(false, 10), frame(false, 10)])
                .unwrap();
        assert!(!summary.overall_vibing);
    }

    #[test]
    fn test_empty_sequence_has_no_summary() {
        assert!(SequenceSummary::from_frames(Vec::new()).is_none());
    }

    proptest! {
        #[test]
        fn prop_confidence_always_in_range(raw in "\\PC*") {
            prop_assert!(parse_verdict(&raw).confidence <= 100);
        }

        #[test]
        fn prop_parser_never_panics(raw in any::<String>()) {
            let _ = parse_verdict(&raw);
        }

        #[test]
        fn prop_numeric_confidence_roundtrips(value in 0u32..=100) {
            let raw = format!("CONFIDENCE: {}", value);
            prop_assert_eq!(parse_verdict(&raw).confidence as u32, value);
        }
    }
}
