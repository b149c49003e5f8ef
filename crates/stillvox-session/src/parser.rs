//! Session parsers
//!
//! Two front-ends produce the same `Session`:
//! - `parse_records`: a JSON array of statement records
//!   `{ "text": .., "voice": .., "duration": .. }`.
//! - `parse_markup`: free narration text interleaved with
//!   `<hold N seconds>` / `<hold N minutes>` markers.

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::SessionError;
use crate::types::{Segment, Session};

/// Default narration voice, matching the session style this tool ships with.
pub const DEFAULT_VOICE: &str = "Algieba";

/// Style prompt prefixed onto every narration before synthesis.
pub const INSTRUCTOR_STYLE: &str = "Speak as a yoga instructor running a relaxing session. \
Use a soft, gentle voice just above a whisper and without strong emphasis on words: ";

/// Options applied while building segments.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Voice used when a statement does not name one.
    pub default_voice: String,
    /// Style sentence prefixed onto narration text, `None` to pass text
    /// through untouched.
    pub style: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_voice: DEFAULT_VOICE.to_string(),
            style: Some(INSTRUCTOR_STYLE.to_string()),
        }
    }
}

impl ParseOptions {
    /// Options with no style wrapping, voice as given.
    pub fn plain(default_voice: impl Into<String>) -> Self {
        Self {
            default_voice: default_voice.into(),
            style: None,
        }
    }

    fn styled_text(&self, text: &str) -> String {
        match &self.style {
            Some(style) => format!("{}'{}'", style, text),
            None => text.to_string(),
        }
    }
}

/// One raw statement as it appears in a JSON session file.
#[derive(Debug, Deserialize)]
struct StatementRecord {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    voice: Option<String>,
    #[serde(default)]
    duration: Option<DurationField>,
}

/// A duration expression: bare seconds, or a `"<n> <unit>"` string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DurationField {
    Seconds(f64),
    Expression(String),
}

impl DurationField {
    fn seconds(&self) -> f64 {
        match self {
            DurationField::Seconds(n) => *n,
            DurationField::Expression(s) => parse_duration_expression(s),
        }
    }
}

/// Parse a duration string: `"5 seconds"`, `"2 minutes"`, or a bare number.
/// Anything unrecognized yields 0.0 — never an error. A malformed duration
/// silently becomes a zero-length hold; that is a documented limitation of
/// the session format, not something to guess around.
pub fn parse_duration_expression(raw: &str) -> f64 {
    let pattern = Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*(seconds?|minutes?)?\s*$").unwrap();
    match pattern.captures(raw) {
        Some(caps) => {
            let value: f64 = caps
                .get(1)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0.0);
            let unit = caps.get(2).map(|m| m.as_str().to_ascii_lowercase());
            match unit.as_deref() {
                Some(u) if u.starts_with("minute") => value * 60.0,
                _ => value,
            }
        }
        None => {
            debug!(raw, "unparseable duration, treating as zero-length hold");
            0.0
        }
    }
}

/// Parse a JSON array of statement records into a session.
///
/// A record with non-empty text becomes a narration (voice defaulted from
/// `opts`); a record with empty or absent text becomes a hold of the
/// record's duration (0 when absent or unparseable).
///
/// Fails with [`SessionError::Malformed`] when the input is not a list of
/// records.
pub fn parse_records(input: &str, opts: &ParseOptions) -> Result<Session, SessionError> {
    let records: Vec<StatementRecord> =
        serde_json::from_str(input).map_err(|e| SessionError::Malformed(e.to_string()))?;

    let mut segments = Vec::with_capacity(records.len());
    for record in &records {
        let index = segments.len();
        let text = record.text.as_deref().map(str::trim).unwrap_or("");
        if !text.is_empty() {
            segments.push(Segment::Narration {
                index,
                text: opts.styled_text(text),
                voice: record
                    .voice
                    .clone()
                    .unwrap_or_else(|| opts.default_voice.clone()),
            });
        } else {
            let seconds = record.duration.as_ref().map(|d| d.seconds()).unwrap_or(0.0);
            segments.push(Segment::Hold { index, seconds });
        }
    }
    Ok(Session::new(segments))
}

/// Parse the plain-text session format: narration interleaved with
/// `<hold N second(s)|minute(s)>` markers (case-insensitive).
///
/// Empty narration chunks and zero-length holds are dropped. Free text is
/// always a valid session, so this cannot fail.
pub fn parse_markup(input: &str, opts: &ParseOptions) -> Session {
    let hold_pattern = Regex::new(r"(?i)<hold\s+(\d+)\s+(seconds?|minutes?)>").unwrap();

    let mut segments = Vec::new();
    let push_narration = |segments: &mut Vec<Segment>, chunk: &str| {
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            segments.push(Segment::Narration {
                index: segments.len(),
                text: opts.styled_text(chunk),
                voice: opts.default_voice.clone(),
            });
        }
    };

    let mut pos = 0;
    for caps in hold_pattern.captures_iter(input) {
        let marker = caps.get(0).unwrap();
        push_narration(&mut segments, &input[pos..marker.start()]);

        let value: f64 = caps[1].parse().unwrap_or(0.0);
        let seconds = if caps[2].to_ascii_lowercase().starts_with("minute") {
            value * 60.0
        } else {
            value
        };
        if seconds > 0.0 {
            segments.push(Segment::Hold {
                index: segments.len(),
                seconds,
            });
        }
        pos = marker.end();
    }
    push_narration(&mut segments, &input[pos..]);

    Session::new(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> ParseOptions {
        ParseOptions::plain("test-voice")
    }

    #[test]
    fn duration_expressions() {
        assert_eq!(parse_duration_expression("5 seconds"), 5.0);
        assert_eq!(parse_duration_expression("1 second"), 1.0);
        assert_eq!(parse_duration_expression("2 minutes"), 120.0);
        assert_eq!(parse_duration_expression("1 minute"), 60.0);
        assert_eq!(parse_duration_expression("30"), 30.0);
        assert_eq!(parse_duration_expression("2 MINUTES"), 120.0);
        assert_eq!(parse_duration_expression("banana"), 0.0);
        assert_eq!(parse_duration_expression(""), 0.0);
    }

    #[test]
    fn records_numeric_duration() {
        let session = parse_records(r#"[{"duration": 10}]"#, &plain()).unwrap();
        assert_eq!(
            session.segments(),
            &[Segment::Hold {
                index: 0,
                seconds: 10.0
            }]
        );
    }

    #[test]
    fn records_mixed_session() {
        let input = r#"[
            {"text": "Breathe in", "voice": "Kore"},
            {"duration": "5 seconds"},
            {"text": "Breathe out"}
        ]"#;
        let session = parse_records(input, &plain()).unwrap();
        assert_eq!(session.len(), 3);
        assert_eq!(
            session.segments()[0],
            Segment::Narration {
                index: 0,
                text: "Breathe in".to_string(),
                voice: "Kore".to_string(),
            }
        );
        assert_eq!(
            session.segments()[1],
            Segment::Hold {
                index: 1,
                seconds: 5.0
            }
        );
        // Voice defaults when the record omits it.
        assert_eq!(
            session.segments()[2],
            Segment::Narration {
                index: 2,
                text: "Breathe out".to_string(),
                voice: "test-voice".to_string(),
            }
        );
    }

    #[test]
    fn records_blank_text_is_a_hold() {
        let session = parse_records(r#"[{"text": "   ", "duration": "1 minute"}]"#, &plain())
            .unwrap();
        assert_eq!(
            session.segments(),
            &[Segment::Hold {
                index: 0,
                seconds: 60.0
            }]
        );
    }

    #[test]
    fn records_unparseable_duration_degrades_to_zero() {
        let session = parse_records(r#"[{"duration": "banana"}]"#, &plain()).unwrap();
        assert_eq!(
            session.segments(),
            &[Segment::Hold {
                index: 0,
                seconds: 0.0
            }]
        );
    }

    #[test]
    fn records_missing_duration_defaults_to_zero() {
        let session = parse_records(r#"[{}]"#, &plain()).unwrap();
        assert_eq!(
            session.segments(),
            &[Segment::Hold {
                index: 0,
                seconds: 0.0
            }]
        );
    }

    #[test]
    fn records_rejects_non_list_input() {
        assert!(matches!(
            parse_records(r#"{"text": "hi"}"#, &plain()),
            Err(SessionError::Malformed(_))
        ));
        assert!(matches!(
            parse_records("not json at all", &plain()),
            Err(SessionError::Malformed(_))
        ));
    }

    #[test]
    fn style_prefix_wraps_narration() {
        let opts = ParseOptions {
            default_voice: "v".to_string(),
            style: Some("Gently: ".to_string()),
        };
        let session = parse_records(r#"[{"text": "Relax"}]"#, &opts).unwrap();
        match &session.segments()[0] {
            Segment::Narration { text, .. } => assert_eq!(text, "Gently: 'Relax'"),
            other => panic!("expected narration, got {:?}", other),
        }
    }

    #[test]
    fn markup_splits_on_hold_markers() {
        let session = parse_markup(
            "Settle onto your mat. <hold 1 minute> Breathe. <HOLD 30 SECONDS> Release.",
            &plain(),
        );
        let kinds: Vec<_> = session
            .segments()
            .iter()
            .map(|s| match s {
                Segment::Narration { text, .. } => format!("n:{}", text),
                Segment::Hold { seconds, .. } => format!("h:{}", seconds),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "n:Settle onto your mat.",
                "h:60",
                "n:Breathe.",
                "h:30",
                "n:Release."
            ]
        );
        // Indices are positions in the final sequence.
        for (i, seg) in session.segments().iter().enumerate() {
            assert_eq!(seg.index(), i);
        }
    }

    #[test]
    fn markup_drops_empty_chunks_and_zero_holds() {
        let session = parse_markup("<hold 0 seconds> Breathe. <hold 5 seconds>", &plain());
        assert_eq!(session.len(), 2);
        assert!(session.segments()[0].is_narration());
        assert_eq!(
            session.segments()[1],
            Segment::Hold {
                index: 1,
                seconds: 5.0
            }
        );
    }

    #[test]
    fn narration_counting() {
        let session = parse_markup("A <hold 5 seconds> B", &plain());
        assert_eq!(session.narration_count(), 2);
        assert_eq!(session.len(), 3);
    }
}
