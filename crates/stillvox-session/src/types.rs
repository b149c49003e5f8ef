//! Core session types

use serde::{Deserialize, Serialize};

/// One unit of the session: spoken narration or a timed silent hold.
///
/// `index` is the segment's 0-based position in the session order. It is
/// assigned once by the parser and is the sole ordering key for playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    /// Spoken content, synthesized ahead of time and played in order.
    Narration {
        index: usize,
        text: String,
        voice: String,
    },
    /// Silent wait of the given length.
    Hold { index: usize, seconds: f64 },
}

impl Segment {
    /// Position of this segment in the session order.
    pub fn index(&self) -> usize {
        match self {
            Segment::Narration { index, .. } => *index,
            Segment::Hold { index, .. } => *index,
        }
    }

    pub fn is_narration(&self) -> bool {
        matches!(self, Segment::Narration { .. })
    }
}

/// An ordered sequence of segments, created once by parsing and immutable
/// thereafter. Insertion order is the narration/performance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    segments: Vec<Segment>,
}

impl Session {
    pub(crate) fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Narration segments in session order.
    pub fn narrations(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.is_narration())
    }

    pub fn narration_count(&self) -> usize {
        self.narrations().count()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
