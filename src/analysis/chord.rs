//! Triad templates and the thresholded chord decision

use std::fmt;
use std::str::FromStr;

use super::chroma::PITCH_CLASSES;

/// Label reported when no triad clears the detection threshold
pub const NO_CHORD_LABEL: &str = "N/A";

/// Number of scored templates (2 qualities × 12 roots)
pub const TRIAD_COUNT: usize = 24;

/// Pitch class names, index 0 = C
pub const NOTE_NAMES: [&str; PITCH_CLASSES] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Triad quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChordQuality {
    Major,
    Minor,
}

impl ChordQuality {
    /// Qualities in scan order
    pub const ALL: [ChordQuality; 2] = [ChordQuality::Major, ChordQuality::Minor];

    /// Scale degrees (semitones above the root) in the template
    pub fn degrees(self) -> [usize; 3] {
        match self {
            ChordQuality::Major => [0, 4, 7],
            ChordQuality::Minor => [0, 3, 7],
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "Maj",
            ChordQuality::Minor => "Min",
        }
    }

    fn index(self) -> usize {
        match self {
            ChordQuality::Major => 0,
            ChordQuality::Minor => 1,
        }
    }
}

/// A major or minor triad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    /// Pitch class of the root, 0..12
    pub root: usize,
    pub quality: ChordQuality,
}

impl Chord {
    /// # Panics
    /// If `root` is not a pitch class (>= 12)
    pub fn new(root: usize, quality: ChordQuality) -> Self {
        assert!(root < PITCH_CLASSES, "root must be a pitch class (0..12)");
        Self { root, quality }
    }

    /// Position in the score table: quality outer, root inner
    pub fn index(&self) -> usize {
        self.quality.index() * PITCH_CLASSES + self.root
    }

    fn from_index(index: usize) -> Self {
        let quality = ChordQuality::ALL[index / PITCH_CLASSES];
        Self::new(index % PITCH_CLASSES, quality)
    }

    pub fn root_name(&self) -> &'static str {
        NOTE_NAMES[self.root]
    }

    /// Pitch classes of the three chord tones
    pub fn pitch_classes(&self) -> [usize; 3] {
        self.quality
            .degrees()
            .map(|degree| (self.root + degree) % PITCH_CLASSES)
    }

    /// Display label, e.g. "C Maj" or "F# Min"
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root_name(), self.quality.suffix())
    }
}

/// Error returned when a chord label cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChordError {
    input: String,
}

impl fmt::Display for ParseChordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid chord '{}'. Expected '<note> <Maj|Min>' such as 'C Maj' or 'A Min'",
            self.input
        )
    }
}

impl std::error::Error for ParseChordError {}

/// Parse a note name (C, C#, ...). Flats are accepted and mapped to sharps.
pub fn parse_note(name: &str) -> Option<usize> {
    let name = name.trim();
    if let Some(index) = NOTE_NAMES.iter().position(|n| n.eq_ignore_ascii_case(name)) {
        return Some(index);
    }
    let mut chars = name.chars();
    let letter = chars.next()?;
    if chars.as_str() != "b" {
        return None;
    }
    let natural = NOTE_NAMES
        .iter()
        .position(|n| n.len() == 1 && n.eq_ignore_ascii_case(&letter.to_string()))?;
    Some((natural + PITCH_CLASSES - 1) % PITCH_CLASSES)
}

impl FromStr for ChordQuality {
    type Err = ParseChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "maj" | "major" => Ok(ChordQuality::Major),
            "min" | "minor" => Ok(ChordQuality::Minor),
            _ => Err(ParseChordError {
                input: s.to_string(),
            }),
        }
    }
}

impl FromStr for Chord {
    type Err = ParseChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseChordError {
            input: s.to_string(),
        };
        let mut parts = s.split_whitespace();
        let root = parts.next().and_then(parse_note).ok_or_else(err)?;
        let quality = parts
            .next()
            .ok_or_else(err)?
            .parse::<ChordQuality>()
            .map_err(|_| err())?;
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Chord::new(root, quality))
    }
}

/// Mean chroma over each triad's three tones, indexed by [`Chord::index`]
pub fn score_triads(chroma: &[f32; PITCH_CLASSES]) -> [f32; TRIAD_COUNT] {
    let mut scores = [0.0f32; TRIAD_COUNT];
    for (index, score) in scores.iter_mut().enumerate() {
        let chord = Chord::from_index(index);
        let tones = chord.pitch_classes();
        *score = tones.iter().map(|&pc| chroma[pc]).sum::<f32>() / tones.len() as f32;
    }
    scores
}

/// Divide every score by `max_power`.
///
/// A zero or non-finite `max_power` (silence) zeroes all scores instead of
/// dividing, so a silent window reports no chord.
pub fn normalize_scores(scores: &mut [f32; TRIAD_COUNT], max_power: f32) {
    if max_power > 0.0 && max_power.is_finite() {
        for score in scores.iter_mut() {
            *score /= max_power;
        }
    } else {
        scores.fill(0.0);
    }
}

/// Highest-scoring triad. Ties keep the first in scan order.
pub fn best_triad(scores: &[f32; TRIAD_COUNT]) -> (Chord, f32) {
    let mut best = 0;
    for (index, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = index;
        }
    }
    (Chord::from_index(best), scores[best])
}

/// Outcome of thresholding the best triad
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordDecision {
    /// The detected chord, `None` when nothing cleared the threshold
    pub chord: Option<Chord>,
    /// Normalized score of the best triad, reported even below threshold
    pub confidence: f32,
}

impl ChordDecision {
    pub fn label(&self) -> String {
        match self.chord {
            Some(chord) => chord.label(),
            None => NO_CHORD_LABEL.to_string(),
        }
    }
}

/// Pick the best triad and keep it only if its score exceeds `threshold`
pub fn decide(scores: &[f32; TRIAD_COUNT], threshold: f32) -> ChordDecision {
    let (chord, confidence) = best_triad(scores);
    ChordDecision {
        chord: (confidence > threshold).then_some(chord),
        confidence,
    }
}
