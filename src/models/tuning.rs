//! Cyclic tunings and the named tuning presets
//!
//! A tuning lists the pitch classes of one octave's worth of strings. String
//! layout repeats the list an octave higher each time it wraps.

use crate::error::LayoutError;
use crate::models::pitch::{PitchClass, CENTS_EPSILON, OCTAVE_CENTS};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered, non-empty cyclic sequence of pitch classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PitchClass>", into = "Vec<PitchClass>")]
pub struct Tuning {
    pattern: Vec<PitchClass>,
}

impl Tuning {
    pub fn new(pattern: Vec<PitchClass>) -> Result<Self, LayoutError> {
        if pattern.is_empty() {
            return Err(LayoutError::EmptyTuning);
        }
        Ok(Self { pattern })
    }

    /// Parse each entry of a list of pitch-class spellings
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, LayoutError> {
        let pattern = names
            .iter()
            .map(|n| n.as_ref().parse::<PitchClass>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(pattern)
    }

    pub fn pattern(&self) -> &[PitchClass] {
        &self.pattern
    }

    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Whether the pattern rises strictly within one octave
    ///
    /// Only monotonic patterns produce strings whose positions rise with the
    /// string index.
    pub fn is_monotonic(&self) -> bool {
        let cents: Vec<f64> = self.pattern.iter().map(|c| c.cents()).collect();
        let rising = cents.windows(2).all(|w| w[1] - w[0] > CENTS_EPSILON);
        let first = cents[0];
        let last = cents[cents.len() - 1];
        rising && last - first < OCTAVE_CENTS - CENTS_EPSILON
    }

    /// Whether a pitch class (any octave, any spelling) is an open string
    pub fn contains_class(&self, class: &PitchClass) -> bool {
        self.pattern.iter().any(|c| c.is_enharmonic(class))
    }

    /// Dash-separated key, e.g. `C-D-E-G-A`
    pub fn key(&self) -> String {
        self.pattern
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for Tuning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for Tuning {
    type Err = LayoutError;

    /// Parse a key such as `C-D-E-G-A`, `C, D, E, G, A` or `C D E G A`
    ///
    /// A dash that opens a microtone offset (`E(-31)`) is not a separator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut names = Vec::new();
        let mut current = String::new();
        let mut depth = 0usize;

        for c in s.chars() {
            match c {
                '(' => {
                    depth += 1;
                    current.push(c);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                '-' | ',' if depth == 0 => names.push(std::mem::take(&mut current)),
                c if c.is_whitespace() && depth == 0 => names.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        names.push(current);

        let names: Vec<&str> = names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()).collect();
        Self::from_names(&names)
    }
}

impl TryFrom<Vec<PitchClass>> for Tuning {
    type Error = LayoutError;

    fn try_from(value: Vec<PitchClass>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tuning> for Vec<PitchClass> {
    fn from(value: Tuning) -> Self {
        value.pattern
    }
}

/// Tuning as supplied by a caller: a key string or a list of pitch classes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TuningSpec {
    Key(String),
    Pattern(Vec<PitchClass>),
}

impl TuningSpec {
    pub fn into_tuning(self) -> Result<Tuning, LayoutError> {
        match self {
            TuningSpec::Key(key) => key.parse(),
            TuningSpec::Pattern(pattern) => Tuning::new(pattern),
        }
    }
}

/// A named tuning offered to users
#[derive(Debug, Clone, Serialize)]
pub struct TuningPreset {
    pub key: &'static str,
    pub name: &'static str,
    pub family: TuningFamily,
}

impl TuningPreset {
    pub fn tuning(&self) -> Result<Tuning, LayoutError> {
        self.key.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TuningFamily {
    Vietnamese,
    Pentatonic,
    Hexatonic,
    Heptatonic,
}

/// All named tunings, Vietnamese dan tranh tunings first
pub static TUNING_PRESETS: Lazy<Vec<TuningPreset>> = Lazy::new(|| {
    use TuningFamily::*;
    let preset = |key, name, family| TuningPreset { key, name, family };
    vec![
        preset("C-D-E-G-A", "Dan Tranh Standard", Vietnamese),
        preset("C-D-F-G-A", "Dan Tranh Southern", Vietnamese),
        preset("C-D-E-G-B", "Dan Tranh Central", Vietnamese),
        preset("C-Eb-F-G-Bb", "Ru Con", Vietnamese),
        preset("D-F-G-A-C", "Nam Ai", Vietnamese),
        preset("D-E-F#-A-B", "Nam Xuan", Vietnamese),
        preset("C-Eb-F-G-Ab", "Oan", Vietnamese),
        preset("A-C-D-E-G", "Minor Pentatonic", Pentatonic),
        preset("C-D-F-G-Bb", "Egyptian", Pentatonic),
        preset("D-E-G-A-C", "Chinese Shang", Pentatonic),
        preset("E-G-A-C-D", "Chinese Jue", Pentatonic),
        preset("G-A-C-D-E", "Chinese Zhi", Pentatonic),
        preset("C-D-Eb-G-Ab", "Hirajoshi", Pentatonic),
        preset("C-Db-F-Gb-Bb", "Iwato", Pentatonic),
        preset("C-Db-F-G-Bb", "In-sen", Pentatonic),
        preset("C-D-Eb-G-A", "Kumoi", Pentatonic),
        preset("D-E-G-A-B", "Modern", Pentatonic),
        preset("C-D-Eb-E-G-A", "Blues Major", Hexatonic),
        preset("C-Eb-F-Gb-G-Bb", "Blues Minor", Hexatonic),
        preset("C-D-E-F#-G#-A#", "Whole Tone", Hexatonic),
        preset("C-D#-E-G-Ab-B", "Augmented", Hexatonic),
        preset("C-D-E-F-G-A-B", "Major", Heptatonic),
        preset("A-B-C-D-E-F-G", "Natural Minor", Heptatonic),
        preset("D-E-F-G-A-B-C", "Dorian", Heptatonic),
        preset("E-F-G-A-B-C-D", "Phrygian", Heptatonic),
        preset("F-G-A-B-C-D-E", "Lydian", Heptatonic),
        preset("G-A-B-C-D-E-F", "Mixolydian", Heptatonic),
        preset("A-B-C-D-E-F-G#", "Harmonic Minor", Heptatonic),
    ]
});

/// Look up a preset by its key
pub fn find_preset(key: &str) -> Option<&'static TuningPreset> {
    TUNING_PRESETS.iter().find(|p| p.key == key)
}

/// The default dan tranh tuning (C-D-E-G-A)
pub fn standard_tuning() -> Tuning {
    use crate::models::pitch::{Accidental, Letter};
    let pattern = [Letter::C, Letter::D, Letter::E, Letter::G, Letter::A]
        .into_iter()
        .map(|letter| PitchClass::new(letter, Accidental::Natural))
        .collect();
    Tuning { pattern }
}
