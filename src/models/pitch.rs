//! Pitch spellings and canonical cents
//!
//! A pitch is spelled as a letter, an optional accidental, an octave number
//! and an optional microtone offset in parentheses:
//!
//! - `"C4"`, `"F#3"`, `"Bb4"`, `"Ebb5"`, `"Fx4"` (double sharp)
//! - `"Dhf4"` (half-flat, a quarter tone below D)
//! - `"E4(-31)"` (31 cents flat)
//!
//! Pitch classes (tuning entries) use the same spelling without the octave.
//!
//! Every spelling maps onto a single cents value. Enharmonic equivalence is
//! decided by comparing cents, so `D#4`, `Eb4` and `Fbb4` are the same pitch.

use crate::error::LayoutError;
use crate::utils::pitch_utils::{accidental_symbol, microtone_suffix, parse_accidental, split_microtone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cents per octave
pub const OCTAVE_CENTS: f64 = 1200.0;

/// Cents per equal-tempered semitone
pub const SEMITONE_CENTS: f64 = 100.0;

/// Tolerance used when comparing cents values
pub const CENTS_EPSILON: f64 = 1e-6;

/// Natural note letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub const ALL: [Letter; 7] = [Letter::C, Letter::D, Letter::E, Letter::F, Letter::G, Letter::A, Letter::B];

    /// Parse a letter, accepting either case
    pub fn from_char(c: char) -> Option<Letter> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }

    /// Distance above C in cents (C=0 … B=1100)
    pub fn cents(self) -> f64 {
        match self {
            Letter::C => 0.0,
            Letter::D => 200.0,
            Letter::E => 400.0,
            Letter::F => 500.0,
            Letter::G => 700.0,
            Letter::A => 900.0,
            Letter::B => 1100.0,
        }
    }
}

/// Accidental applied to a letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accidental {
    Natural,
    Sharp,
    DoubleSharp,
    Flat,
    DoubleFlat,
    /// Quarter-tone flat
    HalfFlat,
}

impl Accidental {
    /// Preference order when respelling
    pub const ALL: [Accidental; 6] = [
        Accidental::Natural,
        Accidental::Sharp,
        Accidental::Flat,
        Accidental::DoubleSharp,
        Accidental::DoubleFlat,
        Accidental::HalfFlat,
    ];

    /// Offset in cents relative to the natural letter
    pub fn cents_offset(self) -> f64 {
        match self {
            Accidental::Natural => 0.0,
            Accidental::Sharp => 100.0,
            Accidental::DoubleSharp => 200.0,
            Accidental::Flat => -100.0,
            Accidental::DoubleFlat => -200.0,
            Accidental::HalfFlat => -50.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        accidental_symbol(self)
    }
}

/// A pitch without octave: letter, accidental and microtone offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PitchClass {
    pub letter: Letter,
    pub accidental: Accidental,
    /// Explicit microtone offset in cents
    pub microtone: f64,
}

impl PitchClass {
    pub fn new(letter: Letter, accidental: Accidental) -> Self {
        Self { letter, accidental, microtone: 0.0 }
    }

    pub fn with_microtone(mut self, cents: f64) -> Self {
        self.microtone = cents;
        self
    }

    /// Cents above the C of the same octave number
    ///
    /// May fall outside `0..1200` for spellings such as `Cb` (-100) or `B#` (1200).
    pub fn cents(&self) -> f64 {
        self.letter.cents() + self.accidental.cents_offset() + self.microtone
    }

    /// Cents folded into a single octave (`0.0..1200.0`)
    pub fn chroma_cents(&self) -> f64 {
        self.cents().rem_euclid(OCTAVE_CENTS)
    }

    /// Whether two spellings name the same sounding pitch class
    pub fn is_enharmonic(&self, other: &PitchClass) -> bool {
        let diff = (self.chroma_cents() - other.chroma_cents()).abs();
        diff < CENTS_EPSILON || (OCTAVE_CENTS - diff) < CENTS_EPSILON
    }

    /// Enharmonic spelling whose `cents()` lies in `0..1200`
    ///
    /// `Cb` becomes `B` and `B#` becomes `C`. Spellings already inside the
    /// octave are returned unchanged.
    pub fn within_octave(self) -> PitchClass {
        if (0.0..OCTAVE_CENTS).contains(&self.cents()) {
            return self;
        }
        Letter::ALL
            .into_iter()
            .flat_map(|letter| {
                Accidental::ALL
                    .into_iter()
                    .map(move |accidental| PitchClass::new(letter, accidental).with_microtone(self.microtone))
            })
            .find(|candidate| (0.0..OCTAVE_CENTS).contains(&candidate.cents()) && candidate.is_enharmonic(&self))
            .unwrap_or(self)
    }

    /// Place this class in an octave
    pub fn at_octave(self, octave: i32) -> Pitch {
        Pitch { class: self, octave }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.letter.as_char(),
            self.accidental.symbol(),
            microtone_suffix(self.microtone)
        )
    }
}

impl FromStr for PitchClass {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (spelling, microtone) = split_microtone(s).map_err(LayoutError::InvalidPitch)?;
        let (letter, rest) = split_letter(spelling)?;
        let accidental = parse_accidental(rest)
            .ok_or_else(|| LayoutError::InvalidPitch(format!("Unknown accidental in '{}'", s)))?;

        Ok(PitchClass { letter, accidental, microtone })
    }
}

impl TryFrom<String> for PitchClass {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PitchClass> for String {
    fn from(value: PitchClass) -> Self {
        value.to_string()
    }
}

/// A pitch class placed in a specific octave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch {
    pub class: PitchClass,
    pub octave: i32,
}

impl Pitch {
    pub fn new(class: PitchClass, octave: i32) -> Self {
        Self { class, octave }
    }

    /// Cents above C of `base_octave`
    pub fn cents_from(&self, base_octave: i32) -> f64 {
        self.class.cents() + (self.octave - base_octave) as f64 * OCTAVE_CENTS
    }

    /// Cents above C0
    pub fn absolute_cents(&self) -> f64 {
        self.cents_from(0)
    }

    /// Signed semitone distance from `self` up to `other`
    pub fn semitones_to(&self, other: &Pitch) -> f64 {
        (other.absolute_cents() - self.absolute_cents()) / SEMITONE_CENTS
    }

    /// Whether two spellings sound at the same pitch
    pub fn is_enharmonic(&self, other: &Pitch) -> bool {
        (self.absolute_cents() - other.absolute_cents()).abs() < CENTS_EPSILON
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.class.letter.as_char(),
            self.class.accidental.symbol(),
            self.octave,
            microtone_suffix(self.class.microtone)
        )
    }
}

impl FromStr for Pitch {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (spelling, microtone) = split_microtone(s).map_err(LayoutError::InvalidPitch)?;
        let (letter, rest) = split_letter(spelling)?;

        // Octave starts at the first digit, or at a minus sign directly before one
        let octave_start = rest
            .char_indices()
            .find(|&(i, c)| {
                c.is_ascii_digit()
                    || (c == '-' && rest[i + 1..].starts_with(|n: char| n.is_ascii_digit()))
            })
            .map(|(i, _)| i)
            .ok_or_else(|| LayoutError::InvalidPitch(format!("Missing octave in '{}'", s)))?;

        let accidental = parse_accidental(&rest[..octave_start])
            .ok_or_else(|| LayoutError::InvalidPitch(format!("Unknown accidental in '{}'", s)))?;
        let octave: i32 = rest[octave_start..]
            .parse()
            .map_err(|_| LayoutError::InvalidPitch(format!("Invalid octave in '{}'", s)))?;

        Ok(Pitch {
            class: PitchClass { letter, accidental, microtone },
            octave,
        })
    }
}

impl TryFrom<String> for Pitch {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pitch> for String {
    fn from(value: Pitch) -> Self {
        value.to_string()
    }
}

fn split_letter(spelling: &str) -> Result<(Letter, &str), LayoutError> {
    let mut chars = spelling.chars();
    let first = chars
        .next()
        .ok_or_else(|| LayoutError::InvalidPitch("Empty pitch spelling".to_string()))?;
    let letter = Letter::from_char(first)
        .ok_or_else(|| LayoutError::InvalidPitch(format!("Unknown pitch letter in '{}'", spelling)))?;

    Ok((letter, chars.as_str()))
}
