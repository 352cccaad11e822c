//! Dart and Turn primitives: the atomic throw record and the 3-dart buffer
//! the capture layer fills before confirming.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::engine::error::DartsError;

pub const MAX_DARTS_PER_TURN: usize = 3;
pub const BULL: u8 = 25;

/// Ring a dart landed in. A miss carries no multiplier at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplier {
    Single = 1,
    Double = 2,
    Triple = 3,
}

impl Multiplier {
    pub const ALL: [Multiplier; 3] = [Multiplier::Single, Multiplier::Double, Multiplier::Triple];

    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Multiplier::Single),
            2 => Some(Multiplier::Double),
            3 => Some(Multiplier::Triple),
            _ => None,
        }
    }

    fn prefix(self) -> char {
        match self {
            Multiplier::Single => 'S',
            Multiplier::Double => 'D',
            Multiplier::Triple => 'T',
        }
    }
}

/// A single thrown dart.
///
/// `Hit` fields are public so engines can pattern-match on them, which also
/// means an out-of-range segment can be built by hand or arrive through
/// deserialization. Every engine runs [`Dart::validate`] before applying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dart {
    Miss,
    Hit { segment: u8, multiplier: Multiplier },
}

impl Dart {
    pub const fn single(segment: u8) -> Self {
        Dart::Hit { segment, multiplier: Multiplier::Single }
    }

    pub const fn double(segment: u8) -> Self {
        Dart::Hit { segment, multiplier: Multiplier::Double }
    }

    pub const fn triple(segment: u8) -> Self {
        Dart::Hit { segment, multiplier: Multiplier::Triple }
    }

    /// Build a dart from the raw `(segment, multiplier)` pair used by capture
    /// devices and remote clients. `(0, 0)` is a deliberate miss.
    pub fn from_raw(segment: u8, multiplier: u8) -> Result<Self, DartsError> {
        match (segment, multiplier) {
            (0, 0) => Ok(Dart::Miss),
            (0, m) => Err(DartsError::InvalidDart(format!(
                "segment 0 is a miss and cannot carry multiplier {m}"
            ))),
            (s, 0) => Err(DartsError::InvalidDart(format!(
                "multiplier 0 is only valid for a miss, got segment {s}"
            ))),
            (s, m) => {
                let multiplier = Multiplier::from_value(m).ok_or_else(|| {
                    DartsError::InvalidDart(format!("multiplier {m} is out of range 0..=3"))
                })?;
                let dart = Dart::Hit { segment: s, multiplier };
                dart.validate()?;
                Ok(dart)
            }
        }
    }

    /// Reject impossible combinations: unknown segments and the triple bull.
    pub fn validate(&self) -> Result<(), DartsError> {
        match *self {
            Dart::Miss => Ok(()),
            Dart::Hit { segment, multiplier } => {
                if segment == BULL {
                    if multiplier == Multiplier::Triple {
                        return Err(DartsError::InvalidDart("the bull has no triple ring".into()));
                    }
                    Ok(())
                } else if (1..=20).contains(&segment) {
                    Ok(())
                } else {
                    Err(DartsError::InvalidDart(format!("segment {segment} is not on the board")))
                }
            }
        }
    }

    /// Segment number, 0 for a miss.
    pub fn segment(&self) -> u8 {
        match self {
            Dart::Miss => 0,
            Dart::Hit { segment, .. } => *segment,
        }
    }

    /// Multiplier value, 0 for a miss.
    pub fn multiplier_value(&self) -> u8 {
        match self {
            Dart::Miss => 0,
            Dart::Hit { multiplier, .. } => multiplier.value(),
        }
    }

    pub fn score(&self) -> u32 {
        self.segment() as u32 * self.multiplier_value() as u32
    }
}

impl fmt::Display for Dart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Dart::Miss => write!(f, "M"),
            Dart::Hit { segment: BULL, multiplier } => write!(f, "{}B", multiplier.prefix()),
            Dart::Hit { segment, multiplier } => write!(f, "{}{}", multiplier.prefix(), segment),
        }
    }
}

// --- Board catalog ---

/// Every legal dart: the miss, then singles/doubles/triples of 1..=20, then
/// single and double bull.
pub static DART_CATALOG: Lazy<Vec<Dart>> = Lazy::new(|| {
    let mut darts = vec![Dart::Miss];
    for multiplier in Multiplier::ALL {
        for segment in 1..=20 {
            darts.push(Dart::Hit { segment, multiplier });
        }
    }
    darts.push(Dart::single(BULL));
    darts.push(Dart::double(BULL));
    darts
});

/// Upper-case notation -> dart, including aliases (`S25`, `BULL`, bare numbers).
static NOTATION_LOOKUP: Lazy<HashMap<String, Dart>> = Lazy::new(|| {
    let mut lookup = HashMap::new();
    for dart in DART_CATALOG.iter() {
        lookup.insert(dart.to_string(), *dart);
        if let Dart::Hit { segment, multiplier } = *dart {
            lookup.insert(format!("{}{}", multiplier.prefix(), segment), *dart);
            if multiplier == Multiplier::Single {
                lookup.insert(segment.to_string(), *dart);
            }
        }
    }
    lookup.insert("MISS".into(), Dart::Miss);
    lookup.insert("0".into(), Dart::Miss);
    lookup.insert("BULL".into(), Dart::single(BULL));
    lookup.insert("DBULL".into(), Dart::double(BULL));
    lookup
});

impl FromStr for Dart {
    type Err = DartsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_uppercase();
        NOTATION_LOOKUP
            .get(&key)
            .copied()
            .ok_or_else(|| DartsError::InvalidDart(format!("unrecognized dart notation `{s}`")))
    }
}

// --- Turn buffer ---

/// Darts thrown by one player before confirmation. Only the most recent dart
/// can be taken back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Turn {
    darts: Vec<Dart>,
}

impl Turn {
    pub fn new() -> Self {
        Self { darts: Vec::with_capacity(MAX_DARTS_PER_TURN) }
    }

    /// Build a turn from a full list of darts, validating each one.
    pub fn from_darts(darts: &[Dart]) -> Result<Self, DartsError> {
        let mut turn = Turn::new();
        for dart in darts {
            turn.add(*dart)?;
        }
        Ok(turn)
    }

    pub fn add(&mut self, dart: Dart) -> Result<(), DartsError> {
        if self.is_full() {
            return Err(DartsError::TurnFull);
        }
        dart.validate()?;
        self.darts.push(dart);
        Ok(())
    }

    /// Undo-last-dart. Returns `None` on an empty turn.
    pub fn pop(&mut self) -> Option<Dart> {
        self.darts.pop()
    }

    pub fn darts(&self) -> &[Dart] {
        &self.darts
    }

    pub fn len(&self) -> usize {
        self.darts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.darts.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.darts.len() >= MAX_DARTS_PER_TURN
    }

    pub fn score(&self) -> u32 {
        self.darts.iter().map(Dart::score).sum()
    }

    pub fn confirm(self) -> Result<ConfirmedTurn, DartsError> {
        if self.darts.is_empty() {
            return Err(DartsError::EmptyTurn);
        }
        Ok(ConfirmedTurn { darts: self.darts })
    }
}

/// A turn that has been accepted for scoring. Holds 1..=3 valid darts and
/// cannot be edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Dart>", into = "Vec<Dart>")]
pub struct ConfirmedTurn {
    darts: Vec<Dart>,
}

impl ConfirmedTurn {
    pub fn darts(&self) -> &[Dart] {
        &self.darts
    }

    pub fn len(&self) -> usize {
        self.darts.len()
    }

    pub fn score(&self) -> u32 {
        self.darts.iter().map(Dart::score).sum()
    }
}

impl TryFrom<Vec<Dart>> for ConfirmedTurn {
    type Error = DartsError;

    fn try_from(darts: Vec<Dart>) -> Result<Self, Self::Error> {
        Turn::from_darts(&darts)?.confirm()
    }
}

impl From<ConfirmedTurn> for Vec<Dart> {
    fn from(turn: ConfirmedTurn) -> Self {
        turn.darts
    }
}
