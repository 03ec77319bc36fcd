//! Criterion scores and the optional comment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TypesError;

/// The three judged criteria, in the order they are scored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Presentation,
    Flavor,
    Experience,
}

impl Criterion {
    pub const ALL: [Criterion; 3] = [
        Criterion::Presentation,
        Criterion::Flavor,
        Criterion::Experience,
    ];
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Criterion::Presentation => "presentation",
            Criterion::Flavor => "flavor",
            Criterion::Experience => "experience",
        };
        f.write_str(name)
    }
}

/// A score in `[1.0, 5.0]` with 0.1 granularity, stored in tenths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CriterionScore(u8);

impl CriterionScore {
    pub const MIN: Self = Self(10);
    pub const MAX: Self = Self(50);
    pub const DEFAULT: Self = Self(30);

    /// Round `value` to the nearest tenth. Values outside `[1.0, 5.0]` are
    /// rejected before rounding.
    pub fn from_f64(value: f64) -> Result<Self, TypesError> {
        if !(1.0..=5.0).contains(&value) {
            return Err(TypesError::ScoreOutOfRange(value));
        }
        Ok(Self((value * 10.0).round() as u8))
    }

    pub fn tenths(self) -> u8 {
        self.0
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    /// Move by `steps` tenths, clamped to the valid range.
    pub fn step(self, steps: i32) -> Self {
        let moved = (i32::from(self.0) + steps)
            .clamp(i32::from(Self::MIN.0), i32::from(Self::MAX.0));
        Self(moved as u8)
    }
}

impl Default for CriterionScore {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for CriterionScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

impl Serialize for CriterionScore {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

impl<'de> Deserialize<'de> for CriterionScore {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::from_f64(value).map_err(serde::de::Error::custom)
    }
}

/// Free-text remark, at most `max_chars` characters. Over-long input is
/// rejected, never truncated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Comment(String);

impl Comment {
    /// Blank input yields `None` (the comment is optional).
    pub fn parse(raw: &str, max_chars: usize) -> Result<Option<Self>, TypesError> {
        let len = raw.chars().count();
        if len > max_chars {
            return Err(TypesError::CommentTooLong {
                len,
                max: max_chars,
            });
        }
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Self(raw.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The three criterion scores plus the optional comment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSheet {
    pub presentation: CriterionScore,
    pub flavor: CriterionScore,
    pub experience: CriterionScore,
    pub comment: Option<Comment>,
}

impl ScoreSheet {
    pub fn get(&self, criterion: Criterion) -> CriterionScore {
        match criterion {
            Criterion::Presentation => self.presentation,
            Criterion::Flavor => self.flavor,
            Criterion::Experience => self.experience,
        }
    }

    pub fn set(&mut self, criterion: Criterion, score: CriterionScore) {
        match criterion {
            Criterion::Presentation => self.presentation = score,
            Criterion::Flavor => self.flavor = score,
            Criterion::Experience => self.experience = score,
        }
    }

    /// `(presentation + flavor + experience) / 3`.
    pub fn mean(&self) -> f64 {
        let total = u32::from(self.presentation.tenths())
            + u32::from(self.flavor.tenths())
            + u32::from(self.experience.tenths());
        f64::from(total) / 30.0
    }
}
