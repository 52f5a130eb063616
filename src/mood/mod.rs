// SPDX-License-Identifier: MIT
//! Mood scale — the fixed 5-category ordinal scale used by mood check-ins
//! and the analytics trend/correlation math.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five mood categories. Ordinal: `Great` = 5 down to
/// `Terrible` = 1; the numeric score is what trend averages and the
/// mood↔habit correlation operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Great,
    Good,
    Okay,
    Bad,
    Terrible,
}

impl Mood {
    /// Ordinal score 1–5 used for averaging.
    pub fn score(self) -> u8 {
        match self {
            Mood::Great => 5,
            Mood::Good => 4,
            Mood::Okay => 3,
            Mood::Bad => 2,
            Mood::Terrible => 1,
        }
    }

    /// Emoji shown on the mood calendar.
    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Great => "😊",
            Mood::Good => "🙂",
            Mood::Okay => "😐",
            Mood::Bad => "😟",
            Mood::Terrible => "😢",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Great => "great",
            Mood::Good => "good",
            Mood::Okay => "okay",
            Mood::Bad => "bad",
            Mood::Terrible => "terrible",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "great" => Ok(Mood::Great),
            "good" => Ok(Mood::Good),
            "okay" => Ok(Mood::Okay),
            "bad" => Ok(Mood::Bad),
            "terrible" => Ok(Mood::Terrible),
            other => Err(format!("unknown mood '{other}'")),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
