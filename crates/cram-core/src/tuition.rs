//! # Grades and the Tuition Table
//!
//! The grade vocabulary (`elementary`..`high`) and the configuration
//! collaborator that resolves a grade to its per-cycle tuition amount.
//!
//! The table is data, not code: it is serde-loadable so a deployment can
//! ship its own rates, with the studio's defaults available via
//! [`TuitionTable::default`]. A per-student override always wins over the
//! grade rate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A student's school grade band.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// Elementary school.
    Elementary,
    /// Middle school, first year.
    Middle1,
    /// Middle school, second year.
    Middle2,
    /// Middle school, third year.
    Middle3,
    /// High school.
    High,
}

impl Grade {
    /// The wire code for this grade.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Elementary => "elementary",
            Self::Middle1 => "middle1",
            Self::Middle2 => "middle2",
            Self::Middle3 => "middle3",
            Self::High => "high",
        }
    }

    /// All grades, in ascending school order.
    pub fn all() -> [Grade; 5] {
        [
            Self::Elementary,
            Self::Middle1,
            Self::Middle2,
            Self::Middle3,
            Self::High,
        ]
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Grade {
    type Err = UnknownGrade;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "elementary" => Ok(Self::Elementary),
            "middle1" => Ok(Self::Middle1),
            "middle2" => Ok(Self::Middle2),
            "middle3" => Ok(Self::Middle3),
            "high" => Ok(Self::High),
            other => Err(UnknownGrade(other.to_string())),
        }
    }
}

/// A grade code outside the known vocabulary.
#[derive(Error, Debug)]
#[error("unknown grade code {0:?}")]
pub struct UnknownGrade(pub String);

// ── Tuition table ──────────────────────────────────────────────────────

/// Per-grade rate entry: a display label and the tuition for one 8-session
/// cycle, in won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRate {
    /// Human-facing label used in notices (e.g. "Middle 2").
    pub label: String,
    /// Tuition for one full cycle.
    pub tuition: i64,
}

/// The studio's tuition configuration, keyed by grade.
///
/// A grade missing from the table resolves to an amount of zero rather
/// than an error; an incomplete table is a configuration gap the
/// administrator notices on the invoice, not a reason to block cycle
/// completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuitionTable {
    /// Rate entries by grade.
    pub grades: BTreeMap<Grade, GradeRate>,
}

impl TuitionTable {
    /// The cycle tuition for a grade, or `None` if the grade is not
    /// configured.
    pub fn amount_for(&self, grade: Grade) -> Option<i64> {
        self.grades.get(&grade).map(|rate| rate.tuition)
    }

    /// The display label for a grade, falling back to the wire code.
    pub fn label_for(&self, grade: Grade) -> &str {
        self.grades
            .get(&grade)
            .map(|rate| rate.label.as_str())
            .unwrap_or_else(|| grade.code())
    }

    /// Resolve the effective tuition: the per-student override if present,
    /// otherwise the grade rate, otherwise zero.
    pub fn effective(&self, tuition_override: Option<i64>, grade: Grade) -> i64 {
        tuition_override
            .or_else(|| self.amount_for(grade))
            .unwrap_or(0)
    }
}

impl Default for TuitionTable {
    fn default() -> Self {
        let mut grades = BTreeMap::new();
        grades.insert(
            Grade::Elementary,
            GradeRate {
                label: "Elementary".to_string(),
                tuition: 180_000,
            },
        );
        grades.insert(
            Grade::Middle1,
            GradeRate {
                label: "Middle 1".to_string(),
                tuition: 200_000,
            },
        );
        grades.insert(
            Grade::Middle2,
            GradeRate {
                label: "Middle 2".to_string(),
                tuition: 220_000,
            },
        );
        grades.insert(
            Grade::Middle3,
            GradeRate {
                label: "Middle 3".to_string(),
                tuition: 240_000,
            },
        );
        grades.insert(
            Grade::High,
            GradeRate {
                label: "High".to_string(),
                tuition: 280_000,
            },
        );
        Self { grades }
    }
}
