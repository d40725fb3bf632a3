use crate::domain::movement::Movement;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categorical field a collection can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Company,
    Territory,
    Category,
    Kind,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Company,
        Dimension::Territory,
        Dimension::Category,
        Dimension::Kind,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Company => "company",
            Dimension::Territory => "territory",
            Dimension::Category => "category",
            Dimension::Kind => "kind",
        }
    }

    /// The grouping key of `m` on this dimension.
    pub fn key<'a>(self, m: &'a Movement) -> &'a str {
        match self {
            Dimension::Company => &m.company,
            Dimension::Territory => &m.territory,
            Dimension::Category => &m.category,
            Dimension::Kind => m.kind.as_str(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Dimension::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::invalid_argument(format!("unknown dimension `{s}`")))
    }
}

/// Numeric field aggregates are computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Relevance,
    Engagement,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Relevance, Metric::Engagement];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Relevance => "relevance",
            Metric::Engagement => "engagement",
        }
    }

    pub fn value(self, m: &Movement) -> f64 {
        match self {
            Metric::Relevance => f64::from(m.relevance),
            Metric::Engagement => f64::from(m.engagement),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::invalid_argument(format!("unknown metric `{s}`")))
    }
}
