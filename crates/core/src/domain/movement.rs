use crate::error::{CoreError, Result};
use crate::time::window::DateWindow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const RELEVANCE_MIN: u8 = 1;
pub const RELEVANCE_MAX: u8 = 5;

const DEFAULT_COMPANIES: &[&str] = &["Natura", "Avon", "Eudora", "Jequiti", "L'Occitane"];
const DEFAULT_TERRITORIES: &[&str] = &[
    "Digital",
    "Innovation",
    "Sustainability",
    "Wellness",
    "Experience",
];
const DEFAULT_CATEGORIES: &[&str] = &["Fragrance", "Skincare", "Makeup", "Haircare", "Body Care"];
const DEFAULT_DESCRIPTIONS: &[&str] = &[
    "Product launch",
    "Price promotion",
    "Influencer campaign",
    "Store opening",
    "Packaging redesign",
    "Strategic partnership",
    "Loyalty program update",
    "Limited edition drop",
];

/// Severity class of a movement. Categorical, not ordered by importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Kind {
    Routine,
    Major,
    Covert,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::Routine, Kind::Major, Kind::Covert];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Routine => "Routine",
            Kind::Major => "Major",
            Kind::Covert => "Covert",
        }
    }

    /// Label used by the dashboard this data model grew out of.
    pub fn source_label(self) -> &'static str {
        match self {
            Kind::Routine => "BAU",
            Kind::Major => "Bomba",
            Kind::Covert => "Ninja",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Kind::ALL
            .into_iter()
            .find(|k| {
                k.as_str().eq_ignore_ascii_case(s) || k.source_label().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| CoreError::invalid_argument(format!("unknown movement kind `{s}`")))
    }
}

/// One observed competitive action. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub date: NaiveDate,
    pub company: String,
    pub territory: String,
    pub category: String,
    pub relevance: u8,
    pub kind: Kind,
    pub engagement: u32,
    pub description: String,
}

/// The closed value sets movements are checked against.
///
/// These are configuration, not code: the UI and the core share one `Domains` value and
/// swapping a table needs no logic change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domains {
    pub companies: Vec<String>,
    pub territories: Vec<String>,
    pub categories: Vec<String>,
    pub descriptions: Vec<String>,
    /// Dates a movement may carry.
    pub window: DateWindow,
}

impl Default for Domains {
    fn default() -> Self {
        Self {
            companies: owned(DEFAULT_COMPANIES),
            territories: owned(DEFAULT_TERRITORIES),
            categories: owned(DEFAULT_CATEGORIES),
            descriptions: owned(DEFAULT_DESCRIPTIONS),
            window: DateWindow::default(),
        }
    }
}

impl Domains {
    pub fn new(
        companies: Vec<String>,
        territories: Vec<String>,
        categories: Vec<String>,
        descriptions: Vec<String>,
        window: DateWindow,
    ) -> Result<Self> {
        check_table("companies", &companies)?;
        check_table("territories", &territories)?;
        check_table("categories", &categories)?;
        check_table("descriptions", &descriptions)?;
        Ok(Self {
            companies,
            territories,
            categories,
            descriptions,
            window,
        })
    }

    pub fn has_company(&self, value: &str) -> bool {
        self.companies.iter().any(|c| c == value)
    }

    pub fn has_territory(&self, value: &str) -> bool {
        self.territories.iter().any(|t| t == value)
    }

    pub fn has_category(&self, value: &str) -> bool {
        self.categories.iter().any(|c| c == value)
    }

    /// Checks every field of `m` against its domain.
    pub fn validate(&self, m: &Movement) -> Result<()> {
        if !self.window.contains(m.date) {
            return Err(CoreError::validation(
                "date",
                format!(
                    "{} is outside {}..={}",
                    m.date,
                    self.window.start(),
                    self.window.end()
                ),
            ));
        }
        if !self.has_company(&m.company) {
            return Err(CoreError::validation(
                "company",
                format!("`{}` is not a tracked company", m.company),
            ));
        }
        if !self.has_territory(&m.territory) {
            return Err(CoreError::validation(
                "territory",
                format!("`{}` is not a known territory", m.territory),
            ));
        }
        if !self.has_category(&m.category) {
            return Err(CoreError::validation(
                "category",
                format!("`{}` is not a known category", m.category),
            ));
        }
        if !(RELEVANCE_MIN..=RELEVANCE_MAX).contains(&m.relevance) {
            return Err(CoreError::validation(
                "relevance",
                format!(
                    "must be {RELEVANCE_MIN}..={RELEVANCE_MAX} (got {})",
                    m.relevance
                ),
            ));
        }
        if m.description.trim().is_empty() {
            return Err(CoreError::validation("description", "must be non-empty"));
        }
        Ok(())
    }

    pub fn is_valid(&self, m: &Movement) -> bool {
        self.validate(m).is_ok()
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn check_table(name: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Err(CoreError::invalid_argument(format!(
            "domain table `{name}` must be non-empty"
        )));
    }
    let mut seen = BTreeSet::new();
    for v in values {
        if v.trim().is_empty() {
            return Err(CoreError::invalid_argument(format!(
                "domain table `{name}` contains a blank value"
            )));
        }
        if !seen.insert(v.as_str()) {
            return Err(CoreError::invalid_argument(format!(
                "domain table `{name}` lists `{v}` twice"
            )));
        }
    }
    Ok(())
}

/// Ordered sequence of movements in insertion order (not necessarily chronological).
///
/// There is no in-place mutation: filtering produces a new collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementCollection(Vec<Movement>);

impl MovementCollection {
    pub fn new(movements: Vec<Movement>) -> Self {
        Self(movements)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Movement> {
        self.0.iter()
    }
}

impl FromIterator<Movement> for MovementCollection {
    fn from_iter<I: IntoIterator<Item = Movement>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a MovementCollection {
    type Item = &'a Movement;
    type IntoIter = std::slice::Iter<'a, Movement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for MovementCollection {
    type Item = Movement;
    type IntoIter = std::vec::IntoIter<Movement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
