use crate::domain::movement::{Domains, Kind, Movement, MovementCollection};
use crate::error::{CoreError, Result};
use crate::time::window::DateWindow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Selection a dashboard user made.
///
/// Dimensions are AND-ed; values inside one set are OR-ed. An empty set or an unset bound puts
/// no constraint on its dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criteria {
    pub companies: BTreeSet<String>,
    pub territories: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub kinds: BTreeSet<Kind>,
    /// Inclusive lower bound on relevance.
    pub min_relevance: Option<u8>,
    pub date_range: Option<DateWindow>,
}

impl Criteria {
    pub fn with_companies<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.companies = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_territories<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.territories = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categories<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = Kind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    pub fn with_min_relevance(mut self, min: u8) -> Self {
        self.min_relevance = Some(min);
        self
    }

    pub fn with_date_range(mut self, range: DateWindow) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Rejects values outside the closed domain tables.
    pub fn validate(&self, domains: &Domains) -> Result<()> {
        check_members("company", &self.companies, |v| domains.has_company(v))?;
        check_members("territory", &self.territories, |v| domains.has_territory(v))?;
        check_members("category", &self.categories, |v| domains.has_category(v))?;
        Ok(())
    }

    pub fn matches(&self, m: &Movement) -> bool {
        allows(&self.companies, &m.company)
            && allows(&self.territories, &m.territory)
            && allows(&self.categories, &m.category)
            && (self.kinds.is_empty() || self.kinds.contains(&m.kind))
            && self.min_relevance.map_or(true, |min| m.relevance >= min)
            && self.date_range.map_or(true, |range| range.contains(m.date))
    }
}

fn allows(set: &BTreeSet<String>, value: &str) -> bool {
    set.is_empty() || set.contains(value)
}

fn check_members(
    dimension: &str,
    values: &BTreeSet<String>,
    known: impl Fn(&str) -> bool,
) -> Result<()> {
    match values.iter().find(|v| !known(v.as_str())) {
        Some(v) => Err(CoreError::invalid_argument(format!(
            "unknown {dimension} `{v}` in filter criteria"
        ))),
        None => Ok(()),
    }
}

/// Movements of `collection` that satisfy `criteria`, in their original order.
pub fn filter(collection: &MovementCollection, criteria: &Criteria) -> MovementCollection {
    collection
        .iter()
        .filter(|m| criteria.matches(m))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::movement::tests::movement;
    use chrono::NaiveDate;

    fn sample() -> MovementCollection {
        let mut late = movement("Avon", "Wellness", Kind::Covert, 5);
        late.date = NaiveDate::from_ymd_opt(2024, 11, 2).unwrap();
        MovementCollection::new(vec![
            movement("Natura", "Digital", Kind::Routine, 2),
            movement("Avon", "Digital", Kind::Major, 4),
            movement("Natura", "Wellness", Kind::Major, 5),
            late,
        ])
    }

    fn companies(c: &MovementCollection) -> Vec<(&str, &str)> {
        c.iter().map(|m| (m.company.as_str(), m.territory.as_str())).collect()
    }

    #[test]
    fn empty_selection_means_no_restriction() {
        let c = sample();
        assert_eq!(filter(&c, &Criteria::default()), c);
        let explicit_empty = Criteria::default().with_companies(Vec::<String>::new());
        assert_eq!(explicit_empty, Criteria::default());
        assert_eq!(filter(&c, &explicit_empty), c);
    }

    #[test]
    fn or_within_dimension_and_across() {
        let c = sample();
        let criteria = Criteria::default()
            .with_companies(["Natura", "Avon"])
            .with_territories(["Wellness"]);
        assert_eq!(
            companies(&filter(&c, &criteria)),
            vec![("Natura", "Wellness"), ("Avon", "Wellness")]
        );

        let criteria = criteria.with_min_relevance(5).with_kinds([Kind::Major]);
        assert_eq!(companies(&filter(&c, &criteria)), vec![("Natura", "Wellness")]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let c = sample();
        let criteria = Criteria::default()
            .with_date_range(DateWindow::parse("2024-11-02", "2024-12-31").unwrap());
        assert_eq!(companies(&filter(&c, &criteria)), vec![("Avon", "Wellness")]);
    }

    #[test]
    fn impossible_conjunction_is_empty_not_an_error() {
        let c = sample();
        let criteria = Criteria::default()
            .with_companies(["Jequiti"])
            .with_min_relevance(6);
        assert!(filter(&c, &criteria).is_empty());
    }

    #[test]
    fn input_is_left_untouched() {
        let c = sample();
        let before = c.clone();
        let _ = filter(&c, &Criteria::default().with_min_relevance(5));
        assert_eq!(c, before);
    }

    #[test]
    fn validate_rejects_unknown_values() {
        let domains = Domains::default();
        assert!(Criteria::default()
            .with_companies(["Natura"])
            .validate(&domains)
            .is_ok());
        let err = Criteria::default()
            .with_territories(["Digital", "Atlantis"])
            .validate(&domains)
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidArgument("unknown territory `Atlantis` in filter criteria".into())
        );
    }
}
