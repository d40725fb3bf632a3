use chrono::NaiveDate;
use radar_core::analytics::aggregate::{
    count_by, count_by_day, cross_tab, grouped_mean, snapshot, top_by, AggregateSnapshot, CrossTab,
};
use radar_core::analytics::overview::Overview;
use radar_core::domain::dimension::{Dimension, Metric};
use radar_core::domain::movement::MovementCollection;
use serde::Serialize;
use std::collections::BTreeMap;

const TOP_MOVEMENTS: usize = 5;

/// Everything the dashboard views render, computed over one (filtered) collection.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub overview: Overview,
    pub by_company: BTreeMap<String, usize>,
    pub by_territory: BTreeMap<String, usize>,
    pub by_kind: AggregateSnapshot,
    pub company_by_territory: CrossTab,
    pub relevance_by_company: BTreeMap<String, f64>,
    pub engagement_by_category: BTreeMap<String, f64>,
    pub timeline: BTreeMap<NaiveDate, usize>,
    pub top_engagement: MovementCollection,
}

impl Summary {
    pub fn build(movements: &MovementCollection) -> Self {
        Self {
            overview: Overview::compute(movements),
            by_company: count_by(movements, Dimension::Company),
            by_territory: count_by(movements, Dimension::Territory),
            by_kind: snapshot(movements, Dimension::Kind),
            company_by_territory: cross_tab(movements, Dimension::Company, Dimension::Territory),
            relevance_by_company: grouped_mean(movements, Dimension::Company, Metric::Relevance),
            engagement_by_category: grouped_mean(
                movements,
                Dimension::Category,
                Metric::Engagement,
            ),
            timeline: count_by_day(movements),
            top_engagement: top_by(movements, Metric::Engagement, TOP_MOVEMENTS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_core::domain::movement::Domains;
    use radar_core::ingest::generator::generate;
    use radar_core::time::window::DateWindow;

    #[test]
    fn views_agree_on_the_row_count() {
        let window = DateWindow::parse("2024-01-01", "2024-03-31").unwrap();
        let movements = generate(80, &window, &Domains::default(), Some(21)).unwrap();
        let s = Summary::build(&movements);

        assert_eq!(s.overview.total, 80);
        assert_eq!(s.by_company.values().sum::<usize>(), 80);
        assert_eq!(s.by_territory.values().sum::<usize>(), 80);
        assert_eq!(s.by_kind.values().map(|g| g.count).sum::<usize>(), 80);
        assert_eq!(s.company_by_territory.total(), 80);
        assert_eq!(s.timeline.values().sum::<usize>(), 80);
        assert_eq!(s.top_engagement.len(), TOP_MOVEMENTS);
    }

    #[test]
    fn empty_selection_still_serializes() {
        let s = Summary::build(&MovementCollection::default());
        let v = serde_json::to_value(&s).unwrap();
        assert!(v["overview"]["mean_relevance"].is_null());
        assert_eq!(v["company_by_territory"]["rows"], serde_json::json!([]));
    }
}
