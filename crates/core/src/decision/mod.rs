//! Rule-based decision engine.
//!
//! Each decision category owns a ranking function over a small reference dataset and a text
//! template (see [`rules`]). `recommend` runs the rule over the embedded dataset;
//! `recommend_with` runs it over one the caller supplies.

pub mod reference;
pub mod rules;

use crate::domain::recommendation::{
    Comparison, ComparisonRow, DecisionCategory, RecommendationResult,
};
use crate::error::{CoreError, Result};
use reference::{ReferenceDataset, SATISFACTION_SCALE_MAX};

pub fn recommend(category: DecisionCategory) -> RecommendationResult {
    evaluate(&reference::embedded(category))
}

/// Parses `category` first; unknown names are an `InvalidArgument`.
pub fn recommend_by_name(category: &str) -> Result<RecommendationResult> {
    Ok(recommend(category.parse::<DecisionCategory>()?))
}

pub fn recommend_with(dataset: &ReferenceDataset) -> Result<RecommendationResult> {
    check_dataset(dataset)?;
    Ok(evaluate(dataset))
}

fn evaluate(dataset: &ReferenceDataset) -> RecommendationResult {
    let rule = rules::rule_for(dataset.category());

    let (ranking, comparison) = match dataset {
        ReferenceDataset::MarketExpansion(markets) => (
            rules::rank_markets(markets),
            Comparison {
                current_label: "potential".to_string(),
                target_label: "competition".to_string(),
                rows: markets
                    .iter()
                    .map(|m| ComparisonRow {
                        metric: m.market.clone(),
                        current: m.potential,
                        target: m.competition,
                    })
                    .collect(),
            },
        ),
        ReferenceDataset::CampaignTuning(metrics) => (
            rules::rank_campaign(metrics),
            Comparison {
                current_label: "current".to_string(),
                target_label: "target".to_string(),
                rows: metrics
                    .iter()
                    .map(|m| ComparisonRow {
                        metric: m.metric.clone(),
                        current: m.current,
                        target: m.target,
                    })
                    .collect(),
            },
        ),
        ReferenceDataset::ProductImprovement(aspects) => (
            rules::rank_aspects(aspects),
            Comparison {
                current_label: "satisfaction".to_string(),
                target_label: "scale maximum".to_string(),
                rows: aspects
                    .iter()
                    .map(|a| ComparisonRow {
                        metric: a.aspect.clone(),
                        current: a.satisfaction,
                        target: SATISFACTION_SCALE_MAX,
                    })
                    .collect(),
            },
        ),
    };

    let chosen: Vec<String> = ranking.into_iter().take(rule.picks).collect();
    RecommendationResult {
        category: rule.category,
        recommendation: rule.render(&chosen),
        chosen,
        comparison,
    }
}

fn check_dataset(dataset: &ReferenceDataset) -> Result<()> {
    if dataset.is_empty() {
        return Err(CoreError::invalid_argument(format!(
            "{} dataset must contain at least one item",
            dataset.category()
        )));
    }

    let values: Vec<(&str, f64)> = match dataset {
        ReferenceDataset::MarketExpansion(v) => v
            .iter()
            .flat_map(|m| [(m.market.as_str(), m.potential), (m.market.as_str(), m.competition)])
            .collect(),
        ReferenceDataset::CampaignTuning(v) => v
            .iter()
            .flat_map(|m| [(m.metric.as_str(), m.current), (m.metric.as_str(), m.target)])
            .collect(),
        ReferenceDataset::ProductImprovement(v) => v
            .iter()
            .map(|a| (a.aspect.as_str(), a.satisfaction))
            .collect(),
    };
    for (name, value) in values {
        if name.trim().is_empty() {
            return Err(CoreError::invalid_argument("dataset item names must be non-empty"));
        }
        if !value.is_finite() {
            return Err(CoreError::invalid_argument(format!(
                "`{name}` has a non-finite score"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reference::{AspectScore, CampaignMetric};

    #[test]
    fn every_category_yields_advice() {
        for category in DecisionCategory::ALL {
            let res = recommend(category);
            assert_eq!(res.category, category);
            assert!(!res.recommendation.trim().is_empty());
            assert!(!res.chosen.is_empty());
            assert!(!res.comparison.rows.is_empty());
        }
    }

    #[test]
    fn market_expansion_picks_wellness() {
        let res = recommend(DecisionCategory::MarketExpansion);
        assert_eq!(res.chosen, vec!["Wellness"]);
        assert!(res.recommendation.contains("Wellness"));
        assert_eq!(res.comparison.rows.len(), 3);
    }

    #[test]
    fn campaign_tuning_targets_conversion() {
        let res = recommend(DecisionCategory::CampaignTuning);
        assert_eq!(res.chosen, vec!["Conversion"]);
        let metrics: Vec<_> = res.comparison.rows.iter().map(|r| r.metric.as_str()).collect();
        assert_eq!(metrics, vec!["Engagement", "Conversion", "ROI"]);
        assert_eq!(res.comparison.rows[1].current, 0.4);
        assert_eq!(res.comparison.rows[1].target, 0.6);
    }

    #[test]
    fn product_improvement_names_the_two_weakest_aspects() {
        let res = recommend(DecisionCategory::ProductImprovement);
        assert_eq!(res.chosen, vec!["Price", "Fragrance"]);
        assert!(res.recommendation.contains("Price"));
        assert!(res.recommendation.contains("Fragrance"));
        let price = res
            .comparison
            .rows
            .iter()
            .find(|r| r.metric == "Price")
            .unwrap();
        assert_eq!(price.current, 3.5);
    }

    #[test]
    fn unknown_category_name_is_invalid() {
        assert!(recommend_by_name("campaign_tuning").is_ok());
        assert!(matches!(
            recommend_by_name("hire_more_people"),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn caller_datasets_go_through_the_same_rules() {
        let res = recommend_with(&ReferenceDataset::ProductImprovement(vec![
            AspectScore { aspect: "Durability".into(), satisfaction: 2.1 },
            AspectScore { aspect: "Color".into(), satisfaction: 4.9 },
            AspectScore { aspect: "Scent".into(), satisfaction: 3.0 },
        ]))
        .unwrap();
        assert_eq!(res.chosen, vec!["Durability", "Scent"]);

        let res = recommend_with(&ReferenceDataset::CampaignTuning(vec![CampaignMetric {
            metric: "ROI".into(),
            current: 1.2,
            target: 1.0,
        }]))
        .unwrap();
        assert!(res.chosen.is_empty());
        assert_eq!(res.recommendation, rules::CAMPAIGN_TUNING.fallback);
    }

    #[test]
    fn caller_datasets_are_checked() {
        assert!(matches!(
            recommend_with(&ReferenceDataset::MarketExpansion(vec![])),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            recommend_with(&ReferenceDataset::ProductImprovement(vec![AspectScore {
                aspect: "Price".into(),
                satisfaction: f64::NAN,
            }])),
            Err(CoreError::InvalidArgument(_))
        ));
    }
}
