use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionCategory {
    MarketExpansion,
    CampaignTuning,
    ProductImprovement,
}

impl DecisionCategory {
    pub const ALL: [DecisionCategory; 3] = [
        DecisionCategory::MarketExpansion,
        DecisionCategory::CampaignTuning,
        DecisionCategory::ProductImprovement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DecisionCategory::MarketExpansion => "market_expansion",
            DecisionCategory::CampaignTuning => "campaign_tuning",
            DecisionCategory::ProductImprovement => "product_improvement",
        }
    }

    /// Selector label shown by the original dashboard.
    pub fn source_label(self) -> &'static str {
        match self {
            DecisionCategory::MarketExpansion => "Explorar Novos Mercados",
            DecisionCategory::CampaignTuning => "Ajustar Campanha",
            DecisionCategory::ProductImprovement => "Melhorar Produto",
        }
    }
}

impl fmt::Display for DecisionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let squashed: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect();
        DecisionCategory::ALL
            .into_iter()
            .find(|c| {
                c.as_str().replace('_', "").eq_ignore_ascii_case(&squashed)
                    || c.source_label().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| CoreError::invalid_argument(format!("unknown decision category `{s}`")))
    }
}

/// One metric of a comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub metric: String,
    pub current: f64,
    pub target: f64,
}

/// Two labelled series over the same metrics, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub current_label: String,
    pub target_label: String,
    pub rows: Vec<ComparisonRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub category: DecisionCategory,
    pub recommendation: String,
    /// Items the rule picked, best first.
    pub chosen: Vec<String>,
    pub comparison: Comparison,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snake_camel_and_source_labels() {
        assert_eq!(
            "market_expansion".parse::<DecisionCategory>().unwrap(),
            DecisionCategory::MarketExpansion
        );
        assert_eq!(
            "CampaignTuning".parse::<DecisionCategory>().unwrap(),
            DecisionCategory::CampaignTuning
        );
        assert_eq!(
            "product-improvement".parse::<DecisionCategory>().unwrap(),
            DecisionCategory::ProductImprovement
        );
        assert_eq!(
            "Melhorar Produto".parse::<DecisionCategory>().unwrap(),
            DecisionCategory::ProductImprovement
        );
    }

    #[test]
    fn anything_else_is_an_invalid_argument() {
        for bad in ["", "pricing", "market"] {
            assert!(matches!(
                bad.parse::<DecisionCategory>(),
                Err(CoreError::InvalidArgument(_))
            ));
        }
    }
}
