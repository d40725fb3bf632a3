use crate::domain::recommendation::DecisionCategory;
use serde::{Deserialize, Serialize};

/// Upper end of the 1-5 satisfaction survey scale.
pub const SATISFACTION_SCALE_MAX: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCandidate {
    pub market: String,
    /// 0..=1, higher is better.
    pub potential: f64,
    /// 0..=1, lower is better.
    pub competition: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignMetric {
    pub metric: String,
    pub current: f64,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectScore {
    pub aspect: String,
    pub satisfaction: f64,
}

/// Input a decision rule ranks over. One variant per decision category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", content = "items", rename_all = "snake_case")]
pub enum ReferenceDataset {
    MarketExpansion(Vec<MarketCandidate>),
    CampaignTuning(Vec<CampaignMetric>),
    ProductImprovement(Vec<AspectScore>),
}

impl ReferenceDataset {
    pub fn category(&self) -> DecisionCategory {
        match self {
            ReferenceDataset::MarketExpansion(_) => DecisionCategory::MarketExpansion,
            ReferenceDataset::CampaignTuning(_) => DecisionCategory::CampaignTuning,
            ReferenceDataset::ProductImprovement(_) => DecisionCategory::ProductImprovement,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ReferenceDataset::MarketExpansion(v) => v.len(),
            ReferenceDataset::CampaignTuning(v) => v.len(),
            ReferenceDataset::ProductImprovement(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Static placeholders; nothing here is derived from live movements yet.
pub fn embedded(category: DecisionCategory) -> ReferenceDataset {
    match category {
        DecisionCategory::MarketExpansion => ReferenceDataset::MarketExpansion(vec![
            market("Digital", 0.8, 0.7),
            market("Skincare", 0.6, 0.4),
            market("Wellness", 0.9, 0.3),
        ]),
        DecisionCategory::CampaignTuning => ReferenceDataset::CampaignTuning(vec![
            campaign("Engagement", 0.8, 0.9),
            campaign("Conversion", 0.4, 0.6),
            campaign("ROI", 0.6, 0.8),
        ]),
        DecisionCategory::ProductImprovement => ReferenceDataset::ProductImprovement(vec![
            aspect("Packaging", 4.2),
            aspect("Fragrance", 3.8),
            aspect("Texture", 4.5),
            aspect("Price", 3.5),
        ]),
    }
}

fn market(name: &str, potential: f64, competition: f64) -> MarketCandidate {
    MarketCandidate {
        market: name.to_string(),
        potential,
        competition,
    }
}

fn campaign(name: &str, current: f64, target: f64) -> CampaignMetric {
    CampaignMetric {
        metric: name.to_string(),
        current,
        target,
    }
}

fn aspect(name: &str, satisfaction: f64) -> AspectScore {
    AspectScore {
        aspect: name.to_string(),
        satisfaction,
    }
}
