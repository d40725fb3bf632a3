use crate::decision::reference::{AspectScore, CampaignMetric, MarketCandidate};
use crate::domain::recommendation::DecisionCategory;
use std::cmp::Ordering;

/// How one decision category turns a ranking into advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionRule {
    pub category: DecisionCategory,
    /// How many top-ranked items the recommendation names.
    pub picks: usize,
    /// `{items}` is replaced by the picked names.
    pub template: &'static str,
    /// Used when the ranking picks nothing.
    pub fallback: &'static str,
}

pub const MARKET_EXPANSION: DecisionRule = DecisionRule {
    category: DecisionCategory::MarketExpansion,
    picks: 1,
    template: "Explore the {items} market: highest potential with the lowest competition.",
    fallback: "No market stands out; hold expansion plans.",
};

pub const CAMPAIGN_TUNING: DecisionRule = DecisionRule {
    category: DecisionCategory::CampaignTuning,
    picks: 1,
    template: "Focus on raising {items} through personalized offers.",
    fallback: "Every campaign metric meets its target; keep the current plan.",
};

pub const PRODUCT_IMPROVEMENT: DecisionRule = DecisionRule {
    category: DecisionCategory::ProductImprovement,
    picks: 2,
    template: "Prioritize improvements in {items} to raise satisfaction.",
    fallback: "No product aspects were rated.",
};

pub fn rule_for(category: DecisionCategory) -> &'static DecisionRule {
    match category {
        DecisionCategory::MarketExpansion => &MARKET_EXPANSION,
        DecisionCategory::CampaignTuning => &CAMPAIGN_TUNING,
        DecisionCategory::ProductImprovement => &PRODUCT_IMPROVEMENT,
    }
}

impl DecisionRule {
    pub fn render(&self, picked: &[String]) -> String {
        if picked.is_empty() {
            return self.fallback.to_string();
        }
        self.template.replace("{items}", &join_names(picked))
    }
}

/// Markets on the Pareto front (no other market has both higher-or-equal potential and
/// lower-or-equal competition, one of them strictly) come first; each group is ordered by
/// potential minus competition.
pub fn rank_markets(markets: &[MarketCandidate]) -> Vec<String> {
    let dominated = |m: &MarketCandidate| {
        markets.iter().any(|o| {
            o.potential >= m.potential
                && o.competition <= m.competition
                && (o.potential > m.potential || o.competition < m.competition)
        })
    };

    let mut scored: Vec<(bool, f64, usize)> = markets
        .iter()
        .enumerate()
        .map(|(i, m)| (dominated(m), m.potential - m.competition, i))
        .collect();
    scored.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| desc(a.1, b.1))
            .then_with(|| a.2.cmp(&b.2))
    });
    scored
        .into_iter()
        .map(|(_, _, i)| markets[i].market.clone())
        .collect()
}

/// Metrics below target, largest relative shortfall first.
pub fn rank_campaign(metrics: &[CampaignMetric]) -> Vec<String> {
    let mut gaps: Vec<(f64, usize)> = metrics
        .iter()
        .enumerate()
        .filter(|(_, m)| m.target > 0.0 && m.current < m.target)
        .map(|(i, m)| ((m.target - m.current) / m.target, i))
        .collect();
    gaps.sort_by(|a, b| desc(a.0, b.0).then_with(|| a.1.cmp(&b.1)));
    gaps.into_iter()
        .map(|(_, i)| metrics[i].metric.clone())
        .collect()
}

/// Aspects from least to most satisfied.
pub fn rank_aspects(aspects: &[AspectScore]) -> Vec<String> {
    let mut order: Vec<usize> = (0..aspects.len()).collect();
    order.sort_by(|&a, &b| {
        aspects[a]
            .satisfaction
            .partial_cmp(&aspects[b].satisfaction)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });
    order.into_iter().map(|i| aspects[i].aspect.clone()).collect()
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
