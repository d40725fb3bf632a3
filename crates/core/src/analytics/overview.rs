use crate::analytics::aggregate::{count_by, mean_relevance, share_above_threshold, sum_engagement};
use crate::domain::dimension::{Dimension, Metric};
use crate::domain::movement::{Kind, MovementCollection};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Relevance at or above this counts as "high".
pub const HIGH_RELEVANCE: u8 = 4;

/// Headline numbers for the dashboard's top row.
///
/// Averages and shares are `None` for an empty collection so a view can show "no data"
/// instead of a misleading zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total: usize,
    pub mean_relevance: Option<f64>,
    pub total_engagement: u64,
    pub high_relevance_share: Option<f64>,
    pub major: usize,
    pub covert: usize,
    pub most_active_company: Option<String>,
}

impl Overview {
    pub fn compute(collection: &MovementCollection) -> Self {
        let kinds = count_by(collection, Dimension::Kind);
        let kind_count = |k: Kind| kinds.get(k.as_str()).copied().unwrap_or(0);

        let mut most_active: Option<(String, usize)> = None;
        for (company, n) in count_by(collection, Dimension::Company) {
            // Strict comparison keeps the alphabetically first company on ties.
            if most_active.as_ref().map_or(true, |(_, best)| n > *best) {
                most_active = Some((company, n));
            }
        }

        Self {
            total: collection.len(),
            mean_relevance: no_data_as_none(mean_relevance(collection)),
            total_engagement: sum_engagement(collection),
            high_relevance_share: no_data_as_none(share_above_threshold(
                collection,
                Metric::Relevance,
                f64::from(HIGH_RELEVANCE),
            )),
            major: kind_count(Kind::Major),
            covert: kind_count(Kind::Covert),
            most_active_company: most_active.map(|(company, _)| company),
        }
    }
}

fn no_data_as_none(res: crate::Result<f64>) -> Option<f64> {
    match res {
        Ok(v) => Some(v),
        Err(CoreError::NoData(_)) => None,
        Err(err) => {
            tracing::warn!(error = %err, "unexpected aggregate failure");
            None
        }
    }
}
