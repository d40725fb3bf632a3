use crate::domain::movement::{Domains, Kind, Movement, MovementCollection};
use crate::error::{CoreError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Loosely typed movement as an ingestion collaborator hands it over.
///
/// Enumerated fields arrive as strings and numeric fields as wide integers; nothing here is
/// trusted until [`MovementRecord::validate_and_into_movement`] has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementRecord {
    pub date: NaiveDate,
    pub company: String,
    pub territory: String,
    pub category: String,
    pub relevance: i64,
    pub kind: String,
    pub engagement: i64,
    pub description: String,
}

impl MovementRecord {
    pub fn validate_and_into_movement(self, domains: &Domains) -> Result<Movement> {
        let relevance = u8::try_from(self.relevance).map_err(|_| {
            CoreError::validation(
                "relevance",
                format!("out of range: {}", self.relevance),
            )
        })?;
        let engagement = u32::try_from(self.engagement).map_err(|_| {
            CoreError::validation(
                "engagement",
                format!("must be a non-negative count (got {})", self.engagement),
            )
        })?;
        let kind = self
            .kind
            .parse::<Kind>()
            .map_err(|_| CoreError::validation("kind", format!("unknown kind `{}`", self.kind)))?;

        let movement = Movement {
            date: self.date,
            company: self.company.trim().to_string(),
            territory: self.territory.trim().to_string(),
            category: self.category.trim().to_string(),
            relevance,
            kind,
            engagement,
            description: self.description.trim().to_string(),
        };
        domains.validate(&movement)?;
        Ok(movement)
    }
}

/// Validates every record, failing on the first bad one with its position in the reason.
pub fn validate_records(
    records: Vec<MovementRecord>,
    domains: &Domains,
) -> Result<MovementCollection> {
    let mut out = Vec::with_capacity(records.len());
    for (i, record) in records.into_iter().enumerate() {
        let movement = record.validate_and_into_movement(domains).map_err(|err| match err {
            CoreError::Validation { field, reason } => {
                CoreError::validation(field, format!("record {i}: {reason}"))
            }
            other => other,
        })?;
        out.push(movement);
    }
    Ok(MovementCollection::new(out))
}
