use crate::analytics::overview::Overview;
use crate::domain::movement::{Domains, MovementCollection};
use crate::error::Result;
use crate::ingest::provider::{MovementSource, SyntheticSource};
use crate::query::{filter, Criteria};
use crate::time::window::DateWindow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One dashboard session: its own collection plus the domain tables it was built against.
///
/// Everything a view needs is passed in explicitly; sessions share no mutable state.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub source: &'static str,
    pub domains: Domains,
    movements: MovementCollection,
}

impl Session {
    pub fn open(source: &dyn MovementSource) -> Result<Self> {
        let movements = source.load()?;
        let session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source: source.source_name(),
            domains: source.domains().clone(),
            movements,
        };
        tracing::info!(
            session_id = %session.id,
            source = session.source,
            movements_len = session.movements.len(),
            "session opened"
        );
        Ok(session)
    }

    pub fn generate(
        n: usize,
        window: &DateWindow,
        domains: Domains,
        seed: Option<u64>,
    ) -> Result<Self> {
        Self::open(&SyntheticSource::new(n, *window, domains, seed))
    }

    pub fn movements(&self) -> &MovementCollection {
        &self.movements
    }

    /// Validates `criteria` against this session's domains, then filters.
    pub fn filter(&self, criteria: &Criteria) -> Result<MovementCollection> {
        criteria.validate(&self.domains)?;
        let out = filter(&self.movements, criteria);
        tracing::debug!(
            session_id = %self.id,
            input_len = self.movements.len(),
            output_len = out.len(),
            "filtered movements"
        );
        Ok(out)
    }

    pub fn overview(&self, criteria: &Criteria) -> Result<Overview> {
        Ok(Overview::compute(&self.filter(criteria)?))
    }
}
