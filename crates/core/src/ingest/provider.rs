use crate::config::Settings;
use crate::domain::contract::{validate_records, MovementRecord};
use crate::domain::movement::{Domains, MovementCollection};
use crate::error::Result;
use crate::ingest::generator;
use crate::time::window::DateWindow;
use anyhow::Context;

/// Anything that can hand a session its working collection.
///
/// The synthetic generator is one implementation; a real ingestion backend only needs to
/// produce the same validated `MovementCollection`.
pub trait MovementSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Domain tables the loaded movements satisfy.
    fn domains(&self) -> &Domains;

    fn load(&self) -> Result<MovementCollection>;
}

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    pub n: usize,
    pub window: DateWindow,
    pub domains: Domains,
    pub seed: Option<u64>,
}

impl SyntheticSource {
    /// Generated dates always satisfy `domains`: its window is set to `window`.
    pub fn new(n: usize, window: DateWindow, mut domains: Domains, seed: Option<u64>) -> Self {
        domains.window = window;
        Self {
            n,
            window,
            domains,
            seed,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.sample_size,
            settings.window,
            settings.domains.clone(),
            settings.seed,
        )
    }
}

impl MovementSource for SyntheticSource {
    fn source_name(&self) -> &'static str {
        "synthetic"
    }

    fn domains(&self) -> &Domains {
        &self.domains
    }

    fn load(&self) -> Result<MovementCollection> {
        generator::generate(self.n, &self.window, &self.domains, self.seed)
    }
}

/// Movements supplied as raw records, validated on load.
#[derive(Debug, Clone)]
pub struct RecordSource {
    records: Vec<MovementRecord>,
    domains: Domains,
}

impl RecordSource {
    pub fn new(records: Vec<MovementRecord>, domains: Domains) -> Self {
        Self { records, domains }
    }

    /// Parses a JSON array of records.
    pub fn from_json_str(text: &str, domains: Domains) -> anyhow::Result<Self> {
        let records = serde_json::from_str::<Vec<MovementRecord>>(text)
            .context("movement records must be a JSON array of movement objects")?;
        Ok(Self::new(records, domains))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl MovementSource for RecordSource {
    fn source_name(&self) -> &'static str {
        "records"
    }

    fn domains(&self) -> &Domains {
        &self.domains
    }

    fn load(&self) -> Result<MovementCollection> {
        validate_records(self.records.clone(), &self.domains)
    }
}
