use anyhow::Context;
use clap::Args;
use radar_core::config::Settings;
use radar_core::ingest::provider::{MovementSource, RecordSource, SyntheticSource};
use radar_core::session::Session;
use radar_core::time::window::DateWindow;
use std::path::PathBuf;

/// Where a session's movements come from. Unset values fall back to `Settings`.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Number of synthetic movements (defaults to RADAR_SAMPLE_SIZE).
    #[arg(long)]
    pub n: Option<usize>,

    /// First day of the generation window (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<String>,

    /// Last day of the generation window (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<String>,

    /// Seed for reproducible output (defaults to RADAR_SEED, else random).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Load movement records from a JSON array instead of generating them.
    #[arg(long, conflicts_with_all = ["n", "start", "end", "seed"])]
    pub input: Option<PathBuf>,
}

impl SourceArgs {
    pub fn open_session(&self, settings: &Settings) -> anyhow::Result<Session> {
        let source = self.build_source(settings)?;
        let session = Session::open(source.as_ref()).with_context(|| {
            format!("failed to load movements from {} source", source.source_name())
        })?;
        Ok(session)
    }

    fn build_source(&self, settings: &Settings) -> anyhow::Result<Box<dyn MovementSource>> {
        if let Some(path) = &self.input {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let source = RecordSource::from_json_str(&text, settings.domains.clone())?;
            tracing::info!(
                path = %path.display(),
                records = source.len(),
                "loaded movement records"
            );
            return Ok(Box::new(source));
        }

        let mut source = SyntheticSource::from_settings(settings);
        if let Some(n) = self.n {
            source.n = n;
        }
        if self.start.is_some() || self.end.is_some() {
            let start = self
                .start
                .clone()
                .unwrap_or_else(|| settings.window.start().to_string());
            let end = self
                .end
                .clone()
                .unwrap_or_else(|| settings.window.end().to_string());
            source.window = DateWindow::parse(&start, &end)?;
            source.domains.window = source.window;
        }
        if self.seed.is_some() {
            source.seed = self.seed;
        }
        Ok(Box::new(source))
    }
}
