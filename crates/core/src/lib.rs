pub mod analytics;
pub mod decision;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod query;
pub mod session;
pub mod time;

pub use error::{CoreError, Result};

pub mod config {
    use crate::domain::movement::Domains;
    use crate::time::window::DateWindow;
    use anyhow::Context;

    const DEFAULT_SAMPLE_SIZE: usize = 100;
    const DEFAULT_MAX_SESSIONS: usize = 64;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub sample_size: usize,
        pub window: DateWindow,
        pub seed: Option<u64>,
        pub domains: Domains,
        /// Sessions an API process keeps before evicting the oldest.
        pub max_sessions: usize,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        /// Same as [`Settings::from_env`] but reads variables through `lookup`.
        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let sample_size = match non_blank(lookup("RADAR_SAMPLE_SIZE")) {
                Some(s) => s
                    .parse::<usize>()
                    .with_context(|| format!("RADAR_SAMPLE_SIZE must be an integer (got {s})"))?,
                None => DEFAULT_SAMPLE_SIZE,
            };

            let default_window = DateWindow::default();
            let start = non_blank(lookup("RADAR_WINDOW_START"))
                .unwrap_or_else(|| default_window.start().to_string());
            let end = non_blank(lookup("RADAR_WINDOW_END"))
                .unwrap_or_else(|| default_window.end().to_string());
            let window = DateWindow::parse(&start, &end)
                .context("RADAR_WINDOW_START/RADAR_WINDOW_END do not form a valid window")?;

            let seed = match non_blank(lookup("RADAR_SEED")) {
                Some(s) => Some(
                    s.parse::<u64>()
                        .with_context(|| format!("RADAR_SEED must be a u64 (got {s})"))?,
                ),
                None => None,
            };

            let max_sessions = match non_blank(lookup("RADAR_MAX_SESSIONS")) {
                Some(s) => s
                    .parse::<usize>()
                    .with_context(|| format!("RADAR_MAX_SESSIONS must be an integer (got {s})"))?,
                None => DEFAULT_MAX_SESSIONS,
            };
            anyhow::ensure!(max_sessions >= 1, "RADAR_MAX_SESSIONS must be at least 1");

            let defaults = Domains::default();
            let domains = Domains::new(
                list_or(lookup("RADAR_COMPANIES"), defaults.companies),
                list_or(lookup("RADAR_TERRITORIES"), defaults.territories),
                list_or(lookup("RADAR_CATEGORIES"), defaults.categories),
                list_or(lookup("RADAR_DESCRIPTIONS"), defaults.descriptions),
                window,
            )
            .context("invalid domain tables")?;

            Ok(Self {
                sentry_dsn: non_blank(lookup("SENTRY_DSN")),
                sample_size,
                window,
                seed,
                domains,
                max_sessions,
            })
        }
    }

    fn non_blank(v: Option<String>) -> Option<String> {
        v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
    }

    fn list_or(v: Option<String>, default: Vec<String>) -> Vec<String> {
        match non_blank(v) {
            Some(s) => s
                .split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
            None => default,
        }
    }

}
