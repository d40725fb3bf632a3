use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod report;
mod source;

#[derive(Debug, Parser)]
#[command(name = "radar_cli", about = "Competitive movement analytics from the command line")]
struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the (filtered) movements of a session.
    Generate {
        #[command(flatten)]
        source: source::SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print the dashboard aggregates of a session.
    Summary {
        #[command(flatten)]
        source: source::SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print the recommendation for a decision category.
    Recommend {
        /// market_expansion, campaign_tuning or product_improvement.
        category: String,
    },
}

#[derive(Debug, Clone, Default, Args)]
struct FilterArgs {
    /// Keep only these companies (repeatable).
    #[arg(long = "company")]
    companies: Vec<String>,

    /// Keep only these territories (repeatable).
    #[arg(long = "territory")]
    territories: Vec<String>,

    /// Keep only these categories (repeatable).
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Keep only these kinds: Routine/Major/Covert or BAU/Bomba/Ninja (repeatable).
    #[arg(long = "kind")]
    kinds: Vec<String>,

    #[arg(long)]
    min_relevance: Option<u8>,

    /// First day kept (YYYY-MM-DD); needs --to.
    #[arg(long, requires = "to")]
    from: Option<String>,

    /// Last day kept (YYYY-MM-DD); needs --from.
    #[arg(long, requires = "from")]
    to: Option<String>,
}

impl FilterArgs {
    fn into_criteria(self) -> anyhow::Result<radar_core::query::Criteria> {
        let kinds = self
            .kinds
            .iter()
            .map(|k| k.parse::<radar_core::domain::movement::Kind>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut criteria = radar_core::query::Criteria::default()
            .with_companies(self.companies)
            .with_territories(self.territories)
            .with_categories(self.categories)
            .with_kinds(kinds);
        criteria.min_relevance = self.min_relevance;
        if let (Some(from), Some(to)) = (self.from.as_deref(), self.to.as_deref()) {
            criteria.date_range = Some(radar_core::time::window::DateWindow::parse(from, to)?);
        }
        Ok(criteria)
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = radar_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let res = run(cli.command, &settings);
    match res {
        Ok(output) => {
            let text = if cli.pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{text}");
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "radar_cli failed");
            Err(err)
        }
    }
}

fn run(
    command: Command,
    settings: &radar_core::config::Settings,
) -> anyhow::Result<serde_json::Value> {
    match command {
        Command::Generate { source, filter } => {
            let session = source.open_session(settings)?;
            let movements = session.filter(&filter.into_criteria()?)?;
            tracing::info!(
                session_id = %session.id,
                movements_len = movements.len(),
                "movements selected"
            );
            Ok(serde_json::to_value(&movements)?)
        }
        Command::Summary { source, filter } => {
            let session = source.open_session(settings)?;
            let movements = session.filter(&filter.into_criteria()?)?;
            Ok(serde_json::to_value(report::Summary::build(&movements))?)
        }
        Command::Recommend { category } => Ok(serde_json::to_value(
            radar_core::decision::recommend_by_name(&category)?,
        )?),
    }
}

fn init_sentry(settings: &radar_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> radar_core::config::Settings {
        radar_core::config::Settings::from_lookup(|_| None).unwrap()
    }

    #[test]
    fn parses_repeatable_filters() {
        let cli = Cli::try_parse_from([
            "radar_cli",
            "summary",
            "--n",
            "35",
            "--seed",
            "4",
            "--company",
            "Natura",
            "--company",
            "Avon",
            "--kind",
            "Ninja",
            "--min-relevance",
            "4",
        ])
        .unwrap();
        let Command::Summary { source, filter } = cli.command else {
            panic!("expected summary");
        };
        assert_eq!(source.n, Some(35));
        let criteria = filter.into_criteria().unwrap();
        assert_eq!(criteria.companies.len(), 2);
        assert_eq!(criteria.min_relevance, Some(4));
    }

    #[test]
    fn date_bounds_must_come_in_pairs() {
        assert!(Cli::try_parse_from(["radar_cli", "generate", "--from", "2024-01-01"]).is_err());
    }

    #[test]
    fn generate_with_min_relevance_keeps_only_relevant_rows() {
        let command = Command::Generate {
            source: source::SourceArgs {
                n: Some(35),
                seed: Some(12),
                ..Default::default()
            },
            filter: FilterArgs {
                min_relevance: Some(4),
                ..Default::default()
            },
        };
        let out = run(command, &settings()).unwrap();
        let rows = out.as_array().unwrap();
        assert!(rows.len() <= 35);
        assert!(rows.iter().all(|r| r["relevance"].as_u64().unwrap() >= 4));
    }

    #[test]
    fn recommend_rejects_unknown_categories() {
        let ok = run(
            Command::Recommend {
                category: "market_expansion".into(),
            },
            &settings(),
        )
        .unwrap();
        assert_eq!(ok["chosen"][0], "Wellness");

        assert!(run(
            Command::Recommend {
                category: "lunch".into()
            },
            &settings()
        )
        .is_err());
    }
}
