//! Synthetic movement generator.
//!
//! Produces schema-valid filler with every field sampled independently. The output says nothing
//! about real market dynamics; it exists so the rest of the core runs without an ingestion
//! backend.

use crate::domain::movement::{
    Domains, Kind, Movement, MovementCollection, RELEVANCE_MAX, RELEVANCE_MIN,
};
use crate::error::{CoreError, Result};
use crate::time::window::DateWindow;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const ENGAGEMENT_MIN: u32 = 100;
/// Exclusive upper bound.
pub const ENGAGEMENT_MAX: u32 = 10_000;

/// Relative weights, in tenths: 70% routine, 20% major, 10% covert.
pub const KIND_WEIGHTS: [(Kind, u32); 3] = [
    (Kind::Routine, 7),
    (Kind::Major, 2),
    (Kind::Covert, 1),
];

/// Generates `n` movements inside `window`.
///
/// With `Some(seed)` the output is reproducible for identical arguments; with `None` the RNG is
/// seeded from the OS and every call differs.
pub fn generate(
    n: usize,
    window: &DateWindow,
    domains: &Domains,
    seed: Option<u64>,
) -> Result<MovementCollection> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let out = generate_with_rng(n, window, domains, &mut rng)?;
    tracing::debug!(
        n,
        ?seed,
        start = %window.start(),
        end = %window.end(),
        "generated synthetic movements"
    );
    Ok(out)
}

/// Same as [`generate`] with a caller-supplied randomness source.
pub fn generate_with_rng<R: Rng + ?Sized>(
    n: usize,
    window: &DateWindow,
    domains: &Domains,
    rng: &mut R,
) -> Result<MovementCollection> {
    let tables = [
        ("companies", &domains.companies),
        ("territories", &domains.territories),
        ("categories", &domains.categories),
        ("descriptions", &domains.descriptions),
    ];
    for (name, table) in tables {
        if table.is_empty() {
            return Err(CoreError::invalid_argument(format!(
                "cannot generate movements: domain table `{name}` is empty"
            )));
        }
    }

    let days = window.num_days();
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let date = window
            .nth_day(rng.gen_range(0..days))
            .unwrap_or_else(|| window.start());
        out.push(Movement {
            date,
            company: pick(rng, &domains.companies),
            territory: pick(rng, &domains.territories),
            category: pick(rng, &domains.categories),
            kind: pick_kind(rng),
            relevance: rng.gen_range(RELEVANCE_MIN..=RELEVANCE_MAX),
            engagement: rng.gen_range(ENGAGEMENT_MIN..ENGAGEMENT_MAX),
            description: pick(rng, &domains.descriptions),
        });
    }

    Ok(MovementCollection::new(out))
}

// Callers guarantee `table` is non-empty.
fn pick<R: Rng + ?Sized>(rng: &mut R, table: &[String]) -> String {
    table[rng.gen_range(0..table.len())].clone()
}

fn pick_kind<R: Rng + ?Sized>(rng: &mut R) -> Kind {
    let total: u32 = KIND_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for (kind, weight) in KIND_WEIGHTS {
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    Kind::Routine
}
