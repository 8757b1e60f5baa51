// Rust guideline compliant 2026-10-19

//! Stokvel demo entry point.
//!
//! Loads a roster snapshot, conducts one rotation draw, validates it, prints
//! the audit CSV to stdout, then prints the fairness summary and, once every
//! active member has been paid out, the settlement plan as JSON. A roster with
//! nobody left to draw skips the CSV and goes straight to fairness. Nothing is
//! written back; persisting results is the job of the surrounding application.
//!
//! # Usage
//!
//! ```text
//! # Built-in demo group, weighted draw
//! RUST_LOG=info cargo run
//!
//! # Own roster file, manual order, replayable demo seed
//! STOKVEL_METHOD=manual STOKVEL_SEED=7 cargo run -- roster.json
//! ```
//!
//! Environment: `STOKVEL_METHOD` (`random` | `weighted` | `manual`, default
//! `weighted`), `STOKVEL_SEED` (u64, default OS-seeded), `RUST_LOG`.

mod adapters;

use std::env::VarError;
use std::path::PathBuf;

use adapters::roster::Roster;
use adapters::secure_random::draw_rng;
use adapters::system_clock::SystemClock;
use anyhow::Context as _;
use domain::{
    AllocationError, Clock, FairnessSummary, RotationConfig, RotationMethod, Transfer, Weighting,
};
use fairness::{FairnessConfig, FairnessEngine};
use rand::Rng;
use rotation::{AllocatorConfig, RotationAllocator};

/// Actor recorded on draws made by this binary.
const ACTOR_ID: &str = "stokvel-cli";

/// Everything one run produces for a roster snapshot.
#[derive(Debug)]
struct Outcome {
    /// Audit CSV; `None` when no member was eligible for the draw.
    csv: Option<String>,
    summary: FairnessSummary,
    /// Transfers; `None` until the rotation cycle is complete.
    plan: Option<Vec<Transfer>>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let clock = SystemClock;
    let roster = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Roster::load(&path)?,
        None => Roster::demo(clock.now().date_naive()),
    };

    let method = method_from_env(std::env::var("STOKVEL_METHOD"))?;
    let seed = seed_from_env(std::env::var("STOKVEL_SEED"))?;

    let config = RotationConfig::new(method)
        .with_exclude_payout_recipients(true)
        .with_weighting(Weighting::new(0.4, 0.6).context("invalid weighting")?);
    // Fresh generator per draw; no generator state outlives this call.
    let outcome = run(&roster, &config, &mut draw_rng(seed), &clock)?;

    if let Some(csv) = &outcome.csv {
        print!("{csv}");
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&outcome.summary)
            .context("failed to serialize fairness summary")?
    );
    if let Some(plan) = &outcome.plan {
        println!(
            "{}",
            serde_json::to_string_pretty(plan).context("failed to serialize settlement plan")?
        );
    }

    Ok(())
}

/// Draw method from `STOKVEL_METHOD`; `weighted` only when the variable is unset.
fn method_from_env(var: Result<String, VarError>) -> anyhow::Result<RotationMethod> {
    match var {
        Ok(raw) => raw.parse().context("invalid STOKVEL_METHOD"),
        Err(VarError::NotPresent) => Ok(RotationMethod::Weighted),
        Err(e) => Err(e).context("invalid STOKVEL_METHOD"),
    }
}

/// Replay seed from `STOKVEL_SEED`; OS seeding only when the variable is unset.
fn seed_from_env(var: Result<String, VarError>) -> anyhow::Result<Option<u64>> {
    match var {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .context("STOKVEL_SEED must be an unsigned integer"),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).context("invalid STOKVEL_SEED"),
    }
}

/// Draw, validate and export, then compute fairness for `roster`.
///
/// An empty eligible pool is not an error here: a completed cycle leaves
/// nobody to draw and is exactly when settlement is due.
///
/// # Errors
///
/// Fails when a configuration cannot be built, the draw fails for any reason
/// other than an empty pool, or the draw does not pass validation.
fn run<R: Rng + ?Sized, C: Clock>(
    roster: &Roster,
    config: &RotationConfig,
    rng: &mut R,
    clock: &C,
) -> anyhow::Result<Outcome> {
    // -- Rotation: 24-month / R50 000 saturation --
    let allocator = RotationAllocator::new(
        AllocatorConfig::builder()
            .build()
            .context("failed to build allocator config")?,
    );
    let csv = match allocator.allocate(&roster.members, config, ACTOR_ID, rng, clock) {
        Ok(draw) => {
            let report = rotation::validate(&draw);
            if !report.is_valid {
                for issue in &report.issues {
                    tracing::error!(%issue, "main.rotation.invalid");
                }
                anyhow::bail!(
                    "rotation draw failed validation with {} issue(s)",
                    report.issues.len()
                );
            }
            Some(rotation::export_csv(&draw))
        }
        Err(AllocationError::EmptyPool) => {
            tracing::warn!(
                members = roster.members.len(),
                "main.rotation.empty_pool: no eligible members, skipping draw"
            );
            None
        }
        Err(e) => return Err(e).context("rotation draw failed"),
    };

    // -- Fairness: recomputed from verified contributions --
    let engine = FairnessEngine::new(
        FairnessConfig::builder()
            .build()
            .context("failed to build fairness config")?,
    );
    let summary =
        engine.calculate_fairness(&roster.members, &roster.contributions, roster.reference_value);
    let stage = fairness::cycle_stage(&roster.members, false);
    tracing::info!(?stage, cycle_complete = summary.cycle_complete, "main.fairness.stage");

    let plan = if fairness::should_trigger_settlement(&roster.members) {
        Some(engine.settlement_plan(&summary))
    } else {
        tracing::info!("main.fairness.settlement_deferred: cycle not complete");
        None
    };

    Ok(Outcome { csv, summary, plan })
}
