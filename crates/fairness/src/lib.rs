// Rust guideline compliant 2026-10-19

//! Fairness component -- reconciles what each member paid against a
//! reference payout value once a rotation cycle completes.
//!
//! Entry points: [`FairnessEngine::calculate_fairness`],
//! [`FairnessEngine::calculate_fairness_from_totals`],
//! [`FairnessEngine::settlement_plan`], [`should_trigger_settlement`],
//! [`cycle_stage`]. Configuration via [`FairnessConfig::builder`].
//!
//! Every function here is total: an empty roster yields a zeroed summary.
//! Nothing is persisted; applying a settlement is the caller's job.

use std::collections::HashMap;

use domain::{Contribution, CycleStage, FairnessSummary, Member, MemberFairness, MemberId, Transfer};

// ---------------------------------------------------------------------------
// FairnessError
// ---------------------------------------------------------------------------

/// Errors raised while configuring the engine. Calculations never fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FairnessError {
    /// The supplied configuration is invalid.
    #[error("invalid fairness configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// FairnessConfig + builder
// ---------------------------------------------------------------------------

/// Amounts at or below this are treated as settled.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Runtime configuration for a [`FairnessEngine`].
///
/// Construct via [`FairnessConfig::builder`].
#[derive(Debug, Clone, PartialEq)]
pub struct FairnessConfig {
    /// Absolute amount below which an adjustment or transfer is ignored by
    /// [`FairnessEngine::settlement_plan`].
    pub tolerance: f64,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self { tolerance: DEFAULT_TOLERANCE }
    }
}

/// Builder for [`FairnessConfig`].
///
/// Obtain via [`FairnessConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct FairnessConfigBuilder {
    tolerance: f64,
}

impl FairnessConfig {
    /// Create a builder. Default value: `tolerance = 1e-6`.
    #[must_use]
    pub fn builder() -> FairnessConfigBuilder {
        FairnessConfigBuilder { tolerance: DEFAULT_TOLERANCE }
    }
}

impl FairnessConfigBuilder {
    /// Override the settlement tolerance.
    #[must_use]
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FairnessError::InvalidConfig`] when the tolerance is negative
    /// or not finite.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<FairnessConfig, FairnessError> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(FairnessError::InvalidConfig {
                reason: format!("tolerance must be finite and >= 0, got {}", self.tolerance),
            });
        }
        Ok(FairnessConfig { tolerance: self.tolerance })
    }
}

// ---------------------------------------------------------------------------
// FairnessEngine
// ---------------------------------------------------------------------------

/// Computes fairness settlements. Holds configuration only.
#[derive(Debug, Clone, Default)]
pub struct FairnessEngine {
    config: FairnessConfig,
}

impl FairnessEngine {
    /// Create an engine from `config`.
    #[must_use]
    pub fn new(config: FairnessConfig) -> Self {
        Self { config }
    }

    /// Settlement figures with totals recomputed from verified
    /// `contributions`.
    ///
    /// `Member::total_paid` is ignored. Contributions whose member is not in
    /// `members` are skipped.
    #[must_use]
    pub fn calculate_fairness(
        &self,
        members: &[Member],
        contributions: &[Contribution],
        reference_value: f64,
    ) -> FairnessSummary {
        let totals = verified_totals(members, contributions);
        summarize(members, &totals, reference_value)
    }

    /// Settlement figures using the caller's pre-aggregated
    /// `Member::total_paid`.
    ///
    /// Agrees with [`calculate_fairness`](Self::calculate_fairness) whenever
    /// those totals equal the verified contribution sums.
    #[must_use]
    pub fn calculate_fairness_from_totals(
        &self,
        members: &[Member],
        reference_value: f64,
    ) -> FairnessSummary {
        let totals: Vec<f64> = members.iter().map(|m| m.total_paid).collect();
        summarize(members, &totals, reference_value)
    }

    /// Convert signed adjustments into payer-to-receiver transfers.
    ///
    /// Largest payer is matched with largest receiver until one side is
    /// exhausted; amounts within the configured tolerance are dropped. The
    /// sum of transfers into a member equals its positive adjustment, up to
    /// the tolerance.
    #[must_use]
    pub fn settlement_plan(&self, summary: &FairnessSummary) -> Vec<Transfer> {
        let tolerance = self.config.tolerance;
        let mut payers: Vec<(MemberId, f64)> = summary
            .members
            .iter()
            .filter(|m| m.adjustment < -tolerance)
            .map(|m| (m.member_id, -m.adjustment))
            .collect();
        let mut receivers: Vec<(MemberId, f64)> = summary
            .members
            .iter()
            .filter(|m| m.adjustment > tolerance)
            .map(|m| (m.member_id, m.adjustment))
            .collect();
        payers.sort_by(|a, b| b.1.total_cmp(&a.1));
        receivers.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut transfers = Vec::new();
        let (mut p, mut r) = (0, 0);
        while p < payers.len() && r < receivers.len() {
            let amount = payers[p].1.min(receivers[r].1);
            if amount > tolerance {
                transfers.push(Transfer { from: payers[p].0, to: receivers[r].0, amount });
            }
            payers[p].1 -= amount;
            receivers[r].1 -= amount;
            if payers[p].1 <= tolerance {
                p += 1;
            }
            if receivers[r].1 <= tolerance {
                r += 1;
            }
        }

        tracing::debug!(transfers = transfers.len(), "fairness.settlement_plan.built");
        transfers
    }
}

// ---------------------------------------------------------------------------
// Cycle state
// ---------------------------------------------------------------------------

/// `true` iff at least one member is active and every active member has
/// received a payout.
///
/// An empty or all-inactive roster is deliberately *not* complete, so a
/// vacuous truth can never authorize settling an empty group. Callers gate
/// any "apply settlement" action on this value.
#[must_use]
pub fn should_trigger_settlement(members: &[Member]) -> bool {
    let mut active = members.iter().filter(|m| m.is_active).peekable();
    active.peek().is_some() && active.all(|m| m.payout_received)
}

/// Derive where a cycle stands from the roster.
///
/// `settled` is the caller's record that a settlement was applied; it only
/// counts once the cycle is complete.
#[must_use]
pub fn cycle_stage(members: &[Member], settled: bool) -> CycleStage {
    if should_trigger_settlement(members) {
        if settled { CycleStage::Settled } else { CycleStage::CycleComplete }
    } else if members
        .iter()
        .any(|m| m.is_active && (m.payout_received || m.rotation_order.is_some()))
    {
        CycleStage::RotationActive
    } else {
        CycleStage::Accumulating
    }
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Verified contribution sums, indexed like `members`.
fn verified_totals(members: &[Member], contributions: &[Contribution]) -> Vec<f64> {
    let index: HashMap<MemberId, usize> =
        members.iter().enumerate().map(|(i, m)| (m.id, i)).collect();
    let mut totals = vec![0.0; members.len()];
    for contribution in contributions.iter().filter(|c| c.verified) {
        match index.get(&contribution.member_id) {
            Some(&i) => totals[i] += contribution.amount,
            None => tracing::debug!(
                member_id = %contribution.member_id,
                period = %contribution.period,
                "fairness.contribution.unknown_member"
            ),
        }
    }
    totals
}

/// Net positions, adjustments and aggregates over every member passed in.
#[expect(clippy::cast_precision_loss, reason = "member counts are far below 2^52")]
fn summarize(members: &[Member], totals: &[f64], reference_value: f64) -> FairnessSummary {
    let net_positions: Vec<f64> = totals.iter().map(|t| reference_value - t).collect();
    let average_net_position = if members.is_empty() {
        0.0
    } else {
        net_positions.iter().sum::<f64>() / members.len() as f64
    };

    let rows: Vec<MemberFairness> = members
        .iter()
        .zip(totals)
        .zip(&net_positions)
        .map(|((member, &total_paid), &net_position)| MemberFairness {
            member_id: member.id,
            member_name: member.name.clone(),
            total_paid,
            period_received: period_ordinal(member),
            net_position,
            adjustment: average_net_position - net_position,
        })
        .collect();

    let total_pool_collected: f64 = totals.iter().sum();
    let total_payouts_distributed = members.iter().filter(|m| m.payout_received).count();
    let leftover_pot = total_pool_collected - total_payouts_distributed as f64 * reference_value;
    let cycle_complete = should_trigger_settlement(members);

    tracing::info!(
        members = members.len(),
        total_pool_collected,
        total_payouts_distributed,
        leftover_pot,
        cycle_complete,
        "fairness.summary.calculated"
    );

    FairnessSummary {
        members: rows,
        reference_value,
        total_pool_collected,
        total_payouts_distributed,
        average_net_position,
        leftover_pot,
        cycle_complete,
    }
}

/// Rotation rank of a payout recipient; 0 while the payout is outstanding.
fn period_ordinal(member: &Member) -> u32 {
    if member.payout_received { member.rotation_order.unwrap_or(0) } else { 0 }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
