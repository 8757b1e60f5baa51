// Rust guideline compliant 2026-10-19

//! Shared domain types for the stokvel rotation and fairness core.
//!
//! Defines `Member`, `Contribution`, the rotation and settlement value objects,
//! `AllocationError`, and the hexagonal `Clock` port. Randomness is taken as
//! any `rand::Rng` by the `rotation` crate.
//! The `rotation` and `fairness` crates depend on this crate; no other
//! workspace crate is imported here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Opaque, stable member identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub uuid::Uuid);

impl MemberId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl From<uuid::Uuid> for MemberId {
    fn from(id: uuid::Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stokvel member as supplied by the caller.
///
/// The core never owns or persists members; it reads a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Stable identifier.
    pub id: MemberId,
    /// Display name.
    pub name: String,
    /// Inactive members are never eligible for rotation and never count
    /// toward cycle completion.
    pub is_active: bool,
    /// Date the member joined the stokvel; drives the tenure score.
    pub join_date: NaiveDate,
    /// Verified contributions as aggregated by the caller.
    pub total_paid: f64,
    /// `true` once the member has received their rotation payout.
    pub payout_received: bool,
    /// Previously assigned rank. `None` sorts as 0 in manual ordering.
    pub rotation_order: Option<u32>,
    /// Label of the period in which the payout was made.
    pub payout_received_period: Option<String>,
}

/// A single contribution made by one member for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Owning member.
    pub member_id: MemberId,
    /// Period label (e.g. `"2026-03"`).
    pub period: String,
    /// Contributed amount.
    pub amount: f64,
    /// Only verified contributions count toward settlement totals.
    pub verified: bool,
}

// ---------------------------------------------------------------------------
// Rotation configuration
// ---------------------------------------------------------------------------

/// How payout ranks are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationMethod {
    /// Unbiased shuffle.
    Random,
    /// Sampling without replacement, biased by tenure and contributions.
    Weighted,
    /// Existing `rotation_order`, no randomness.
    Manual,
}

impl fmt::Display for RotationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Random => "random",
            Self::Weighted => "weighted",
            Self::Manual => "manual",
        };
        f.write_str(name)
    }
}

impl FromStr for RotationMethod {
    type Err = AllocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "weighted" => Ok(Self::Weighted),
            "manual" => Ok(Self::Manual),
            other => Err(AllocationError::InvalidConfig {
                reason: format!("unknown rotation method {other:?}"),
            }),
        }
    }
}

/// Tenure/contribution weight pair used by [`RotationMethod::Weighted`].
///
/// Each weight lies in `[0, 1]`. They need not sum to 1: the draw samples
/// proportionally to the resulting scores, not to a forced distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weighting {
    tenure_weight: f64,
    contribution_weight: f64,
}

impl Weighting {
    /// Build a weighting pair.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::InvalidConfig`] when either weight is not a
    /// finite value in `[0, 1]`.
    pub fn new(tenure_weight: f64, contribution_weight: f64) -> Result<Self, AllocationError> {
        for (label, value) in [("tenure", tenure_weight), ("contribution", contribution_weight)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AllocationError::InvalidConfig {
                    reason: format!("{label} weight must be within [0, 1], got {value}"),
                });
            }
        }
        Ok(Self { tenure_weight, contribution_weight })
    }

    /// Weight applied to the tenure score.
    #[must_use]
    pub fn tenure_weight(&self) -> f64 {
        self.tenure_weight
    }

    /// Weight applied to the contribution score.
    #[must_use]
    pub fn contribution_weight(&self) -> f64 {
        self.contribution_weight
    }
}

impl Default for Weighting {
    /// 0.4 tenure / 0.6 contribution.
    fn default() -> Self {
        Self { tenure_weight: 0.4, contribution_weight: 0.6 }
    }
}

/// Caller-constructed description of one rotation draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationConfig {
    /// Assignment method.
    pub method: RotationMethod,
    /// Drop members who already received a payout before allocating.
    pub exclude_payout_recipients: bool,
    /// Weights for the weighted method. `None` uses the allocator default.
    pub weighting: Option<Weighting>,
}

impl RotationConfig {
    /// Config for `method`, keeping payout recipients and default weights.
    #[must_use]
    pub fn new(method: RotationMethod) -> Self {
        Self { method, exclude_payout_recipients: false, weighting: None }
    }

    /// Set whether payout recipients are removed from the pool.
    #[must_use]
    pub fn with_exclude_payout_recipients(mut self, exclude: bool) -> Self {
        self.exclude_payout_recipients = exclude;
        self
    }

    /// Override the weighting pair.
    #[must_use]
    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = Some(weighting);
        self
    }
}

// ---------------------------------------------------------------------------
// Rotation result
// ---------------------------------------------------------------------------

/// Audit token stamped on every entry of one draw.
///
/// Serialized as a plain string; the manual method uses the literal `"manual"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DrawSeed {
    /// No randomness was consulted.
    Manual,
    /// Opaque token for a random or weighted draw. Not a replay key.
    Token(String),
}

impl DrawSeed {
    /// Literal used for manual draws.
    pub const MANUAL: &'static str = "manual";
}

impl fmt::Display for DrawSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => f.write_str(Self::MANUAL),
            Self::Token(token) => f.write_str(token),
        }
    }
}

impl From<DrawSeed> for String {
    fn from(seed: DrawSeed) -> Self {
        seed.to_string()
    }
}

impl From<String> for DrawSeed {
    fn from(raw: String) -> Self {
        if raw == Self::MANUAL { Self::Manual } else { Self::Token(raw) }
    }
}

/// One ranked member in a [`RotationResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationEntry {
    pub member_id: MemberId,
    pub member_name: String,
    /// Payout position, starting at 1.
    pub rank: u32,
    /// Shared by every entry of the draw.
    pub draw_timestamp: DateTime<Utc>,
    /// Shared by every entry of the draw.
    pub seed: DrawSeed,
    /// Score that drove the pick; only set by the weighted method.
    pub weight_score: Option<f64>,
}

/// Why a member was left out of the eligible pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    Inactive,
    PayoutReceived,
}

/// A member dropped before allocation, with the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedMember {
    pub member_id: MemberId,
    pub reason: ExclusionReason,
}

/// Output of one rotation draw. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationResult {
    pub method: RotationMethod,
    /// Ordered by rank ascending.
    pub entries: Vec<RotationEntry>,
    pub excluded: Vec<ExcludedMember>,
    pub eligible_count: usize,
    /// Who conducted the draw.
    pub actor_id: String,
    pub timestamp: DateTime<Utc>,
}

impl RotationResult {
    /// Rank assigned to `member_id`, if the member was eligible.
    #[must_use]
    pub fn rank_of(&self, member_id: MemberId) -> Option<u32> {
        self.entries.iter().find(|e| e.member_id == member_id).map(|e| e.rank)
    }

    /// Identifiers of every excluded member.
    pub fn excluded_ids(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.excluded.iter().map(|e| e.member_id)
    }
}

// ---------------------------------------------------------------------------
// Fairness
// ---------------------------------------------------------------------------

/// Settlement figures for one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberFairness {
    pub member_id: MemberId,
    pub member_name: String,
    /// Sum of verified contributions.
    pub total_paid: f64,
    /// Ordinal of the payout period; 0 when not yet received.
    pub period_received: u32,
    /// `reference_value - total_paid`.
    pub net_position: f64,
    /// `average_net_position - net_position`. Positive: receives from the
    /// pool. Negative: pays into the pool.
    pub adjustment: f64,
}

/// Output of a fairness calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessSummary {
    pub members: Vec<MemberFairness>,
    pub reference_value: f64,
    pub total_pool_collected: f64,
    /// Number of members flagged `payout_received`.
    pub total_payouts_distributed: usize,
    pub average_net_position: f64,
    /// `total_pool_collected - total_payouts_distributed * reference_value`.
    /// Negative values are a shortfall, not an error.
    pub leftover_pot: f64,
    pub cycle_complete: bool,
}

impl FairnessSummary {
    /// Sum of all adjustments; zero up to floating-point error.
    #[must_use]
    pub fn adjustment_sum(&self) -> f64 {
        self.members.iter().map(|m| m.adjustment).sum()
    }
}

/// One payer-to-receiver movement in a settlement plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    /// Member with a negative adjustment.
    pub from: MemberId,
    /// Member with a positive adjustment.
    pub to: MemberId,
    pub amount: f64,
}

/// Conceptual lifecycle of a stokvel cycle.
///
/// `Accumulating -> RotationActive -> CycleComplete -> Settled`. The core
/// derives the stage; it never enforces transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStage {
    Accumulating,
    RotationActive,
    CycleComplete,
    Settled,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by the rotation allocator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocationError {
    /// No member is left after filtering.
    #[error("no eligible members for rotation")]
    EmptyPool,
    /// A caller-supplied configuration value breaks a precondition.
    #[error("invalid rotation configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Hexagonal port: wall-clock time for draw timestamps and tenure.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}
