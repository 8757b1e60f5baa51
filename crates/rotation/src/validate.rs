// Rust guideline compliant 2026-10-19

//! Post-hoc structural checks on a [`RotationResult`].
//!
//! Reports only; nothing here repairs a result.

use std::collections::HashSet;
use std::fmt;

use domain::{DrawSeed, MemberId, RotationMethod, RotationResult};

/// One structural problem found in a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The result ranks nobody.
    EmptyResults,
    /// More than one entry holds `rank`.
    DuplicateRank { rank: u32 },
    /// No entry holds `rank`, although it lies in `1..=N`.
    MissingRank { rank: u32 },
    /// `rank` lies outside `1..=max`.
    RankOutOfRange { rank: u32, max: usize },
    /// The entry at `position` does not follow its predecessor's rank.
    OutOfOrder { position: usize },
    /// `eligible_count` disagrees with the number of entries.
    EligibleCountMismatch { declared: usize, actual: usize },
    /// An entry's timestamp differs from the draw timestamp.
    TimestampMismatch { member_id: MemberId },
    /// An entry's seed does not match the method or the rest of the draw.
    SeedMismatch { member_id: MemberId },
    /// Weight score missing on a weighted draw, or present on another method.
    WeightScoreMismatch { member_id: MemberId },
    /// The same member is ranked twice.
    DuplicateMember { member_id: MemberId },
    /// A member is both ranked and excluded.
    RankedAndExcluded { member_id: MemberId },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyResults => write!(f, "result contains no entries"),
            Self::DuplicateRank { rank } => write!(f, "rank {rank} is assigned more than once"),
            Self::MissingRank { rank } => write!(f, "rank {rank} is missing"),
            Self::RankOutOfRange { rank, max } => {
                write!(f, "rank {rank} is outside 1..={max}")
            }
            Self::OutOfOrder { position } => {
                write!(f, "entry at position {position} is out of rank order")
            }
            Self::EligibleCountMismatch { declared, actual } => {
                write!(f, "eligible count {declared} does not match {actual} entries")
            }
            Self::TimestampMismatch { member_id } => {
                write!(f, "member {member_id} has a different draw timestamp")
            }
            Self::SeedMismatch { member_id } => {
                write!(f, "member {member_id} has an inconsistent seed")
            }
            Self::WeightScoreMismatch { member_id } => {
                write!(f, "member {member_id} has an unexpected weight score")
            }
            Self::DuplicateMember { member_id } => {
                write!(f, "member {member_id} is ranked more than once")
            }
            Self::RankedAndExcluded { member_id } => {
                write!(f, "member {member_id} is both ranked and excluded")
            }
        }
    }
}

/// Outcome of [`validate`]: valid iff no issue was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
}

/// Check rank uniqueness and contiguity from 1, rank ordering, non-empty
/// entries, and that timestamps, seeds and weight scores are consistent with
/// the draw.
#[must_use]
pub fn validate(result: &RotationResult) -> ValidationReport {
    let mut issues = Vec::new();
    let n = result.entries.len();

    if n == 0 {
        issues.push(ValidationIssue::EmptyResults);
    }
    if result.eligible_count != n {
        issues.push(ValidationIssue::EligibleCountMismatch {
            declared: result.eligible_count,
            actual: n,
        });
    }

    issues.extend(check_ranks(result));
    issues.extend(check_entries(result));

    let excluded: HashSet<MemberId> = result.excluded_ids().collect();
    let mut ranked = HashSet::with_capacity(n);
    for entry in &result.entries {
        if !ranked.insert(entry.member_id) {
            issues.push(ValidationIssue::DuplicateMember { member_id: entry.member_id });
        }
        if excluded.contains(&entry.member_id) {
            issues.push(ValidationIssue::RankedAndExcluded { member_id: entry.member_id });
        }
    }

    if !issues.is_empty() {
        tracing::debug!(issues = issues.len(), "rotation.validate.failed");
    }
    ValidationReport { is_valid: issues.is_empty(), issues }
}

fn check_ranks(result: &RotationResult) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let n = result.entries.len();
    let mut seen = HashSet::with_capacity(n);

    for entry in &result.entries {
        let in_range = usize::try_from(entry.rank).is_ok_and(|r| (1..=n).contains(&r));
        if !in_range {
            issues.push(ValidationIssue::RankOutOfRange { rank: entry.rank, max: n });
        } else if !seen.insert(entry.rank) {
            issues.push(ValidationIssue::DuplicateRank { rank: entry.rank });
        }
    }
    for rank in (1_u32..).take(n) {
        if !seen.contains(&rank) {
            issues.push(ValidationIssue::MissingRank { rank });
        }
    }
    for (position, pair) in result.entries.windows(2).enumerate() {
        if pair[1].rank <= pair[0].rank {
            issues.push(ValidationIssue::OutOfOrder { position: position + 1 });
        }
    }
    issues
}

fn check_entries(result: &RotationResult) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let shared_seed = result.entries.first().map(|e| &e.seed);

    for entry in &result.entries {
        let member_id = entry.member_id;
        if entry.draw_timestamp != result.timestamp {
            issues.push(ValidationIssue::TimestampMismatch { member_id });
        }

        let seed_ok = match (&entry.seed, result.method) {
            (DrawSeed::Manual, RotationMethod::Manual) => true,
            (DrawSeed::Token(token), RotationMethod::Random | RotationMethod::Weighted) => {
                !token.is_empty() && shared_seed == Some(&entry.seed)
            }
            _ => false,
        };
        if !seed_ok {
            issues.push(ValidationIssue::SeedMismatch { member_id });
        }

        let weight_ok = match (entry.weight_score, result.method) {
            (Some(w), RotationMethod::Weighted) => w.is_finite(),
            (None, RotationMethod::Random | RotationMethod::Manual) => true,
            _ => false,
        };
        if !weight_ok {
            issues.push(ValidationIssue::WeightScoreMismatch { member_id });
        }
    }
    issues
}
