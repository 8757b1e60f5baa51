// Rust guideline compliant 2026-10-19

//! Roster snapshot loading for the demo binary.
//!
//! Stands in for the storage layer: a JSON file (or a built-in demo group)
//! supplies the members, contributions and reference payout value.

use std::path::Path;

use anyhow::Context as _;
use chrono::{Months, NaiveDate};
use domain::{Contribution, Member, MemberId};
use serde::Deserialize;

/// Everything the core needs about one stokvel.
#[derive(Debug, Clone, Deserialize)]
pub struct Roster {
    /// Value of one rotation payout (e.g. the price of the vehicle).
    pub reference_value: f64,
    pub members: Vec<Member>,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
}

impl Roster {
    /// Read a roster from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not a valid roster.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parse a roster from JSON text.
    ///
    /// # Errors
    ///
    /// Fails when `raw` is not a valid roster document.
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let roster: Self = serde_json::from_str(raw).context("invalid roster JSON")?;
        tracing::debug!(
            members = roster.members.len(),
            contributions = roster.contributions.len(),
            "roster.loaded"
        );
        Ok(roster)
    }

    /// Four-member demo group as of `today`, with monthly R2 000 payments.
    ///
    /// Thandi and Sipho have already received their payout; Ayanda joined
    /// this month; Bongani is inactive.
    #[must_use]
    pub fn demo(today: NaiveDate) -> Self {
        let months_ago = |m: u32| today.checked_sub_months(Months::new(m)).unwrap_or(today);
        let people = [
            ("Thandi", 24, true, Some(1)),
            ("Sipho", 12, true, Some(2)),
            ("Ayanda", 0, false, None),
            ("Bongani", 6, false, None),
        ];

        let mut members = Vec::with_capacity(people.len());
        let mut contributions = Vec::new();
        for (name, tenure, received, order) in people {
            let id = MemberId::new_v4();
            for month in 0..tenure {
                contributions.push(Contribution {
                    member_id: id,
                    period: months_ago(month).format("%Y-%m").to_string(),
                    amount: 2_000.0,
                    // The latest month is still awaiting verification.
                    verified: month > 0,
                });
            }
            let total_paid = contributions
                .iter()
                .filter(|c| c.member_id == id && c.verified)
                .map(|c| c.amount)
                .sum();
            members.push(Member {
                id,
                name: name.to_owned(),
                is_active: name != "Bongani",
                join_date: months_ago(tenure),
                total_paid,
                payout_received: received,
                rotation_order: order,
                payout_received_period: order.map(|o| format!("round-{o}")),
            });
        }

        Self { reference_value: 40_000.0, members, contributions }
    }
}
