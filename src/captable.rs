//! Cap-table arithmetic: point-in-time ownership against the current
//! round's stored valuation. No dilution modeling, no waterfall.

use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::{cap_table_entry, funding_round};

pub const EQUITY: &str = "equity";
pub const DEBT: &str = "debt";

/// `amount / valuation * 100`, rounded to two decimals.
/// A zero or negative valuation yields 0 rather than Inf/NaN.
pub fn ownership_percentage(amount: i64, valuation: i64) -> f64 {
    if valuation <= 0 {
        return 0.0;
    }
    let pct = amount as f64 / valuation as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CapTableSummary {
    /// Sum of entries typed `equity`
    pub equity_total: i64,
    /// Sum of entries typed `debt`
    pub debt_total: i64,
    pub total_invested: i64,
    pub investor_count: usize,
    /// Open allocation on the current round, 0 when no round exists
    pub open_allocation: i64,
}

pub fn summarize(
    entries: &[cap_table_entry::Model],
    current_round: Option<&funding_round::Model>,
) -> CapTableSummary {
    let mut equity_total = 0;
    let mut debt_total = 0;
    for entry in entries {
        match entry.investment_type.as_str() {
            DEBT => debt_total += entry.amount,
            // Anything unrecognized counts as equity, matching the admin
            // tool's permissive typing of imported rows.
            _ => equity_total += entry.amount,
        }
    }

    CapTableSummary {
        equity_total,
        debt_total,
        total_invested: equity_total + debt_total,
        investor_count: entries.len(),
        open_allocation: current_round.map(|r| r.allocation).unwrap_or(0),
    }
}
