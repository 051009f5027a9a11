use chrono::Utc;
use dealflow::captable::{ownership_percentage, summarize};
use dealflow::entities::{cap_table_entry, funding_round};
use uuid::Uuid;

fn entry(amount: i64, investment_type: &str) -> cap_table_entry::Model {
    cap_table_entry::Model {
        id: 1,
        company_id: Uuid::new_v4(),
        investor_name: "Test Investor".to_string(),
        email: None,
        amount,
        round_stage: "seed".to_string(),
        investment_type: investment_type.to_string(),
        share_price: None,
        share_count: None,
        is_investment: true,
        created_at: Utc::now(),
    }
}

fn round(valuation: i64, allocation: i64) -> funding_round::Model {
    funding_round::Model {
        id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        stage: "seed".to_string(),
        valuation,
        allocation,
        is_current: true,
        created_at: Utc::now(),
    }
}

#[test]
fn test_ownership_is_amount_over_valuation() {
    assert_eq!(ownership_percentage(100_000, 1_000_000), 10.00);
    assert_eq!(ownership_percentage(250_000, 1_000_000), 25.00);
    assert_eq!(ownership_percentage(1_000_000, 1_000_000), 100.00);
}

#[test]
fn test_ownership_rounds_to_two_decimals() {
    // 100_000 / 3_000_000 = 3.3333...%
    assert_eq!(ownership_percentage(100_000, 3_000_000), 3.33);
    // 200_000 / 3_000_000 = 6.6666...%
    assert_eq!(ownership_percentage(200_000, 3_000_000), 6.67);
}

#[test]
fn test_zero_valuation_yields_zero_not_infinity() {
    assert_eq!(ownership_percentage(100_000, 0), 0.0);
    assert_eq!(ownership_percentage(100_000, -5), 0.0);
    assert_eq!(ownership_percentage(0, 0), 0.0);
}

#[test]
fn test_summary_splits_equity_and_debt() {
    let entries = vec![
        entry(100_000, "equity"),
        entry(50_000, "equity"),
        entry(25_000, "debt"),
    ];
    let current = round(1_000_000, 400_000);

    let summary = summarize(&entries, Some(&current));
    assert_eq!(summary.equity_total, 150_000);
    assert_eq!(summary.debt_total, 25_000);
    assert_eq!(summary.total_invested, 175_000);
    assert_eq!(summary.investor_count, 3);
    assert_eq!(summary.open_allocation, 400_000);
}

#[test]
fn test_summary_without_a_round_has_zero_allocation() {
    let entries = vec![entry(10_000, "equity")];
    let summary = summarize(&entries, None);
    assert_eq!(summary.open_allocation, 0);
    assert_eq!(summary.total_invested, 10_000);
}

#[test]
fn test_unknown_investment_type_counts_as_equity() {
    let entries = vec![entry(30_000, "safe")];
    let summary = summarize(&entries, None);
    assert_eq!(summary.equity_total, 30_000);
    assert_eq!(summary.debt_total, 0);
}

#[test]
fn test_empty_cap_table_summary() {
    let summary = summarize(&[], None);
    assert_eq!(summary.total_invested, 0);
    assert_eq!(summary.investor_count, 0);
}
