//! Grouping account balances into chart categories
//!
//! A category is the first two segments of an account path
//! (`Expenses:Food:Groceries` lands in `Expenses:Food`). Categories keep the
//! order in which they were first seen.

use indexmap::IndexSet;
use rust_decimal::Decimal;

use crate::error::CoreResult;
use crate::reports::{CategoryTotals, ChartData, ChartSeries, NetWorthSeries};
use crate::types::{amount_overflow, AccountBalances};

/// Leaf name of the bucket collecting accounts with no deeper segment
pub const OVERFLOW_LEAF: &str = "Other";

/// Category for `account`.
///
/// With `collect_bottom_level`, an account that is its own category
/// (`Expenses`, `Expenses:Gifts`) goes to `<root>:Other` instead.
pub fn category_for(account: &str, collect_bottom_level: bool) -> String {
    let category = account.splitn(3, ':').take(2).collect::<Vec<_>>().join(":");
    if collect_bottom_level && category == account {
        let root = account.split(':').next().unwrap_or(account);
        format!("{}:{}", root, OVERFLOW_LEAF)
    } else {
        category
    }
}

/// Stacked chart of one snapshot: a row per account, its amount at its
/// category's slot and zero elsewhere
pub fn aggregate_snapshot(balances: &AccountBalances, collect_bottom_level: bool) -> ChartData {
    let mut categories = IndexSet::new();
    let slots: Vec<usize> = balances
        .accounts()
        .map(|account| categories.insert_full(category_for(account, collect_bottom_level)).0)
        .collect();

    let series = balances
        .iter()
        .zip(slots)
        .map(|((account, amount), slot)| {
            let mut data = vec![Decimal::ZERO; categories.len()];
            data[slot] = amount;
            ChartSeries::new(account, data)
        })
        .collect();

    ChartData::new(categories.into_iter().collect(), series)
}

/// Chart over several snapshots, one per period label.
///
/// Each category becomes a series with one slot per snapshot. Leading empty
/// snapshots are dropped together with their labels.
pub fn aggregate_periods(
    snapshots: &[AccountBalances],
    labels: &[String],
    collect_bottom_level: bool,
) -> CoreResult<ChartData> {
    let skip = snapshots.iter().take_while(|s| s.is_empty()).count();
    let snapshots = &snapshots[skip..];
    let labels: Vec<String> = labels.iter().skip(skip).cloned().collect();

    let mut categories = IndexSet::new();
    let mut series: Vec<ChartSeries> = Vec::new();
    for (slot, balances) in snapshots.iter().enumerate() {
        for (account, amount) in balances.iter() {
            let (i, added) = categories.insert_full(category_for(account, collect_bottom_level));
            if added {
                series.push(ChartSeries::new(&categories[i], vec![Decimal::ZERO; snapshots.len()]));
            }
            let cell = &mut series[i].data[slot];
            *cell = cell.checked_add(amount).ok_or_else(|| amount_overflow(&categories[i]))?;
        }
    }

    Ok(ChartData::new(labels, series))
}

/// Summed amount per category, for a pie chart
pub fn category_totals(
    balances: &AccountBalances,
    collect_bottom_level: bool,
) -> CoreResult<CategoryTotals> {
    let mut categories = IndexSet::new();
    let mut values = Vec::new();
    for (account, amount) in balances.iter() {
        let (i, added) = categories.insert_full(category_for(account, collect_bottom_level));
        if added {
            values.push(Decimal::ZERO);
        }
        values[i] = values[i].checked_add(amount).ok_or_else(|| amount_overflow(&categories[i]))?;
    }
    Ok(CategoryTotals {
        labels: categories.into_iter().collect(),
        values,
    })
}

/// Sum of the accounts under any of `prefixes`, per snapshot.
///
/// Leading zero points are dropped with their labels.
pub fn net_worth_series(
    snapshots: &[AccountBalances],
    labels: &[String],
    prefixes: &[String],
) -> CoreResult<NetWorthSeries> {
    let values = snapshots
        .iter()
        .zip(labels)
        .map(|(balances, label)| {
            balances
                .iter()
                .filter(|(account, _)| prefixes.iter().any(|p| account.starts_with(p.as_str())))
                .try_fold(Decimal::ZERO, |sum, (_, amount)| {
                    sum.checked_add(amount)
                        .ok_or_else(|| amount_overflow(&format!("net worth at {}", label)))
                })
        })
        .collect::<CoreResult<Vec<Decimal>>>()?;

    let skip = values.iter().take_while(|v| v.is_zero()).count();
    Ok(NetWorthSeries {
        labels: labels.iter().skip(skip).cloned().collect(),
        values: values.into_iter().skip(skip).collect(),
    })
}
