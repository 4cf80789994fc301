//! Chart payloads handed to the rendering side

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One named data series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub data: Vec<Decimal>,
}

impl ChartSeries {
    pub fn new(name: impl Into<String>, data: Vec<Decimal>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Series shown when there is nothing to plot
    pub fn placeholder() -> Self {
        Self::new("", Vec::new())
    }
}

/// Categories along the x axis plus the series plotted against them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    /// Build chart data; an empty series list becomes a single placeholder
    pub fn new(categories: Vec<String>, mut series: Vec<ChartSeries>) -> Self {
        if series.is_empty() {
            series.push(ChartSeries::placeholder());
        }
        Self { categories, series }
    }
}

/// Per-category totals for a pie chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub labels: Vec<String>,
    pub values: Vec<Decimal>,
}

/// Net worth at the end of each period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetWorthSeries {
    pub labels: Vec<String>,
    pub values: Vec<Decimal>,
}
