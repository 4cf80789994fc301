//! Chart API endpoints - JSON payloads for a charting front-end

use axum::extract::{Query, State};
use axum::Json;
use ledgerdash_core::{CalendarDate, CategoryTotals, ChartData, NetWorthSeries, PeriodKind};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// `?period=month&date=2024/3&collect_bottom_level=true`
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseQuery {
    pub period: Option<String>,
    pub date: Option<String>,
    pub collect_bottom_level: Option<bool>,
}

impl ExpenseQuery {
    fn period(&self) -> ApiResult<PeriodKind> {
        match self.period.as_deref() {
            None | Some("") => Ok(PeriodKind::default()),
            Some(text) => text.parse().map_err(ApiError::bad_request),
        }
    }

    fn date(&self) -> ApiResult<CalendarDate> {
        match self.date.as_deref() {
            None | Some("") => Ok(CalendarDate::today()),
            Some(text) => Ok(text.parse::<CalendarDate>()?),
        }
    }
}

/// `?year=2024&collect_bottom_level=true`
#[derive(Debug, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
    pub collect_bottom_level: Option<bool>,
}

impl YearQuery {
    fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| CalendarDate::today().year())
    }
}

pub async fn api_expense_chart(
    State(state): State<AppState>,
    Query(query): Query<ExpenseQuery>,
) -> ApiResult<Json<ChartData>> {
    let chart = state
        .dashboard
        .expense_chart(query.period()?, query.date()?, query.collect_bottom_level)
        .await?;
    Ok(Json(chart))
}

pub async fn api_expense_totals(
    State(state): State<AppState>,
    Query(query): Query<ExpenseQuery>,
) -> ApiResult<Json<CategoryTotals>> {
    let totals = state
        .dashboard
        .expense_totals(query.period()?, query.date()?, query.collect_bottom_level)
        .await?;
    Ok(Json(totals))
}

pub async fn api_monthly_chart(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> ApiResult<Json<ChartData>> {
    let chart = state
        .dashboard
        .monthly_expense_chart(query.year(), query.collect_bottom_level)
        .await?;
    Ok(Json(chart))
}

pub async fn api_net_worth(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> ApiResult<Json<NetWorthSeries>> {
    Ok(Json(state.dashboard.net_worth(query.year()).await?))
}
