//! Profit reporting: period resolution, summary and trend aggregation,
//! expense breakdown, the persisted per-day rollup, and display formatting.
//!
//! The reporting entry points (`get_profit`, `get_daily_trend`,
//! `get_expense_breakdown`) degrade to zeroed output when the underlying read
//! fails, so one broken panel never takes down the whole page. The swallowed
//! cause is always logged.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::warn;

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{
    CategoryShare, CustomRange, DailySummary, DailyTrendPoint, DateRange, Expense,
    ExpenseBreakdown, ExpenseCategory, Order, OrderStatus, Period, ProfitData,
};
use crate::services::{expenses, orders};

fn resolve_local(dt: chrono::NaiveDateTime) -> DateTime<Local> {
    match dt.and_local_timezone(Local) {
        LocalResult::Single(t) => t,
        LocalResult::Ambiguous(earliest, _) => earliest,
        // a DST gap has no local reading; fall back to interpreting as UTC
        LocalResult::None => Local.from_utc_datetime(&dt),
    }
}

pub(crate) fn local_day_start(day: NaiveDate) -> DateTime<Local> {
    resolve_local(day.and_time(NaiveTime::MIN))
}

pub(crate) fn local_day_end(day: NaiveDate) -> DateTime<Local> {
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap();
    resolve_local(day.and_time(end_of_day))
}

/// Resolves a named period to a closed `[start, end]` interval on local day
/// boundaries. `week` and `month` are trailing windows of 7 and 30 calendar
/// days including today. `Custom` requires both bounds.
pub fn resolve_range(period: Period, custom: Option<CustomRange>) -> AppResult<DateRange> {
    let today = Local::now().date_naive();

    let (start_day, end_day) = match period {
        Period::Today => (today, today),
        Period::Week => (today - Duration::days(6), today),
        Period::Month => (today - Duration::days(29), today),
        Period::Custom => {
            let range = custom.ok_or_else(|| {
                AppError::InvalidArgument(
                    "custom period requires both start and end dates".to_string(),
                )
            })?;
            (range.start_date, range.end_date)
        }
    };

    Ok(DateRange {
        start: local_day_start(start_day),
        end: local_day_end(end_day),
    })
}

/// Reduces one interval's orders and expenses to `ProfitData`. Cancelled
/// orders contribute nothing. Margin on zero revenue is defined as 0 rather
/// than undefined; that is a policy choice, not arithmetic.
pub fn summarize(orders: &[Order], expenses: &[Expense]) -> ProfitData {
    let mut total_revenue = 0.0;
    let mut total_orders = 0;

    for order in orders {
        if order.status == OrderStatus::Cancelled {
            continue;
        }
        total_revenue += order.total_amount;
        total_orders += 1;
    }

    let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
    let net_profit = total_revenue - total_expenses;
    let profit_margin = if total_revenue > 0.0 {
        net_profit / total_revenue * 100.0
    } else {
        0.0
    };

    ProfitData {
        total_revenue,
        total_expenses,
        net_profit,
        profit_margin,
        total_orders,
    }
}

fn fetch_range(db: &Database, range: DateRange) -> AppResult<(Vec<Order>, Vec<Expense>)> {
    let fetched_orders = orders::get_orders_in_range(db, range.start, range.end)?;
    let fetched_expenses = expenses::get_expenses_in_range(db, range.start, range.end)?;
    Ok((fetched_orders, fetched_expenses))
}

pub fn get_profit(
    db: &Database,
    period: Period,
    custom: Option<CustomRange>,
) -> AppResult<ProfitData> {
    let range = resolve_range(period, custom)?;

    match fetch_range(db, range) {
        Ok((orders, expenses)) => Ok(summarize(&orders, &expenses)),
        Err(err) => {
            warn!(error = %err, "profit summary fetch failed, returning zeroed data");
            Ok(ProfitData::default())
        }
    }
}

/// Buckets an already-fetched record set per local calendar day, oldest
/// first, zero-filling days without activity. Pure: the same inputs always
/// produce the same output, in any order.
pub fn trend_for_window(
    orders: &[Order],
    expenses: &[Expense],
    start_day: NaiveDate,
    days: u32,
) -> Vec<DailyTrendPoint> {
    let mut points = Vec::with_capacity(days as usize);

    for offset in 0..days {
        let day = start_day + Duration::days(offset as i64);

        let revenue: f64 = orders
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .filter(|o| o.order_date.with_timezone(&Local).date_naive() == day)
            .map(|o| o.total_amount)
            .sum();

        let day_expenses: f64 = expenses
            .iter()
            .filter(|e| e.date.with_timezone(&Local).date_naive() == day)
            .map(|e| e.amount)
            .sum();

        points.push(DailyTrendPoint {
            date: day,
            revenue,
            expenses: day_expenses,
            profit: revenue - day_expenses,
        });
    }

    points
}

fn zero_trend(start_day: NaiveDate, days: u32) -> Vec<DailyTrendPoint> {
    (0..days)
        .map(|offset| DailyTrendPoint {
            date: start_day + Duration::days(offset as i64),
            revenue: 0.0,
            expenses: 0.0,
            profit: 0.0,
        })
        .collect()
}

/// Daily revenue/expense/profit series for the trailing window of `days`
/// calendar days ending today. The window is fetched once per entity kind
/// and grouped in memory; a 30-day trend costs two reads, not sixty.
pub fn get_daily_trend(db: &Database, days: u32) -> AppResult<Vec<DailyTrendPoint>> {
    if days == 0 {
        return Err(AppError::InvalidArgument(
            "trend window must cover at least one day".to_string(),
        ));
    }

    let today = Local::now().date_naive();
    let start_day = today - Duration::days(days as i64 - 1);
    let range = DateRange {
        start: local_day_start(start_day),
        end: local_day_end(today),
    };

    match fetch_range(db, range) {
        Ok((orders, expenses)) => Ok(trend_for_window(&orders, &expenses, start_day, days)),
        Err(err) => {
            warn!(error = %err, "daily trend fetch failed, returning zeroed series");
            Ok(zero_trend(start_day, days))
        }
    }
}

/// Groups an interval's expenses over the fixed category set. Categories
/// without spending are dropped; the rest are sorted by descending amount.
pub fn breakdown_expenses(expenses: &[Expense]) -> ExpenseBreakdown {
    let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();

    let mut breakdown: Vec<CategoryShare> = ExpenseCategory::ALL
        .iter()
        .map(|&category| {
            let amount: f64 = expenses
                .iter()
                .filter(|e| e.category == category)
                .map(|e| e.amount)
                .sum();
            CategoryShare {
                category,
                amount,
                percentage: if total_expenses > 0.0 {
                    amount / total_expenses * 100.0
                } else {
                    0.0
                },
            }
        })
        .filter(|share| share.amount > 0.0)
        .collect();

    breakdown.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    ExpenseBreakdown {
        breakdown,
        total_expenses,
    }
}

pub fn get_expense_breakdown(
    db: &Database,
    period: Period,
    custom: Option<CustomRange>,
) -> AppResult<ExpenseBreakdown> {
    let range = resolve_range(period, custom)?;

    match expenses::get_expenses_in_range(db, range.start, range.end) {
        Ok(expenses) => Ok(breakdown_expenses(&expenses)),
        Err(err) => {
            warn!(error = %err, "expense breakdown fetch failed, returning empty breakdown");
            Ok(ExpenseBreakdown::default())
        }
    }
}

fn row_to_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<DailySummary> {
    Ok(DailySummary {
        id: row.get(0)?,
        date: row.get(1)?,
        total_orders: row.get(2)?,
        total_revenue: row.get(3)?,
        total_expenses: row.get(4)?,
        net_profit: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub fn get_daily_summary(db: &Database, date: NaiveDate) -> AppResult<Option<DailySummary>> {
    let conn = db.conn()?;

    let summary = conn
        .query_row(
            "SELECT id, date, total_orders, total_revenue, total_expenses, net_profit, \
             created_at FROM daily_summaries WHERE date = ?1",
            [date],
            row_to_summary,
        )
        .optional()?;

    Ok(summary)
}

/// Recomputes one day's rollup from the order and expense records and
/// upserts it by date. This is a write path, so fetch failures propagate
/// instead of degrading.
pub fn calculate_and_store_daily_summary(db: &Database, date: NaiveDate) -> AppResult<DailySummary> {
    let range = DateRange {
        start: local_day_start(date),
        end: local_day_end(date),
    };

    let (orders, expenses) = fetch_range(db, range)?;
    let profit = summarize(&orders, &expenses);

    let conn = db.conn()?;

    conn.execute(
        "INSERT INTO daily_summaries (date, total_orders, total_revenue, total_expenses, \
         net_profit, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
         ON CONFLICT(date) DO UPDATE SET \
         total_orders = excluded.total_orders, \
         total_revenue = excluded.total_revenue, \
         total_expenses = excluded.total_expenses, \
         net_profit = excluded.net_profit",
        params![
            date,
            profit.total_orders,
            profit.total_revenue,
            profit.total_expenses,
            profit.net_profit,
            Utc::now(),
        ],
    )?;

    let stored = conn
        .query_row(
            "SELECT id, date, total_orders, total_revenue, total_expenses, net_profit, \
             created_at FROM daily_summaries WHERE date = ?1",
            [date],
            row_to_summary,
        )
        .optional()?
        .ok_or(AppError::NotFound("daily summary"))?;

    Ok(stored)
}

/// Formats an amount as `symbol` plus Indian-style digit grouping (last
/// three digits, then pairs), no fraction digits. The symbol is
/// configuration supplied by the caller, usually from `Settings`.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let rounded = amount.round();
    let digits = format!("{}", rounded.abs() as i64);
    let grouped = group_indian(&digits);

    if rounded < 0.0 {
        format!("-{}{}", symbol, grouped)
    } else {
        format!("{}{}", symbol, grouped)
    }
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut idx = head.len();

    while idx > 2 {
        groups.push(&head[idx - 2..idx]);
        idx -= 2;
    }
    groups.push(&head[..idx]);
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}
