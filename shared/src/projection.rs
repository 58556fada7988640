//! Stock status and valuation projector
//!
//! Pure functions over entity-store snapshots. Nothing here touches storage;
//! the dashboard and alerting layers feed in what they have read.

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::{MovementDirection, MovementType, StockMovement};
use crate::types::DateRange;

pub const DEFAULT_CHART_WINDOW_DAYS: u32 = 14;

/// Longest daily chart the projector will build
pub const MAX_CHART_WINDOW_DAYS: u32 = 366;

/// Derived stock classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    Overstock,
    Normal,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "out_of_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::Overstock => "overstock",
            StockStatus::Normal => "normal",
        }
    }
}

/// Classify stock against thresholds.
///
/// Checks run in priority order: out of stock, low, overstock, normal. A
/// quantity of 0 is out of stock even when `min` is 0.
pub fn classify_stock(quantity: i64, min: i64, max: Option<i64>) -> StockStatus {
    if quantity <= 0 {
        StockStatus::OutOfStock
    } else if quantity <= min {
        StockStatus::LowStock
    } else if matches!(max, Some(max) if quantity >= max) {
        StockStatus::Overstock
    } else {
        StockStatus::Normal
    }
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Value of one stock line, rounded to cents
pub fn stock_value(cost_price: Decimal, quantity: i64) -> Decimal {
    round_money(cost_price * Decimal::from(quantity))
}

/// Total value of many stock lines.
///
/// Sums the exact products and rounds once at the end.
pub fn total_stock_value<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, i64)>,
{
    let sum: Decimal = lines
        .into_iter()
        .map(|(cost, quantity)| cost * Decimal::from(quantity))
        .sum();
    round_money(sum)
}

/// Daily in/out totals over a fixed window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementChart {
    pub labels: Vec<String>,
    pub stock_in: Vec<i64>,
    pub stock_out: Vec<i64>,
}

/// The calendar window of `window_days` days ending on `today`, inclusive.
///
/// The length is clamped to `1..=MAX_CHART_WINDOW_DAYS`, and the start never
/// goes before the first representable date.
pub fn chart_window(today: NaiveDate, window_days: u32) -> DateRange {
    let span = window_days.clamp(1, MAX_CHART_WINDOW_DAYS) - 1;
    DateRange {
        start: today
            .checked_sub_days(Days::new(u64::from(span)))
            .unwrap_or(NaiveDate::MIN),
        end: today,
    }
}

/// Bucket movements into a contiguous daily window ending on `today` (UTC).
///
/// `in`/`return` count towards `stock_in`, `out`/`transfer` towards
/// `stock_out`, adjustments towards neither. Days without movements are
/// zero-filled so every series has exactly `window_days` entries. A window of
/// 0 is treated as 1 and anything above `MAX_CHART_WINDOW_DAYS` as the maximum.
pub fn aggregate_movements_by_day(
    movements: &[StockMovement],
    window_days: u32,
    today: NaiveDate,
) -> MovementChart {
    let window = chart_window(today, window_days);
    let days: Vec<NaiveDate> = window.start.iter_days().take_while(|d| *d <= window.end).collect();

    let mut buckets: HashMap<NaiveDate, (i64, i64)> = days.iter().map(|d| (*d, (0, 0))).collect();

    for movement in movements {
        let day = movement.created_at.date_naive();
        let Some(bucket) = buckets.get_mut(&day) else {
            continue;
        };
        match movement.movement_type.direction() {
            Some(MovementDirection::In) => bucket.0 += movement.quantity.abs(),
            Some(MovementDirection::Out) => bucket.1 += movement.quantity.abs(),
            None => {}
        }
    }

    let mut chart = MovementChart {
        labels: Vec::with_capacity(days.len()),
        stock_in: Vec::with_capacity(days.len()),
        stock_out: Vec::with_capacity(days.len()),
    };
    for day in days {
        let (stock_in, stock_out) = buckets[&day];
        chart.labels.push(day.format("%b %-d").to_string());
        chart.stock_in.push(stock_in);
        chart.stock_out.push(stock_out);
    }
    chart
}

/// Count of items per stock status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevelCount {
    pub status: StockStatus,
    pub count: i64,
}

/// Count `(quantity, min, max)` snapshots per status; statuses with no items are omitted
pub fn stock_level_counts<I>(items: I) -> Vec<StockLevelCount>
where
    I: IntoIterator<Item = (i64, i64, Option<i64>)>,
{
    let mut counts: BTreeMap<StockStatus, i64> = BTreeMap::new();
    for (quantity, min, max) in items {
        *counts.entry(classify_stock(quantity, min, max)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(status, count)| StockLevelCount { status, count })
        .collect()
}

/// Movement count and absolute quantity for one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementTypeTotal {
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub count: i64,
    pub total_quantity: i64,
}

/// Per-type totals, in the order of `MovementType::ALL`; unused types are omitted
pub fn movement_type_totals(movements: &[StockMovement]) -> Vec<MovementTypeTotal> {
    MovementType::ALL
        .iter()
        .filter_map(|t| {
            let matching = movements.iter().filter(|m| m.movement_type == *t);
            let (count, total_quantity) =
                matching.fold((0i64, 0i64), |(c, q), m| (c + 1, q + m.quantity.abs()));
            (count > 0).then_some(MovementTypeTotal {
                movement_type: *t,
                count,
                total_quantity,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn movement_on(day: NaiveDate, t: MovementType, quantity: i64) -> StockMovement {
        StockMovement {
            id: crate::ids::generate_id(Some("mov")),
            product_id: "prd_1".to_string(),
            variant_id: None,
            movement_type: t,
            quantity,
            stock_before: 0,
            stock_after: 0,
            unit_cost: None,
            reference: None,
            reason: None,
            supplier_id: None,
            created_at: Utc.from_utc_datetime(&day.and_hms_opt(10, 30, 0).unwrap()),
        }
    }

    #[test]
    fn test_classify_stock_priority() {
        assert_eq!(classify_stock(0, 5, None), StockStatus::OutOfStock);
        assert_eq!(classify_stock(0, 0, None), StockStatus::OutOfStock);
        assert_eq!(classify_stock(5, 5, None), StockStatus::LowStock);
        assert_eq!(classify_stock(10, 5, Some(8)), StockStatus::Overstock);
        assert_eq!(classify_stock(6, 5, Some(10)), StockStatus::Normal);
        assert_eq!(classify_stock(8, 5, Some(8)), StockStatus::Overstock);
        assert_eq!(classify_stock(3, 5, Some(2)), StockStatus::LowStock);
    }

    #[test]
    fn test_stock_value() {
        assert_eq!(stock_value(dec("12.5"), 4), dec("50.00"));
        assert_eq!(stock_value(dec("0.005"), 1), dec("0.01"));
    }

    #[test]
    fn test_total_stock_value_rounds_once() {
        let lines = vec![(dec("10"), 3), (dec("7.333"), 2)];
        assert_eq!(total_stock_value(lines), dec("44.67"));

        // Per-row rounding would give 0.02 here
        let half_cents = vec![(dec("0.005"), 1), (dec("0.005"), 1)];
        assert_eq!(total_stock_value(half_cents), dec("0.01"));
    }

    #[test]
    fn test_total_stock_value_empty() {
        assert_eq!(total_stock_value(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn test_chart_window_length_with_no_movements() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let chart = aggregate_movements_by_day(&[], 14, today);
        assert_eq!(chart.labels.len(), 14);
        assert_eq!(chart.stock_in, vec![0; 14]);
        assert_eq!(chart.stock_out, vec![0; 14]);
        assert_eq!(chart.labels.first().unwrap(), "Oct 1");
        assert_eq!(chart.labels.last().unwrap(), "Oct 14");
    }

    #[test]
    fn test_chart_buckets_by_direction() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let yesterday = today.pred_opt().unwrap();
        let long_ago = today - Duration::days(30);
        let movements = vec![
            movement_on(today, MovementType::In, 5),
            movement_on(today, MovementType::Return, 2),
            movement_on(today, MovementType::Out, 3),
            movement_on(yesterday, MovementType::Transfer, 4),
            movement_on(yesterday, MovementType::Adjustment, -9),
            movement_on(long_ago, MovementType::In, 100),
        ];
        let chart = aggregate_movements_by_day(&movements, 14, today);
        assert_eq!(chart.labels.len(), 14);
        assert_eq!(chart.stock_in[13], 7);
        assert_eq!(chart.stock_out[13], 3);
        assert_eq!(chart.stock_in[12], 0);
        assert_eq!(chart.stock_out[12], 4);
        assert_eq!(chart.stock_in.iter().sum::<i64>(), 7);
        // Window crosses the month boundary
        assert_eq!(chart.labels[12], "Mar 1");
        assert_eq!(chart.labels[11], "Feb 28");
    }

    #[test]
    fn test_zero_window_is_one_day() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let chart = aggregate_movements_by_day(&[], 0, today);
        assert_eq!(chart.labels, vec!["Jan 1".to_string()]);
    }

    #[test]
    fn test_oversized_window_is_clamped() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let chart = aggregate_movements_by_day(&[], u32::MAX, today);
        assert_eq!(chart.labels.len(), MAX_CHART_WINDOW_DAYS as usize);
        assert_eq!(chart.labels.last().unwrap(), "Oct 14");
    }

    #[test]
    fn test_window_near_first_date_does_not_underflow() {
        let window = chart_window(NaiveDate::MIN, 30);
        assert_eq!(window.start, NaiveDate::MIN);
        assert_eq!(window.end, NaiveDate::MIN);
    }

    #[test]
    fn test_stock_level_counts() {
        let counts = stock_level_counts(vec![(0, 5, None), (3, 5, None), (4, 5, None), (20, 5, Some(10))]);
        assert_eq!(
            counts,
            vec![
                StockLevelCount { status: StockStatus::OutOfStock, count: 1 },
                StockLevelCount { status: StockStatus::LowStock, count: 2 },
                StockLevelCount { status: StockStatus::Overstock, count: 1 },
            ]
        );
    }

    #[test]
    fn test_movement_type_totals() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let movements = vec![
            movement_on(today, MovementType::In, 5),
            movement_on(today, MovementType::In, 5),
            movement_on(today, MovementType::Adjustment, -2),
        ];
        let totals = movement_type_totals(&movements);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].movement_type, MovementType::In);
        assert_eq!(totals[0].count, 2);
        assert_eq!(totals[0].total_quantity, 10);
        assert_eq!(totals[1].movement_type, MovementType::Adjustment);
        assert_eq!(totals[1].total_quantity, 2);
    }
}
