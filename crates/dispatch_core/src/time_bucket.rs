//! Time Bucketing (S2). Grounded on
//! `orders_optimizer.py::cluster_orders_by_time_window`'s exact
//! minute-flooring: `.replace(minute=(minute//window)*window, second=0,
//! microsecond=0)`.

use chrono::{DateTime, Timelike, Utc};
use indexmap::IndexMap;

use crate::models::Order;

/// Floors `desired_delivery_time` to the nearest multiple of
/// `window_minutes` (minute field only; hour/day untouched, seconds and
/// subseconds zeroed).
pub fn bucket_timestamp(timestamp: DateTime<Utc>, window_minutes: i64) -> DateTime<Utc> {
    let minute = timestamp.minute() as i64;
    let floored_minute = (minute / window_minutes) * window_minutes;
    timestamp
        .with_minute(floored_minute as u32)
        .expect("floored minute is in range")
        .with_second(0)
        .expect("second 0 is valid")
        .with_nanosecond(0)
        .expect("nanosecond 0 is valid")
}

/// Groups orders by quantised desired delivery time, preserving bucket
/// insertion order (first order seen for a bucket determines its
/// position).
pub fn bucket_orders(orders: &[Order], window_minutes: i64) -> IndexMap<DateTime<Utc>, Vec<Order>> {
    let mut buckets: IndexMap<DateTime<Utc>, Vec<Order>> = IndexMap::new();
    for order in orders {
        let key = bucket_timestamp(order.desired_delivery_time, window_minutes);
        buckets.entry(key).or_default().push(order.clone());
    }
    buckets
}
