//! Date-range filtering.

use crate::domain::{DateRange, Series};

/// Observations with `start <= date <= end`, in their original order.
///
/// An inverted range (start after end) simply matches nothing.
pub fn filter_range(series: &Series, range: &DateRange) -> Series {
    series.iter().filter(|o| range.contains(o.date)).copied().collect()
}
