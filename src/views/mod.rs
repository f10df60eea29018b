/// Per-chart aggregation: one pure transform per chart.
///
/// Every function takes a [`FilteredView`](crate::data::filter::FilteredView)
/// and returns an owned chart view that the UI draws and drops. The two 3D
/// views take the whole [`Dataset`](crate::data::model::Dataset) instead:
/// they ignore the sidebar filters.

pub mod hierarchy;
pub mod ranking;
pub mod stats;

use std::cmp::Ordering;

use crate::data::model::GameRecord;

/// Descending order with `None` after every known value.
pub fn desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by estimated downloads, biggest first, unknown last.
pub fn by_downloads_desc<'a>(records: impl IntoIterator<Item = &'a GameRecord>) -> Vec<&'a GameRecord> {
    let mut sorted: Vec<&GameRecord> = records.into_iter().collect();
    sorted.sort_by(|a, b| desc_nulls_last(a.estimated_downloads, b.estimated_downloads));
    sorted
}
