//! Forward-only date lookups into a security's history.
//!
//! A simulation visits dates in increasing order, so every lookup resumes
//! from the index found on the previous step instead of searching the whole
//! history. Callers must never pass a date earlier than one already used
//! with the same `from` index.

use crate::domain::history::HistoryRecord;
use chrono::NaiveDate;

/// Highest index whose date is on or before `date`, never below `from`.
///
/// Scans forward from `from + 1`. Returns `None` only when the history is
/// empty or its very first record is already after `date`.
pub fn latest_index_on_or_before(
    history: &[HistoryRecord],
    date: NaiveDate,
    from: usize,
) -> Option<usize> {
    let first = history.get(from)?;
    if from == 0 && first.date > date {
        return None;
    }

    let mut result = from;
    for (i, record) in history.iter().enumerate().skip(from + 1) {
        if record.date <= date {
            result = i;
        } else {
            break;
        }
    }
    Some(result)
}

/// First record date strictly after `date`, scanning from `from`.
///
/// `None` means no later record exists.
pub fn earliest_date_after(
    history: &[HistoryRecord],
    date: NaiveDate,
    from: usize,
) -> Option<NaiveDate> {
    history
        .iter()
        .skip(from)
        .map(|r| r.date)
        .find(|&d| d > date)
}

/// Like [`latest_index_on_or_before`], but `None` when the scan did not move
/// past `from`: the security has no newer record on or before `date`, and the
/// caller keeps its previous index.
pub fn close_index_on_or_before(
    history: &[HistoryRecord],
    date: NaiveDate,
    from: usize,
) -> Option<usize> {
    let mut result = from;
    for (i, record) in history.iter().enumerate().skip(from + 1) {
        if record.date <= date {
            result = i;
        } else {
            break;
        }
    }

    if result != from { Some(result) } else { None }
}
