//! Orderings over task collections.
//!
//! Both sorts are stable. `by_deadline` puts tasks without a parsable
//! deadline date after every dated task, in their original relative order.

use std::cmp::Ordering;

use crate::task::Task;

/// Earliest deadline first; undated and unparsable dates last.
pub fn by_deadline(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(compare_deadline);
    tasks
}

/// High (1) before Medium (2) before Low (3).
pub fn by_priority(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by_key(|task| task.priority);
    tasks
}

fn compare_deadline(left: &Task, right: &Task) -> Ordering {
    match (left.deadline_date.datetime(), right.deadline_date.datetime()) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
