//! Domain-specific assertion macros for eoslog harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear *which* grouping guarantee was violated.

// ---------------------------------------------------------------------------
// Group assertions
// ---------------------------------------------------------------------------

/// Assert that the entries of a `LogGroup` are numbered exactly `1..=count`.
///
/// ```rust
/// assert_gap_free!(service.group("g1").unwrap());
/// ```
#[macro_export]
macro_rules! assert_gap_free {
    ($group:expr) => {{
        let group: &eoslog_core::LogGroup = $group;
        let indices: Vec<usize> = group.items().iter().map(|e| e.index()).collect();
        let expected: Vec<usize> = (1..=group.count()).collect();
        if indices != expected {
            panic!(
                "assert_gap_free! failed for group {:?}:\n  expected: {:?}\n  actual:   {:?}",
                group.id(),
                expected,
                indices
            );
        }
    }};
}

/// Assert a group's counters in one go.
///
/// ```rust
/// assert_counters!(group, count = 2, errors = 0, sql = 1);
/// ```
#[macro_export]
macro_rules! assert_counters {
    ($group:expr, count = $count:expr, errors = $errors:expr, sql = $sql:expr) => {{
        let group: &eoslog_core::LogGroup = $group;
        pretty_assertions::assert_eq!(
            (group.count(), group.errors_count(), group.sql_count()),
            ($count, $errors, $sql),
            "counters (count, errors, sql) of group {:?}",
            group.id()
        );
        pretty_assertions::assert_eq!(
            group.count(),
            group.items().len(),
            "count and items.len() diverged in group {:?}",
            group.id()
        );
    }};
}

// ---------------------------------------------------------------------------
// Notification assertions
// ---------------------------------------------------------------------------

/// Assert the sequence of notification kinds.
///
/// ```rust
/// assert_kinds!(recorded.all(), [Log, Debug, NewLogEntry, ConnectionError]);
/// ```
#[macro_export]
macro_rules! assert_kinds {
    ($notifications:expr, [$($kind:ident),* $(,)?]) => {{
        let actual: Vec<eoslog_core::NotificationKind> =
            $notifications.iter().map(|n| n.kind()).collect();
        let expected: Vec<eoslog_core::NotificationKind> =
            vec![$(eoslog_core::NotificationKind::$kind),*];
        pretty_assertions::assert_eq!(actual, expected, "notification kinds");
    }};
}
