//! Keyword matcher - maps free text to a probable cause and action.
//!
//! Two-stage algorithm:
//! 1. Critical override: any power-failure keyword returns the power-supply
//!    record immediately, regardless of other keyword overlap. Power failure
//!    is always surfaced first.
//! 2. Best-overlap scoring: count keyword substring hits per record, keep the
//!    strictly greatest count. Ties keep the first-seen record, so catalog
//!    order is the tie-break.

use crate::catalog::CauseCatalog;

/// Power-failure keywords that bypass scoring entirely.
const CRITICAL_POWER_KEYWORDS: &[&str] = &["no power", "won't turn on", "dead", "power issue"];

/// Sentinel returned when nothing in the catalog overlaps the statement.
pub const NO_MATCH_ACTION: &str =
    "No specific match found in the database. Please fill out the form for human review.";
pub const NO_MATCH_CAUSE: &str = "Uncategorized/Complex Issue";

/// Sentinel for an empty confirmed-cause selection.
pub const NO_CAUSE_SELECTED: &str =
    "No cause selected. Please choose at least one probable cause before proceeding.";

/// Result of matching a statement against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub action: String,
    pub cause: String,
}

/// Match a problem statement to the most probable cause.
pub fn match_statement(catalog: &CauseCatalog, text: &str) -> MatchOutcome {
    let statement = text.to_lowercase();

    if CRITICAL_POWER_KEYWORDS.iter().any(|kw| statement.contains(kw)) {
        // Falls through to scoring only if the catalog lacks the record.
        if let Some(record) = catalog.power_supply_record() {
            return MatchOutcome {
                action: record.action.to_string(),
                cause: record.cause.to_string(),
            };
        }
    }

    let mut best: Option<(&str, &str)> = None;
    let mut best_score = 0usize;

    for record in catalog.records() {
        let score = record
            .keywords
            .iter()
            .filter(|kw| statement.contains(*kw))
            .count();
        if score > best_score {
            best_score = score;
            best = Some((record.action, record.cause));
        }
    }

    match best {
        Some((action, cause)) => MatchOutcome {
            action: action.to_string(),
            cause: cause.to_string(),
        },
        None => MatchOutcome {
            action: NO_MATCH_ACTION.to_string(),
            cause: NO_MATCH_CAUSE.to_string(),
        },
    }
}

/// Aggregate the actions for a set of user-confirmed causes.
///
/// One bullet per cause, blank-line separated. Causes the catalog does not
/// know get a "no action on file" bullet rather than being dropped silently.
pub fn action_bundle(catalog: &CauseCatalog, causes: &[String]) -> String {
    if causes.is_empty() {
        return NO_CAUSE_SELECTED.to_string();
    }

    causes
        .iter()
        .map(|cause| match catalog.action_for(cause) {
            Some(action) => format!("- {} Action: {}", cause, action),
            None => format!("- {} Action: No action on file for this cause.", cause),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
