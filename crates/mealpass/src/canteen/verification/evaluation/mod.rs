mod gates;
mod matching;
mod verdict;

pub use verdict::{EligibilityVerdict, MatchedRule};

use chrono::NaiveDateTime;

use super::domain::{AttendanceFact, EligibilityRule, EmployeeSnapshot, MealSessionSnapshot};
use matching::RuleMatch;

/// Pre-fetched inputs for one evaluation.
///
/// The engine performs no I/O of its own; the orchestration shell resolves
/// snapshots and facts up front and injects them here. Missing lookups arrive
/// as `None` and become denial verdicts, never errors. `rules` must hold the
/// active, non-deleted rules for the session in evaluation order, highest
/// priority first with creation order breaking ties.
#[derive(Debug, Clone)]
pub struct EvaluationContext<'a> {
    pub employee: Option<&'a EmployeeSnapshot>,
    pub meal_session: Option<&'a MealSessionSnapshot>,
    pub rules: &'a [EligibilityRule],
    pub attendance: Option<AttendanceFact>,
    pub meals_taken_today: u32,
    pub evaluated_at: NaiveDateTime,
}

/// Stateless evaluator deciding meal authorization from injected snapshots.
///
/// Evaluation is a pure function of its context: the same inputs always
/// produce an identical verdict, and concurrent evaluations share nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityEngine;

impl EligibilityEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run only the pre-rule admission gates. `Some` is an early denial the
    /// caller can return without fetching attendance, ledger, or rule data;
    /// `None` means both gates passed. `evaluate` re-runs the same gates, so
    /// the two paths cannot disagree.
    pub fn preflight(
        &self,
        employee: Option<&EmployeeSnapshot>,
        meal_session: Option<&MealSessionSnapshot>,
        at: NaiveDateTime,
    ) -> Option<EligibilityVerdict> {
        if let Err(reason) = gates::admit_session(meal_session, at) {
            return Some(EligibilityVerdict::denied(reason, at));
        }
        if let Err(reason) = gates::admit_employee(employee) {
            return Some(EligibilityVerdict::denied(reason, at));
        }
        None
    }

    /// Decide authorization for one context.
    ///
    /// Gates first, then first-match-wins over the ordered rules: the first
    /// rule whose every constrained dimension passes is cited and iteration
    /// stops, so lower-priority rules never override it. When nothing
    /// matches, the verdict carries every accumulated miss reason verbatim,
    /// or the no-rules explanation if the list was empty.
    pub fn evaluate(&self, context: &EvaluationContext<'_>) -> EligibilityVerdict {
        let at = context.evaluated_at;

        if let Err(reason) = gates::admit_session(context.meal_session, at) {
            return EligibilityVerdict::denied(reason, at);
        }
        let employee = match gates::admit_employee(context.employee) {
            Ok(employee) => employee,
            Err(reason) => return EligibilityVerdict::denied(reason, at),
        };

        if context.rules.is_empty() {
            return EligibilityVerdict::denied("No matching eligibility rule found".to_string(), at);
        }

        let mut misses: Vec<String> = Vec::new();
        for rule in context.rules {
            match matching::match_rule(
                rule,
                employee,
                context.attendance,
                context.meals_taken_today,
                at.time(),
            ) {
                RuleMatch::Matched => return EligibilityVerdict::authorized(rule, at),
                RuleMatch::Missed(reasons) => misses.extend(reasons),
            }
        }

        EligibilityVerdict::denied(misses.join("; "), at)
    }
}
