use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::super::domain::{EligibilityRule, RuleId};

/// Authorization decision for one employee, one meal session, one instant.
///
/// Constructed fresh per evaluation and never mutated afterwards; callers may
/// log or persist it but the engine keeps no copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityVerdict {
    pub eligible: bool,
    pub reason: String,
    pub matched_rule: Option<MatchedRule>,
    pub evaluated_at: NaiveDateTime,
}

impl EligibilityVerdict {
    pub(crate) fn authorized(rule: &EligibilityRule, at: NaiveDateTime) -> Self {
        Self {
            eligible: true,
            reason: format!("Eligible via rule: {}", rule.name),
            matched_rule: Some(MatchedRule::cite(rule)),
            evaluated_at: at,
        }
    }

    pub(crate) fn denied(reason: String, at: NaiveDateTime) -> Self {
        Self {
            eligible: false,
            reason,
            matched_rule: None,
            evaluated_at: at,
        }
    }

    /// Kiosk lamp color, a pure function of the decision.
    pub fn display_color(&self) -> &'static str {
        if self.eligible {
            "green"
        } else {
            "red"
        }
    }

    /// Kiosk banner text, likewise purely presentational.
    pub fn kiosk_message(&self) -> &'static str {
        if self.eligible {
            "Meal Authorized"
        } else {
            "Not Authorized"
        }
    }
}

/// Citation of the rule that granted authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedRule {
    pub id: RuleId,
    pub name: String,
    pub priority: i32,
}

impl MatchedRule {
    fn cite(rule: &EligibilityRule) -> Self {
        Self {
            id: rule.id.clone(),
            name: rule.name.clone(),
            priority: rule.priority,
        }
    }
}
