use std::sync::{Arc, Mutex};

use super::domain::{EligibilityRule, MealSessionId, RuleId};
use super::providers::{ProviderError, RuleProvider};

/// Error enumeration for rule catalogue lifecycle failures.
#[derive(Debug, thiserror::Error)]
pub enum RuleStoreError {
    #[error("rule already exists")]
    Conflict,
    #[error("rule not found")]
    NotFound,
    #[error("invalid rule: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
struct StoredRule {
    rule: EligibilityRule,
    created_seq: u64,
}

#[derive(Default)]
struct StoreInner {
    rules: Vec<StoredRule>,
    next_seq: u64,
}

/// In-memory rule catalogue. Implements the read contract the engine consumes
/// plus the owner-side lifecycle the administrative surface drives.
///
/// Every rule carries a creation stamp assigned at insert and retained across
/// updates; it breaks priority ties, so evaluation order stays reproducible
/// no matter how often a rule is edited. Backing storage is a plain vector
/// with linear scans, adequate at tens-of-rules scale.
#[derive(Default, Clone)]
pub struct InMemoryRuleStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. Malformed rules are rejected here so evaluation never has
    /// to tolerate one.
    pub fn insert(&self, rule: EligibilityRule) -> Result<(), RuleStoreError> {
        Self::validate(&rule)?;
        let mut guard = self.inner.lock().expect("rule store mutex poisoned");
        if guard.rules.iter().any(|stored| stored.rule.id == rule.id) {
            return Err(RuleStoreError::Conflict);
        }
        let created_seq = guard.next_seq;
        guard.next_seq += 1;
        guard.rules.push(StoredRule { rule, created_seq });
        Ok(())
    }

    /// Replace a rule wholesale by id. The creation stamp is retained, so a
    /// priority tie still resolves the way it did before the edit.
    pub fn update(&self, rule: EligibilityRule) -> Result<(), RuleStoreError> {
        Self::validate(&rule)?;
        let mut guard = self.inner.lock().expect("rule store mutex poisoned");
        match guard.rules.iter_mut().find(|stored| stored.rule.id == rule.id) {
            Some(stored) => {
                stored.rule = rule;
                Ok(())
            }
            None => Err(RuleStoreError::NotFound),
        }
    }

    /// Mark a rule deleted without forgetting it. Soft-deleted rules never
    /// reach evaluation but keep their id reserved.
    pub fn soft_delete(&self, id: &RuleId) -> Result<(), RuleStoreError> {
        let mut guard = self.inner.lock().expect("rule store mutex poisoned");
        match guard.rules.iter_mut().find(|stored| stored.rule.id == *id) {
            Some(stored) => {
                stored.rule.is_deleted = true;
                Ok(())
            }
            None => Err(RuleStoreError::NotFound),
        }
    }

    fn validate(rule: &EligibilityRule) -> Result<(), RuleStoreError> {
        if let Some(window) = &rule.time_window {
            if window.is_inverted() {
                return Err(RuleStoreError::Invalid(format!(
                    "time window {} starts after it ends",
                    window.label()
                )));
            }
        }
        Ok(())
    }
}

impl RuleProvider for InMemoryRuleStore {
    fn rules_for_session(
        &self,
        session: &MealSessionId,
    ) -> Result<Vec<EligibilityRule>, ProviderError> {
        let guard = self.inner.lock().expect("rule store mutex poisoned");
        let mut scoped: Vec<&StoredRule> = guard
            .rules
            .iter()
            .filter(|stored| {
                stored.rule.meal_session_ref.id == *session && stored.rule.is_evaluable()
            })
            .collect();
        scoped.sort_by(|a, b| {
            b.rule
                .priority
                .cmp(&a.rule.priority)
                .then(a.created_seq.cmp(&b.created_seq))
        });
        Ok(scoped.into_iter().map(|stored| stored.rule.clone()).collect())
    }
}
