//! Meal eligibility verification: the rule model, the pure decision engine,
//! and the orchestration shell that resolves reference data around it.

pub mod domain;
pub(crate) mod evaluation;
pub mod providers;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    AttendanceFact, DepartmentId, EligibilityRule, EmployeeId, EmployeeSnapshot, EmployeeStatus,
    EmploymentType, MealSessionId, MealSessionSnapshot, RuleApplicability, RuleId, SessionRef,
    ShiftId, TimeWindow, TimeWindowError,
};
pub use evaluation::{EligibilityEngine, EligibilityVerdict, EvaluationContext, MatchedRule};
pub use providers::{
    AttendanceProvider, EmployeeDirectory, MealLedger, MealSessionProvider, ProviderError,
    RuleProvider,
};
pub use router::verification_router;
pub use service::{
    EmployeeView, MealSessionView, MealVerificationService, VerificationError, VerificationOutcome,
    VerificationRequest,
};
pub use store::{InMemoryRuleStore, RuleStoreError};
