use chrono::NaiveDate;

use super::domain::{
    AttendanceFact, EligibilityRule, EmployeeId, EmployeeSnapshot, MealSessionId,
    MealSessionSnapshot,
};

/// Infrastructure fault raised by a reference-data provider.
///
/// A missing record is not a fault: lookups answer `Ok(None)` for that and the
/// engine turns it into a denial verdict. `Unavailable` means the provider
/// itself could not answer and the verification must fail as an error.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Read model over the employee directory.
pub trait EmployeeDirectory: Send + Sync {
    fn find_employee(&self, id: &EmployeeId) -> Result<Option<EmployeeSnapshot>, ProviderError>;
}

/// Read model over configured meal sessions.
pub trait MealSessionProvider: Send + Sync {
    fn find_session(
        &self,
        id: &MealSessionId,
    ) -> Result<Option<MealSessionSnapshot>, ProviderError>;
}

/// Read model over attendance bookings. `Ok(None)` means no record exists for
/// the day, which evaluation treats the same as not present.
pub trait AttendanceProvider: Send + Sync {
    fn attendance_on(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceFact>, ProviderError>;
}

/// Read model over the daily consumption ledger.
pub trait MealLedger: Send + Sync {
    /// Number of meals already recorded for the employee on the given date.
    fn meals_taken_on(&self, employee: &EmployeeId, date: NaiveDate)
        -> Result<u32, ProviderError>;
}

/// Read model over the rule catalogue.
pub trait RuleProvider: Send + Sync {
    /// Rules governing the session that are active and not deleted, ordered by
    /// priority descending with creation order breaking ties. Callers evaluate
    /// in the order given.
    fn rules_for_session(
        &self,
        session: &MealSessionId,
    ) -> Result<Vec<EligibilityRule>, ProviderError>;
}
