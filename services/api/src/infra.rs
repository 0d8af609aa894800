use chrono::{NaiveDate, NaiveTime};
use mealpass::canteen::verification::domain::{
    AttendanceFact, EmployeeId, EmployeeSnapshot, MealSessionId, MealSessionSnapshot,
};
use mealpass::canteen::verification::providers::{
    AttendanceProvider, EmployeeDirectory, MealLedger, MealSessionProvider, ProviderError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Employee directory backed by process memory. Stands in for the HR system
/// the verification service would normally read from.
#[derive(Default, Clone)]
pub(crate) struct InMemoryEmployeeDirectory {
    employees: Arc<Mutex<HashMap<EmployeeId, EmployeeSnapshot>>>,
}

impl InMemoryEmployeeDirectory {
    pub(crate) fn put(&self, employee: EmployeeSnapshot) {
        let mut guard = self.employees.lock().expect("directory mutex poisoned");
        guard.insert(employee.id.clone(), employee);
    }
}

impl EmployeeDirectory for InMemoryEmployeeDirectory {
    fn find_employee(&self, id: &EmployeeId) -> Result<Option<EmployeeSnapshot>, ProviderError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryMealSessionCatalog {
    sessions: Arc<Mutex<HashMap<MealSessionId, MealSessionSnapshot>>>,
}

impl InMemoryMealSessionCatalog {
    pub(crate) fn put(&self, session: MealSessionSnapshot) {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.insert(session.id.clone(), session);
    }
}

impl MealSessionProvider for InMemoryMealSessionCatalog {
    fn find_session(
        &self,
        id: &MealSessionId,
    ) -> Result<Option<MealSessionSnapshot>, ProviderError> {
        let guard = self.sessions.lock().expect("session mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAttendanceLog {
    facts: Arc<Mutex<HashMap<(EmployeeId, NaiveDate), AttendanceFact>>>,
}

impl InMemoryAttendanceLog {
    pub(crate) fn mark(&self, employee: &EmployeeId, date: NaiveDate, fact: AttendanceFact) {
        let mut guard = self.facts.lock().expect("attendance mutex poisoned");
        guard.insert((employee.clone(), date), fact);
    }
}

impl AttendanceProvider for InMemoryAttendanceLog {
    fn attendance_on(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceFact>, ProviderError> {
        let guard = self.facts.lock().expect("attendance mutex poisoned");
        Ok(guard.get(&(employee.clone(), date)).copied())
    }
}

/// Per-day meal consumption counts. Verification only reads this; recording
/// happens after an authorized verdict, outside the engine.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMealLedger {
    counts: Arc<Mutex<HashMap<(EmployeeId, NaiveDate), u32>>>,
}

impl InMemoryMealLedger {
    pub(crate) fn record_meal(&self, employee: &EmployeeId, date: NaiveDate) -> u32 {
        let mut guard = self.counts.lock().expect("ledger mutex poisoned");
        let count = guard.entry((employee.clone(), date)).or_insert(0);
        *count += 1;
        *count
    }
}

impl MealLedger for InMemoryMealLedger {
    fn meals_taken_on(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
    ) -> Result<u32, ProviderError> {
        let guard = self.counts.lock().expect("ledger mutex poisoned");
        Ok(guard.get(&(employee.clone(), date)).copied().unwrap_or(0))
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|err| format!("failed to parse '{raw}' as HH:MM ({err})"))
}
