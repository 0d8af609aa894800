use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::canteen::verification::domain::{
    AttendanceFact, DepartmentId, EligibilityRule, EmployeeId, EmployeeSnapshot, EmployeeStatus,
    EmploymentType, MealSessionId, MealSessionSnapshot, RuleApplicability, RuleId, SessionRef,
    ShiftId,
};
use crate::canteen::verification::providers::{
    AttendanceProvider, EmployeeDirectory, MealLedger, MealSessionProvider, ProviderError,
    RuleProvider,
};
use crate::canteen::verification::store::InMemoryRuleStore;
use crate::canteen::verification::{MealVerificationService, VerificationRequest};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date")
}

pub(super) fn at(hour: u32, minute: u32) -> NaiveDateTime {
    today()
        .and_hms_opt(hour, minute, 0)
        .expect("valid wall-clock time")
}

pub(super) fn hhmm(raw: &str) -> NaiveTime {
    NaiveTime::parse_from_str(raw, "%H:%M").expect("valid HH:mm literal")
}

pub(super) fn employee() -> EmployeeSnapshot {
    EmployeeSnapshot {
        id: EmployeeId("emp-100".to_string()),
        name: "Asha Verma".to_string(),
        employee_code: "EMP-100".to_string(),
        status: EmployeeStatus::Active,
        shift_id: Some(ShiftId("shift-morning".to_string())),
        department_id: Some(DepartmentId("dept-assembly".to_string())),
        employment_type: EmploymentType::Permanent,
    }
}

pub(super) fn lunch_session() -> MealSessionSnapshot {
    MealSessionSnapshot {
        id: MealSessionId("sess-lunch".to_string()),
        name: "Lunch".to_string(),
        start_time: hhmm("12:00"),
        end_time: hhmm("14:00"),
        is_active: true,
    }
}

/// Unrestricted active rule scoped to the lunch session; tests tighten the
/// dimensions they exercise.
pub(super) fn lunch_rule(id: &str, priority: i32) -> EligibilityRule {
    EligibilityRule {
        id: RuleId(id.to_string()),
        name: format!("Rule {id}"),
        meal_session_ref: SessionRef {
            id: MealSessionId("sess-lunch".to_string()),
            name: "Lunch".to_string(),
        },
        applicability: RuleApplicability::default(),
        requires_attendance: false,
        requires_overtime: false,
        time_window: None,
        max_meals_per_day: None,
        priority,
        is_active: true,
        is_deleted: false,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    employees: Arc<Mutex<HashMap<EmployeeId, EmployeeSnapshot>>>,
}

impl MemoryDirectory {
    pub(super) fn put(&self, employee: EmployeeSnapshot) {
        self.employees
            .lock()
            .expect("directory mutex poisoned")
            .insert(employee.id.clone(), employee);
    }
}

impl EmployeeDirectory for MemoryDirectory {
    fn find_employee(&self, id: &EmployeeId) -> Result<Option<EmployeeSnapshot>, ProviderError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySessions {
    sessions: Arc<Mutex<HashMap<MealSessionId, MealSessionSnapshot>>>,
}

impl MemorySessions {
    pub(super) fn put(&self, session: MealSessionSnapshot) {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .insert(session.id.clone(), session);
    }
}

impl MealSessionProvider for MemorySessions {
    fn find_session(
        &self,
        id: &MealSessionId,
    ) -> Result<Option<MealSessionSnapshot>, ProviderError> {
        let guard = self.sessions.lock().expect("session mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAttendance {
    facts: Arc<Mutex<HashMap<(EmployeeId, NaiveDate), AttendanceFact>>>,
}

impl MemoryAttendance {
    pub(super) fn mark(&self, employee: &EmployeeId, date: NaiveDate, fact: AttendanceFact) {
        self.facts
            .lock()
            .expect("attendance mutex poisoned")
            .insert((employee.clone(), date), fact);
    }
}

impl AttendanceProvider for MemoryAttendance {
    fn attendance_on(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceFact>, ProviderError> {
        let guard = self.facts.lock().expect("attendance mutex poisoned");
        Ok(guard.get(&(employee.clone(), date)).copied())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryLedger {
    counts: Arc<Mutex<HashMap<(EmployeeId, NaiveDate), u32>>>,
}

impl MemoryLedger {
    pub(super) fn set_count(&self, employee: &EmployeeId, date: NaiveDate, count: u32) {
        self.counts
            .lock()
            .expect("ledger mutex poisoned")
            .insert((employee.clone(), date), count);
    }
}

impl MealLedger for MemoryLedger {
    fn meals_taken_on(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
    ) -> Result<u32, ProviderError> {
        let guard = self.counts.lock().expect("ledger mutex poisoned");
        Ok(guard.get(&(employee.clone(), date)).copied().unwrap_or(0))
    }
}

/// Fake standing in for any provider that cannot answer.
pub(super) struct FaultyProvider;

impl EmployeeDirectory for FaultyProvider {
    fn find_employee(&self, _id: &EmployeeId) -> Result<Option<EmployeeSnapshot>, ProviderError> {
        Err(ProviderError::Unavailable("directory offline".to_string()))
    }
}

impl MealSessionProvider for FaultyProvider {
    fn find_session(
        &self,
        _id: &MealSessionId,
    ) -> Result<Option<MealSessionSnapshot>, ProviderError> {
        Err(ProviderError::Unavailable("sessions offline".to_string()))
    }
}

impl AttendanceProvider for FaultyProvider {
    fn attendance_on(
        &self,
        _employee: &EmployeeId,
        _date: NaiveDate,
    ) -> Result<Option<AttendanceFact>, ProviderError> {
        Err(ProviderError::Unavailable("attendance offline".to_string()))
    }
}

impl MealLedger for FaultyProvider {
    fn meals_taken_on(
        &self,
        _employee: &EmployeeId,
        _date: NaiveDate,
    ) -> Result<u32, ProviderError> {
        Err(ProviderError::Unavailable("ledger offline".to_string()))
    }
}

impl RuleProvider for FaultyProvider {
    fn rules_for_session(
        &self,
        _session: &MealSessionId,
    ) -> Result<Vec<EligibilityRule>, ProviderError> {
        Err(ProviderError::Unavailable("rule store offline".to_string()))
    }
}

pub(super) type TestService = MealVerificationService<
    MemoryDirectory,
    MemorySessions,
    MemoryAttendance,
    MemoryLedger,
    InMemoryRuleStore,
>;

/// Providers seeded with the default employee and the lunch session; rules
/// are left to each test.
pub(super) fn seeded_providers() -> (
    MemoryDirectory,
    MemorySessions,
    MemoryAttendance,
    MemoryLedger,
    InMemoryRuleStore,
) {
    let directory = MemoryDirectory::default();
    directory.put(employee());
    let sessions = MemorySessions::default();
    sessions.put(lunch_session());
    (
        directory,
        sessions,
        MemoryAttendance::default(),
        MemoryLedger::default(),
        InMemoryRuleStore::new(),
    )
}

pub(super) fn build_service(
    directory: &MemoryDirectory,
    sessions: &MemorySessions,
    attendance: &MemoryAttendance,
    ledger: &MemoryLedger,
    store: &InMemoryRuleStore,
) -> TestService {
    MealVerificationService::new(
        Arc::new(directory.clone()),
        Arc::new(sessions.clone()),
        Arc::new(attendance.clone()),
        Arc::new(ledger.clone()),
        Arc::new(store.clone()),
    )
}

/// Verification request for the seeded employee and session at the given
/// wall-clock time on the fixture date.
pub(super) fn request_at(hour: u32, minute: u32) -> VerificationRequest {
    VerificationRequest {
        employee_id: EmployeeId("emp-100".to_string()),
        meal_session_id: MealSessionId("sess-lunch".to_string()),
        timestamp: Some(at(hour, minute)),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
