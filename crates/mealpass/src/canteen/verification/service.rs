use std::sync::Arc;

use chrono::{Local, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::domain::{
    hhmm, DepartmentId, EligibilityRule, EmployeeId, EmployeeSnapshot, EmploymentType,
    MealSessionId, MealSessionSnapshot, ShiftId,
};
use super::evaluation::{EligibilityEngine, EligibilityVerdict, EvaluationContext, MatchedRule};
use super::providers::{
    AttendanceProvider, EmployeeDirectory, MealLedger, MealSessionProvider, ProviderError,
    RuleProvider,
};

/// Service composing the reference-data providers, the rule catalogue, and
/// the eligibility engine into the verification operation.
///
/// The service owns all provider I/O; evaluation itself runs over snapshots
/// fetched here, so a slow or failing provider can never wedge the engine.
pub struct MealVerificationService<D, S, A, L, R> {
    directory: Arc<D>,
    sessions: Arc<S>,
    attendance: Arc<A>,
    ledger: Arc<L>,
    rules: Arc<R>,
    engine: EligibilityEngine,
}

impl<D, S, A, L, R> MealVerificationService<D, S, A, L, R>
where
    D: EmployeeDirectory + 'static,
    S: MealSessionProvider + 'static,
    A: AttendanceProvider + 'static,
    L: MealLedger + 'static,
    R: RuleProvider + 'static,
{
    pub fn new(
        directory: Arc<D>,
        sessions: Arc<S>,
        attendance: Arc<A>,
        ledger: Arc<L>,
        rules: Arc<R>,
    ) -> Self {
        Self {
            directory,
            sessions,
            attendance,
            ledger,
            rules,
            engine: EligibilityEngine::new(),
        }
    }

    /// Resolve snapshots and facts for one verification request and run the
    /// engine over them.
    ///
    /// Unknown identifiers become denial verdicts; only provider faults are
    /// errors. When an admission gate already denies, the attendance, ledger,
    /// and rule providers are not consulted at all.
    pub fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationOutcome, VerificationError> {
        let evaluated_at = request
            .timestamp
            .unwrap_or_else(|| Local::now().naive_local());

        let employee = self.directory.find_employee(&request.employee_id)?;
        let meal_session = self.sessions.find_session(&request.meal_session_id)?;

        let outcome = if let Some(verdict) =
            self.engine
                .preflight(employee.as_ref(), meal_session.as_ref(), evaluated_at)
        {
            VerificationOutcome::assemble(verdict, employee.as_ref(), meal_session.as_ref())
        } else {
            let date = evaluated_at.date();
            let attendance = self.attendance.attendance_on(&request.employee_id, date)?;
            let meals_taken_today = self.ledger.meals_taken_on(&request.employee_id, date)?;
            let rules = self.rules.rules_for_session(&request.meal_session_id)?;

            let context = EvaluationContext {
                employee: employee.as_ref(),
                meal_session: meal_session.as_ref(),
                rules: &rules,
                attendance,
                meals_taken_today,
                evaluated_at,
            };
            let verdict = self.engine.evaluate(&context);
            VerificationOutcome::assemble(verdict, employee.as_ref(), meal_session.as_ref())
        };

        tracing::info!(
            employee = %request.employee_id.0,
            meal_session = %request.meal_session_id.0,
            eligible = outcome.eligible,
            reason = %outcome.reason,
            "meal verification decided"
        );

        Ok(outcome)
    }

    /// Ordered active rules for a session, for administrative listings. An
    /// unknown session simply has no rules.
    pub fn session_rules(
        &self,
        session: &MealSessionId,
    ) -> Result<Vec<EligibilityRule>, VerificationError> {
        Ok(self.rules.rules_for_session(session)?)
    }
}

/// Arguments for one kiosk verification. `timestamp` defaults to the server's
/// local wall clock when omitted; its date scopes the attendance and ledger
/// lookups to "today".
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub employee_id: EmployeeId,
    pub meal_session_id: MealSessionId,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

/// Serialized verification outcome: the verdict enriched with echo blocks of
/// the resolved records and the kiosk presentation hints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub eligible: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<EmployeeView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_session: Option<MealSessionView>,
    pub matched_rule: Option<MatchedRule>,
    pub timestamp: NaiveDateTime,
    pub display_color: &'static str,
    pub message: &'static str,
}

impl VerificationOutcome {
    fn assemble(
        verdict: EligibilityVerdict,
        employee: Option<&EmployeeSnapshot>,
        meal_session: Option<&MealSessionSnapshot>,
    ) -> Self {
        let display_color = verdict.display_color();
        let message = verdict.kiosk_message();
        Self {
            eligible: verdict.eligible,
            reason: verdict.reason,
            employee: employee.map(EmployeeView::from_snapshot),
            meal_session: meal_session.map(MealSessionView::from_snapshot),
            matched_rule: verdict.matched_rule,
            timestamp: verdict.evaluated_at,
            display_color,
            message,
        }
    }
}

/// Sanitized employee block echoed on outcomes; absent when the directory
/// never resolved the identifier.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeView {
    pub id: EmployeeId,
    pub name: String,
    /// Badge code, serialized under the name kiosks expect.
    #[serde(rename = "employeeId")]
    pub employee_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift: Option<ShiftId>,
    pub employment_type: EmploymentType,
}

impl EmployeeView {
    fn from_snapshot(snapshot: &EmployeeSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            name: snapshot.name.clone(),
            employee_code: snapshot.employee_code.clone(),
            department: snapshot.department_id.clone(),
            shift: snapshot.shift_id.clone(),
            employment_type: snapshot.employment_type,
        }
    }
}

/// Session block echoed on outcomes; absent when the session lookup failed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSessionView {
    pub id: MealSessionId,
    pub name: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl MealSessionView {
    fn from_snapshot(snapshot: &MealSessionSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            name: snapshot.name.clone(),
            start_time: snapshot.start_time,
            end_time: snapshot.end_time,
        }
    }
}

/// Error raised by the verification service. Provider faults are never
/// disguised as verdicts; the transport layer decides how to surface them.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
