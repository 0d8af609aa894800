use std::sync::Arc;

use chrono::Duration;

use super::common::*;
use crate::canteen::verification::domain::{AttendanceFact, EmployeeId, MealSessionId};
use crate::canteen::verification::providers::ProviderError;
use crate::canteen::verification::{
    MealVerificationService, VerificationError, VerificationRequest,
};

#[test]
fn verify_authorizes_and_echoes_resolved_records() {
    let (directory, sessions, attendance, ledger, store) = seeded_providers();
    store.insert(lunch_rule("r-open", 1)).expect("insert rule");
    let service = build_service(&directory, &sessions, &attendance, &ledger, &store);

    let outcome = service.verify(&request_at(12, 30)).expect("verification");

    assert!(outcome.eligible);
    assert_eq!(outcome.reason, "Eligible via rule: Rule r-open");
    assert_eq!(outcome.display_color, "green");
    assert_eq!(outcome.message, "Meal Authorized");
    let employee = outcome.employee.expect("employee echoed");
    assert_eq!(employee.employee_code, "EMP-100");
    let session = outcome.meal_session.expect("session echoed");
    assert_eq!(session.name, "Lunch");
    assert_eq!(outcome.matched_rule.expect("rule cited").id.0, "r-open");
    assert_eq!(outcome.timestamp, at(12, 30));
}

#[test]
fn unknown_employee_is_a_verdict_not_an_error() {
    let (directory, sessions, attendance, ledger, store) = seeded_providers();
    store.insert(lunch_rule("r-open", 1)).expect("insert rule");
    let service = build_service(&directory, &sessions, &attendance, &ledger, &store);

    let request = VerificationRequest {
        employee_id: EmployeeId("emp-unknown".to_string()),
        meal_session_id: MealSessionId("sess-lunch".to_string()),
        timestamp: Some(at(12, 30)),
    };
    let outcome = service.verify(&request).expect("still a verdict");

    assert!(!outcome.eligible);
    assert_eq!(outcome.reason, "Employee not found or inactive");
    assert!(outcome.employee.is_none());
    assert!(outcome.meal_session.is_some());
    assert_eq!(outcome.message, "Not Authorized");
}

#[test]
fn unknown_session_is_a_verdict_not_an_error() {
    let (directory, sessions, attendance, ledger, store) = seeded_providers();
    let service = build_service(&directory, &sessions, &attendance, &ledger, &store);

    let request = VerificationRequest {
        employee_id: EmployeeId("emp-100".to_string()),
        meal_session_id: MealSessionId("sess-midnight".to_string()),
        timestamp: Some(at(12, 30)),
    };
    let outcome = service.verify(&request).expect("still a verdict");

    assert!(!outcome.eligible);
    assert_eq!(outcome.reason, "Meal session not found or inactive");
    assert!(outcome.meal_session.is_none());
    assert!(outcome.employee.is_some());
}

#[test]
fn ledger_counts_scope_to_the_request_date() {
    let (directory, sessions, attendance, ledger, store) = seeded_providers();
    let mut rule = lunch_rule("r-capped", 1);
    rule.max_meals_per_day = Some(2);
    store.insert(rule).expect("insert rule");
    let employee_id = EmployeeId("emp-100".to_string());

    // Yesterday's meals do not count against today.
    let yesterday = today() - Duration::days(1);
    ledger.set_count(&employee_id, yesterday, 2);
    let service = build_service(&directory, &sessions, &attendance, &ledger, &store);
    let outcome = service.verify(&request_at(12, 30)).expect("verification");
    assert!(outcome.eligible);

    ledger.set_count(&employee_id, today(), 2);
    let outcome = service.verify(&request_at(12, 30)).expect("verification");
    assert!(!outcome.eligible);
    assert_eq!(outcome.reason, "Max meals per day limit reached (2)");
}

#[test]
fn attendance_scopes_to_the_request_date() {
    let (directory, sessions, attendance, ledger, store) = seeded_providers();
    let mut rule = lunch_rule("r-attend", 1);
    rule.requires_attendance = true;
    store.insert(rule).expect("insert rule");
    let employee_id = EmployeeId("emp-100".to_string());

    let yesterday = today() - Duration::days(1);
    attendance.mark(
        &employee_id,
        yesterday,
        AttendanceFact {
            present: true,
            overtime_hours: 0.0,
        },
    );
    let service = build_service(&directory, &sessions, &attendance, &ledger, &store);
    let outcome = service.verify(&request_at(12, 30)).expect("verification");
    assert!(!outcome.eligible);
    assert_eq!(outcome.reason, "Attendance not marked as PRESENT");

    attendance.mark(
        &employee_id,
        today(),
        AttendanceFact {
            present: true,
            overtime_hours: 0.0,
        },
    );
    let outcome = service.verify(&request_at(12, 30)).expect("verification");
    assert!(outcome.eligible);
}

#[test]
fn provider_fault_is_an_error_not_a_verdict() {
    let (_, sessions, attendance, ledger, store) = seeded_providers();
    store.insert(lunch_rule("r-open", 1)).expect("insert rule");

    // Directory down: even though a missing employee would be a verdict, an
    // unanswerable directory is not.
    let service = MealVerificationService::new(
        Arc::new(FaultyProvider),
        Arc::new(sessions),
        Arc::new(attendance),
        Arc::new(ledger),
        Arc::new(store),
    );
    match service.verify(&request_at(12, 30)) {
        Err(VerificationError::Provider(ProviderError::Unavailable(message))) => {
            assert!(message.contains("directory"));
        }
        other => panic!("expected provider fault, got {other:?}"),
    }

    let (directory, sessions, attendance, _, store) = seeded_providers();
    store.insert(lunch_rule("r-open", 1)).expect("insert rule");
    let service = MealVerificationService::new(
        Arc::new(directory),
        Arc::new(sessions),
        Arc::new(attendance),
        Arc::new(FaultyProvider),
        Arc::new(store),
    );
    match service.verify(&request_at(12, 30)) {
        Err(VerificationError::Provider(ProviderError::Unavailable(message))) => {
            assert!(message.contains("ledger"));
        }
        other => panic!("expected provider fault, got {other:?}"),
    }
}

#[test]
fn gate_denial_skips_attendance_ledger_and_rule_providers() {
    let (directory, sessions, _, _, _) = seeded_providers();
    let service = MealVerificationService::new(
        Arc::new(directory),
        Arc::new(sessions),
        Arc::new(FaultyProvider),
        Arc::new(FaultyProvider),
        Arc::new(FaultyProvider),
    );

    // Outside the serving window the downstream providers are never touched,
    // so their outage cannot surface.
    let outcome = service.verify(&request_at(15, 0)).expect("gate verdict");
    assert!(!outcome.eligible);
    assert_eq!(outcome.reason, "Meal session time window: 12:00 - 14:00");

    let request = VerificationRequest {
        employee_id: EmployeeId("emp-unknown".to_string()),
        meal_session_id: MealSessionId("sess-lunch".to_string()),
        timestamp: Some(at(12, 30)),
    };
    let outcome = service.verify(&request).expect("gate verdict");
    assert!(!outcome.eligible);
    assert_eq!(outcome.reason, "Employee not found or inactive");
}

#[test]
fn priority_swap_flips_the_cited_rule() {
    let (directory, sessions, attendance, ledger, store) = seeded_providers();
    store.insert(lunch_rule("r-one", 10)).expect("insert");
    store.insert(lunch_rule("r-two", 20)).expect("insert");
    let service = build_service(&directory, &sessions, &attendance, &ledger, &store);

    let outcome = service.verify(&request_at(12, 30)).expect("verification");
    assert_eq!(outcome.matched_rule.expect("match").id.0, "r-two");

    store.update(lunch_rule("r-one", 20)).expect("update");
    store.update(lunch_rule("r-two", 10)).expect("update");

    let outcome = service.verify(&request_at(12, 30)).expect("verification");
    assert_eq!(outcome.matched_rule.expect("match").id.0, "r-one");
}

#[test]
fn session_rules_lists_in_evaluation_order() {
    let (directory, sessions, attendance, ledger, store) = seeded_providers();
    store.insert(lunch_rule("r-low", 1)).expect("insert");
    store.insert(lunch_rule("r-high", 9)).expect("insert");
    let service = build_service(&directory, &sessions, &attendance, &ledger, &store);

    let rules = service
        .session_rules(&MealSessionId("sess-lunch".to_string()))
        .expect("listing");
    let ids: Vec<&str> = rules.iter().map(|rule| rule.id.0.as_str()).collect();
    assert_eq!(ids, vec!["r-high", "r-low"]);

    let none = service
        .session_rules(&MealSessionId("sess-unknown".to_string()))
        .expect("listing");
    assert!(none.is_empty());
}
