use chrono::NaiveDateTime;

use super::super::domain::{EmployeeSnapshot, EmployeeStatus, MealSessionSnapshot};

/// Session admission gate: the session must exist, be active, and be serving
/// at the evaluation instant. Denied before any rule is consulted.
pub(crate) fn admit_session(
    session: Option<&MealSessionSnapshot>,
    at: NaiveDateTime,
) -> Result<(), String> {
    let Some(session) = session else {
        return Err("Meal session not found or inactive".to_string());
    };
    if !session.is_active {
        return Err("Meal session not found or inactive".to_string());
    }

    let window = session.window();
    if !window.contains(at.time()) {
        return Err(format!("Meal session time window: {}", window.label()));
    }
    Ok(())
}

/// Employee admission gate: the directory record must exist with ACTIVE
/// status. Runs after the session gate, before rule matching.
pub(crate) fn admit_employee(
    employee: Option<&EmployeeSnapshot>,
) -> Result<&EmployeeSnapshot, String> {
    match employee {
        Some(employee) if employee.status == EmployeeStatus::Active => Ok(employee),
        _ => Err("Employee not found or inactive".to_string()),
    }
}
