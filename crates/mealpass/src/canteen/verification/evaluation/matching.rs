use chrono::NaiveTime;

use super::super::domain::{AttendanceFact, EligibilityRule, EmployeeSnapshot};

/// Outcome of matching one rule against one employee at one instant.
pub(crate) enum RuleMatch {
    Matched,
    Missed(Vec<String>),
}

/// Conjunctive check across every constrained dimension of a rule. Every
/// dimension is evaluated even after one has failed, so a miss explains all
/// of its gaps rather than the first one encountered. An unconstrained
/// dimension (empty allow-list, unset flag or cap) always passes.
pub(crate) fn match_rule(
    rule: &EligibilityRule,
    employee: &EmployeeSnapshot,
    attendance: Option<AttendanceFact>,
    meals_taken_today: u32,
    at: NaiveTime,
) -> RuleMatch {
    let mut misses: Vec<String> = Vec::new();
    let scope = &rule.applicability;

    if !scope.shifts.is_empty() {
        let covered = employee
            .shift_id
            .as_ref()
            .map(|shift| scope.shifts.contains(shift))
            .unwrap_or(false);
        if !covered {
            misses.push("Shift not eligible".to_string());
        }
    }

    if !scope.departments.is_empty() {
        let covered = employee
            .department_id
            .as_ref()
            .map(|department| scope.departments.contains(department))
            .unwrap_or(false);
        if !covered {
            misses.push("Department not eligible".to_string());
        }
    }

    if !scope.employment_types.is_empty()
        && !scope.employment_types.contains(&employee.employment_type)
    {
        misses.push("Employment type not eligible".to_string());
    }

    if !scope.specific_employees.is_empty() && !scope.specific_employees.contains(&employee.id) {
        misses.push("Employee not in allowed list".to_string());
    }

    if rule.requires_attendance {
        let present = attendance.map(|fact| fact.present).unwrap_or(false);
        if !present {
            misses.push("Attendance not marked as PRESENT".to_string());
        }
        if rule.requires_overtime {
            let overtime = attendance.map(|fact| fact.overtime_hours > 0.0).unwrap_or(false);
            if !overtime {
                misses.push("OT hours required".to_string());
            }
        }
    }

    if let Some(window) = &rule.time_window {
        if !window.contains(at) {
            misses.push(format!("Rule time window: {}", window.label()));
        }
    }

    if let Some(cap) = rule.max_meals_per_day {
        if meals_taken_today >= cap {
            misses.push(format!("Max meals per day limit reached ({cap})"));
        }
    }

    if misses.is_empty() {
        RuleMatch::Matched
    } else {
        RuleMatch::Missed(misses)
    }
}
