use crate::infra::{
    InMemoryAttendanceLog, InMemoryEmployeeDirectory, InMemoryMealLedger,
    InMemoryMealSessionCatalog,
};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;
use mealpass::canteen::verification::domain::{
    AttendanceFact, DepartmentId, EligibilityRule, EmployeeId, EmployeeSnapshot, EmployeeStatus,
    EmploymentType, MealSessionId, MealSessionSnapshot, RuleApplicability, RuleId, SessionRef,
    ShiftId, TimeWindow,
};
use mealpass::canteen::verification::{
    InMemoryRuleStore, MealVerificationService, VerificationRequest,
};
use mealpass::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Service date for the walkthrough (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct VerifyArgs {
    /// Employee identifier to check (e.g. emp-1001)
    #[arg(long)]
    pub(crate) employee: String,
    /// Meal session identifier to check against (e.g. sess-lunch)
    #[arg(long)]
    pub(crate) session: String,
    /// Service date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Wall-clock time of the check (HH:MM). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_time)]
    pub(crate) at: Option<NaiveTime>,
    /// Mark the employee present for the service date before checking
    #[arg(long)]
    pub(crate) present: bool,
    /// Overtime hours booked for the service date (implies presence)
    #[arg(long)]
    pub(crate) overtime: Option<f32>,
    /// Meals already recorded for the employee on the service date
    #[arg(long, default_value_t = 0)]
    pub(crate) meals_taken: u32,
}

type DemoService = MealVerificationService<
    InMemoryEmployeeDirectory,
    InMemoryMealSessionCatalog,
    InMemoryAttendanceLog,
    InMemoryMealLedger,
    InMemoryRuleStore,
>;

/// Check a single employee against a session at the given moment and print
/// the verdict payload a kiosk would receive.
pub(crate) fn run_verify(args: VerifyArgs) -> Result<(), AppError> {
    let VerifyArgs {
        employee,
        session,
        date,
        at,
        present,
        overtime,
        meals_taken,
    } = args;

    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let time = at.unwrap_or_else(|| Local::now().time());
    let timestamp = date.and_time(time);

    let (service, attendance, ledger) = build_platform()?;
    let employee_id = EmployeeId(employee);

    if present || overtime.is_some() {
        attendance.mark(
            &employee_id,
            date,
            AttendanceFact {
                present: true,
                overtime_hours: overtime.unwrap_or(0.0),
            },
        );
    }
    for _ in 0..meals_taken {
        ledger.record_meal(&employee_id, date);
    }

    let request = VerificationRequest {
        employee_id,
        meal_session_id: MealSessionId(session),
        timestamp: Some(timestamp),
    };
    let outcome = service.verify(&request)?;

    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("verdict payload unavailable: {err}"),
    }

    Ok(())
}

/// Walk the seeded canteen through a full service day: breakfast, lunch with
/// its vendor window and daily caps, the overtime-gated dinner, and the
/// checks that never reach rule evaluation at all.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { date } = args;
    let date = date.unwrap_or_else(|| Local::now().date_naive());

    let (service, attendance, ledger) = build_platform()?;

    // Attendance for the day: Priya worked her shift, Chen booked overtime,
    // Marcus never clocked in.
    attendance.mark(&employee_id("emp-1001"), date, present_with(0.0));
    attendance.mark(&employee_id("emp-1003"), date, present_with(2.5));

    println!("Canteen verification walkthrough (service date {date})");

    println!("\nRoster");
    for employee in seed_employees() {
        println!(
            "- {} {} | {:?}, {:?} | shift {} | dept {}",
            employee.employee_code,
            employee.name,
            employee.employment_type,
            employee.status,
            employee
                .shift_id
                .as_ref()
                .map(|shift| shift.0.as_str())
                .unwrap_or("-"),
            employee
                .department_id
                .as_ref()
                .map(|department| department.0.as_str())
                .unwrap_or("-"),
        );
    }

    println!("\nMeal sessions");
    for session in seed_sessions() {
        if session.is_active {
            println!("- {}: {}", session.name, session.window().label());
        } else {
            println!("- {}: inactive", session.name);
        }
    }

    println!("\nEligibility rules (evaluation order)");
    for session in seed_sessions().iter().filter(|session| session.is_active) {
        let listed = service.session_rules(&session.id)?;
        if listed.is_empty() {
            continue;
        }
        println!("{}:", session.name);
        for rule in &listed {
            println!("  - [{}] {}{}", rule.priority, rule.name, requirements_note(rule));
        }
    }

    println!("\nBreakfast service");
    check_and_record(&service, &ledger, "emp-1001", "sess-breakfast", at(date, 8, 0))?;

    println!("\nLunch service");
    // Priya already ate breakfast today, so the production rule's daily cap
    // bites here.
    check_and_record(&service, &ledger, "emp-1001", "sess-lunch", at(date, 12, 10))?;
    check_and_record(&service, &ledger, "emp-1002", "sess-lunch", at(date, 12, 10))?;
    check_and_record(&service, &ledger, "emp-1010", "sess-lunch", at(date, 12, 10))?;
    check_and_record(&service, &ledger, "emp-2001", "sess-lunch", at(date, 12, 10))?;
    check_and_record(&service, &ledger, "emp-2001", "sess-lunch", at(date, 12, 45))?;

    println!("\nDinner service");
    check_and_record(&service, &ledger, "emp-1003", "sess-dinner", at(date, 19, 30))?;
    check_and_record(&service, &ledger, "emp-1001", "sess-dinner", at(date, 19, 30))?;

    println!("\nGate checks (no rule is ever evaluated)");
    check_and_record(&service, &ledger, "emp-1099", "sess-lunch", at(date, 12, 10))?;
    check_and_record(&service, &ledger, "emp-9999", "sess-lunch", at(date, 12, 10))?;
    check_and_record(&service, &ledger, "emp-1002", "sess-lunch", at(date, 15, 0))?;
    check_and_record(&service, &ledger, "emp-1003", "sess-night", at(date, 23, 15))?;

    Ok(())
}

fn build_platform() -> Result<
    (DemoService, Arc<InMemoryAttendanceLog>, Arc<InMemoryMealLedger>),
    AppError,
> {
    let directory = Arc::new(InMemoryEmployeeDirectory::default());
    let sessions = Arc::new(InMemoryMealSessionCatalog::default());
    let attendance = Arc::new(InMemoryAttendanceLog::default());
    let ledger = Arc::new(InMemoryMealLedger::default());
    let rules = Arc::new(InMemoryRuleStore::new());
    seed_reference_data(&directory, &sessions, &rules)?;

    let service = MealVerificationService::new(
        directory,
        sessions,
        attendance.clone(),
        ledger.clone(),
        rules,
    );
    Ok((service, attendance, ledger))
}

/// Load the starter canteen dataset into the given providers. The server and
/// the CLI walkthrough share this data so a fresh deployment answers real
/// verifications out of the box.
pub(crate) fn seed_reference_data(
    directory: &InMemoryEmployeeDirectory,
    sessions: &InMemoryMealSessionCatalog,
    rules: &InMemoryRuleStore,
) -> Result<(), AppError> {
    for employee in seed_employees() {
        directory.put(employee);
    }
    for session in seed_sessions() {
        sessions.put(session);
    }
    for rule in seed_rules() {
        rules.insert(rule)?;
    }
    Ok(())
}

fn check_and_record(
    service: &DemoService,
    ledger: &InMemoryMealLedger,
    employee: &str,
    session: &str,
    timestamp: NaiveDateTime,
) -> Result<(), AppError> {
    let request = VerificationRequest {
        employee_id: employee_id(employee),
        meal_session_id: MealSessionId(session.to_string()),
        timestamp: Some(timestamp),
    };
    let outcome = service.verify(&request)?;

    let name = outcome
        .employee
        .as_ref()
        .map(|view| view.name.as_str())
        .unwrap_or(employee);
    println!(
        "- {} {}: {} | {}",
        timestamp.format("%H:%M"),
        name,
        outcome.message,
        outcome.reason
    );
    if outcome.eligible {
        let count = ledger.record_meal(&request.employee_id, timestamp.date());
        println!("    meal recorded ({count} today)");
    }

    Ok(())
}

fn requirements_note(rule: &EligibilityRule) -> String {
    let mut parts = Vec::new();
    if rule.requires_attendance {
        parts.push("attendance".to_string());
    }
    if rule.requires_overtime {
        parts.push("overtime".to_string());
    }
    if let Some(window) = &rule.time_window {
        parts.push(format!("window {}", window.label()));
    }
    if let Some(cap) = rule.max_meals_per_day {
        parts.push(format!("max {cap}/day"));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn seed_employees() -> Vec<EmployeeSnapshot> {
    vec![
        employee(
            "emp-1001",
            "Priya Sharma",
            "EMP-1001",
            EmployeeStatus::Active,
            Some("shift-morning"),
            Some("dept-assembly"),
            EmploymentType::Permanent,
        ),
        employee(
            "emp-1002",
            "Marcus Webb",
            "EMP-1002",
            EmployeeStatus::Active,
            Some("shift-morning"),
            Some("dept-assembly"),
            EmploymentType::Contract,
        ),
        employee(
            "emp-1003",
            "Chen Wei",
            "EMP-1003",
            EmployeeStatus::Active,
            Some("shift-night"),
            Some("dept-maintenance"),
            EmploymentType::Permanent,
        ),
        employee(
            "emp-1010",
            "Farid Khan",
            "EMP-1010",
            EmployeeStatus::Active,
            None,
            Some("dept-admin"),
            EmploymentType::Permanent,
        ),
        employee(
            "emp-2001",
            "Dana Okafor",
            "EMP-2001",
            EmployeeStatus::Active,
            None,
            None,
            EmploymentType::Vendor,
        ),
        employee(
            "emp-1099",
            "Sofia Reyes",
            "EMP-1099",
            EmployeeStatus::Inactive,
            Some("shift-morning"),
            Some("dept-assembly"),
            EmploymentType::Permanent,
        ),
    ]
}

fn seed_sessions() -> Vec<MealSessionSnapshot> {
    vec![
        session("sess-breakfast", "Breakfast", (7, 30), (9, 30), true),
        session("sess-lunch", "Lunch", (12, 0), (14, 0), true),
        session("sess-dinner", "Dinner", (19, 0), (21, 0), true),
        session("sess-night", "Night Snack", (23, 0), (23, 45), false),
    ]
}

fn seed_rules() -> Vec<EligibilityRule> {
    let mut production_lunch = rule_base("r-prod-lunch", "Production lunch", "sess-lunch", 20);
    production_lunch.applicability.shifts = vec![
        ShiftId("shift-morning".to_string()),
        ShiftId("shift-night".to_string()),
    ];
    production_lunch.requires_attendance = true;
    production_lunch.max_meals_per_day = Some(1);

    let mut admin_lunch = rule_base("r-admin-lunch", "Admin staff lunch", "sess-lunch", 15);
    admin_lunch.applicability.departments = vec![DepartmentId("dept-admin".to_string())];
    admin_lunch.max_meals_per_day = Some(2);

    let mut vendor_lunch = rule_base("r-vendor-lunch", "Vendor lunch window", "sess-lunch", 10);
    vendor_lunch.applicability.employment_types = vec![EmploymentType::Vendor];
    vendor_lunch.time_window = Some(TimeWindow {
        start: hhmm((12, 0)),
        end: hhmm((12, 30)),
    });
    vendor_lunch.max_meals_per_day = Some(1);

    let mut overtime_dinner = rule_base("r-ot-dinner", "Overtime dinner", "sess-dinner", 20);
    overtime_dinner.requires_attendance = true;
    overtime_dinner.requires_overtime = true;
    overtime_dinner.max_meals_per_day = Some(1);

    let mut early_breakfast =
        rule_base("r-early-breakfast", "Early shift breakfast", "sess-breakfast", 10);
    early_breakfast.applicability.shifts = vec![ShiftId("shift-morning".to_string())];
    early_breakfast.requires_attendance = true;

    vec![
        production_lunch,
        admin_lunch,
        vendor_lunch,
        overtime_dinner,
        early_breakfast,
    ]
}

fn employee(
    id: &str,
    name: &str,
    code: &str,
    status: EmployeeStatus,
    shift: Option<&str>,
    department: Option<&str>,
    employment_type: EmploymentType,
) -> EmployeeSnapshot {
    EmployeeSnapshot {
        id: EmployeeId(id.to_string()),
        name: name.to_string(),
        employee_code: code.to_string(),
        status,
        shift_id: shift.map(|value| ShiftId(value.to_string())),
        department_id: department.map(|value| DepartmentId(value.to_string())),
        employment_type,
    }
}

fn session(
    id: &str,
    name: &str,
    start: (u32, u32),
    end: (u32, u32),
    is_active: bool,
) -> MealSessionSnapshot {
    MealSessionSnapshot {
        id: MealSessionId(id.to_string()),
        name: name.to_string(),
        start_time: hhmm(start),
        end_time: hhmm(end),
        is_active,
    }
}

fn rule_base(id: &str, name: &str, session_id: &str, priority: i32) -> EligibilityRule {
    let session_name = seed_sessions()
        .into_iter()
        .find(|session| session.id.0 == session_id)
        .map(|session| session.name)
        .unwrap_or_else(|| session_id.to_string());

    EligibilityRule {
        id: RuleId(id.to_string()),
        name: name.to_string(),
        meal_session_ref: SessionRef {
            id: MealSessionId(session_id.to_string()),
            name: session_name,
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

fn employee_id(id: &str) -> EmployeeId {
    EmployeeId(id.to_string())
}

fn present_with(overtime_hours: f32) -> AttendanceFact {
    AttendanceFact {
        present: true,
        overtime_hours,
    }
}

fn hhmm((hour, minute): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_time(hhmm((hour, minute)))
}
