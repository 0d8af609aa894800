use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for employees in the reference directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

/// Identifier wrapper for meal sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MealSessionId(pub String);

/// Identifier wrapper for eligibility rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(pub String);

/// Identifier wrapper for shifts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftId(pub String);

/// Identifier wrapper for departments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepartmentId(pub String);

/// Employment categories an eligibility rule can restrict on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentType {
    Permanent,
    Contract,
    Temporary,
    Vendor,
}

/// Directory lifecycle state; only ACTIVE employees can ever be authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    Terminated,
}

/// Point-in-time employee record resolved from the reference directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSnapshot {
    pub id: EmployeeId,
    pub name: String,
    /// Badge/display code shown on kiosks, distinct from the document id.
    pub employee_code: String,
    pub status: EmployeeStatus,
    pub shift_id: Option<ShiftId>,
    pub department_id: Option<DepartmentId>,
    pub employment_type: EmploymentType,
}

/// Point-in-time meal session record: a named serving window such as
/// Lunch 12:00-14:00.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSessionSnapshot {
    pub id: MealSessionId,
    pub name: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub is_active: bool,
}

impl MealSessionSnapshot {
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

/// Attendance facts for one (employee, date) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceFact {
    pub present: bool,
    pub overtime_hours: f32,
}

/// Denormalized pointer from a rule to the session it governs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRef {
    pub id: MealSessionId,
    pub name: String,
}

/// Allow-lists scoping who a rule applies to. An empty list leaves that
/// dimension unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleApplicability {
    #[serde(default)]
    pub shifts: Vec<ShiftId>,
    #[serde(default)]
    pub departments: Vec<DepartmentId>,
    #[serde(default)]
    pub employment_types: Vec<EmploymentType>,
    #[serde(default)]
    pub specific_employees: Vec<EmployeeId>,
}

/// Administrator-defined predicate set granting meal authorization when every
/// constrained dimension is satisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityRule {
    pub id: RuleId,
    pub name: String,
    pub meal_session_ref: SessionRef,
    #[serde(default)]
    pub applicability: RuleApplicability,
    #[serde(default)]
    pub requires_attendance: bool,
    /// Only meaningful while `requires_attendance` is set; ignored otherwise.
    #[serde(default)]
    pub requires_overtime: bool,
    #[serde(default)]
    pub time_window: Option<TimeWindow>,
    #[serde(default)]
    pub max_meals_per_day: Option<u32>,
    /// Higher priorities evaluate first; ties fall back to creation order.
    pub priority: i32,
    pub is_active: bool,
    #[serde(default)]
    pub is_deleted: bool,
}

impl EligibilityRule {
    /// Whether the rule participates in evaluation at all.
    pub fn is_evaluable(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}

/// Inclusive wall-clock window stored at HH:mm precision.
///
/// Containment truncates the probe to whole minutes before comparing, so a
/// timestamp of 13:00:59 still falls inside a window ending at 13:00, the
/// same answer a zero-padded string comparison of the HH:mm parts gives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Build a window from two `"HH:mm"` strings, rejecting malformed times
    /// and inverted bounds. Rule authoring goes through this so evaluation
    /// never sees a window it cannot interpret.
    pub fn from_hhmm(start: &str, end: &str) -> Result<Self, TimeWindowError> {
        let start = parse_hhmm(start)?;
        let end = parse_hhmm(end)?;
        let window = Self { start, end };
        if window.is_inverted() {
            return Err(TimeWindowError::Inverted {
                start: format_hhmm(start),
                end: format_hhmm(end),
            });
        }
        Ok(window)
    }

    /// Inclusive containment at minute precision.
    pub fn contains(&self, at: NaiveTime) -> bool {
        let probe = minute_of_day(at);
        minute_of_day(self.start) <= probe && probe <= minute_of_day(self.end)
    }

    /// A window whose start lies after its end matches nothing and is
    /// rejected at rule-creation time.
    pub fn is_inverted(&self) -> bool {
        minute_of_day(self.start) > minute_of_day(self.end)
    }

    /// Render as `"HH:mm - HH:mm"` for verdict reasons.
    pub fn label(&self) -> String {
        format!("{} - {}", format_hhmm(self.start), format_hhmm(self.end))
    }
}

/// Validation failures raised while authoring a time window.
#[derive(Debug, thiserror::Error)]
pub enum TimeWindowError {
    #[error("invalid HH:mm time '{0}'")]
    InvalidTime(String),
    #[error("time window start {start} is after end {end}")]
    Inverted { start: String, end: String },
}

fn minute_of_day(at: NaiveTime) -> u32 {
    at.hour() * 60 + at.minute()
}

fn format_hhmm(at: NaiveTime) -> String {
    at.format("%H:%M").to_string()
}

fn parse_hhmm(raw: &str) -> Result<NaiveTime, TimeWindowError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| TimeWindowError::InvalidTime(raw.to_string()))
}

/// Serde adapter storing `NaiveTime` fields as zero-padded `"HH:mm"` strings,
/// the shape session and rule documents use.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_hhmm(*time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw).map_err(serde::de::Error::custom)
    }
}
