//! Data types and associated functions and methods

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Minimum score of a superuser.
pub const SUPERUSER_MIN_SCORE: f64 = 900.0;

/// An attribute that may not have the expected JSON type.
///
/// A value of the wrong type is kept as it was loaded, so that it is serialised back unchanged,
/// but is otherwise treated as if the attribute were absent.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Valid(T),
    Invalid(Value),
}

impl<T> Lenient<T> {
    /// Returns the value if it has the expected type.
    pub fn valid(&self) -> Option<&T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }
}

fn valid<T>(field: &Option<Lenient<T>>) -> Option<&T> {
    field.as_ref().and_then(Lenient::valid)
}

/// A user record loaded from the users file.
///
/// Only the attributes used by the insights are typed. Any other attribute is kept in `extra` and
/// serialised back unchanged, so records are echoed as they were loaded.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct User {
    /// User score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Lenient<Number>>,
    /// Whether the user is active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<Lenient<bool>>,
    /// Country of the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Lenient<String>>,
    /// Team membership
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Lenient<Team>>,
    /// Activity log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Lenient<Vec<Lenient<LogEntry>>>>,
    /// Remaining attributes
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Returns true if the user has a score of at least 900 and is active.
    pub fn is_superuser(&self) -> bool {
        self.is_active()
            && valid(&self.score)
                .and_then(Number::as_f64)
                .is_some_and(|score| score >= SUPERUSER_MIN_SCORE)
    }

    /// Returns true if the user is flagged as active.
    pub fn is_active(&self) -> bool {
        valid(&self.active) == Some(&true)
    }

    pub fn country(&self) -> Option<&str> {
        valid(&self.country).map(String::as_str)
    }

    pub fn team(&self) -> Option<&Team> {
        valid(&self.team)
    }

    /// Name of the user's team, if any.
    pub fn team_name(&self) -> Option<&str> {
        self.team()
            .and_then(|team| valid(&team.name))
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Well-formed entries of the activity log.
    pub fn logs(&self) -> impl Iterator<Item = &LogEntry> {
        valid(&self.logs)
            .into_iter()
            .flatten()
            .filter_map(Lenient::valid)
    }
}

/// Team membership of a user
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Team {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Lenient<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader: Option<Lenient<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Lenient<Vec<Lenient<Project>>>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Team {
    pub fn is_leader(&self) -> bool {
        valid(&self.leader) == Some(&true)
    }

    /// Number of completed projects.
    pub fn completed_projects(&self) -> usize {
        valid(&self.projects)
            .into_iter()
            .flatten()
            .filter_map(Lenient::valid)
            .filter(|project| valid(&project.completed) == Some(&true))
            .count()
    }
}

/// A team project
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<Lenient<bool>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An entry of a user's activity log
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct LogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Lenient<String>>,
    /// Date of the action. Compared as a plain string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Lenient<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogEntry {
    /// Returns the date of the entry if it records a login.
    pub fn login_date(&self) -> Option<&str> {
        match valid(&self.action).map(String::as_str) {
            Some("login") => valid(&self.date).map(String::as_str),
            _ => None,
        }
    }
}

/// Response to a successful load of the users file
#[derive(Debug, Deserialize, Serialize)]
pub struct LoadResponse {
    pub message: String,
}

impl LoadResponse {
    pub fn new(count: usize) -> Self {
        Self {
            message: format!("{} users loaded.", count),
        }
    }
}

/// Superusers and the time taken to find them
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperusersResponse<'a> {
    /// Formatted as `"<milliseconds> ms"` with two decimal places.
    pub processing_time_ms: String,
    pub total: usize,
    pub data: Vec<&'a User>,
}

/// Number of superusers in a country
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

/// Countries with the most superusers
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCountries {
    pub total_superusers: usize,
    pub top_countries: Vec<CountryCount>,
}

/// Statistics of a single team
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInsight {
    pub team: String,
    pub total_members: usize,
    pub leaders: usize,
    pub completed_projects: usize,
    /// Percentage of active members, rounded to two decimal places.
    pub active_percentage: f64,
}

/// Number of logins on a date
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LoginsPerDay {
    pub date: String,
    pub logins: usize,
}

/// Outcome of a call to one endpoint during evaluation
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointResult {
    pub endpoint: String,
    /// HTTP status, absent when no response was received.
    pub status: Option<u16>,
    #[serde(rename = "isJSON")]
    pub is_json: bool,
    pub time_ms: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of an evaluation run
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    /// RFC 3339 UTC timestamp
    pub evaluated_at: String,
    pub results: Vec<EndpointResult>,
    /// `"<successful> / <total>"`
    pub score: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_record() {
        let user: User = serde_json::from_value(json!({
            "id": "u1",
            "name": "Ana",
            "score": 950,
            "active": true,
            "country": "Brasil",
            "team": {
                "name": "Falcons",
                "leader": true,
                "projects": [
                    {"name": "A", "completed": true},
                    {"name": "B", "completed": false}
                ]
            },
            "logs": [{"date": "2025-03-01", "action": "login"}]
        }))
        .unwrap();
        assert!(user.is_superuser());
        assert_eq!(Some("Brasil"), user.country());
        assert_eq!(Some("Falcons"), user.team_name());
        let team = user.team().unwrap();
        assert!(team.is_leader());
        assert_eq!(1, team.completed_projects());
        assert_eq!(Some("2025-03-01"), user.logs().next().unwrap().login_date());
        assert_eq!(Some(&json!("u1")), user.extra.get("id"));
    }

    #[test]
    fn test_missing_optional_fields() {
        let user: User = serde_json::from_value(json!({})).unwrap();
        assert_eq!(User::default(), user);
        assert!(!user.is_superuser());
        assert_eq!(None, user.team_name());
    }

    #[test]
    fn test_null_fields() {
        let user: User =
            serde_json::from_value(json!({"team": null, "logs": null, "score": null})).unwrap();
        assert!(user.team.is_none());
        assert!(user.logs.is_none());
        assert!(user.score.is_none());
    }

    #[test]
    fn test_record_echoed_unchanged() {
        let value = json!({
            "id": 7,
            "score": 901.5,
            "active": true,
            "team": {"name": "X", "projects": [{"completed": true, "title": "t"}]},
            "logs": [{"date": "2025-01-01", "action": "logout", "ip": "::1"}]
        });
        let user: User = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(value, serde_json::to_value(&user).unwrap());
    }

    #[test]
    fn test_wrong_types_are_absent() {
        let value = json!({
            "score": "950",
            "active": 1,
            "country": ["BR"],
            "team": "Falcons",
            "logs": {"date": "2025-01-01"}
        });
        let user: User = serde_json::from_value(value.clone()).unwrap();
        assert!(!user.is_superuser());
        assert!(!user.is_active());
        assert_eq!(None, user.country());
        assert_eq!(None, user.team());
        assert_eq!(0, user.logs().count());
        assert_eq!(value, serde_json::to_value(&user).unwrap());
    }

    #[test]
    fn test_nested_wrong_types_are_absent() {
        let user: User = serde_json::from_value(json!({
            "team": {
                "name": 7,
                "leader": "yes",
                "projects": [{"completed": true}, 3, {"completed": "true"}]
            },
            "logs": [
                {"action": "login", "date": "2025-01-01"},
                "login",
                {"action": "login", "date": 20250102}
            ]
        }))
        .unwrap();
        let team = user.team().unwrap();
        assert_eq!(None, user.team_name());
        assert!(!team.is_leader());
        assert_eq!(1, team.completed_projects());
        let dates: Vec<_> = user.logs().filter_map(LogEntry::login_date).collect();
        assert_eq!(vec!["2025-01-01"], dates);
    }

    #[test]
    fn test_superuser_boundaries() {
        let user = |score: Value, active: Value| -> User {
            serde_json::from_value(json!({"score": score, "active": active})).unwrap()
        };
        assert!(user(json!(900), json!(true)).is_superuser());
        assert!(user(json!(900.0), json!(true)).is_superuser());
        assert!(!user(json!(899.99), json!(true)).is_superuser());
        assert!(!user(json!(1000), json!(false)).is_superuser());
    }

    #[test]
    fn test_empty_team_name_is_no_team() {
        let user: User = serde_json::from_value(json!({"team": {"name": ""}})).unwrap();
        assert_eq!(None, user.team_name());
    }

    #[test]
    fn test_login_date() {
        let entry: LogEntry =
            serde_json::from_value(json!({"action": "logout", "date": "2025-01-01"})).unwrap();
        assert_eq!(None, entry.login_date());
        let entry: LogEntry = serde_json::from_value(json!({"action": "login"})).unwrap();
        assert_eq!(None, entry.login_date());
    }

    #[test]
    fn test_endpoint_result_field_names() {
        let result = EndpointResult {
            endpoint: "GET /superusers".to_string(),
            status: Some(200),
            is_json: true,
            time_ms: "1.23".to_string(),
            success: true,
            error: None,
        };
        assert_eq!(
            json!({
                "endpoint": "GET /superusers",
                "status": 200,
                "isJSON": true,
                "timeMs": "1.23",
                "success": true
            }),
            serde_json::to_value(&result).unwrap()
        );
    }
}
