use crate::models::User;

use serde_json::{json, Value};

const COUNTRIES: [&str; 7] = ["Brasil", "Portugal", "Argentina", "Chile", "Peru", "Spain", "Italy"];
const TEAMS: [&str; 4] = ["Falcons", "Wolves", "Tigers", "Sharks"];

/// Create a User with only score, active flag and country set.
pub(crate) fn user(score: i64, active: bool, country: &str) -> User {
    serde_json::from_value(json!({"score": score, "active": active, "country": country})).unwrap()
}

/// Create a list of Users from a JSON array.
pub(crate) fn users(value: Value) -> Vec<User> {
    serde_json::from_value(value).unwrap()
}

/// Create `count` Users with a deterministic spread of attributes.
pub(crate) fn generate_users(count: usize) -> Vec<User> {
    users(Value::Array((0..count).map(generated_user).collect()))
}

fn generated_user(i: usize) -> Value {
    let logs: Vec<Value> = (0..i % 4)
        .map(|n| {
            json!({
                "date": format!("2025-01-{:02}", (i + n) % 28 + 1),
                "action": if n % 3 == 2 { "logout" } else { "login" },
            })
        })
        .collect();
    let mut user = json!({
        "id": i,
        "name": format!("user{i}"),
        "score": (i * 37) % 1001,
        "active": i % 3 != 0,
        "country": COUNTRIES[i % COUNTRIES.len()],
        "logs": logs,
    });
    if i % 5 != 0 {
        user["team"] = json!({
            "name": TEAMS[i % TEAMS.len()],
            "leader": i % 7 == 0,
            "projects": [{"completed": i % 2 == 0}, {"completed": true}],
        });
    }
    user
}
