//! Aggregations over the user record set.
//!
//! Each insight is a pure function over a slice of [User] records. Records with missing optional
//! attributes are tolerated: they are skipped by the groupings that need the attribute.

use crate::models::{CountryCount, LoginsPerDay, TeamInsight, TopCountries, User};

use std::collections::HashMap;

/// Maximum number of countries returned by [top_countries].
pub const TOP_COUNTRIES: usize = 5;

/// Groups values by a string key, keeping keys in order of first appearance.
struct Grouping<'a, T> {
    index: HashMap<&'a str, usize>,
    groups: Vec<(&'a str, T)>,
}

impl<'a, T: Default> Grouping<'a, T> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    /// Returns the group for `key`, creating it if this is the first time the key is seen.
    fn entry(&mut self, key: &'a str) -> &mut T {
        let position = *self.index.entry(key).or_insert_with(|| {
            self.groups.push((key, T::default()));
            self.groups.len() - 1
        });
        &mut self.groups[position].1
    }

    fn into_groups(self) -> Vec<(&'a str, T)> {
        self.groups
    }
}

/// Returns every superuser, in record set order.
pub fn superusers(users: &[User]) -> Vec<&User> {
    users.iter().filter(|user| user.is_superuser()).collect()
}

/// Returns the countries with the most superusers.
///
/// Countries are sorted by descending count. Countries with equal counts keep the order in which
/// they were first encountered. Superusers without a country are included in the total but not
/// attributed to any country.
pub fn top_countries(users: &[User]) -> TopCountries {
    let superusers = superusers(users);
    let mut by_country = Grouping::<usize>::new();
    for country in superusers.iter().filter_map(|user| user.country()) {
        *by_country.entry(country) += 1;
    }
    let mut top_countries: Vec<CountryCount> = by_country
        .into_groups()
        .into_iter()
        .map(|(country, count)| CountryCount {
            country: country.to_string(),
            count,
        })
        .collect();
    // Stable sort.
    top_countries.sort_by(|a, b| b.count.cmp(&a.count));
    top_countries.truncate(TOP_COUNTRIES);
    TopCountries {
        total_superusers: superusers.len(),
        top_countries,
    }
}

#[derive(Default)]
struct TeamTotals {
    members: usize,
    active_members: usize,
    leaders: usize,
    completed_projects: usize,
}

/// Returns statistics for each team, in order of first appearance.
///
/// Users without a team name are skipped.
pub fn team_insights(users: &[User]) -> Vec<TeamInsight> {
    let mut by_team = Grouping::<TeamTotals>::new();
    for user in users {
        let (Some(team), Some(name)) = (user.team(), user.team_name()) else {
            continue;
        };
        let totals = by_team.entry(name);
        totals.members += 1;
        totals.active_members += usize::from(user.is_active());
        totals.leaders += usize::from(team.is_leader());
        totals.completed_projects += team.completed_projects();
    }
    by_team
        .into_groups()
        .into_iter()
        .map(|(name, totals)| TeamInsight {
            team: name.to_string(),
            total_members: totals.members,
            leaders: totals.leaders,
            completed_projects: totals.completed_projects,
            active_percentage: percentage(totals.active_members, totals.members),
        })
        .collect()
}

/// `part / whole * 100`, rounded to two decimal places. `whole` must be non-zero.
fn percentage(part: usize, whole: usize) -> f64 {
    let percentage = part as f64 / whole as f64 * 100.0;
    (percentage * 100.0).round() / 100.0
}

/// Minimum number of logins for a date to be reported by [logins_per_day].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MinLogins(f64);

impl MinLogins {
    /// Parse a query parameter value.
    ///
    /// Absent, empty, non-numeric, non-finite and negative values all mean no minimum.
    pub fn parse(value: Option<&str>) -> Self {
        let min = value
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|min| min.is_finite() && *min > 0.0)
            .unwrap_or_default();
        Self(min)
    }

    /// Take the minimum from decoded query parameters.
    ///
    /// Only a single `min` parameter is parsed. A repeated `min` is not a number and means no
    /// minimum.
    pub fn from_query(params: &[(String, String)]) -> Self {
        let mut values = params
            .iter()
            .filter(|(name, _)| name == "min")
            .map(|(_, value)| value.as_str());
        match (values.next(), values.next()) {
            (Some(value), None) => Self::parse(Some(value)),
            _ => Self::default(),
        }
    }

    /// Returns true if `logins` meets the minimum.
    pub fn admits(&self, logins: usize) -> bool {
        logins as f64 >= self.0
    }
}

impl From<usize> for MinLogins {
    fn from(min: usize) -> Self {
        Self(min as f64)
    }
}

/// Counts login actions per date.
///
/// Dates with fewer than `min` logins are dropped. The result is sorted by ascending date,
/// comparing dates as strings.
pub fn logins_per_day(users: &[User], min: MinLogins) -> Vec<LoginsPerDay> {
    let mut by_date = Grouping::<usize>::new();
    let dates = users
        .iter()
        .flat_map(User::logs)
        .filter_map(|entry| entry.login_date());
    for date in dates {
        *by_date.entry(date) += 1;
    }
    let mut result: Vec<LoginsPerDay> = by_date
        .into_groups()
        .into_iter()
        .filter(|(_, logins)| min.admits(*logins))
        .map(|(date, logins)| LoginsPerDay {
            date: date.to_string(),
            logins,
        })
        .collect();
    result.sort_by(|a, b| a.date.cmp(&b.date));
    result
}
