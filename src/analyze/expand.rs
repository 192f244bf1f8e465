use crate::analyze::assignees::combine_assignees;
use crate::model::{normalize_login, Row, RowExt, Table};
use itertools::Itertools;
use log::{debug, info, warn};
use serde_json::Value;

pub const CREATOR: &str = "creator";
pub const ASSIGNEE: &str = "assignee";
pub const ASSIGNEES: &str = "assignees";
pub const ASSIGNEES_LIST: &str = "assignees_list";
pub const LOGIN: &str = "login";
pub const TEAM_SLUG: &str = "team_slug";

/// Derives `login` from the nested `user` column when the roster lacks one, and trims
/// the logins it already has.
pub fn prepare_members(members: &mut Table) {
    if !members.has_column(LOGIN) && members.has_column("user") {
        info!("Extracting login from the `user` field of team members");
        members.with_column(LOGIN, |row| Value::String(normalize_login(row.cell("user"))));
        return;
    }
    if members.has_column(LOGIN) {
        members.with_column(LOGIN, |row| match row.cell(LOGIN) {
            Value::String(login) => Value::String(login.trim().to_string()),
            other => other.clone(),
        });
    }
}

/// Adds `creator` and the combined `assignees_list` to every issue.
pub fn prepare_issues(issues: &mut Table) {
    info!("Processing issues...");
    issues.with_column(CREATOR, |row| Value::String(normalize_login(row.cell("user"))));
    issues.with_column(ASSIGNEES_LIST, |row| {
        let logins = combine_assignees(row.cell(ASSIGNEES), row.cell(ASSIGNEE));
        Value::Array(logins.into_iter().map(Value::String).collect())
    });

    let distribution = issues
        .rows()
        .iter()
        .map(|row| assignees_of(row).len())
        .counts()
        .into_iter()
        .sorted()
        .collect::<Vec<_>>();
    debug!("Assignees per issue (count, issues): {distribution:?}");
}

/// One row per (issue, assignee). Issues without assignees produce no rows.
pub fn expand_issues(issues: &Table) -> Table {
    let rows = issues
        .rows()
        .iter()
        .flat_map(|row| {
            assignees_of(row)
                .into_iter()
                .map(move |login| expanded_row(row, login))
        })
        .collect::<Vec<_>>();

    if rows.is_empty() {
        warn!("⚠️ No assignees found in the issues.");
        return Table::with_columns([ASSIGNEE]);
    }
    info!("Created {} assignee-issue rows", rows.len());
    Table::from_rows(rows)
}

fn expanded_row(issue: &Row, login: String) -> Row {
    let mut row = issue
        .iter()
        .filter(|(column, _)| column.as_str() != ASSIGNEES_LIST)
        .map(|(column, value)| (column.clone(), value.clone()))
        .collect::<Row>();
    row.insert(ASSIGNEE.to_string(), Value::String(login));
    row
}

fn assignees_of(row: &Row) -> Vec<String> {
    row.cell(ASSIGNEES_LIST)
        .as_array()
        .map(|logins| {
            logins
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
