use crate::analyze::expand::{
    expand_issues, prepare_issues, prepare_members, ASSIGNEE, CREATOR, LOGIN, TEAM_SLUG,
};
use crate::analyze::{Analysis, DataAnalysis, IssuesAnalyzed, MemberStats, TeamStats, UserStatistics};
use crate::model::{RowExt, Table, UNKNOWN_LOGIN};
use indexmap::{IndexMap, IndexSet};
use log::{info, warn};
use std::collections::BTreeSet;

pub trait Analyzer {
    fn analyze_issues(self) -> Analysis;
}

impl Analyzer for DataAnalysis {
    fn analyze_issues(mut self) -> Analysis {
        if self.members.is_empty() || self.issues.is_empty() {
            warn!(
                "⚠️ Insufficient data for processing. Members: {} Issues: {}",
                self.members.len(),
                self.issues.len()
            );
            return Analysis::InsufficientData {
                members: self.members.len(),
                issues: self.issues.len(),
            };
        }

        prepare_members(&mut self.members);
        prepare_issues(&mut self.issues);
        let expanded = expand_issues(&self.issues);

        let users = count_issues_by_member(&self.members, &self.issues, &expanded);
        let teams = self
            .members
            .has_column(TEAM_SLUG)
            .then(|| team_rollup(&self.members, &users));
        info!(
            "✅ Statistics computed for {} users{}",
            users.len(),
            teams
                .as_ref()
                .map(|t| format!(" in {} teams", t.len()))
                .unwrap_or_default()
        );

        Analysis::Ready(IssuesAnalyzed {
            total_issues: self.issues.len(),
            users,
            teams,
        })
    }
}

/// Created and assigned counts for every login seen in the roster, as a creator or as an
/// assignee. Unknown and empty logins are left out.
pub fn count_issues_by_member(members: &Table, issues: &Table, expanded: &Table) -> UserStatistics {
    let roster = members
        .rows()
        .iter()
        .filter_map(|row| row.text(LOGIN))
        .collect::<IndexSet<_>>();
    let created = issues.group_count(CREATOR);
    let mut assigned = expanded.group_count(ASSIGNEE);
    assigned.shift_remove("");

    let universe = roster
        .iter()
        .chain(created.keys())
        .chain(assigned.keys())
        .map(String::as_str)
        .filter(|login| is_valid_login(login))
        .collect::<BTreeSet<_>>();
    if universe.is_empty() {
        warn!("⚠️ No valid user found for analysis.");
    }

    let teams = members
        .has_column(TEAM_SLUG)
        .then(|| team_assignments(members));

    let rows = universe
        .into_iter()
        .map(|login| {
            let mut row = MemberStats::new(
                login,
                created.get(login).copied().unwrap_or(0),
                assigned.get(login).copied().unwrap_or(0),
                roster.contains(login),
            );
            row.teams = teams.as_ref().and_then(|t| t.get(login).cloned());
            row
        })
        .collect();
    UserStatistics::new(rows)
}

/// Per-team member count and summed counts, sorted by created issues descending.
///
/// Members without a statistics row still count as members but add nothing to the sums.
pub fn team_rollup(members: &Table, users: &UserStatistics) -> Vec<TeamStats> {
    let mut teams: IndexMap<String, TeamStats> = IndexMap::new();
    for (login, team) in roster_pairs(members) {
        let stats = teams
            .entry(team.clone())
            .or_insert_with(|| TeamStats::new(&team));
        if let Some(user) = users.get(&login) {
            stats.created += user.created;
            stats.assigned += user.assigned;
        }
        stats.members.push(login);
    }

    let mut teams = teams.into_values().collect::<Vec<_>>();
    teams.sort_by(|a, b| b.created.cmp(&a.created));
    teams
}

/// Teams of each login joined with `", "`, in roster order.
fn team_assignments(members: &Table) -> IndexMap<String, String> {
    let mut assignments: IndexMap<String, String> = IndexMap::new();
    for (login, team) in roster_pairs(members) {
        assignments
            .entry(login)
            .and_modify(|teams| {
                teams.push_str(", ");
                teams.push_str(&team);
            })
            .or_insert(team);
    }
    assignments
}

fn roster_pairs(members: &Table) -> impl Iterator<Item = (String, String)> + '_ {
    members.rows().iter().filter_map(|row| {
        let login = row.text(LOGIN).filter(|l| !l.is_empty())?;
        let team = row.text(TEAM_SLUG).filter(|t| !t.is_empty())?;
        Some((login, team))
    })
}

fn is_valid_login(login: &str) -> bool {
    !login.is_empty() && login != UNKNOWN_LOGIN
}
