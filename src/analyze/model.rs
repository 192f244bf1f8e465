use crate::model::Table;

#[derive(Debug, Clone)]
pub struct DataAnalysis {
    pub members: Table,
    pub issues: Table,
}

impl DataAnalysis {
    pub fn new(members: Table, issues: Table) -> Self {
        Self { members, issues }
    }
}

pub enum Analysis {
    Ready(IssuesAnalyzed),
    InsufficientData { members: usize, issues: usize },
}

#[derive(Debug, Clone)]
pub struct IssuesAnalyzed {
    pub total_issues: usize,
    pub users: UserStatistics,
    /// `None` when the roster carries no team column.
    pub teams: Option<Vec<TeamStats>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberStats {
    pub login: String,
    pub created: usize,
    pub assigned: usize,
    pub team_member: bool,
    pub teams: Option<String>,
}

impl MemberStats {
    pub fn new(login: impl ToString, created: usize, assigned: usize, team_member: bool) -> Self {
        Self {
            login: login.to_string(),
            created,
            assigned,
            team_member,
            teams: None,
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.assigned
    }
}

/// Per-user rows, sorted by login.
#[derive(Debug, Clone, Default)]
pub struct UserStatistics {
    rows: Vec<MemberStats>,
}

impl UserStatistics {
    pub fn new(mut rows: Vec<MemberStats>) -> Self {
        rows.sort_by(|a, b| a.login.cmp(&b.login));
        Self { rows }
    }

    pub fn rows(&self) -> &[MemberStats] {
        &self.rows
    }

    pub fn get(&self, login: &str) -> Option<&MemberStats> {
        self.rows
            .binary_search_by(|row| row.login.as_str().cmp(login))
            .ok()
            .map(|index| &self.rows[index])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn team_members(&self) -> usize {
        self.rows.iter().filter(|row| row.team_member).count()
    }

    /// First `limit` rows by `key` descending; ties keep login order.
    pub fn top_by<F>(&self, limit: usize, key: F) -> Vec<&MemberStats>
    where
        F: Fn(&MemberStats) -> usize,
    {
        let mut rows = self.rows.iter().collect::<Vec<_>>();
        rows.sort_by(|a, b| key(b).cmp(&key(a)));
        rows.truncate(limit);
        rows
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamStats {
    pub team: String,
    pub members: Vec<String>,
    pub created: usize,
    pub assigned: usize,
}

impl TeamStats {
    pub fn new(team: impl ToString) -> Self {
        Self {
            team: team.to_string(),
            members: vec![],
            created: 0,
            assigned: 0,
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Created issues per member, rounded half to even at one decimal.
    pub fn average_created(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        let average = self.created as f64 / self.members.len() as f64;
        (average * 10.0).round_ties_even() / 10.0
    }
}
