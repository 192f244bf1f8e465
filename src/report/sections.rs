use crate::analyze::{IssuesAnalyzed, MemberStats, TeamStats};
use crate::report::chart::{BarChart, BarLayout, ChartRenderer, MEMBER_CHART, WIDE_CHART};
use crate::report::Block;
use log::warn;

const TOP_USERS: usize = 5;
const TOP_CONTRIBUTORS: usize = 10;

/// One part of the report, built from the aggregated statistics.
pub trait Section {
    fn build(&self, data: &IssuesAnalyzed, charts: &dyn ChartRenderer) -> Vec<Block>;
}

/// Sections in report order.
pub fn report_sections() -> Vec<Box<dyn Section>> {
    vec![
        Box::new(HeaderSection),
        Box::new(TopCreatorsSection),
        Box::new(TopAssigneesSection),
        Box::new(ContributorsChartSection),
        Box::new(TeamOverviewSection),
        Box::new(TeamProfilesSection),
    ]
}

pub struct HeaderSection;

impl Section for HeaderSection {
    fn build(&self, data: &IssuesAnalyzed, _: &dyn ChartRenderer) -> Vec<Block> {
        vec![
            Block::Heading(1, "📊 Team and Issue Statistics".to_string()),
            Block::Heading(2, "📈 General Summary".to_string()),
            Block::Paragraph(format!(
                "This repository has **{} issues** managed by **{} members** spread across different teams.",
                data.total_issues,
                data.users.team_members()
            )),
        ]
    }
}

pub struct TopCreatorsSection;

impl Section for TopCreatorsSection {
    fn build(&self, data: &IssuesAnalyzed, _: &dyn ChartRenderer) -> Vec<Block> {
        let items = data
            .users
            .top_by(TOP_USERS, |row| row.created)
            .into_iter()
            .map(|row| {
                format!(
                    "**{}**: {} issues created, team(s): {}",
                    row.login,
                    row.created,
                    teams_label(row)
                )
            })
            .collect();
        vec![
            Block::Heading(3, "Top Issue Creators".to_string()),
            Block::Bullets(items),
        ]
    }
}

pub struct TopAssigneesSection;

impl Section for TopAssigneesSection {
    fn build(&self, data: &IssuesAnalyzed, _: &dyn ChartRenderer) -> Vec<Block> {
        let items = data
            .users
            .top_by(TOP_USERS, |row| row.assigned)
            .into_iter()
            .map(|row| {
                format!(
                    "**{}**: {} issues assigned, team(s): {}",
                    row.login,
                    row.assigned,
                    teams_label(row)
                )
            })
            .collect();
        vec![
            Block::Heading(3, "Top Issue Assignees".to_string()),
            Block::Bullets(items),
        ]
    }
}

pub struct ContributorsChartSection;

impl Section for ContributorsChartSection {
    fn build(&self, data: &IssuesAnalyzed, charts: &dyn ChartRenderer) -> Vec<Block> {
        let rows = data
            .users
            .top_by(TOP_CONTRIBUTORS, MemberStats::total)
            .into_iter()
            .map(|row| (row.login.clone(), row.created, row.assigned))
            .collect();
        let chart = BarChart::created_assigned(
            "Top 10 Contributors (Issues Created + Assigned)",
            "Users",
            rows,
            BarLayout::Stacked,
            WIDE_CHART,
        );
        chart_block(charts, "Top Contributors Chart", &chart)
            .into_iter()
            .collect()
    }
}

pub struct TeamOverviewSection;

impl Section for TeamOverviewSection {
    fn build(&self, data: &IssuesAnalyzed, charts: &dyn ChartRenderer) -> Vec<Block> {
        let Some(teams) = &data.teams else {
            return vec![];
        };
        let mut blocks = vec![Block::Heading(2, "🏢 Team Analysis".to_string())];

        let mut narrative = format!("The repository has **{}** active teams.", teams.len());
        if let Some(top) = teams.first() {
            narrative.push_str(&format!(
                " The team with the most issues created is **{}** with {} issues.",
                top.team, top.created
            ));
        }
        blocks.push(Block::Paragraph(narrative));
        if teams.is_empty() {
            return blocks;
        }

        blocks.push(Block::Heading(3, "Team Summary".to_string()));
        blocks.push(Block::Bullets(teams.iter().map(team_summary).collect()));

        let rows = teams
            .iter()
            .map(|team| (team.team.clone(), team.created, team.assigned))
            .collect();
        let chart = BarChart::created_assigned(
            "Contribution by Team",
            "Team",
            rows,
            BarLayout::Grouped,
            WIDE_CHART,
        );
        blocks.extend(chart_block(charts, "Team Contribution Chart", &chart));
        blocks
    }
}

pub struct TeamProfilesSection;

impl Section for TeamProfilesSection {
    fn build(&self, data: &IssuesAnalyzed, charts: &dyn ChartRenderer) -> Vec<Block> {
        let Some(teams) = &data.teams else {
            return vec![];
        };
        let mut blocks = vec![Block::Heading(2, "📋 Team Profiles".to_string())];
        let mut teams = teams.iter().collect::<Vec<_>>();
        teams.sort_by(|a, b| a.team.cmp(&b.team));
        for team in teams {
            blocks.extend(team_profile(data, team, charts));
        }
        blocks
    }
}

fn team_profile(data: &IssuesAnalyzed, team: &TeamStats, charts: &dyn ChartRenderer) -> Vec<Block> {
    let mut blocks = vec![
        Block::Heading(3, format!("🔍 {}", team.team)),
        Block::Paragraph(format!(
            "Team **{}** has {} members, who created {} issues and received {} assignments.",
            team.team,
            team.member_count(),
            team.created,
            team.assigned
        )),
        Block::Paragraph("**Members and their contributions:**".to_string()),
    ];

    let mut members = team.members.iter().collect::<Vec<_>>();
    members.sort();
    let mut items = vec![];
    let mut charted = vec![];
    for member in members {
        match data.users.get(member) {
            Some(row) => {
                items.push(format!(
                    "**{}**: {} issues created, {} issues assigned",
                    member, row.created, row.assigned
                ));
                charted.push((member.clone(), row.created, row.assigned));
            }
            None => items.push(format!("**{member}**: 0 issues created, 0 issues assigned")),
        }
    }
    blocks.push(Block::Bullets(items));

    if charted.iter().any(|(_, created, _)| *created > 0) {
        let chart = BarChart::created_assigned(
            format!("Member Contribution - {}", team.team),
            "Member",
            charted,
            BarLayout::Grouped,
            MEMBER_CHART,
        );
        blocks.extend(chart_block(charts, "Member Contributions", &chart));
    }
    blocks.push(Block::Rule);
    blocks
}

fn team_summary(team: &TeamStats) -> String {
    format!(
        "**{}**: {} members, {} issues created, {} issues assigned, average of {:.1} issues per member",
        team.team,
        team.member_count(),
        team.created,
        team.assigned,
        team.average_created()
    )
}

fn teams_label(row: &MemberStats) -> &str {
    if !row.team_member {
        return "not a team member";
    }
    row.teams.as_deref().unwrap_or("not specified")
}

/// Rendered image block, or nothing when the chart is empty or fails to render.
fn chart_block(charts: &dyn ChartRenderer, alt: &str, chart: &BarChart) -> Option<Block> {
    if chart.is_empty() {
        return None;
    }
    match charts.render_png(chart) {
        Ok(png) => Some(Block::Image {
            alt: alt.to_string(),
            png,
        }),
        Err(err) => {
            warn!("⚠️ Skipping chart `{}`: {err}", chart.title);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::UserStatistics;
    use crate::model::{Error, Result};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingCharts {
        titles: RefCell<Vec<String>>,
    }

    impl ChartRenderer for RecordingCharts {
        fn render_png(&self, chart: &BarChart) -> Result<Vec<u8>> {
            self.titles.borrow_mut().push(chart.title.clone());
            Ok(vec![1, 2, 3])
        }
    }

    struct FailingCharts;

    impl ChartRenderer for FailingCharts {
        fn render_png(&self, _: &BarChart) -> Result<Vec<u8>> {
            Err(Error::Chart("no backend".to_string()))
        }
    }

    fn member(login: &str, created: usize, assigned: usize, teams: Option<&str>) -> MemberStats {
        let mut row = MemberStats::new(login, created, assigned, teams.is_some());
        row.teams = teams.map(String::from);
        row
    }

    fn team(name: &str, members: &[&str], created: usize, assigned: usize) -> TeamStats {
        let mut team = TeamStats::new(name);
        team.members = members.iter().map(|m| m.to_string()).collect();
        team.created = created;
        team.assigned = assigned;
        team
    }

    fn data() -> IssuesAnalyzed {
        IssuesAnalyzed {
            total_issues: 4,
            users: UserStatistics::new(vec![
                member("ana", 3, 0, Some("core, web")),
                member("bia", 0, 2, Some("core")),
                member("out", 1, 1, None),
            ]),
            teams: Some(vec![
                team("core", &["bia", "ana"], 3, 2),
                team("web", &["ana", "ghost"], 3, 0),
            ]),
        }
    }

    fn bullets(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .find_map(|block| match block {
                Block::Bullets(items) => Some(items.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn images(blocks: &[Block]) -> Vec<&str> {
        blocks
            .iter()
            .filter_map(|block| match block {
                Block::Image { alt, .. } => Some(alt.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn header_counts_team_members() {
        let blocks = HeaderSection.build(&data(), &RecordingCharts::default());
        assert_eq!(
            blocks[2],
            Block::Paragraph(
                "This repository has **4 issues** managed by **2 members** spread across different teams."
                    .to_string()
            )
        );
    }

    #[test]
    fn top_creators_label_teams() {
        let items = bullets(&TopCreatorsSection.build(&data(), &RecordingCharts::default()));
        assert_eq!(
            items,
            vec![
                "**ana**: 3 issues created, team(s): core, web",
                "**out**: 1 issues created, team(s): not a team member",
                "**bia**: 0 issues created, team(s): core",
            ]
        );
    }

    #[test]
    fn member_without_teams_is_not_specified() {
        let mut row = MemberStats::new("solo", 0, 0, true);
        assert_eq!(teams_label(&row), "not specified");
        row.team_member = false;
        assert_eq!(teams_label(&row), "not a team member");
    }

    #[test]
    fn top_assignees_sorted_by_assigned() {
        let items = bullets(&TopAssigneesSection.build(&data(), &RecordingCharts::default()));
        assert_eq!(items[0], "**bia**: 2 issues assigned, team(s): core");
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn contributors_chart_is_stacked_top_ten() {
        let charts = RecordingCharts::default();
        let blocks = ContributorsChartSection.build(&data(), &charts);
        assert_eq!(images(&blocks), vec!["Top Contributors Chart"]);

        let empty = IssuesAnalyzed {
            total_issues: 1,
            users: UserStatistics::default(),
            teams: None,
        };
        assert!(ContributorsChartSection.build(&empty, &charts).is_empty());
    }

    #[test]
    fn team_sections_skipped_without_team_data() {
        let mut data = data();
        data.teams = None;
        let charts = RecordingCharts::default();
        assert!(TeamOverviewSection.build(&data, &charts).is_empty());
        assert!(TeamProfilesSection.build(&data, &charts).is_empty());
    }

    #[test]
    fn team_overview_names_top_team() {
        let charts = RecordingCharts::default();
        let blocks = TeamOverviewSection.build(&data(), &charts);
        assert_eq!(
            blocks[1],
            Block::Paragraph(
                "The repository has **2** active teams. The team with the most issues created is **core** with 3 issues."
                    .to_string()
            )
        );
        assert_eq!(
            bullets(&blocks)[1],
            "**web**: 2 members, 3 issues created, 0 issues assigned, average of 1.5 issues per member"
        );
        assert_eq!(charts.titles.borrow().as_slice(), ["Contribution by Team"]);
    }

    #[test]
    fn team_profiles_list_members_and_chart_only_with_created() {
        let mut data = data();
        data.teams.as_mut().unwrap().push(team("idle", &["bia"], 0, 2));
        let charts = RecordingCharts::default();
        let blocks = TeamProfilesSection.build(&data, &charts);

        let headings = blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading(3, text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(headings, vec!["🔍 core", "🔍 idle", "🔍 web"]);
        assert!(blocks.contains(&Block::Bullets(vec![
            "**ana**: 3 issues created, 0 issues assigned".to_string(),
            "**ghost**: 0 issues created, 0 issues assigned".to_string(),
        ])));
        assert_eq!(
            charts.titles.borrow().as_slice(),
            ["Member Contribution - core", "Member Contribution - web"]
        );
        assert_eq!(blocks.iter().filter(|b| **b == Block::Rule).count(), 3);
    }

    #[test]
    fn failed_chart_is_omitted() {
        let blocks = TeamOverviewSection.build(&data(), &FailingCharts);
        assert!(images(&blocks).is_empty());
        assert!(!bullets(&blocks).is_empty());
    }
}
