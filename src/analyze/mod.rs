pub mod analyzer;
pub mod assignees;
pub mod expand;
mod model;

pub use analyzer::Analyzer;
pub use model::{Analysis, DataAnalysis, IssuesAnalyzed, MemberStats, TeamStats, UserStatistics};
