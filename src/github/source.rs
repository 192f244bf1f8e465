use crate::model::{Credentials, Error, Result};
use futures::future;
use log::debug;
use serde_json::Value;

const PAGE_SIZE: usize = 100;
const USER_AGENT: &str = concat!("team-issue-stats/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    TeamMembers,
    Issues,
}

impl Stream {
    pub fn name(&self) -> &'static str {
        match self {
            Stream::TeamMembers => "team_members",
            Stream::Issues => "issues",
        }
    }
}

/// Source of raw records for the report streams.
pub trait StreamSource {
    async fn check(&self) -> Result<()>;
    async fn read(&self, stream: Stream) -> Result<Vec<Value>>;
}

pub struct GitHubSource {
    client: reqwest::Client,
    api_url: String,
    credentials: Credentials,
}

impl GitHubSource {
    pub fn new(api_url: impl ToString, credentials: Credentials) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            api_url: api_url.to_string().trim_end_matches('/').to_string(),
            credentials,
        })
    }
}

impl StreamSource for GitHubSource {
    async fn check(&self) -> Result<()> {
        let path = format!("/repos/{}", self.credentials.repository());
        self.get_json(&path, &[]).await.map(|_| ())
    }

    async fn read(&self, stream: Stream) -> Result<Vec<Value>> {
        match stream {
            Stream::TeamMembers => self.fetch_team_members().await,
            Stream::Issues => self.fetch_issues().await,
        }
    }
}

impl GitHubSource {
    async fn fetch_team_members(&self) -> Result<Vec<Value>> {
        let owner = &self.credentials.owner;
        let teams = self.get_pages(&format!("/orgs/{owner}/teams"), &[]).await?;
        let slugs = teams
            .iter()
            .filter_map(|team| team["slug"].as_str().map(String::from))
            .collect::<Vec<_>>();

        let members = future::join_all(slugs.iter().map(|slug| async move {
            let path = format!("/orgs/{owner}/teams/{slug}/members");
            let members = self.get_pages(&path, &[]).await?;
            Ok::<_, Error>(members.into_iter().map(|member| with_team(member, owner, slug)).collect::<Vec<_>>())
        }))
        .await;

        let mut records = vec![];
        for team_members in members {
            records.extend(team_members?);
        }
        Ok(records)
    }

    async fn fetch_issues(&self) -> Result<Vec<Value>> {
        let path = format!("/repos/{}/issues", self.credentials.repository());
        let issues = self.get_pages(&path, &[("state", "all".to_string())]).await?;
        Ok(issues
            .into_iter()
            .filter(|issue| issue.get("pull_request").is_none())
            .collect())
    }

    async fn get_pages(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Value>> {
        let mut page = 1;
        let mut records = vec![];
        loop {
            let mut params = query.to_vec();
            params.push(("per_page", PAGE_SIZE.to_string()));
            params.push(("page", page.to_string()));
            let Value::Array(items) = self.get_json(path, &params).await? else {
                return Err(Error::Fetch(format!("Expected a list from `{path}`")));
            };
            debug!("{path}: page {page} with {} records", items.len());
            let last_page = items.len() < PAGE_SIZE;
            records.extend(items);
            if last_page {
                break;
            }
            page += 1;
        }
        Ok(records)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let response = self
            .client
            .get(format!("{}{path}", self.api_url))
            .bearer_auth(&self.credentials.token)
            .header("Accept", "application/vnd.github+json")
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Fetch(format!("GitHub API error {status} for `{path}`: {text}")));
        }
        Ok(response.json().await?)
    }
}

fn with_team(mut member: Value, org: &str, team_slug: &str) -> Value {
    if let Value::Object(map) = &mut member {
        map.insert("org".to_string(), Value::String(org.to_string()));
        map.insert("team_slug".to_string(), Value::String(team_slug.to_string()));
    }
    member
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stream_names() {
        assert_eq!(Stream::TeamMembers.name(), "team_members");
        assert_eq!(Stream::Issues.name(), "issues");
    }

    #[test]
    fn members_are_tagged_with_team() {
        let member = with_team(json!({"login": "ana"}), "leds", "core");
        assert_eq!(member, json!({"login": "ana", "org": "leds", "team_slug": "core"}));
    }

    #[test]
    fn api_url_trailing_slash_is_dropped() {
        let credentials = Credentials::from_env_values(Some("a/b"), Some("t")).unwrap();
        let source = GitHubSource::new("https://api.github.com/", credentials).unwrap();
        assert_eq!(source.api_url, "https://api.github.com");
    }
}
