use crate::model::{Error, Result};
use std::fmt;

/// Repository coordinates and access token for the GitHub source.
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    pub owner: String,
    pub name: String,
    pub token: String,
}

// New
impl Credentials {
    pub fn from_env_values(repository: Option<&str>, token: Option<&str>) -> Result<Self> {
        let Some(repository) = non_blank(repository) else {
            return Err(Error::Configuration(
                "GITHUB_REPOSITORY is not set".to_string(),
            ));
        };
        let Some(token) = non_blank(token) else {
            return Err(Error::Configuration("GITHUB_TOKEN is not set".to_string()));
        };
        let (owner, name) = Self::parse_repository(repository)?;
        Ok(Self::new(owner, name, token))
    }

    fn new(owner: impl ToString, name: impl ToString, token: impl ToString) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            token: token.to_string(),
        }
    }

    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

// Parser
impl Credentials {
    fn parse_repository(repository: &str) -> Result<(&str, &str)> {
        match repository.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok((owner, name))
            }
            _ => Err(Error::Configuration(format!(
                "Not a valid repository `{repository}`, expected `owner/name`"
            ))),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("token", &"***")
            .finish()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
