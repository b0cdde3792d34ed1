//! GitHub REST client.
//!
//! Authenticated `GET`s only. Status 204 is "no content" (`Ok(None)`),
//! anything but 200 is [`RemoteError::BadStatus`].

use std::time::Duration;

use serde::de::DeserializeOwned;

use radar_core::GithubConfig;

use crate::error::RemoteError;
use crate::source::RemoteSource;
use crate::types::{LanguageBreakdown, RemoteContributor, RemoteOrganization, RemoteRepository};

const ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Debug, Clone)]
pub struct GithubClient {
    agent: ureq::Agent,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(api_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("octoradar/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn from_config(config: &GithubConfig) -> Self {
        if config.token.is_none() {
            tracing::warn!("no GitHub token configured; requests are unauthenticated");
        }
        Self::new(
            config.api_url.clone(),
            config.token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// `GET {api_url}{path}` decoded as `T`.
    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, RemoteError> {
        let url = format!("{}{}", self.api_url, path);
        let mut request = self.agent.get(&url).set("Accept", ACCEPT);
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(RemoteError::BadStatus { status, url });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(RemoteError::Transport {
                    url,
                    source: Box::new(transport),
                });
            }
        };

        match response.status() {
            204 => {
                tracing::warn!(url = %url, "no content returned");
                Ok(None)
            }
            200 => response
                .into_json::<T>()
                .map(Some)
                .map_err(|source| RemoteError::Decode { url, source }),
            status => Err(RemoteError::BadStatus { status, url }),
        }
    }
}

impl RemoteSource for GithubClient {
    fn list_organizations(&self) -> Result<Vec<RemoteOrganization>, RemoteError> {
        Ok(self.get_json("/user/orgs")?.unwrap_or_default())
    }

    fn list_organization_repositories(
        &self,
        organization: &str,
    ) -> Result<Vec<RemoteRepository>, RemoteError> {
        Ok(self
            .get_json(&format!("/orgs/{organization}/repos"))?
            .unwrap_or_default())
    }

    fn get_repository_languages(
        &self,
        organization: &str,
        repository: &str,
    ) -> Result<Option<LanguageBreakdown>, RemoteError> {
        self.get_json(&format!("/repos/{organization}/{repository}/languages"))
    }

    fn get_repository_contributors(
        &self,
        organization: &str,
        repository: &str,
    ) -> Result<Option<Vec<RemoteContributor>>, RemoteError> {
        self.get_json(&format!("/repos/{organization}/{repository}/contributors"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed_from_api_url() {
        let client = GithubClient::new("https://api.github.com/", None, Duration::from_secs(1));
        assert_eq!(client.api_url(), "https://api.github.com");
    }

    #[test]
    fn from_config_uses_configured_url() {
        let config = GithubConfig {
            api_url: "http://127.0.0.1:1".to_string(),
            token: Some("t".to_string()),
            timeout_secs: 2,
        };
        assert_eq!(GithubClient::from_config(&config).api_url(), "http://127.0.0.1:1");
    }
}
