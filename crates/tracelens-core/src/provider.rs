//! Git hosting provider clients.
//!
//! One implementation per supported provider behind the [`GitProvider`]
//! trait, so the budgeted fetch loop stays provider-agnostic. Providers
//! fetch single files at a ref; nothing here clones repositories.

use async_trait::async_trait;
use base64::Engine;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

use crate::domain::{FetchError, GitProviderKind, RepoConfig};

/// Characters escaped in path segments. '/' is kept for GitHub (path stays
/// hierarchical) and escaped separately for GitLab (single encoded segment).
const PATH_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'%');

/// Capability: fetch one file's full content at a ref.
#[async_trait]
pub trait GitProvider: Send + Sync {
    async fn fetch_file(&self, path: &str, ref_name: &str) -> Result<String, FetchError>;
}

/// Snapshot of the environment variables relevant to token resolution.
///
/// An explicit map instead of process-wide lookups, so tests can inject
/// whatever environment they need.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn from_process_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Resolve the access token for a project, in order:
/// 1. explicit token on the repo config,
/// 2. a project-scoped variable derived from the project key
///    ("checkout-api" -> `CHECKOUT_API_TOKEN`),
/// 3. the global `GIT_FALLBACK_TOKEN`, then `GITHUB_TOKEN`.
///
/// `None` means an unauthenticated fetch, which works for public repos.
pub fn resolve_token(config: &RepoConfig, project_key: &str, env: &EnvSnapshot) -> Option<String> {
    if let Some(token) = config.access_token.as_deref() {
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    let scoped = project_token_var(project_key);
    if let Some(token) = env.get(&scoped) {
        return Some(token.to_string());
    }

    env.get("GIT_FALLBACK_TOKEN")
        .or_else(|| env.get("GITHUB_TOKEN"))
        .map(str::to_string)
}

/// "checkout-api" -> "CHECKOUT_API_TOKEN" (uppercased, non-alphanumeric
/// collapsed to underscores).
fn project_token_var(project_key: &str) -> String {
    let mut name: String = project_key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    name.push_str("_TOKEN");
    name
}

/// Build the provider client for a repo config.
pub fn make_provider(config: &RepoConfig, token: Option<String>) -> Box<dyn GitProvider> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("tracelens/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap_or_default();

    match config.provider {
        GitProviderKind::Github => Box::new(GithubProvider {
            client,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token,
        }),
        GitProviderKind::Gitlab => Box::new(GitlabProvider {
            client,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token,
        }),
    }
}

/// GitHub Contents API client.
pub struct GithubProvider {
    client: reqwest::Client,
    owner: String,
    repo: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct GithubContent {
    content: Option<String>,
}

#[async_trait]
impl GitProvider for GithubProvider {
    async fn fetch_file(&self, path: &str, ref_name: &str) -> Result<String, FetchError> {
        let encoded = utf8_percent_encode(path, PATH_SET).to_string();
        let url = format!(
            "https://api.github.com/repos/{}/{}/contents/{}",
            self.owner, self.repo, encoded
        );

        let mut request = self
            .client
            .get(&url)
            .query(&[("ref", ref_name)])
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let response = request.send().await.map_err(|e| classify(e, path))?;
        check_status(response.status(), path)?;

        let body: GithubContent = response.json().await.map_err(|e| FetchError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let raw = body.content.ok_or_else(|| FetchError::Decode {
            path: path.to_string(),
            reason: "no content field in response".to_string(),
        })?;

        // The API base64-encodes content with embedded newlines.
        let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(stripped)
            .map_err(|e| FetchError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        String::from_utf8(bytes).map_err(|e| FetchError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

/// GitLab repository-files API client.
pub struct GitlabProvider {
    client: reqwest::Client,
    owner: String,
    repo: String,
    token: Option<String>,
}

#[async_trait]
impl GitProvider for GitlabProvider {
    async fn fetch_file(&self, path: &str, ref_name: &str) -> Result<String, FetchError> {
        // GitLab takes the file path as one encoded segment.
        let encoded_path = utf8_percent_encode(path, PATH_SET)
            .to_string()
            .replace('/', "%2F");
        let url = format!(
            "https://gitlab.com/api/v4/projects/{}%2F{}/repository/files/{}/raw",
            self.owner, self.repo, encoded_path
        );

        let mut request = self.client.get(&url).query(&[("ref", ref_name)]);
        if let Some(token) = &self.token {
            request = request.header("PRIVATE-TOKEN", token.clone());
        }

        let response = request.send().await.map_err(|e| classify(e, path))?;
        check_status(response.status(), path)?;

        response.text().await.map_err(|e| FetchError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

fn check_status(status: StatusCode, path: &str) -> Result<(), FetchError> {
    match status {
        StatusCode::NOT_FOUND => Err(FetchError::NotFound {
            path: path.to_string(),
        }),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FetchError::Unauthorized {
            path: path.to_string(),
        }),
        s if s.is_success() => Ok(()),
        s => {
            warn!(path = %path, status = s.as_u16(), "unexpected provider status");
            Err(FetchError::Http {
                path: path.to_string(),
                status: s.as_u16(),
            })
        }
    }
}

fn classify(err: reqwest::Error, path: &str) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            path: path.to_string(),
        }
    } else {
        FetchError::Network {
            path: path.to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GitProviderKind;

    fn config() -> RepoConfig {
        RepoConfig::new(GitProviderKind::Github, "acme", "shop")
    }

    #[test]
    fn test_project_token_var_derivation() {
        assert_eq!(project_token_var("checkout-api"), "CHECKOUT_API_TOKEN");
        assert_eq!(project_token_var("shop.v2"), "SHOP_V2_TOKEN");
        assert_eq!(project_token_var("plain"), "PLAIN_TOKEN");
    }

    #[test]
    fn test_explicit_token_wins() {
        let mut cfg = config();
        cfg.access_token = Some("explicit".to_string());
        let env = EnvSnapshot::default()
            .with_var("CHECKOUT_API_TOKEN", "scoped")
            .with_var("GITHUB_TOKEN", "global");
        assert_eq!(
            resolve_token(&cfg, "checkout-api", &env).as_deref(),
            Some("explicit")
        );
    }

    #[test]
    fn test_project_scoped_token_beats_global() {
        let env = EnvSnapshot::default()
            .with_var("CHECKOUT_API_TOKEN", "scoped")
            .with_var("GITHUB_TOKEN", "global");
        assert_eq!(
            resolve_token(&config(), "checkout-api", &env).as_deref(),
            Some("scoped")
        );
    }

    #[test]
    fn test_global_fallback_token() {
        let env = EnvSnapshot::default().with_var("GITHUB_TOKEN", "global");
        assert_eq!(
            resolve_token(&config(), "checkout-api", &env).as_deref(),
            Some("global")
        );
    }

    #[test]
    fn test_no_token_means_unauthenticated() {
        assert!(resolve_token(&config(), "checkout-api", &EnvSnapshot::default()).is_none());
    }

    #[test]
    fn test_empty_explicit_token_is_ignored() {
        let mut cfg = config();
        cfg.access_token = Some(String::new());
        let env = EnvSnapshot::default().with_var("GITHUB_TOKEN", "global");
        assert_eq!(
            resolve_token(&cfg, "checkout-api", &env).as_deref(),
            Some("global")
        );
    }
}
