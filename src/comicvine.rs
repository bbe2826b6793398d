//! Comicvine API client
//!
//! Thin JSON client for the issue endpoint. The session is constructed once
//! at process start and passed into the pipeline explicitly.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

const API_BASE: &str = "https://comicvine.gamespot.com/api";
const USER_AGENT: &str = concat!("comic-scrape/", env!("CARGO_PKG_VERSION"));

/// Comicvine API session.
pub struct Comicvine {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

/// API response envelope.
#[derive(Debug, Deserialize)]
struct IssueResponse {
    error: String,
    status_code: i64,
    results: Option<Issue>,
}

/// An issue as returned by the Comicvine API.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub id: u64,
    /// Collection title (often null for single issues)
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub issue_number: Option<String>,
    /// Loosely formatted, e.g. "2023-03-01" or "March 2023"
    #[serde(default)]
    pub cover_date: Option<String>,
    #[serde(default)]
    pub store_date: Option<String>,
    /// HTML fragment
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub volume: Option<NamedResource>,
    #[serde(default)]
    pub person_credits: Vec<PersonCredit>,
    #[serde(default)]
    pub character_credits: Vec<NamedResource>,
    #[serde(default)]
    pub team_credits: Vec<NamedResource>,
    #[serde(default)]
    pub story_arc_credits: Vec<NamedResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub original_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
}

/// A person credit; `role` is a comma-joined role list.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonCredit {
    pub name: String,
    #[serde(default)]
    pub role: String,
}

impl Comicvine {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base(api_key, API_BASE)
    }

    /// Build a session against a non-default API base (tests).
    pub fn with_base(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    /// Fetch a single issue by its numeric ID.
    pub async fn get_issue(&self, issue_id: u64) -> Result<Issue> {
        let url = format!("{}/issue/4000-{}/", self.base_url, issue_id);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("format", "json")])
            .send()
            .await
            .context("Failed to reach Comicvine")?;

        if !response.status().is_success() {
            bail!("Comicvine API error: HTTP {}", response.status());
        }

        let envelope: IssueResponse = response
            .json()
            .await
            .context("Failed to parse Comicvine response")?;

        // status_code 1 means OK; anything else carries an error string
        if envelope.status_code != 1 {
            bail!("Comicvine API error: {}", envelope.error);
        }

        envelope
            .results
            .with_context(|| format!("Comicvine returned no issue for ID {}", issue_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_issue() {
        let json = r#"{
            "id": 123456,
            "name": "The Example Collection",
            "issue_number": "3",
            "cover_date": "2023-03-01",
            "store_date": "2023-01-15",
            "description": "<p>Desc</p>",
            "image": {"original_url": "https://img.example.com/cover.jpg"},
            "volume": {"id": 99, "name": "Example Vol 1"},
            "person_credits": [{"id": 7, "name": "Jane Doe", "role": "writer, artist"}],
            "character_credits": [{"id": 1, "name": "Hero"}]
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.id, 123456);
        assert_eq!(issue.volume.unwrap().name, "Example Vol 1");
        assert_eq!(issue.person_credits[0].role, "writer, artist");
        assert!(issue.team_credits.is_empty());
    }

    #[test]
    fn test_deserialize_sparse_issue() {
        let json = r#"{"id": 1}"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert!(issue.name.is_none());
        assert!(issue.image.is_none());
        assert!(issue.person_credits.is_empty());
    }

    #[test]
    fn test_deserialize_error_envelope() {
        let json = r#"{"error": "Invalid API Key", "status_code": 100, "results": null}"#;
        let envelope: IssueResponse = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status_code, 100);
        assert!(envelope.results.is_none());
    }
}
