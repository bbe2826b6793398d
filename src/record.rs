//! Issue Record data model and the API/scrape merger
//!
//! An Issue Record is built once per run from the two fetch results, never
//! mutated afterwards. Every field is always present; `"N/A"` marks data
//! that neither source provided.

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;

use crate::comicvine::{Issue, NamedResource};
use crate::dates::{normalize_cover_date, normalize_store_date};
use crate::scrape::ScrapedPage;
use crate::text::strip_tags;

/// Sentinel value for fields with no available data.
pub const NA: &str = "N/A";

/// A single creator credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub name: String,
    pub role: String,
}

/// A record field value: plain text or a list of creator credits.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Text(String),
    Credits(Vec<Creator>),
}

impl Field {
    pub fn na() -> Self {
        Field::Text(NA.to_string())
    }

    /// Flat cell rendering shared by the CSV and HTML emitters, so both
    /// artifacts show identical values.
    pub fn as_cell(&self) -> String {
        match self {
            Field::Text(text) => text.clone(),
            Field::Credits(creators) => creators
                .iter()
                .map(|c| format!("{} ({})", c.name, c.role))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Text(text) => serializer.serialize_str(text),
            Field::Credits(creators) => {
                let mut seq = serializer.serialize_seq(Some(creators.len()))?;
                for creator in creators {
                    seq.serialize_element(creator)?;
                }
                seq.end()
            }
        }
    }
}

/// The canonical merged issue metadata, in fixed field order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueRecord {
    #[serde(rename = "Series")]
    pub series: String,
    #[serde(rename = "Number")]
    pub number: String,
    #[serde(rename = "Collection Title")]
    pub collection_title: String,
    #[serde(rename = "Story Titles")]
    pub story_titles: String,
    #[serde(rename = "Cover")]
    pub cover: String,
    #[serde(rename = "Cover Date")]
    pub cover_date: String,
    #[serde(rename = "In Store Date")]
    pub in_store_date: String,
    #[serde(rename = "Comic Vine ID")]
    pub comic_vine_id: String,
    #[serde(rename = "ISBN")]
    pub isbn: String,
    #[serde(rename = "Distributor SKU")]
    pub distributor_sku: String,
    #[serde(rename = "UPC")]
    pub upc: String,
    #[serde(rename = "Cover Price")]
    pub cover_price: String,
    #[serde(rename = "Page Count")]
    pub page_count: String,
    #[serde(rename = "Format")]
    pub format: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Creators")]
    pub creators: Field,
    #[serde(rename = "Creators (CV)")]
    pub creators_cv: String,
    #[serde(rename = "Characters")]
    pub characters: String,
    #[serde(rename = "Teams")]
    pub teams: String,
    #[serde(rename = "Arcs")]
    pub arcs: String,
}

impl IssueRecord {
    /// Field names and flat cell values in record order. Both the tabular
    /// and markup emitters and the console summary read from here.
    pub fn cells(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Series", self.series.clone()),
            ("Number", self.number.clone()),
            ("Collection Title", self.collection_title.clone()),
            ("Story Titles", self.story_titles.clone()),
            ("Cover", self.cover.clone()),
            ("Cover Date", self.cover_date.clone()),
            ("In Store Date", self.in_store_date.clone()),
            ("Comic Vine ID", self.comic_vine_id.clone()),
            ("ISBN", self.isbn.clone()),
            ("Distributor SKU", self.distributor_sku.clone()),
            ("UPC", self.upc.clone()),
            ("Cover Price", self.cover_price.clone()),
            ("Page Count", self.page_count.clone()),
            ("Format", self.format.clone()),
            ("Description", self.description.clone()),
            ("Creators", self.creators.as_cell()),
            ("Creators (CV)", self.creators_cv.clone()),
            ("Characters", self.characters.clone()),
            ("Teams", self.teams.clone()),
            ("Arcs", self.arcs.clone()),
        ]
    }
}

/// Merge duplicate creator names, unioning their role sets.
///
/// First-seen name order is preserved; merged role sets are sorted so the
/// result does not depend on input order.
pub fn merge_creator_roles(entries: Vec<Creator>) -> Vec<Creator> {
    let mut merged: Vec<Creator> = Vec::new();

    for entry in entries {
        if let Some(existing) = merged.iter_mut().find(|c| c.name == entry.name) {
            let mut roles: BTreeSet<String> = existing
                .role
                .split(", ")
                .map(str::to_string)
                .collect();
            roles.extend(entry.role.split(", ").map(str::to_string));
            existing.role = roles.into_iter().collect::<Vec<_>>().join(", ");
        } else {
            merged.push(entry);
        }
    }

    merged
}

/// Combine the API issue and the scraped page into one Issue Record.
///
/// Identity and catalog fields come from the API; bibliographic, physical,
/// and story/creator-credit fields come from the page scrape. The API's own
/// creator list is kept under "Creators (CV)" rather than overwritten.
pub fn build_record(issue: &Issue, scraped: &ScrapedPage) -> IssueRecord {
    let creators = if scraped.creators.is_empty() {
        Field::na()
    } else {
        Field::Credits(scraped.creators.clone())
    };

    let cv_creators: Vec<String> = issue
        .person_credits
        .iter()
        .map(|p| format!("{} ({})", p.name, p.role))
        .collect();

    IssueRecord {
        series: issue
            .volume
            .as_ref()
            .map(|v| v.name.clone())
            .unwrap_or_else(|| NA.to_string()),
        number: or_na(issue.issue_number.as_deref()),
        collection_title: or_na(issue.name.as_deref()),
        story_titles: if scraped.story_titles.is_empty() {
            NA.to_string()
        } else {
            scraped.story_titles.join("; ")
        },
        cover: issue
            .image
            .as_ref()
            .and_then(|i| i.original_url.clone())
            .unwrap_or_else(|| NA.to_string()),
        cover_date: issue
            .cover_date
            .as_deref()
            .map(normalize_cover_date)
            .unwrap_or_else(|| NA.to_string()),
        in_store_date: issue
            .store_date
            .as_deref()
            .map(normalize_store_date)
            .unwrap_or_else(|| NA.to_string()),
        comic_vine_id: issue.id.to_string(),
        isbn: or_na(scraped.isbn.as_deref()),
        distributor_sku: or_na(scraped.distributor_sku.as_deref()),
        upc: or_na(scraped.upc.as_deref()),
        cover_price: or_na(scraped.cover_price.as_deref()),
        page_count: or_na(scraped.page_count.as_deref()),
        format: or_na(scraped.format.as_deref()),
        description: issue
            .description
            .as_deref()
            .map(strip_tags)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NA.to_string()),
        creators,
        creators_cv: if cv_creators.is_empty() {
            NA.to_string()
        } else {
            cv_creators.join(", ")
        },
        characters: join_names(&issue.character_credits),
        teams: join_names(&issue.team_credits),
        arcs: join_names(&issue.story_arc_credits),
    }
}

fn or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => NA.to_string(),
    }
}

fn join_names(resources: &[NamedResource]) -> String {
    if resources.is_empty() {
        NA.to_string()
    } else {
        resources
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
