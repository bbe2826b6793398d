//! League of Comic Geeks page scraper
//!
//! Fetches an issue page with a browser-like request identity and extracts
//! bibliographic fields from the DOM. Each field is extracted independently;
//! one missing section never discards the others.

use anyhow::{Context, Result};
use clap::Args;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::record::{merge_creator_roles, Creator};

#[derive(Args)]
pub struct ScrapeArgs {
    /// Issue page URL to scrape
    pub url: String,
}

/// Run the standalone scrape command: fetch one page, print the extracted
/// fields as JSON.
pub async fn run_scrape(args: ScrapeArgs) -> Result<()> {
    let client = reqwest::Client::new();
    let page = scrape_issue_page(&client, &args.url).await?;
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

const REFERER: &str = "https://leagueofcomicgeeks.com";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36";

/// Boilerplate section headings that are not real story titles.
/// Compared case-insensitively against the raw heading text.
const UNWANTED_TITLES: &[&str] = &[
    "overview",
    "[overview]",
    "[title page]",
    "[dedication]",
    "[illustration, title, and credits]",
    "[title, illustration and credits]",
    "[creator biography]",
    "[cover reprint]",
    "[variant cover gallery]",
    "cover progression",
];

/// Fields extracted from an issue page. Fields the page did not provide
/// stay `None`/empty; the merger substitutes the sentinel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScrapedPage {
    pub cover_price: Option<String>,
    pub page_count: Option<String>,
    pub format: Option<String>,
    pub isbn: Option<String>,
    pub distributor_sku: Option<String>,
    pub upc: Option<String>,
    pub story_titles: Vec<String>,
    pub creators: Vec<Creator>,
}

/// Fetch and parse an issue page.
///
/// A non-2xx response yields an empty `ScrapedPage` rather than an error;
/// only transport failures propagate.
pub async fn scrape_issue_page(client: &reqwest::Client, url: &str) -> Result<ScrapedPage> {
    let response = client
        .get(url)
        .header("User-Agent", BROWSER_USER_AGENT)
        .header("Referer", REFERER)
        .send()
        .await
        .with_context(|| format!("Failed to fetch page: {}", url))?;

    if !response.status().is_success() {
        eprintln!(
            "Failed to retrieve the LCG page. Status code: {}",
            response.status()
        );
        return Ok(ScrapedPage::default());
    }

    let html = response.text().await.context("Failed to read page body")?;
    Ok(parse_page(&html))
}

/// Extract all fields from the page HTML.
pub fn parse_page(html: &str) -> ScrapedPage {
    let doc = Html::parse_document(html);

    let (format, page_count, cover_price) = extract_price_details(&doc);
    let (isbn, distributor_sku, upc) = extract_catalog_numbers(&doc);

    ScrapedPage {
        cover_price,
        page_count,
        format,
        isbn,
        distributor_sku,
        upc,
        story_titles: extract_story_titles(&doc),
        creators: extract_creators(&doc),
    }
}

/// Parse the italic price/details line, e.g. "Hardcover · 280 pages · $49.99".
fn extract_price_details(doc: &Html) -> (Option<String>, Option<String>, Option<String>) {
    let Some(line) = select_text(doc, "div.col.copy-small.font-italic") else {
        return (None, None, None);
    };

    let re = Regex::new(r"(?:([^·]+?)\s+·\s+)?(\d+)\s+pages\s+·\s+\$(\d+\.\d{2})")
        .expect("valid regex");

    match re.captures(&line) {
        Some(caps) => {
            let format = caps.get(1).map(|m| m.as_str().trim().to_string());
            let pages = Some(caps[2].to_string());
            let price = Some(caps[3].to_string());
            (format, pages, price)
        }
        None => (None, None, None),
    }
}

/// Walk the named key/value blocks for ISBN, Distributor SKU, and UPC.
fn extract_catalog_numbers(doc: &Html) -> (Option<String>, Option<String>, Option<String>) {
    let mut isbn = None;
    let mut sku = None;
    let mut upc = None;

    let (Ok(block_sel), Ok(name_sel), Ok(value_sel)) = (
        Selector::parse("div.details-addtl-block"),
        Selector::parse("div.name"),
        Selector::parse("div.value"),
    ) else {
        return (None, None, None);
    };

    for block in doc.select(&block_sel) {
        let name = block
            .select(&name_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let Some(value) = block.select(&value_sel).next().map(element_text) else {
            continue;
        };

        match name.as_str() {
            "ISBN" => isbn = Some(value),
            "Distributor SKU" => sku = Some(value),
            "UPC" => upc = Some(value),
            _ => {}
        }
    }

    (isbn, sku, upc)
}

/// Collect story headings, drop denylisted boilerplate, strip enclosing
/// brackets from what remains.
fn extract_story_titles(doc: &Html) -> Vec<String> {
    let Ok(sel) = Selector::parse("h4.story-title") else {
        return Vec::new();
    };

    let bracket_re = Regex::new(r"^\[(.*?)\]$").expect("valid regex");
    let mut titles = Vec::new();

    for heading in doc.select(&sel) {
        let title = element_text(heading);
        if title.is_empty() {
            continue;
        }
        let normalized = title.to_lowercase();
        if UNWANTED_TITLES.contains(&normalized.as_str()) {
            continue;
        }
        let cleaned = bracket_re.replace(&title, "$1").into_owned();
        titles.push(cleaned);
    }

    titles
}

/// Gather creator credits from every creator section and the top-level
/// credits, unioning role sets when a name recurs.
fn extract_creators(doc: &Html) -> Vec<Creator> {
    let mut entries = Vec::new();

    // Legacy single featured section (requires an avatar per entry)
    if let Ok(sel) = Selector::parse("section[id='creators-']") {
        for section in doc.select(&sel) {
            entries.extend(creators_in(section, true));
        }
    }

    // Family of sections sharing the ID prefix
    if let Ok(sel) = Selector::parse("section[id^='creators-']") {
        for section in doc.select(&sel) {
            entries.extend(creators_in(section, false));
        }
    }

    // Cover artists and production credits under top-level-credits
    for sel_str in [
        "section#top-level-credits div#cover-artists",
        "section#top-level-credits div#credits-production",
    ] {
        if let Ok(sel) = Selector::parse(sel_str) {
            for group in doc.select(&sel) {
                entries.extend(creators_in(group, false));
            }
        }
    }

    merge_creator_roles(entries)
}

/// Name/role pairs inside one credits container.
fn creators_in(container: ElementRef<'_>, require_avatar: bool) -> Vec<Creator> {
    let (Ok(entry_sel), Ok(name_sel), Ok(role_sel), Ok(avatar_sel)) = (
        Selector::parse("div.col-auto"),
        Selector::parse("div.name"),
        Selector::parse("div.role"),
        Selector::parse("div.avatar"),
    ) else {
        return Vec::new();
    };

    let mut creators = Vec::new();

    for entry in container.select(&entry_sel) {
        if require_avatar && entry.select(&avatar_sel).next().is_none() {
            continue;
        }
        let name = entry.select(&name_sel).next().map(element_text);
        let role = entry.select(&role_sel).next().map(element_text);
        if let (Some(name), Some(role)) = (name, role) {
            if !name.is_empty() && !role.is_empty() {
                creators.push(Creator { name, role });
            }
        }
    }

    creators
}

fn select_text(doc: &Html, sel: &str) -> Option<String> {
    let selector = Selector::parse(sel).ok()?;
    doc.select(&selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = r#"
        <html><body>
        <div class="col copy-small font-italic">Hardcover · 280 pages · $49.99</div>
        <div class="details-addtl-block">
            <div class="name">ISBN</div>
            <div class="value">978-0-000000-0-0</div>
        </div>
        <div class="details-addtl-block">
            <div class="name">Distributor SKU</div>
            <div class="value">JAN230001</div>
        </div>
        <div class="details-addtl-block">
            <div class="name">UPC</div>
            <div class="value">76194130000100111</div>
        </div>
        <h4 class="story-title color-primary m-0 p-0">Overview</h4>
        <h4 class="story-title color-primary m-0 p-0">[The First Story]</h4>
        <h4 class="story-title color-primary m-0 p-0">The Second Story</h4>
        <h4 class="story-title color-primary m-0 p-0">[Variant Cover Gallery]</h4>
        <section id="creators-">
            <div class="col-auto">
                <div class="avatar"></div>
                <div class="name">Jane Doe</div>
                <div class="role">Writer</div>
            </div>
        </section>
        <section id="creators-pencillers">
            <div class="col-auto">
                <div class="name">Jane Doe</div>
                <div class="role">Artist</div>
            </div>
            <div class="col-auto">
                <div class="name">John Roe</div>
                <div class="role">Colorist</div>
            </div>
        </section>
        <section id="top-level-credits">
            <div id="cover-artists">
                <div class="col-auto">
                    <div class="name">John Roe</div>
                    <div class="role">Cover Artist</div>
                </div>
            </div>
            <div id="credits-production">
                <div class="col-auto">
                    <div class="name">Pat Smith</div>
                    <div class="role">Letterer</div>
                </div>
            </div>
        </section>
        </body></html>
    "#;

    #[test]
    fn test_parse_full_page() {
        let page = parse_page(SAMPLE_PAGE);
        assert_eq!(page.format.as_deref(), Some("Hardcover"));
        assert_eq!(page.page_count.as_deref(), Some("280"));
        assert_eq!(page.cover_price.as_deref(), Some("49.99"));
        assert_eq!(page.isbn.as_deref(), Some("978-0-000000-0-0"));
        assert_eq!(page.distributor_sku.as_deref(), Some("JAN230001"));
        assert_eq!(page.upc.as_deref(), Some("76194130000100111"));
    }

    #[test]
    fn test_story_titles_filtered_and_unbracketed() {
        let page = parse_page(SAMPLE_PAGE);
        assert_eq!(page.story_titles, vec!["The First Story", "The Second Story"]);
    }

    #[test]
    fn test_denylist_is_case_insensitive() {
        let html = r#"
            <h4 class="story-title">OVERVIEW</h4>
            <h4 class="story-title">[cover reprint]</h4>
            <h4 class="story-title">Cover Progression</h4>
            <h4 class="story-title">A Real Story</h4>
        "#;
        let page = parse_page(html);
        assert_eq!(page.story_titles, vec!["A Real Story"]);
    }

    #[test]
    fn test_creators_unioned_across_sections() {
        let page = parse_page(SAMPLE_PAGE);
        assert_eq!(page.creators.len(), 3);

        let jane = page.creators.iter().find(|c| c.name == "Jane Doe").unwrap();
        assert_eq!(jane.role, "Artist, Writer");

        let john = page.creators.iter().find(|c| c.name == "John Roe").unwrap();
        assert_eq!(john.role, "Colorist, Cover Artist");

        let pat = page.creators.iter().find(|c| c.name == "Pat Smith").unwrap();
        assert_eq!(pat.role, "Letterer");
    }

    #[test]
    fn test_price_line_without_format() {
        let html = r#"<div class="col copy-small font-italic">32 pages · $3.99</div>"#;
        let page = parse_page(html);
        assert_eq!(page.format, None);
        assert_eq!(page.page_count.as_deref(), Some("32"));
        assert_eq!(page.cover_price.as_deref(), Some("3.99"));
    }

    #[test]
    fn test_missing_sections_leave_other_fields_intact() {
        let html = r#"
            <div class="details-addtl-block">
                <div class="name">ISBN</div>
                <div class="value">978-1-111111-1-1</div>
            </div>
        "#;
        let page = parse_page(html);
        assert_eq!(page.isbn.as_deref(), Some("978-1-111111-1-1"));
        assert_eq!(page.cover_price, None);
        assert!(page.story_titles.is_empty());
        assert!(page.creators.is_empty());
    }

    #[test]
    fn test_empty_page() {
        assert_eq!(parse_page("<html></html>"), ScrapedPage::default());
    }
}
