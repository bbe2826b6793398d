//! Metron form filler
//!
//! Drives a visible Chrome session that logs into Metron and pre-fills the
//! issue creation form with a merged record. The form is never submitted;
//! the session pauses for manual review and the human clicks submit (or
//! not) themselves.

use anyhow::{Context, Result};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use regex::Regex;
use std::time::Duration;

use crate::prompt::Prompter;
use crate::record::IssueRecord;

const LOGIN_URL: &str = "https://metron.cloud/accounts/login/";
const FORM_URL: &str = "https://metron.cloud/issue/create/";

/// Metron account credentials, read from the environment.
pub struct MetronCredentials {
    pub username: String,
    pub password: String,
}

impl MetronCredentials {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            username: std::env::var("METRON_USERNAME")
                .context("METRON_USERNAME is not set")?,
            password: std::env::var("METRON_PASSWORD")
                .context("METRON_PASSWORD is not set")?,
        })
    }
}

/// Map a format name to the keyword Metron uses in series labels.
pub fn format_keyword(format: &str) -> &str {
    match format {
        "Trade Paperback" => "TPB",
        "Hardcover" => "HC",
        "Softcover" => "SC",
        "Graphic Novel" => "GN",
        other => other,
    }
}

/// Extract the year from a `DD-MM-YYYY` date string.
pub fn year_from_date(date: &str) -> String {
    match chrono::NaiveDate::parse_from_str(date, "%d-%m-%Y") {
        Ok(d) => d.format("%Y").to_string(),
        Err(_) => "Unknown".to_string(),
    }
}

/// Reduce a series name to its searchable core: drop any prefix up to the
/// first colon, then strip edition suffixes and trailing punctuation.
pub fn core_series_name(series: &str) -> String {
    let core = series.split_once(':').map(|(_, rest)| rest).unwrap_or(series);

    let suffix_re = Regex::new(r"(The Deluxe Edition|The Complete|HC|TPB|Paperback)$")
        .expect("valid regex");
    let core = suffix_re.replace(core.trim(), "");

    let trailing_re = Regex::new(r"[;:,.\s]+$").expect("valid regex");
    trailing_re.replace(core.trim(), "").trim().to_string()
}

/// Open a visible browser, log in, and fill the issue-create form.
///
/// Pauses on the prompter before closing so the filled form can be reviewed
/// and submitted manually.
pub async fn fill_metron_form(
    record: &IssueRecord,
    credentials: &MetronCredentials,
    prompter: &dyn Prompter,
) -> Result<()> {
    let config = BrowserConfig::builder()
        .with_head()
        .no_sandbox()
        .arg("--disable-dev-shm-usage")
        .build()
        .map_err(|e| anyhow::anyhow!("Browser config error: {}", e))?;

    let (mut browser, mut handler) = Browser::launch(config)
        .await
        .context("Failed to launch Chrome. Is Chrome/Chromium installed?")?;

    tokio::spawn(async move { while handler.next().await.is_some() {} });

    let page = browser.new_page(LOGIN_URL).await?;
    login(&page, credentials).await?;

    page.goto(FORM_URL).await?;
    page.wait_for_navigation().await?;

    select_series(&page, record).await?;
    fill_fields(&page, record).await?;

    eprintln!("Form has been filled in. Please review and submit manually.");
    prompter.ask("[Press ENTER to close the browser]")?;

    browser.close().await?;
    Ok(())
}

async fn login(page: &Page, credentials: &MetronCredentials) -> Result<()> {
    page.wait_for_navigation().await?;

    type_into(page, "input[name='username']", &credentials.username).await?;
    let password = page
        .find_element("input[name='password']")
        .await
        .context("Login form field not found: password")?;
    password.click().await?;
    password.type_str(&credentials.password).await?;
    password.press_key("Enter").await?;

    // Give the login redirect time to settle
    tokio::time::sleep(Duration::from_secs(5)).await;
    eprintln!("Login successful.");
    Ok(())
}

/// Resolve the series through the select2 autocomplete dropdown.
///
/// Picks the option matching the series name, format keyword, and cover
/// year, or the single remaining option; scrolls to load more results until
/// the list is exhausted.
async fn select_series(page: &Page, record: &IssueRecord) -> Result<()> {
    let query = core_series_name(&record.series);
    eprintln!("Searching for series: {}", query);

    page.find_element("#select2-id_series-container")
        .await
        .context("Series dropdown not found")?
        .click()
        .await?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    let search_boxes = page.find_elements("input.select2-search__field").await?;
    let search_box = search_boxes.last().context("Series search box not found")?;
    search_box.type_str(&query).await?;
    tokio::time::sleep(Duration::from_secs(2)).await;

    let keyword = format_keyword(&record.format).to_lowercase();
    let year_tag = format!("({})", year_from_date(&record.cover_date));
    let series_lower = record.series.to_lowercase();

    loop {
        let options = page
            .find_elements("ul.select2-results__options li.select2-results__option")
            .await
            .unwrap_or_default();

        for option in &options {
            let text = option.inner_text().await?.unwrap_or_default();
            let text = text.trim();
            let text_lower = text.to_lowercase();

            if text_lower.contains(&series_lower)
                && text_lower.contains(&keyword)
                && text.contains(&year_tag)
            {
                eprintln!("Match found: {}", text);
                option.click().await?;
                tokio::time::sleep(Duration::from_secs(1)).await;
                return Ok(());
            }
            if options.len() == 1 {
                eprintln!("Only one option found: {}", text);
                option.click().await?;
                tokio::time::sleep(Duration::from_secs(1)).await;
                return Ok(());
            }
        }

        let load_more = page
            .find_elements("li.select2-results__option--load-more")
            .await
            .unwrap_or_default();
        match load_more.first() {
            Some(button) => {
                eprintln!("No match yet, loading more options...");
                button.scroll_into_view().await?;
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            None => break,
        }
    }

    eprintln!("Series not found in options.");
    Ok(())
}

async fn fill_fields(page: &Page, record: &IssueRecord) -> Result<()> {
    let fields = [
        ("number", record.number.clone()),
        ("title", record.collection_title.clone()),
        ("name", record.story_titles.clone()),
        ("cover_date", record.cover_date.clone()),
        ("store_date", record.in_store_date.clone()),
        ("cv_id", record.comic_vine_id.clone()),
        ("isbn", record.isbn.clone()),
        ("sku", record.distributor_sku.clone()),
        ("upc", record.upc.clone()),
        ("price", record.cover_price.clone()),
        ("page", record.page_count.clone()),
        ("desc", record.description.clone()),
        ("creators", record.creators.as_cell()),
        ("characters", record.characters.clone()),
    ];

    for (name, value) in fields {
        let selector = format!("[name='{}']", name);
        type_into(page, &selector, &value)
            .await
            .with_context(|| format!("Failed to fill form field '{}'", name))?;
    }

    Ok(())
}

async fn type_into(page: &Page, selector: &str, value: &str) -> Result<()> {
    let element = page
        .find_element(selector)
        .await
        .with_context(|| format!("Element not found: {}", selector))?;
    element.click().await?;
    element.type_str(value).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_keyword() {
        assert_eq!(format_keyword("Trade Paperback"), "TPB");
        assert_eq!(format_keyword("Hardcover"), "HC");
        assert_eq!(format_keyword("Graphic Novel"), "GN");
        assert_eq!(format_keyword("One-Shot"), "One-Shot");
    }

    #[test]
    fn test_year_from_date() {
        assert_eq!(year_from_date("01-03-2023"), "2023");
        assert_eq!(year_from_date("N/A"), "Unknown");
        assert_eq!(year_from_date("2023-03-01"), "Unknown");
    }

    #[test]
    fn test_core_series_name() {
        assert_eq!(
            core_series_name("Batman: The Long Halloween The Deluxe Edition"),
            "The Long Halloween"
        );
        assert_eq!(core_series_name("Saga TPB"), "Saga");
        assert_eq!(core_series_name("Watchmen"), "Watchmen");
        assert_eq!(core_series_name("Sandman: Overture;"), "Overture");
    }
}
