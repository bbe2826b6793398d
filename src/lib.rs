//! comic-scrape: comic issue metadata assembly
//!
//! Pipeline: fetch structured issue data from the Comicvine API, scrape the
//! matching League of Comic Geeks page, merge both into one Issue Record,
//! and emit it as CSV, JSON, and HTML.

pub mod comicvine;
pub mod dates;
pub mod emit;
pub mod fetch;
pub mod form;
pub mod prompt;
pub mod record;
pub mod scrape;
pub mod text;

pub use record::{build_record, Creator, Field, IssueRecord, NA};
pub use scrape::{parse_page, scrape_issue_page, ScrapedPage};
