//! Static HTML digest of one run.
//!
//! Renders every record into a single self-contained page: one collapsible
//! block per company with its news, product launches, blog posts, commits,
//! and share price. Rendering is a pure function over the records; writing
//! is a separate step so tests never touch the filesystem.
//!
//! All provider-supplied text is escaped on the way in. Feed titles are
//! arbitrary third-party strings and this page may be served as-is.

use std::io;
use std::path::Path;

use html_escape::{encode_double_quoted_attribute, encode_text};
use itertools::Itertools;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::{EntityRecord, NormalizedItem, QuoteSnapshot, RunIndex};

const STYLE: &str = r#"
body { font-family: sans-serif; line-height: 1.6; margin: 2em; background: #f9f9f9; }
h1 { color: #333; }
h2 { color: #004aad; margin-top: 2em; }
h3 { color: #666; margin-bottom: 0.3em; }
a { color: #0077cc; text-decoration: none; }
a:hover { text-decoration: underline; }
ul { padding-left: 1.2em; }
.company-block { margin-bottom: 2em; padding-bottom: 1em; border-bottom: 1px solid #ccc; }
.empty { color: #999; }
.source-errors { color: #a40000; }
details summary { cursor: pointer; }
details summary h2 { display: inline; font-size: 1.4em; color: #004aad; }
details[open] summary::after { content: " 🔽"; }
details summary::after { content: " ▶"; }
"#;

/// Render the digest page for one run.
pub fn render_digest(index: &RunIndex, records: &[EntityRecord]) -> String {
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    page.push_str("<title>Company Tracker</title>\n<style>");
    page.push_str(STYLE);
    page.push_str("</style>\n</head>\n<body>\n<h1>📈 Company Tracker</h1>\n");
    page.push_str(&format!(
        "<p><strong>Last updated:</strong> {}</p>\n",
        index.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    for record in records {
        render_company(&mut page, record);
    }
    page.push_str("</body></html>\n");
    page
}

fn render_company(page: &mut String, record: &EntityRecord) {
    page.push_str(&format!(
        "<div class=\"company-block\"><details class=\"company-block\"><summary><h2>📊 Updates for {}</h2></summary>\n",
        encode_text(&record.name)
    ));

    render_section(page, "🗞️ News", &record.news);
    render_section(page, "🚀 Product Launches", &record.product_launches);
    if let Some(items) = &record.blog {
        render_section(page, "📝 Blog", items);
    }
    if let Some(items) = &record.commits {
        render_section(page, "💻 GitHub", items);
    }
    if let Some(stock) = &record.stock {
        render_stock(page, stock);
    }
    if !record.errors.is_empty() {
        let summary = record
            .errors
            .iter()
            .map(|(source, reason)| format!("{} ({})", encode_text(source), encode_text(reason)))
            .join(", ");
        page.push_str(&format!(
            "<p class=\"source-errors\">⚠️ Some sources failed: {summary}</p>\n"
        ));
    }

    page.push_str("</details></div>\n");
}

fn render_section(page: &mut String, heading: &str, items: &[NormalizedItem]) {
    page.push_str(&format!("<h3>{heading}</h3>\n"));
    if items.is_empty() {
        page.push_str("<p class=\"empty\">No recent items.</p>\n");
        return;
    }
    page.push_str("<ul>\n");
    for item in items {
        let date = item
            .published
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        page.push_str(&format!(
            "<li><a href=\"{}\" target=\"_blank\">{}</a> <em>({})</em></li>\n",
            encode_double_quoted_attribute(&item.link),
            encode_text(&item.title),
            date
        ));
    }
    page.push_str("</ul>\n");
}

fn render_stock(page: &mut String, stock: &QuoteSnapshot) {
    page.push_str("<h3>📈 Stock</h3>\n");
    match stock {
        QuoteSnapshot::Series {
            ticker,
            currency,
            latest,
            history,
            name,
        } => {
            let label = name.as_deref().unwrap_or(ticker);
            match latest {
                Some(point) => page.push_str(&format!(
                    "<p>{} ({}): <strong>{:.2} {}</strong> as of {} · {} closes on record</p>\n",
                    encode_text(label),
                    encode_text(ticker),
                    point.close,
                    encode_text(currency.as_deref().unwrap_or("")),
                    point.date,
                    history.len()
                )),
                None => page.push_str(&format!(
                    "<p class=\"empty\">{}: no recent closes</p>\n",
                    encode_text(ticker)
                )),
            }
        }
        QuoteSnapshot::Failed { ticker, error } => page.push_str(&format!(
            "<p class=\"source-errors\">{}: quote unavailable ({})</p>\n",
            encode_text(ticker),
            encode_text(error)
        )),
    }
}

/// Render and write the digest to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_digest(
    index: &RunIndex,
    records: &[EntityRecord],
    path: &Path,
) -> io::Result<()> {
    let page = render_digest(index, records);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, page).await?;
    info!(path = %path.display(), companies = records.len(), "Wrote HTML digest");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IndexEntry, PricePoint};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn item(title: &str, link: &str) -> NormalizedItem {
        NormalizedItem {
            title: title.to_string(),
            link: link.to_string(),
            summary: None,
            published: Utc.with_ymd_and_hms(2026, 8, 21, 9, 0, 0).single(),
            source: None,
        }
    }

    fn record() -> EntityRecord {
        EntityRecord {
            name: "Johnson & Johnson".to_string(),
            slug: "johnson-and-johnson".to_string(),
            ticker: Some("JNJ".to_string()),
            fetched_at: Utc::now(),
            news: vec![item(
                "J&J beats <estimates>",
                "https://news.example.com/jnj?a=1&b=2",
            )],
            product_launches: vec![],
            blog: None,
            commits: Some(vec![NormalizedItem {
                title: "Failed to fetch commits: HTTP 404".to_string(),
                link: "#".to_string(),
                summary: None,
                published: None,
                source: Some("github".to_string()),
            }]),
            stock: Some(QuoteSnapshot::Series {
                ticker: "JNJ".to_string(),
                currency: Some("USD".to_string()),
                latest: Some(PricePoint {
                    date: NaiveDate::from_ymd_opt(2026, 8, 21).unwrap(),
                    close: 171.239,
                }),
                history: vec![PricePoint {
                    date: NaiveDate::from_ymd_opt(2026, 8, 21).unwrap(),
                    close: 171.239,
                }],
                name: Some("Johnson & Johnson".to_string()),
            }),
            errors: BTreeMap::from([("commits".to_string(), "HTTP 404".to_string())]),
        }
    }

    fn index_for(records: &[EntityRecord]) -> RunIndex {
        RunIndex {
            generated_at: Utc.with_ymd_and_hms(2026, 8, 21, 12, 30, 0).unwrap(),
            companies: records.iter().map(IndexEntry::from).collect(),
        }
    }

    #[test]
    fn test_digest_escapes_provider_text() {
        let records = vec![record()];
        let page = render_digest(&index_for(&records), &records);

        assert!(page.contains("Updates for Johnson &amp; Johnson"));
        assert!(page.contains("J&amp;J beats &lt;estimates&gt;"));
        // Attribute escaping keeps the ampersand but encodes it.
        assert!(page.contains("https://news.example.com/jnj?a=1&amp;b=2"));
        assert!(!page.contains("<estimates>"));
    }

    #[test]
    fn test_digest_structure() {
        let records = vec![record()];
        let page = render_digest(&index_for(&records), &records);

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<h1>📈 Company Tracker</h1>"));
        assert!(page.contains("<strong>Last updated:</strong> 2026-08-21 12:30 UTC"));
        assert!(page.contains("<h3>🗞️ News</h3>"));
        assert!(page.contains("<h3>🚀 Product Launches</h3>"));
        assert!(page.contains("<h3>💻 GitHub</h3>"));
        assert!(page.contains("<h3>📈 Stock</h3>"));
        // No blog configured, no blog section.
        assert!(!page.contains("<h3>📝 Blog</h3>"));
        assert!(page.ends_with("</body></html>\n"));
    }

    #[test]
    fn test_digest_renders_diagnostic_row_and_error_note() {
        let records = vec![record()];
        let page = render_digest(&index_for(&records), &records);

        assert!(page.contains("Failed to fetch commits: HTTP 404"));
        assert!(page.contains("Some sources failed: commits (HTTP 404)"));
    }

    #[test]
    fn test_digest_stock_line() {
        let records = vec![record()];
        let page = render_digest(&index_for(&records), &records);
        assert!(page.contains("<strong>171.24 USD</strong> as of 2026-08-21"));
    }

    #[test]
    fn test_digest_failed_stock_line() {
        let mut r = record();
        r.stock = Some(QuoteSnapshot::Failed {
            ticker: "JNJ".to_string(),
            error: "HTTP 429".to_string(),
        });
        let records = vec![r];
        let page = render_digest(&index_for(&records), &records);
        assert!(page.contains("JNJ: quote unavailable (HTTP 429)"));
    }

    #[test]
    fn test_digest_empty_section_placeholder() {
        let records = vec![record()];
        let page = render_digest(&index_for(&records), &records);
        // Product launches list is empty in the fixture.
        assert!(page.contains("<p class=\"empty\">No recent items.</p>"));
    }

    #[tokio::test]
    async fn test_write_digest_creates_file() {
        let dir = std::env::temp_dir().join(format!(
            "company_tracker_digest_{}",
            std::process::id()
        ));
        let path = dir.join("digest.html");
        let records = vec![record()];

        write_digest(&index_for(&records), &records, &path)
            .await
            .unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("<!DOCTYPE html>"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
