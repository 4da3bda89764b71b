//! Markdown summary generation
//!
//! This module renders a crawl result as a human-readable markdown sitemap:
//! run information, statistics, and every crawled page with its links.

use crate::output::aggregator::CrawlResult;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;

/// Writes the markdown summary of `result` to `output_path`
///
/// # Arguments
///
/// * `result` - The finished crawl
/// * `root` - The URL the crawl started from
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(
    result: &CrawlResult,
    root: &Url,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(result, root);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl result as markdown
///
/// Pages are listed sorted by URL so reports of the same site diff cleanly,
/// whatever order the pages completed in.
pub fn format_markdown_summary(result: &CrawlResult, root: &Url) -> String {
    let stats = &result.stats;
    let mut md = String::new();

    md.push_str(&format!("# Sitegraph Crawl Summary: {}\n\n", root));

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Root**: {}\n", root));
    md.push_str(&format!("- **Started**: {}\n", stats.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", stats.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        stats.duration().num_milliseconds() as f64 / 1000.0
    ));
    let status = if stats.interrupted {
        "interrupted"
    } else {
        "complete"
    };
    md.push_str(&format!("- **Status**: {}\n\n", status));

    // Overall statistics
    md.push_str("## Statistics\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Crawled | {} |\n", stats.pages_crawled));
    md.push_str(&format!("| fetch-error | {} |\n", stats.fetch_errors));
    md.push_str(&format!("| parse-error | {} |\n", stats.parse_errors));
    md.push_str(&format!("| cancelled | {} |\n", stats.cancelled_tasks));
    if stats.aborted_tasks > 0 {
        md.push_str(&format!("| aborted | {} |\n", stats.aborted_tasks));
    }
    md.push_str(&format!(
        "| Never dispatched | {} |\n\n",
        stats.frontier_remaining
    ));
    md.push_str(&format!("- **Links Recorded**: {}\n", stats.links_recorded));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    // Sitemap
    md.push_str("## Pages\n\n");
    if result.pages.is_empty() {
        md.push_str("_No pages were crawled._\n");
        return md;
    }

    let mut pages: Vec<_> = result.pages.iter().collect();
    pages.sort_by(|a, b| a.url.as_str().cmp(b.url.as_str()));

    for page in pages {
        md.push_str(&format!("### {}\n\n", page.url));
        if page.links.is_empty() {
            md.push_str("_No links._\n\n");
            continue;
        }
        for link in &page.links {
            md.push_str(&format!("- {}\n", link));
        }
        md.push('\n');
    }

    md
}
