use std::str::FromStr;

use super::SearchResponse;
use crate::search_query::{escape_html, highlight};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv buffer error: {0}")]
    CsvBuffer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Html,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "html" => Ok(ExportFormat::Html),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

const CSV_HEADERS: [&str; 5] = ["title", "url", "tags", "description", "score"];

pub fn export(response: &SearchResponse, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(response)?),
        ExportFormat::Csv => to_csv(response),
        ExportFormat::Html => Ok(to_html(response)),
    }
}

fn to_csv(response: &SearchResponse) -> Result<String, ExportError> {
    let mut wrt = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(vec![]);

    wrt.write_record(CSV_HEADERS)?;
    for hit in &response.results {
        let bm = &hit.bookmark;
        wrt.write_record([
            bm.title.as_str(),
            bm.url.as_str(),
            bm.tags.join(", ").as_str(),
            bm.description(),
            hit.score.to_string().as_str(),
        ])?;
    }

    let data = wrt
        .into_inner()
        .map_err(|err| ExportError::CsvBuffer(err.to_string()))?;
    String::from_utf8(data).map_err(|err| ExportError::CsvBuffer(err.to_string()))
}

fn to_html(response: &SearchResponse) -> String {
    let stats = &response.stats;
    let mut out = String::new();

    out.push_str("<div class=\"search-report\">\n");
    out.push_str(&format!(
        "  <h1>Search results for &quot;{}&quot;</h1>\n",
        escape_html(&stats.query)
    ));
    out.push_str(&format!(
        "  <p class=\"stats\">{} of {} bookmarks matched</p>\n",
        stats.matched, stats.total
    ));

    for hit in &response.results {
        let bm = &hit.bookmark;
        let url = escape_html(&bm.url);
        let (title, description) = match &hit.matches {
            Some(m) => (
                highlight(&bm.title, &m.title),
                highlight(bm.description(), &m.description),
            ),
            None => (escape_html(&bm.title), escape_html(bm.description())),
        };

        out.push_str("  <div class=\"result\">\n");
        out.push_str(&format!("    <h2><a href=\"{url}\">{title}</a></h2>\n"));
        out.push_str(&format!("    <p class=\"url\">{url}</p>\n"));
        if !description.is_empty() {
            out.push_str(&format!("    <p class=\"description\">{description}</p>\n"));
        }
        if !bm.tags.is_empty() {
            let chips: Vec<String> = bm
                .tags
                .iter()
                .map(|tag| format!("<span class=\"tag\">{}</span>", escape_html(tag)))
                .collect();
            out.push_str(&format!("    <div class=\"tags\">{}</div>\n", chips.join("")));
        }
        out.push_str("  </div>\n");
    }

    out.push_str("</div>\n");
    out
}
