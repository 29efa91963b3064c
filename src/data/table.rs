//! Locate the rate table in the source HTML and flatten it to cell text.

use scraper::{ElementRef, Html, Selector};

use crate::error::PipelineError;

/// Rows of the first table whose visible text contains `marker`.
///
/// Each row is the list of its `td`/`th` texts, whitespace-trimmed per text
/// node. Rows without cells are dropped.
pub fn find_marker_table(body: &str, marker: &str) -> Result<Vec<Vec<String>>, PipelineError> {
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td, th")?;

    let document = Html::parse_document(body);
    let table = document
        .select(&table_sel)
        .find(|t| t.text().collect::<String>().contains(marker))
        .ok_or_else(|| PipelineError::TableNotFound {
            marker: marker.to_string(),
        })?;

    let rows = table
        .select(&row_sel)
        .map(|row| row.select(&cell_sel).map(cell_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();
    Ok(rows)
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}

fn selector(css: &'static str) -> Result<Selector, PipelineError> {
    Selector::parse(css).map_err(|e| PipelineError::TableParse(format!("bad selector '{css}': {e}")))
}
