//! HTML purchase tables (aggregator listing pages).
//!
//! Column order differs between pages and changes over time, so every table's
//! header row is matched against synonym rules before any row is read.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::DocumentExtractor;
use super::utils::{clean_number, inner_html, strip_tags, tag_blocks, to_lower};
use crate::core::window::parse_filing_date;
use crate::core::{
    DocumentHandle, DocumentShape, Insider, Issuer, Provenance, PurchaseLine, PurchaseRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Column {
    FilingDate,
    TradeDate,
    TradeType,
    Ticker,
    Company,
    Insider,
    Role,
    Price,
    Quantity,
    Value,
}

/// Header synonyms, checked in this order; the first rule a header matches wins.
const RULES: &[(Column, &[&str])] = &[
    (Column::FilingDate, &["filing date", "filed", "file date"]),
    (Column::TradeDate, &["trade date", "transaction date", "trans date"]),
    (
        Column::TradeType,
        &["trade type", "transaction type", "transaction code", "type", "code"],
    ),
    (Column::Ticker, &["ticker", "symbol"]),
    (Column::Company, &["company", "issuer"]),
    (Column::Insider, &["insider", "owner", "reporting", "name"]),
    (Column::Role, &["title", "role", "relationship", "position"]),
    (Column::Price, &["price"]),
    (Column::Quantity, &["qty", "quantity", "shares"]),
    (Column::Value, &["value", "amount"]),
];

/// A table without these columns cannot produce records.
const REQUIRED: &[Column] = &[Column::Ticker, Column::Insider, Column::Price, Column::Value];

/// Header text -> column index, discovered per table.
#[derive(Debug, Default, Clone)]
pub(crate) struct ColumnMap(HashMap<Column, usize>);

impl ColumnMap {
    pub(crate) fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut map = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            let text = to_lower(header.as_ref());
            let hit = RULES.iter().find(|(col, synonyms)| {
                !map.contains_key(col) && synonyms.iter().any(|s| text.contains(s))
            });
            if let Some((col, _)) = hit {
                map.insert(*col, idx);
            }
        }
        Self(map)
    }

    pub(crate) fn get(&self, col: Column) -> Option<usize> {
        self.0.get(&col).copied()
    }

    pub(crate) fn missing_required(&self) -> Vec<Column> {
        REQUIRED
            .iter()
            .copied()
            .filter(|c| !self.0.contains_key(c))
            .collect()
    }
}

/// One raw data row: visible cell text plus the first link in each cell.
#[derive(Debug, Clone)]
pub(crate) struct Row {
    cells: Vec<String>,
    links: Vec<Option<String>>,
}

impl Row {
    fn cell(&self, columns: &ColumnMap, col: Column) -> Option<&str> {
        columns
            .get(col)
            .and_then(|i| self.cells.get(i))
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    fn link(&self, columns: &ColumnMap, col: Column) -> Option<&str> {
        columns
            .get(col)
            .and_then(|i| self.links.get(i))
            .and_then(Option::as_deref)
    }
}

/// A table whose header resolved every required column.
#[derive(Debug, Clone)]
pub(crate) struct PurchaseTable {
    pub(crate) columns: ColumnMap,
    pub(crate) rows: Vec<Row>,
}

/// Every table in `html` that carries the required columns.
pub(crate) fn purchase_tables(html: &str) -> Vec<PurchaseTable> {
    tag_blocks(html, "table")
        .into_iter()
        .filter_map(|(s, e)| parse_table(&html[s..e]))
        .collect()
}

/// True when some table on the page holds at least one valid purchase row.
pub(crate) fn has_purchase_table(html: &str) -> bool {
    purchase_tables(html)
        .iter()
        .any(|t| t.rows.iter().any(|r| parse_row(r, &t.columns).is_some()))
}

fn parse_table(table: &str) -> Option<PurchaseTable> {
    let rows: Vec<&str> = tag_blocks(table, "tr")
        .into_iter()
        .map(|(s, e)| &table[s..e])
        .collect();

    let header_idx = rows
        .iter()
        .position(|r| to_lower(r).contains("<th"))
        .unwrap_or(0);
    let header_row = rows.get(header_idx)?;
    let mut headers = cell_texts(header_row, "th");
    if headers.is_empty() {
        headers = cell_texts(header_row, "td");
    }

    let columns = ColumnMap::from_headers(&headers);
    let missing = columns.missing_required();
    if !missing.is_empty() {
        tracing::debug!(?missing, "table lacks required columns; skipped");
        return None;
    }

    let rows = rows
        .iter()
        .skip(header_idx + 1)
        .filter_map(|r| {
            let inner = inner_html(r);
            let blocks = tag_blocks(inner, "td");
            if blocks.is_empty() {
                return None;
            }
            let (cells, links) = blocks
                .into_iter()
                .map(|(s, e)| {
                    let cell = &inner[s..e];
                    (strip_tags(inner_html(cell)), first_href(cell))
                })
                .unzip();
            Some(Row { cells, links })
        })
        .collect();

    Some(PurchaseTable { columns, rows })
}

fn cell_texts(row: &str, tag: &str) -> Vec<String> {
    let inner = inner_html(row);
    tag_blocks(inner, tag)
        .into_iter()
        .map(|(s, e)| strip_tags(inner_html(&inner[s..e])))
        .collect()
}

fn first_href(cell: &str) -> Option<String> {
    let lc = to_lower(cell);
    let start = lc.find("href=")? + "href=".len();
    let rest = &cell[start..];
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &rest[1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string()).filter(|h| !h.is_empty())
}

/* ---------------- Extraction ---------------- */

/// Groups purchase rows from aggregator tables into one record per (ticker, insider).
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTableExtractor;

impl DocumentExtractor for HtmlTableExtractor {
    fn shape(&self) -> DocumentShape {
        DocumentShape::HtmlTable
    }

    fn parse(&self, body: &str, handle: &DocumentHandle) -> Vec<PurchaseRecord> {
        let tables = purchase_tables(body);
        if tables.is_empty() {
            tracing::info!(url = %handle.url, "no purchase table found");
            return Vec::new();
        }

        let mut groups: Vec<Group> = Vec::new();
        let mut index: HashMap<(String, String), usize> = HashMap::new();

        for table in &tables {
            for row in &table.rows {
                let Some(parsed) = parse_row(row, &table.columns) else {
                    continue;
                };
                if let Some(cutoff) = handle.not_before
                    && filed_before(parsed.filing_date.as_deref(), cutoff)
                {
                    tracing::debug!(
                        ticker = %parsed.ticker,
                        filed = ?parsed.filing_date,
                        "row filed before the window; skipped"
                    );
                    continue;
                }
                let key = (
                    parsed.ticker.to_uppercase(),
                    parsed.insider.trim().to_lowercase(),
                );
                match index.get(&key).copied() {
                    Some(i) => groups[i].lines.push(parsed.line),
                    None => {
                        index.insert(key, groups.len());
                        groups.push(Group::from_row(parsed));
                    }
                }
            }
        }

        groups.into_iter().map(|g| g.into_record(handle)).collect()
    }
}

struct ParsedRow {
    ticker: String,
    company: Option<String>,
    insider: String,
    role: Option<String>,
    filing_date: Option<String>,
    filing_link: Option<String>,
    line: PurchaseLine,
}

fn parse_row(row: &Row, columns: &ColumnMap) -> Option<ParsedRow> {
    let ticker = row.cell(columns, Column::Ticker)?.to_uppercase();
    let insider = row.cell(columns, Column::Insider)?.to_string();

    if let Some(kind) = row.cell(columns, Column::TradeType)
        && trade_code(kind) != "P"
    {
        return None;
    }

    let price = row.cell(columns, Column::Price).map_or(0.0, clean_number);
    let mut shares = row.cell(columns, Column::Quantity).map_or(0.0, clean_number);
    let mut value = row.cell(columns, Column::Value).map_or(0.0, clean_number);

    if value == 0.0 && shares > 0.0 && price > 0.0 {
        value = shares * price;
    }
    if shares == 0.0 && price > 0.0 && value > 0.0 {
        shares = value / price;
    }

    let line = PurchaseLine {
        trade_date: row.cell(columns, Column::TradeDate).map(str::to_string),
        shares,
        price,
        value,
    };
    if !line.is_valid() {
        tracing::debug!(%ticker, %insider, "row without a positive share count; skipped");
        return None;
    }

    Some(ParsedRow {
        ticker,
        company: row.cell(columns, Column::Company).map(str::to_string),
        insider,
        role: row.cell(columns, Column::Role).map(str::to_string),
        filing_date: row.cell(columns, Column::FilingDate).map(str::to_string),
        filing_link: row.link(columns, Column::FilingDate).map(str::to_string),
        line,
    })
}

/// Unparsable or missing dates count as inside the window.
fn filed_before(raw: Option<&str>, cutoff: NaiveDate) -> bool {
    raw.and_then(parse_filing_date).is_some_and(|d| d < cutoff)
}

/// `P - Purchase` -> `P`.
fn trade_code(cell: &str) -> String {
    cell.split(|c: char| !c.is_ascii_alphanumeric())
        .find(|t| !t.is_empty())
        .unwrap_or_default()
        .to_ascii_uppercase()
}

struct Group {
    ticker: String,
    company: Option<String>,
    insider: String,
    role: Option<String>,
    filing_date: Option<String>,
    filing_link: Option<String>,
    lines: Vec<PurchaseLine>,
}

impl Group {
    fn from_row(row: ParsedRow) -> Self {
        Self {
            ticker: row.ticker,
            company: row.company,
            insider: row.insider,
            role: row.role,
            filing_date: row.filing_date,
            filing_link: row.filing_link,
            lines: vec![row.line],
        }
    }

    fn into_record(self, handle: &DocumentHandle) -> PurchaseRecord {
        let name = self
            .company
            .or_else(|| handle.entity_name.clone())
            .unwrap_or_else(|| self.ticker.clone());
        PurchaseRecord::new(
            Issuer {
                ticker: self.ticker,
                name,
                cik: None,
            },
            Insider {
                name: self.insider,
                role: self.role.unwrap_or_else(|| "Insider".to_string()),
            },
            self.lines,
            Provenance {
                source_url: self.filing_link.unwrap_or_else(|| handle.url.clone()),
                index_url: None,
                filing_date: self.filing_date.or_else(|| handle.filing_date.clone()),
            },
        )
    }
}
