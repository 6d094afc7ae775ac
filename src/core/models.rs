use std::fmt;

use chrono::NaiveDate;

use crate::core::DigestError;

/* ---------------- Filing references ---------------- */

/// EDGAR accession number, stored as its 18 digits.
///
/// Filing URLs need both the dashed (`0001234567-24-000001`) and the undashed
/// form; both are derived from the same digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Accession(String);

impl Accession {
    /// Parse from either the dashed or the undashed form.
    ///
    /// # Errors
    ///
    /// Returns `DigestError::Data` unless the input holds exactly 18 digits
    /// (dashes allowed only at the canonical positions).
    pub fn parse(raw: &str) -> Result<Self, DigestError> {
        let raw = raw.trim();
        let digits: String = raw.chars().filter(|c| *c != '-').collect();
        let dashes_ok = match raw.len() {
            18 => true,
            20 => raw.as_bytes()[10] == b'-' && raw.as_bytes()[13] == b'-',
            _ => false,
        };
        if !dashes_ok || digits.len() != 18 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DigestError::Data(format!("malformed accession number: {raw}")));
        }
        Ok(Self(digits))
    }

    /// `0001234567-24-000001`
    pub fn dashed(&self) -> String {
        format!("{}-{}-{}", &self.0[..10], &self.0[10..12], &self.0[12..])
    }

    /// `000123456724000001`
    pub fn undashed(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Accession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dashed())
    }
}

/// Source-specific pointer to a filing whose document is not yet known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilingReference {
    /// Accession + filer CIK (full-text search hits).
    Accession {
        accession: Accession,
        cik: String,
        entity_name: Option<String>,
        filing_date: Option<String>,
    },
    /// Raw archive path from a daily index, e.g. `edgar/data/1234/0001234567-24-000001.txt`.
    ArchivePath {
        path: String,
        cik: String,
        entity_name: Option<String>,
        filing_date: Option<String>,
    },
    /// Filing index page URL (latest-filings feed).
    IndexPage {
        url: String,
        entity_name: Option<String>,
        filing_date: Option<String>,
    },
}

impl FilingReference {
    pub fn entity_name(&self) -> Option<&str> {
        match self {
            FilingReference::Accession { entity_name, .. }
            | FilingReference::ArchivePath { entity_name, .. }
            | FilingReference::IndexPage { entity_name, .. } => entity_name.as_deref(),
        }
    }

    pub fn filing_date(&self) -> Option<&str> {
        match self {
            FilingReference::Accession { filing_date, .. }
            | FilingReference::ArchivePath { filing_date, .. }
            | FilingReference::IndexPage { filing_date, .. } => filing_date.as_deref(),
        }
    }
}

/* ---------------- Documents ---------------- */

/// Which extraction path a document takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// Form 4 ownership XML.
    Form4Xml,
    /// HTML listing page with a purchases table.
    HtmlTable,
}

/// A resolved, fetchable document plus whatever metadata its source knew.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    pub url: String,
    pub shape: DocumentShape,
    pub entity_name: Option<String>,
    pub filing_date: Option<String>,
    /// Human-readable filing index page, when the document was located through one.
    pub index_url: Option<String>,
    /// Body already downloaded by the source; extraction reuses it instead of refetching.
    pub body: Option<String>,
    /// Rows filed before this day are ignored by extractors that see many filings at once.
    pub not_before: Option<NaiveDate>,
}

impl DocumentHandle {
    pub fn new(url: impl Into<String>, shape: DocumentShape) -> Self {
        Self {
            url: url.into(),
            shape,
            entity_name: None,
            filing_date: None,
            index_url: None,
            body: None,
            not_before: None,
        }
    }
}

/// Either a reference that still needs locating, or a document ready for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Reference(FilingReference),
    Document(DocumentHandle),
}

/* ---------------- Purchase records ---------------- */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issuer {
    /// Upper-cased trading symbol, `N/A` when the filing has none.
    pub ticker: String,
    pub name: String,
    pub cik: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insider {
    pub name: String,
    /// Display role, e.g. `CEO, Director` or `10%+ Owner`.
    pub role: String,
}

/// One qualifying transaction line.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseLine {
    pub trade_date: Option<String>,
    pub shares: f64,
    pub price: f64,
    /// Usually `shares * price`; aggregator tables may report it directly.
    pub value: f64,
}

impl PurchaseLine {
    /// Build a line valued at `shares * price`.
    pub fn new(trade_date: Option<String>, shares: f64, price: f64) -> Self {
        Self {
            trade_date,
            shares,
            price,
            value: shares * price,
        }
    }

    /// Positive share count and non-negative price.
    pub fn is_valid(&self) -> bool {
        self.shares > 0.0 && self.price >= 0.0 && self.value.is_finite()
    }
}

/// Where a record came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub source_url: String,
    pub index_url: Option<String>,
    pub filing_date: Option<String>,
}

/// Canonical output unit: one insider buying one issuer.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRecord {
    pub issuer: Issuer,
    pub insider: Insider,
    pub lines: Vec<PurchaseLine>,
    pub total_shares: f64,
    pub total_value: f64,
    /// `total_value / total_shares`, or 0 when no shares.
    pub avg_price: f64,
    pub provenance: Provenance,
}

impl PurchaseRecord {
    /// Assemble a record and derive its totals from `lines`.
    pub fn new(
        issuer: Issuer,
        insider: Insider,
        lines: Vec<PurchaseLine>,
        provenance: Provenance,
    ) -> Self {
        let total_shares: f64 = lines.iter().map(|l| l.shares).sum();
        let total_value: f64 = lines.iter().map(|l| l.value).sum();
        let avg_price = if total_shares > 0.0 {
            total_value / total_shares
        } else {
            0.0
        };
        Self {
            issuer,
            insider,
            lines,
            total_shares,
            total_value,
            avg_price,
            provenance,
        }
    }

    /// Case-normalized (ticker, insider) identity used for deduplication.
    pub fn identity_key(&self) -> (String, String) {
        (
            self.issuer.ticker.trim().to_uppercase(),
            self.insider.name.trim().to_lowercase(),
        )
    }

    /// True when the aggregate value reaches `threshold`.
    pub fn meets_threshold(&self, threshold: f64) -> bool {
        self.total_value >= threshold
    }
}
