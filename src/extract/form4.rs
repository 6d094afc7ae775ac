//! Form 4 ownership XML.

use roxmltree::Node;

use super::DocumentExtractor;
use super::utils::{descendant, descendant_text, value_text, with_lenient_xml};
use crate::core::{
    DocumentHandle, DocumentShape, Insider, Issuer, Provenance, PurchaseLine, PurchaseRecord,
};

/// Transaction code for an open-market or private purchase.
const PURCHASE_CODE: &str = "P";
/// Acquired/disposed flag for acquisitions.
const ACQUIRED: &str = "A";

/// Extracts open-market purchase lines from a Form 4 XML document.
#[derive(Debug, Clone, Copy, Default)]
pub struct Form4Extractor;

impl DocumentExtractor for Form4Extractor {
    fn shape(&self) -> DocumentShape {
        DocumentShape::Form4Xml
    }

    fn parse(&self, body: &str, handle: &DocumentHandle) -> Vec<PurchaseRecord> {
        match with_lenient_xml(body, |doc| record_from_root(doc.root_element(), handle)) {
            Ok(Some(record)) => vec![record],
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::debug!(url = %handle.url, error = %e, "unparsable Form 4 XML; skipped");
                Vec::new()
            }
        }
    }
}

fn record_from_root(root: Node<'_, '_>, handle: &DocumentHandle) -> Option<PurchaseRecord> {
    let issuer_node = descendant(root, "issuer").unwrap_or(root);
    let Some(issuer_name) = descendant_text(issuer_node, "issuerName") else {
        tracing::debug!(url = %handle.url, "Form 4 without issuerName; skipped");
        return None;
    };
    let ticker = descendant_text(issuer_node, "issuerTradingSymbol")
        .map(|t| t.to_uppercase())
        .unwrap_or_else(|| "N/A".to_string());
    let cik = descendant_text(issuer_node, "issuerCik");

    let owner_node = descendant(root, "reportingOwner").unwrap_or(root);
    let owner_name = descendant_text(owner_node, "rptOwnerName").unwrap_or_default();
    let role = descendant(owner_node, "reportingOwnerRelationship")
        .map(role_label)
        .unwrap_or_else(|| "Insider".to_string());

    let lines: Vec<PurchaseLine> = root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "nonDerivativeTransaction")
        .filter_map(purchase_line)
        .collect();

    if lines.is_empty() {
        return None;
    }

    Some(PurchaseRecord::new(
        Issuer {
            ticker,
            name: issuer_name,
            cik,
        },
        Insider {
            name: owner_name,
            role,
        },
        lines,
        Provenance {
            source_url: handle.url.clone(),
            index_url: handle.index_url.clone(),
            filing_date: handle.filing_date.clone(),
        },
    ))
}

/// Officer title (or `Officer`), then `Director`, then `10%+ Owner`, comma-joined.
pub(crate) fn role_label(rel: Node<'_, '_>) -> String {
    let flag = |name: &str| {
        descendant_text(rel, name)
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    };

    let mut roles = Vec::new();
    if flag("isOfficer") {
        roles.push(descendant_text(rel, "officerTitle").unwrap_or_else(|| "Officer".to_string()));
    }
    if flag("isDirector") {
        roles.push("Director".to_string());
    }
    if flag("isTenPercentOwner") {
        roles.push("10%+ Owner".to_string());
    }

    if roles.is_empty() {
        "Insider".to_string()
    } else {
        roles.join(", ")
    }
}

/// One qualifying line, or `None` when the transaction is not a purchase or
/// its numbers do not parse.
fn purchase_line(txn: Node<'_, '_>) -> Option<PurchaseLine> {
    let code = value_text(txn, "transactionCode")?;
    if code != PURCHASE_CODE {
        return None;
    }

    // Absent code counts as acquired; some filers omit it on purchases.
    if let Some(ad) = value_text(txn, "transactionAcquiredDisposedCode")
        && ad != ACQUIRED
    {
        return None;
    }

    let shares = parse_amount(value_text(txn, "transactionShares"))?;
    let price = parse_amount(value_text(txn, "transactionPricePerShare"))?;
    let date = value_text(txn, "transactionDate");

    let line = PurchaseLine::new(date, shares, price);
    if !line.is_valid() {
        tracing::debug!(shares, price, "purchase line with non-positive shares or negative price; skipped");
        return None;
    }
    Some(line)
}

/// Missing amounts read as zero; present but unparsable ones drop the line.
fn parse_amount(raw: Option<String>) -> Option<f64> {
    match raw {
        None => Some(0.0),
        Some(s) => s.replace(',', "").trim().parse::<f64>().ok(),
    }
}
