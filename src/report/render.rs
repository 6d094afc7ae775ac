//! HTML digest body.

use std::fmt::Write as _;

use num_format::{Locale, ToFormattedString as _};

use crate::core::PurchaseRecord;
use crate::extract::escape_html;

const QUOTE_BASE: &str = "https://finance.yahoo.com/quote/";

/// `1234567.4` -> `1,234,567`
pub(crate) fn fmt_whole(amount: f64) -> String {
    (amount.round() as i64).to_formatted_string(&Locale::en)
}

/// `1234.565` -> `1,234.57`
pub(crate) fn fmt_cents(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    format!(
        "{}.{:02}",
        (cents / 100).to_formatted_string(&Locale::en),
        (cents % 100).abs()
    )
}

/// Renders records as an HTML email body. Records are shown in the order given.
#[derive(Debug, Clone)]
pub struct DigestRenderer {
    pub threshold: f64,
    pub lookback_days: u32,
}

impl DigestRenderer {
    pub fn render(&self, records: &[PurchaseRecord], label: &str) -> String {
        let label = escape_html(label);
        if records.is_empty() {
            return self.render_empty(&label);
        }

        let mut rows = String::new();
        for r in records {
            let ticker = escape_html(&r.issuer.ticker);
            let filing = r
                .provenance
                .index_url
                .as_deref()
                .unwrap_or(&r.provenance.source_url);
            let _ = write!(
                rows,
                r#"
        <tr style="border-bottom: 1px solid #eee;">
            <td style="padding: 10px;">
                <strong><a href="{quote}{ticker}" style="color: #2980b9; text-decoration: none;">{ticker}</a></strong><br>
                <span style="font-size: 12px; color: #777;">{issuer}</span></td>
            <td style="padding: 10px;">{insider}<br>
                <span style="font-size: 12px; color: #777;">{role}</span></td>
            <td style="padding: 10px; text-align: right;">{shares}</td>
            <td style="padding: 10px; text-align: right;">${avg}</td>
            <td style="padding: 10px; text-align: right; font-weight: bold; color: #27ae60;">${value}</td>
            <td style="padding: 10px; text-align: center;">
                <a href="{filing}" style="color: #2980b9; font-size: 12px;">Filing</a></td>
        </tr>"#,
                quote = QUOTE_BASE,
                issuer = escape_html(&r.issuer.name),
                insider = escape_html(&r.insider.name),
                role = escape_html(&r.insider.role),
                shares = fmt_whole(r.total_shares),
                avg = fmt_cents(r.avg_price),
                value = fmt_whole(r.total_value),
                filing = escape_html(filing),
            );
        }

        let grand_total: f64 = records.iter().map(|r| r.total_value).sum();
        format!(
            r#"<html><body style="font-family: Arial, sans-serif; color: #333; max-width: 750px; margin: auto;">
    <h2 style="color: #1a5276; border-bottom: 3px solid #2980b9; padding-bottom: 8px;">Insider Buying Digest &mdash; {label}</h2>
    <p style="color: #555;">
        <strong>{count}</strong> sizeable open-market purchase(s) totaling
        <strong style="color: #27ae60;">${total}</strong>
        &nbsp;(threshold: &ge;${threshold})
    </p>
    <table style="width: 100%; border-collapse: collapse; font-size: 14px;">
        <thead>
            <tr style="background: #f8f9fa; border-bottom: 2px solid #dee2e6;">
                <th style="padding: 10px; text-align: left;">Ticker</th>
                <th style="padding: 10px; text-align: left;">Insider</th>
                <th style="padding: 10px; text-align: right;">Shares</th>
                <th style="padding: 10px; text-align: right;">Avg Price</th>
                <th style="padding: 10px; text-align: right;">Total Value</th>
                <th style="padding: 10px; text-align: center;">Source</th>
            </tr>
        </thead>
        <tbody>{rows}
        </tbody>
    </table>
    <p style="font-size: 11px; color: #aaa; margin-top: 20px;">
        Source: SEC EDGAR Form 4 filings. Open-market purchases only (code &ldquo;P&rdquo;).
        This is not investment advice.</p>
</body></html>
"#,
            count = records.len(),
            total = fmt_whole(grand_total),
            threshold = fmt_whole(self.threshold),
        )
    }

    fn render_empty(&self, label: &str) -> String {
        format!(
            r#"<html><body style="font-family: Arial, sans-serif; color: #333;">
    <h2 style="color: #1a5276;">Insider Buying Digest &mdash; {label}</h2>
    <p>No sizeable open-market insider purchases were filed in the last {days} days
    (min threshold: ${threshold}).</p>
</body></html>
"#,
            days = self.lookback_days,
            threshold = fmt_whole(self.threshold),
        )
    }
}
