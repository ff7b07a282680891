// Plain-text rendering of quotes and trade verdicts.

use std::fmt::Write;

use huddle_core::{AssetQuote, Side, SideSummary, ValidationWarning};

use crate::desk::TradeReport;

/// How many warnings to list before summarising the rest.
pub const DEFAULT_MAX_WARNINGS: usize = 3;

/// `1234567` -> `1,234,567`.
pub fn thousands<N: Into<u64>>(n: N) -> String {
    let digits = n.into().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn render_quote(quote: &AssetQuote, max_warnings: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", quote.asset.description);
    let _ = writeln!(out, "Trade value: {}", thousands(quote.asset.value));
    write_warnings(&mut out, &quote.warnings, max_warnings);
    out
}

pub fn render_trade(report: &TradeReport, max_warnings: usize) -> String {
    let verdict = &report.verdict;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({:.1}% value difference)",
        verdict.fairness.label(),
        verdict.percent_diff
    );
    out.push('\n');

    write_side(&mut out, Side::A, &verdict.side_a);
    write_side(&mut out, Side::B, &verdict.side_b);

    match verdict.favored {
        Some(side) => {
            let _ = writeln!(out, "{side} gets {} more value", thousands(verdict.difference));
        }
        None => out.push_str("Perfectly balanced trade\n"),
    }

    write_warnings(&mut out, &verdict.warnings, max_warnings);

    if let Some(narrative) = &report.narrative {
        out.push_str("\nAnalysis:\n");
        for line in narrative.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }
    out
}

fn write_side(out: &mut String, side: Side, summary: &SideSummary) {
    if summary.assets.is_empty() {
        let _ = writeln!(out, "{side} sends:\n  - No valid assets\n");
        return;
    }
    let _ = writeln!(out, "{side} sends (total {}):", thousands(summary.total));
    for asset in &summary.assets {
        let _ = writeln!(out, "  - {}: {}", asset.description, thousands(asset.value));
    }
    out.push('\n');
}

fn write_warnings(out: &mut String, warnings: &[ValidationWarning], max: usize) {
    if warnings.is_empty() {
        return;
    }
    out.push_str("\nData issues:\n");
    for warning in warnings.iter().take(max) {
        let _ = writeln!(out, "  ! {warning}");
    }
    if warnings.len() > max {
        let _ = writeln!(out, "  ...and {} more", warnings.len() - max);
    }
}
