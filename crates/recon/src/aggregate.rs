use crate::config::ReconConfig;
use crate::model::{
    ActualTotals, Extraction, MonthlyReport, Partner, RevenueRow, RowCounts, SkipCounts,
    TeamProgramTotals,
};
use crate::month::MonthInference;

/// Group rows by team then program and sum amounts at full precision.
pub fn aggregate(rows: &[RevenueRow]) -> TeamProgramTotals {
    let mut totals = TeamProgramTotals::new();
    for row in rows {
        *totals
            .entry(row.team.clone())
            .or_default()
            .entry(row.program.clone())
            .or_insert(0.0) += row.amount;
    }
    totals
}

/// Sum of every program booked to `team`.
pub fn team_total(totals: &TeamProgramTotals, team: &str) -> f64 {
    totals
        .get(team)
        .map(|programs| programs.values().sum())
        .unwrap_or(0.0)
}

/// Everything one report is built from.
pub struct ReportSources<'a> {
    pub month: &'a MonthInference,
    pub source_filename: &'a str,
    pub direct: &'a Extraction,
    /// DO rows already narrowed to `month`.
    pub domestic_rows: &'a [RevenueRow],
    /// Skip counts of the whole DO ledger.
    pub domestic_skipped: SkipCounts,
}

/// Assemble one monthly report.
///
/// Breakdowns keep every team. Summary totals only count the two configured
/// partners, so a team outside the pair shows up in `direct`/`domestic` but
/// not in `actual`.
pub fn build_report(sources: ReportSources<'_>, config: &ReconConfig) -> MonthlyReport {
    let direct = aggregate(&sources.direct.rows);
    let domestic = aggregate(sources.domestic_rows);

    let partner = |totals: &TeamProgramTotals, p: Partner| team_total(totals, config.partner_name(p));
    let di_partner_a = partner(&direct, Partner::A);
    let di_partner_b = partner(&direct, Partner::B);
    let do_partner_a = partner(&domestic, Partner::A);
    let do_partner_b = partner(&domestic, Partner::B);
    let di_total = di_partner_a + di_partner_b;
    let do_total = do_partner_a + do_partner_b;

    MonthlyReport {
        month: sources.month.display_name.clone(),
        month_key: sources.month.month_key,
        source_filename: sources.source_filename.to_string(),
        partners: [
            config.partner_name(Partner::A).to_string(),
            config.partner_name(Partner::B).to_string(),
        ],
        actual: ActualTotals {
            di_partner_a,
            di_partner_b,
            di_total,
            do_partner_a,
            do_partner_b,
            do_total,
            grand_total: di_total + do_total,
        },
        direct,
        domestic,
        row_counts: RowCounts {
            di_rows: sources.direct.rows.len(),
            do_rows: sources.domestic_rows.len(),
            di_skipped: sources.direct.skipped,
            do_skipped: sources.domestic_skipped,
        },
    }
}
