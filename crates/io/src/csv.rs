// CSV export of monthly reports

use std::io::Write;

use revsplit_recon::model::{Category, Partner};
use revsplit_recon::MonthlyReport;

use crate::error::IoError;

pub const HEADER: [&str; 5] = ["Month", "Category", "Team", "Program", "Amount"];

/// Render reports as delimited text, one line per (month, category, partner,
/// program). Only the two partners are listed, so the amounts of a month add
/// up to its grand total.
pub fn to_delimited_text(reports: &[MonthlyReport]) -> Result<String, IoError> {
    let mut buf = Vec::new();
    write_delimited(reports, &mut buf)?;
    String::from_utf8(buf).map_err(|e| IoError::Export(e.to_string()))
}

/// Stream the same rows as [`to_delimited_text`] into `out`.
pub fn write_delimited<W: Write>(reports: &[MonthlyReport], out: W) -> Result<(), IoError> {
    let mut writer = csv::WriterBuilder::new().delimiter(b',').from_writer(out);
    writer.write_record(HEADER)?;

    for report in reports {
        for category in Category::ALL {
            for partner in Partner::ALL {
                let team = report.partner_name(partner);
                for (program, amount) in report.partner_programs(category, partner) {
                    let amount = format!("{amount:.2}");
                    writer.write_record([
                        report.month.as_str(),
                        category.label(),
                        team,
                        program,
                        amount.as_str(),
                    ])?;
                }
            }
        }
    }

    writer.flush()?;
    Ok(())
}
