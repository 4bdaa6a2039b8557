// Excel export of the flattened report: a Summary sheet and a per-company detail sheet

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook as XlsxWorkbook, Worksheet};

use billdiff_recon::report::{AccountRow, ItemRow, Report, ReportRow, SummaryValue};

use crate::error::IoError;

pub const SUMMARY_SHEET: &str = "Summary";
pub const DETAIL_SHEET: &str = "Details by Company";

const SUMMARY_TITLE: &str = "Invoice Comparison Summary";

const CURRENCY_FORMAT: &str = "$#,##0.00";
const QUANTITY_FORMAT: &str = "#,##0.####";

/// Detail column widths, in Excel character units, matching `Report::HEADERS`.
const DETAIL_WIDTHS: [f64; 11] = [40.0, 12.0, 22.0, 55.0, 10.0, 10.0, 12.0, 14.0, 14.0, 14.0, 40.0];

struct Styles {
    title: Format,
    header: Format,
    account: Format,
    account_currency: Format,
    currency: Format,
    quantity: Format,
}

impl Styles {
    fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(0xD9E1F2))
            .set_border_bottom(FormatBorder::Thin);
        let account = Format::new().set_bold().set_background_color(Color::RGB(0xF2F2F2));
        Self {
            title: Format::new().set_bold().set_font_size(14),
            header,
            account_currency: account.clone().set_num_format(CURRENCY_FORMAT),
            account,
            currency: Format::new().set_num_format(CURRENCY_FORMAT),
            quantity: Format::new().set_num_format(QUANTITY_FORMAT),
        }
    }
}

/// Write the report as an .xlsx workbook at `path`.
pub fn export_report(report: &Report, path: &Path) -> Result<(), IoError> {
    let mut workbook = build_workbook(report)?;
    workbook.save(path)?;
    log::info!("wrote {} report row(s) to {}", report.rows.len(), path.display());
    Ok(())
}

fn build_workbook(report: &Report) -> Result<XlsxWorkbook, IoError> {
    let styles = Styles::new();
    let mut workbook = XlsxWorkbook::new();

    let summary = workbook.add_worksheet().set_name(SUMMARY_SHEET)?;
    write_summary(summary, report, &styles)?;

    let details = workbook.add_worksheet().set_name(DETAIL_SHEET)?;
    write_details(details, report, &styles)?;

    Ok(workbook)
}

fn write_summary(ws: &mut Worksheet, report: &Report, styles: &Styles) -> Result<(), IoError> {
    ws.merge_range(0, 0, 0, 1, SUMMARY_TITLE, &styles.title)?;
    ws.write_string_with_format(2, 0, "Metric", &styles.header)?;
    ws.write_string_with_format(2, 1, "Count", &styles.header)?;

    let mut row = 3;
    for section in report.summary_table() {
        for (label, value) in section {
            ws.write_string(row, 0, label)?;
            match value {
                SummaryValue::Count(n) => ws.write_number(row, 1, n as f64)?,
                SummaryValue::Text(text) => ws.write_string(row, 1, &text)?,
            };
            row += 1;
        }
        // Blank line between sections
        row += 1;
    }

    ws.set_column_width(0, 30.0)?;
    ws.set_column_width(1, 26.0)?;
    Ok(())
}

fn write_details(ws: &mut Worksheet, report: &Report, styles: &Styles) -> Result<(), IoError> {
    for (col, header) in Report::HEADERS.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, *header, &styles.header)?;
    }
    for (col, width) in DETAIL_WIDTHS.iter().enumerate() {
        ws.set_column_width(col as u16, *width)?;
    }
    ws.set_freeze_panes(1, 0)?;

    let mut row: u32 = 1;
    let mut first_account = true;
    for report_row in &report.rows {
        match report_row {
            ReportRow::Account(account) => {
                // Blank spacer row between companies
                if !first_account {
                    row += 1;
                }
                first_account = false;
                write_account_row(ws, row, account, styles)?;
            }
            ReportRow::Item(item) => write_item_row(ws, row, item, styles)?,
        }
        row += 1;
    }

    Ok(())
}

fn write_account_row(
    ws: &mut Worksheet,
    row: u32,
    account: &AccountRow,
    styles: &Styles,
) -> Result<(), IoError> {
    for col in 0..Report::HEADERS.len() as u16 {
        ws.write_blank(row, col, &styles.account)?;
    }
    ws.write_string_with_format(row, 0, &account.company, &styles.account)?;
    ws.write_string_with_format(row, 1, account.status.as_str(), &styles.account)?;
    ws.write_number_with_format(row, 7, account.total_a, &styles.account_currency)?;
    ws.write_number_with_format(row, 8, account.total_b, &styles.account_currency)?;
    ws.write_number_with_format(row, 9, account.difference, &styles.account_currency)?;
    Ok(())
}

fn write_item_row(ws: &mut Worksheet, row: u32, item: &ItemRow, styles: &Styles) -> Result<(), IoError> {
    // Company column stays blank under the account row
    ws.write_string(row, 1, item.status.label())?;
    ws.write_string(row, 2, &item.sku)?;
    ws.write_string(row, 3, &item.description)?;

    let numbers = [
        (4, item.quantity_a, &styles.quantity),
        (5, item.quantity_b, &styles.quantity),
        (6, item.quantity_change, &styles.quantity),
        (7, item.total_a, &styles.currency),
        (8, item.total_b, &styles.currency),
        (9, Some(item.total_change), &styles.currency),
    ];
    for (col, value, format) in numbers {
        if let Some(value) = value {
            ws.write_number_with_format(row, col, value, format)?;
        }
    }

    if !item.changes.is_empty() {
        ws.write_string(row, 10, &item.changes)?;
    }
    Ok(())
}
