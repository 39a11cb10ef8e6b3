//! Excel export of monthly payroll.

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::Path;

use crate::models::{AttendanceRecord, Staff, YearMonth};
use crate::payroll::MonthlySummary;

/// A staff member with their punch records for the month.
pub type StaffAttendance = (Staff, Vec<AttendanceRecord>);

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin)
}

fn write_headers(sheet: &mut Worksheet, headers: &[(&str, f64)]) -> Result<(), XlsxError> {
    let format = header_format();
    for (col, (title, width)) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &format)?;
        sheet.set_column_width(col as u16, *width)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn cents(amount: i64) -> f64 {
    amount as f64 / 100.0
}

/// Write a workbook with a "Payroll" sheet (one row per staff member) and an
/// "Attendance" sheet (one row per live punch record).
pub fn export_payroll_to_excel(
    month: YearMonth,
    summaries: &[(Staff, MonthlySummary)],
    attendance: &[StaffAttendance],
    path: &Path,
) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let money = Format::new().set_num_format("#,##0.00");
    let hours = Format::new().set_num_format("0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name(format!("Payroll {month}"))?;
    write_headers(
        sheet,
        &[
            ("Staff", 28.0),
            ("Role", 14.0),
            ("Days Worked", 12.0),
            ("Open Days", 10.0),
            ("Hours", 10.0),
            ("Visits", 8.0),
            ("Service Revenue", 16.0),
            ("Rate %", 8.0),
            ("Commission", 14.0),
        ],
    )?;

    for (idx, (staff, summary)) in summaries.iter().enumerate() {
        let row = (idx + 1) as u32;
        sheet.write_string(row, 0, &staff.full_name)?;
        sheet.write_string(row, 1, staff.role.to_string())?;
        sheet.write_number(row, 2, summary.days_worked)?;
        sheet.write_number(row, 3, summary.open_days)?;
        sheet.write_number_with_format(row, 4, summary.total_hours, &hours)?;
        sheet.write_number(row, 5, summary.visit_count)?;
        sheet.write_number_with_format(row, 6, cents(summary.commission_base_cents), &money)?;
        sheet.write_number(row, 7, summary.commission_rate_percent)?;
        sheet.write_number_with_format(row, 8, cents(summary.commission_cents), &money)?;
    }
    if !summaries.is_empty() {
        sheet.autofilter(0, 0, summaries.len() as u32, 8)?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name("Attendance")?;
    write_headers(
        sheet,
        &[("Staff", 28.0), ("Date", 12.0), ("Punch In", 10.0), ("Punch Out", 10.0), ("Hours", 10.0)],
    )?;

    let mut row = 1u32;
    for (staff, records) in attendance {
        for record in records.iter().filter(|r| !r.is_deleted()) {
            sheet.write_string(row, 0, &staff.full_name)?;
            sheet.write_string(row, 1, record.work_date.to_string())?;
            sheet.write_string(row, 2, record.punch_in.format("%H:%M").to_string())?;
            match (record.punch_out, record.work_hours()) {
                (Some(out), Some(h)) => {
                    sheet.write_string(row, 3, out.format("%H:%M").to_string())?;
                    sheet.write_number_with_format(row, 4, h, &hours)?;
                }
                _ => {
                    sheet.write_string(row, 3, "")?;
                }
            }
            row += 1;
        }
    }
    if row > 1 {
        sheet.autofilter(0, 0, row - 1, 4)?;
    }

    workbook.save(path)?;
    Ok(())
}

/// Default file name for a month's export.
pub fn generate_export_filename(month: YearMonth) -> String {
    format!("payroll_{month}.xlsx")
}
