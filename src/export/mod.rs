//! Export module for Spendwise
//!
//! Spreadsheet-friendly CSV of a user's expenses over a date range.

pub mod csv;

pub use self::csv::{
    export_expenses_csv, export_filename, write_expenses_csv, ExpenseExport, ExportFormat,
    UTF8_BOM,
};
