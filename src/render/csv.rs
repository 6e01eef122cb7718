//! Comma-separated rendering of recognized tables.
//!
//! Layout: each table is introduced by a `Table N` line (1-based), followed
//! by one line per row; every table block ends with a blank line.

use crate::model::{Table, TableSet};

/// Render all tables as comma-separated text.
pub fn to_csv(tables: &TableSet) -> String {
    let mut output = String::new();

    for (index, table) in tables.iter().enumerate() {
        output.push_str(&format!("Table {}\n", index + 1));
        write_table(&mut output, table);
        output.push('\n');
    }

    output
}

fn write_table(output: &mut String, table: &Table) {
    for row in &table.rows {
        let line = row
            .cells
            .iter()
            .map(|cell| escape_cell(cell))
            .collect::<Vec<_>>()
            .join(",");
        output.push_str(&line);
        output.push('\n');
    }
}

/// Quote a cell if it contains a comma, quote, or newline.
///
/// Internal quotes are doubled.
pub fn escape_cell(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
