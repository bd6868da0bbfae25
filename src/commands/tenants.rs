use std::io::Write;

use colored::Colorize;
use prettytable::{format, Table};

use crate::directory::TenantRecord;
use crate::error::Result;

/// Builds the result table shown by `search` and `login`.
///
/// Positions are one-based, matching what [`crate::flow::Selection::parse`]
/// accepts.
pub fn tenant_table(records: &[TenantRecord]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "#".bold(),
        "Name".bold(),
        "Address".bold(),
        "ID".bold()
    ]);

    for (position, record) in records.iter().enumerate() {
        let address = record.address.split_whitespace().collect::<Vec<_>>().join(" ");
        table.add_row(prettytable::row![
            position + 1,
            record.name.cyan(),
            address,
            record.id
        ]);
    }

    table
}

/// Writes the result table to `out`.
pub fn print_tenants<W: Write>(records: &[TenantRecord], out: &mut W) -> Result<()> {
    writeln!(out)?;
    tenant_table(records).print(out)?;
    writeln!(out)?;
    Ok(())
}
