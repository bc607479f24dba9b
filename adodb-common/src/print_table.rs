use crate::error::AdodbStdResult;
use tabled::builder::Builder;
use tabled::{Style, Table};

/// Render a header plus rows as a text table. E.g:
/// ```bash
/// ┌────┬────────┬─────────────────────┐
/// │ id │ name   │ created_at          │
/// ├────┼────────┼─────────────────────┤
/// │ 1  │ hallo  │ 2022-08-24 15:50:36 │
/// └────┴────────┴─────────────────────┘
/// ```
pub trait Print: Sized {
    fn print_all_tables(self) -> AdodbStdResult<()> {
        let p = self.table_string()?;
        debug!("\n{}", p);
        Ok(())
    }

    fn header_data(self) -> AdodbStdResult<(Vec<String>, Vec<Vec<String>>)>;

    fn convert_table(self) -> AdodbStdResult<Table> {
        let (headers, records) = self.header_data()?;
        let mut builder = Builder::default();
        for record in records {
            builder.add_record(record);
        }
        builder.set_columns(headers);

        let mut table = builder.build();
        table.with(Style::modern());

        Ok(table)
    }

    fn table_string(self) -> AdodbStdResult<String> {
        let table = self.convert_table()?;
        let output = table.to_string();
        Ok(output)
    }
}

impl Print for (Vec<String>, Vec<Vec<String>>) {
    fn header_data(self) -> AdodbStdResult<(Vec<String>, Vec<Vec<String>>)> {
        Ok(self)
    }
}
