use crate::types::Value;
use crate::Convert;
use adodb_common::error::AdodbStdResult;
use adodb_common::print_table::Print;

pub type AdodbRow = Vec<Value>;

#[derive(Debug, Default)]
pub struct QueryResult {
    // table columns header
    pub columns: Vec<String>,
    // table columns data
    pub data: Vec<AdodbRow>,
}

impl Convert<Vec<String>> for AdodbRow {
    fn convert(self) -> Vec<String> {
        self.iter().map(ToString::to_string).collect()
    }
}

impl Print for QueryResult {
    fn header_data(self) -> AdodbStdResult<(Vec<String>, Vec<Vec<String>>)> {
        let rows = self
            .data
            .into_iter()
            .map(|row| -> Vec<String> { row.convert() })
            .collect();
        Ok((self.columns, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_result_table() {
        let result = QueryResult {
            columns: vec!["id".to_string(), "name".to_string()],
            data: vec![
                vec![Value::Int(1), Value::Text("gear".into())],
                vec![Value::Int(2), Value::Null],
            ],
        };
        let output = result.table_string().unwrap();
        assert!(output.contains("gear"));
        assert!(output.contains("NULL"));
        assert!(output.contains("name"));
    }
}
