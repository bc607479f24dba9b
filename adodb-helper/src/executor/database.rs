use crate::driver::AdodbConnection;
use crate::executor::execute::ExecResult;
use crate::executor::query::QueryResult;
use crate::executor::statement::StatementInput;
use crate::types::Value;
use anyhow::Context;

pub trait ConnectionTrait {
    /// Execute a `[Statement]`  INSERT,UPDATE,DELETE
    fn execute<S>(&self, stmt: S) -> anyhow::Result<ExecResult>
    where
        S: StatementInput;

    /// Execute a `[Statement]` and collect every row into a [`QueryResult`]
    fn query<S>(&self, stmt: S) -> anyhow::Result<QueryResult>
    where
        S: StatementInput;
}

impl ConnectionTrait for &AdodbConnection {
    fn execute<S>(&self, stmt: S) -> anyhow::Result<ExecResult>
    where
        S: StatementInput,
    {
        let sql = stmt.to_sql();
        let mut prepared = self
            .prepare(sql)
            .with_context(|| format!("prepare `{}`", sql))?;
        prepared.bind(stmt.bind_names().iter().cloned());
        let result = prepared.exec(stmt.values())?;
        prepared.close()?;
        Ok(result)
    }

    fn query<S>(&self, stmt: S) -> anyhow::Result<QueryResult>
    where
        S: StatementInput,
    {
        let sql = stmt.to_sql();
        let mut prepared = self
            .prepare(sql)
            .with_context(|| format!("prepare `{}`", sql))?;
        prepared.bind(stmt.bind_names().iter().cloned());

        let mut rows = prepared.query(stmt.values())?;
        let columns = rows.columns()?.to_vec();
        debug!("columns:{:?}", columns);

        let mut data = vec![];
        loop {
            let mut row = vec![Value::Null; columns.len()];
            if !rows.next(&mut row)? {
                break;
            }
            data.push(row);
        }
        rows.close()?;
        prepared.close()?;

        Ok(QueryResult { columns, data })
    }
}
