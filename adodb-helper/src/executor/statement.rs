use crate::types::Value;

pub trait StatementInput {
    fn to_sql(&self) -> &str;

    /// Positional arguments.
    fn values(&self) -> &[Value];

    /// Explicit parameter names; empty binds positionally.
    fn bind_names(&self) -> &[String];
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    /// The SQL query
    pub sql: String,
    /// The values for the SQL statement's parameters
    pub values: Vec<Value>,
    /// Parameter names, see [`crate::driver::AdodbStatement::bind`]
    pub binds: Vec<String>,
}

impl Statement {
    pub fn new<S: Into<String>>(sql: S, values: Vec<Value>) -> Self {
        Statement {
            sql: sql.into(),
            values,
            binds: vec![],
        }
    }

    pub fn binds<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.binds = names.into_iter().map(Into::into).collect();
        self
    }
}

impl StatementInput for Statement {
    fn to_sql(&self) -> &str {
        &self.sql
    }

    fn values(&self) -> &[Value] {
        &self.values
    }

    fn bind_names(&self) -> &[String] {
        &self.binds
    }
}

impl StatementInput for &str {
    fn to_sql(&self) -> &str {
        self
    }

    fn values(&self) -> &[Value] {
        &[]
    }

    fn bind_names(&self) -> &[String] {
        &[]
    }
}

impl StatementInput for String {
    fn to_sql(&self) -> &str {
        self
    }

    fn values(&self) -> &[Value] {
        &[]
    }

    fn bind_names(&self) -> &[String] {
        &[]
    }
}
