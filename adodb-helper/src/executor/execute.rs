#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    /// The adapter does not ask the provider for an affected row count.
    pub rows_affected: Option<u64>,
}

impl ExecResult {
    pub fn rows_affected(&self) -> Option<u64> {
        self.rows_affected
    }
}
