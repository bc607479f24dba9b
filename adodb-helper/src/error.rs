use crate::types::DecodeError;
use adodb_common::error::{AdodbStdError, AutomationError};
use thiserror::Error;

pub type AdodbResult<T, E = AdodbError> = core::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum AdodbError {
    #[error("connection error:`{0}`")]
    ConnectionError(AutomationError),
    #[error("prepare error:`{0}`")]
    PrepareError(AutomationError),
    #[error("automation error:`{0}`")]
    AutomationError(#[from] AutomationError),
    #[error("decode column {column} error:`{source}`")]
    Decode {
        column: usize,
        #[source]
        source: DecodeError,
    },
    #[error("{0}")]
    Std(#[from] AdodbStdError),
    #[error("{0} is closed")]
    Closed(&'static str),
}
