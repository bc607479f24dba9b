use std::{
    fmt::{self, Display, Formatter},
    num::TryFromIntError,
};

use crate::hresult::{get_obj_by_code, HResultKind};
use thiserror::Error;

pub type AdodbStdResult<T, E = AdodbStdError> = core::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum AdodbStdError {
    #[error("automation error:`{0}`")]
    AutomationError(#[from] AutomationError),
    #[error("Failed to convert value to {0}")]
    TypeConversionError(String),
}

impl From<TryFromIntError> for AdodbStdError {
    fn from(e: TryFromIntError) -> Self {
        AdodbStdError::TypeConversionError(e.to_string())
    }
}

/// Failure reported by a late-bound call across the automation boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutomationError {
    #[error("data handler error:`{0}`")]
    DataHandlerError(String),
    #[error("dispatch error:`{0}`")]
    DispatchError(DispatchError),
}

impl From<DispatchError> for AutomationError {
    fn from(e: DispatchError) -> Self {
        AutomationError::DispatchError(e)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub struct DispatchError {
    pub hresult: u32,
    pub member: String,
    pub description: String,
}

impl DispatchError {
    pub fn new<M: Into<String>, D: Into<String>>(hresult: u32, member: M, description: D) -> Self {
        Self {
            hresult,
            member: member.into(),
            description: description.into(),
        }
    }

    pub fn kind(&self) -> Option<HResultKind> {
        get_obj_by_code(self.hresult)
    }
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(
                f,
                "hresult: {:#010X} ({}), member: {:?}, description: {:?}",
                self.hresult, kind, self.member, self.description
            ),
            None => write!(
                f,
                "hresult: {:#010X}, member: {:?}, description: {:?}",
                self.hresult, self.member, self.description
            ),
        }
    }
}
