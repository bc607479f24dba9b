pub mod connection;
pub mod rows;
pub mod statement;

pub use connection::{AdodbConnection, AdodbTransaction};
pub use rows::{AdodbRowSet, CursorState};
pub use statement::AdodbStatement;

use crate::automation::{Context, Variant};
use crate::error::AdodbResult;
use adodb_common::error::AdodbStdError;
use serde::{Deserialize, Serialize};

/// Name given to explicitly created parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BindNamePolicy {
    /// Every parameter is named with [`Options::placeholder`], whatever was bound.
    #[default]
    Placeholder,
    /// The bound name at the argument's position, else the placeholder.
    ByIndex,
}

/// What a field with an undecodable type code does to its destination slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnsupportedPolicy {
    /// Leave the slot as it was and log a warning.
    Skip,
    #[default]
    Fail,
}

/// When a row set re-reads its column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnCache {
    /// When the live field count differs from the cached one.
    #[default]
    ByCount,
    /// On every call.
    Always,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub connection_class: String,
    pub command_class: String,
    pub placeholder: String,
    pub bind_names: BindNamePolicy,
    pub unsupported: UnsupportedPolicy,
    pub column_cache: ColumnCache,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            connection_class: Self::CONNECTION_CLASS.to_string(),
            command_class: Self::COMMAND_CLASS.to_string(),
            placeholder: Self::PLACEHOLDER.to_string(),
            bind_names: BindNamePolicy::default(),
            unsupported: UnsupportedPolicy::default(),
            column_cache: ColumnCache::default(),
        }
    }
}

impl Options {
    pub const CONNECTION_CLASS: &'static str = "ADODB.Connection";
    pub const COMMAND_CLASS: &'static str = "ADODB.Command";
    pub const PLACEHOLDER: &'static str = "?";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_names(mut self, policy: BindNamePolicy) -> Self {
        self.bind_names = policy;
        self
    }

    pub fn unsupported(mut self, policy: UnsupportedPolicy) -> Self {
        self.unsupported = policy;
        self
    }

    pub fn column_cache(mut self, policy: ColumnCache) -> Self {
        self.column_cache = policy;
        self
    }

    fn check(mut self) -> Self {
        if self.connection_class.is_empty() {
            self.connection_class = Self::CONNECTION_CLASS.to_string();
        }
        if self.command_class.is_empty() {
            self.command_class = Self::COMMAND_CLASS.to_string();
        }
        if self.placeholder.is_empty() {
            self.placeholder = Self::PLACEHOLDER.to_string();
        }
        self
    }
}

/// Opens connections through an automation context.
#[derive(Debug, Default)]
pub struct AdodbDriver {
    options: Options,
}

impl AdodbDriver {
    pub fn new(options: Options) -> Self {
        Self {
            options: options.check(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Open `dsn`. The context is initialized here and torn down when the
    /// returned connection closes, or right away if opening fails.
    pub fn open(&self, ctx: Context, dsn: &str) -> AdodbResult<AdodbConnection> {
        AdodbConnection::open(ctx, dsn, self.options.clone())
    }
}

/// Collection index argument.
pub(crate) fn item_index(index: usize) -> AdodbResult<Variant> {
    Ok(Variant::I4(
        i32::try_from(index).map_err(AdodbStdError::from)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_check() {
        let options = Options {
            connection_class: String::new(),
            command_class: "Custom.Command".to_string(),
            placeholder: String::new(),
            ..Options::default()
        };
        let driver = AdodbDriver::new(options);
        assert_eq!(driver.options().connection_class, Options::CONNECTION_CLASS);
        assert_eq!(driver.options().command_class, "Custom.Command");
        assert_eq!(driver.options().placeholder, "?");
    }

    #[test]
    fn test_options_defaults() {
        let options: Options = serde_json::from_str(r#"{"bind_names":"ByIndex"}"#).unwrap();
        assert_eq!(options.bind_names, BindNamePolicy::ByIndex);
        assert_eq!(options.unsupported, UnsupportedPolicy::Fail);
        assert_eq!(options.column_cache, ColumnCache::ByCount);
        assert_eq!(options.connection_class, "ADODB.Connection");
    }

    #[test]
    fn test_item_index() {
        assert_eq!(item_index(3).unwrap(), Variant::I4(3));
        assert!(item_index(usize::MAX).is_err());
    }
}
