#![deny(missing_debug_implementations)]

#[macro_use]
extern crate log;
pub extern crate adodb_common;

pub mod automation;
pub mod driver;
pub mod error;
pub mod executor;
pub mod types;

#[cfg(test)]
mod tests_cfg;

pub use adodb_common::Print;
pub use automation::{Automation, Context, Handle, SafeArray, Variant};
pub use driver::{AdodbDriver, Options};
pub use error::{AdodbError, AdodbResult};
pub use types::{AdType, Value};

pub trait Convert<T>: Sized {
    fn convert(self) -> T;
}

pub trait TryConvert<T>: Sized {
    type Error;
    fn try_convert(self) -> Result<T, Self::Error>;
}
