//! The automation boundary.
//!
//! Every remote call made by the adapter goes through [`Automation`]: object
//! creation by class name, late-bound method invocation, property access and
//! reference release. A host platform implements the trait once; the adapter
//! never depends on any other form of dynamic dispatch.

pub mod memory;
pub mod variant;

pub use memory::MemoryHost;
pub use variant::{SafeArray, VarType, Variant};

use adodb_common::error::AutomationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

pub type AutomationResult<T> = Result<T, AutomationError>;

/// Opaque reference to a remote automation object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(usize);

impl Handle {
    pub fn from_raw(raw: usize) -> Self {
        Handle(raw)
    }

    pub fn as_raw(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Late-bound access to an automation object model.
///
/// Implementations are single-threaded: a handle is only meaningful inside
/// the apartment that created it.
pub trait Automation: fmt::Debug {
    /// Enter the automation apartment. Calls nest and must be balanced by
    /// [`Automation::uninitialize`].
    fn initialize(&self) -> AutomationResult<()>;

    fn uninitialize(&self);

    fn create_object(&self, class: &str) -> AutomationResult<Handle>;

    fn invoke(&self, handle: Handle, method: &str, args: &[Variant]) -> AutomationResult<Variant>;

    fn get_property(&self, handle: Handle, name: &str) -> AutomationResult<Variant>;

    fn set_property(&self, handle: Handle, name: &str, value: Variant) -> AutomationResult<()>;

    /// Drop one reference to `handle`.
    fn release(&self, handle: Handle);

    /// Read an object-valued property.
    fn get_object(&self, handle: Handle, name: &str) -> AutomationResult<Handle> {
        let value = self.get_property(handle, name)?;
        expect_object(name, value)
    }

    /// Invoke a method returning an object.
    fn invoke_object(&self, handle: Handle, method: &str, args: &[Variant]) -> AutomationResult<Handle> {
        let value = self.invoke(handle, method, args)?;
        expect_object(method, value)
    }
}

fn expect_object(member: &str, value: Variant) -> AutomationResult<Handle> {
    value.object().ok_or_else(|| {
        AutomationError::DataHandlerError(format!(
            "`{}` returned {:?} where an object was expected",
            member, value
        ))
    })
}

/// Explicit automation context handed to the driver.
///
/// The connection opened from it initializes the apartment and tears it down
/// again on close, so the caller owns the lifecycle instead of process-wide
/// state.
#[derive(Debug, Clone)]
pub struct Context {
    host: Rc<dyn Automation>,
}

impl Context {
    pub fn new<A: Automation + 'static>(host: A) -> Self {
        Self {
            host: Rc::new(host),
        }
    }

    pub fn from_shared(host: Rc<dyn Automation>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &dyn Automation {
        self.host.as_ref()
    }
}

/// Releases a transient handle when it goes out of scope.
pub(crate) struct Scoped<'a> {
    host: &'a dyn Automation,
    handle: Handle,
}

impl<'a> Scoped<'a> {
    pub(crate) fn new(host: &'a dyn Automation, handle: Handle) -> Self {
        Self { host, handle }
    }

    pub(crate) fn handle(&self) -> Handle {
        self.handle
    }
}

impl fmt::Debug for Scoped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Scoped").field(&self.handle).finish()
    }
}

impl Drop for Scoped<'_> {
    fn drop(&mut self) {
        self.host.release(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adodb_common::hresult::HResultKind;

    #[test]
    fn test_get_object_rejects_scalars() {
        let host = MemoryHost::new();
        host.initialize().unwrap();
        let conn = host.create_object("ADODB.Connection").unwrap();

        let err = host.get_object(conn, "State").unwrap_err();
        assert!(matches!(err, AutomationError::DataHandlerError(_)));

        host.release(conn);
        host.uninitialize();
    }

    #[test]
    fn test_scoped_release() {
        let host = MemoryHost::new();
        host.initialize().unwrap();
        let command = host.create_object("ADODB.Command").unwrap();
        {
            let guard = Scoped::new(&host, command);
            assert_eq!(guard.handle(), command);
            // the command and its parameter collection
            assert_eq!(host.live_objects(), 2);
        }
        assert_eq!(host.live_objects(), 0);
        assert_eq!(host.invalid_releases(), 0);
        host.uninitialize();
    }

    #[test]
    fn test_create_requires_apartment() {
        let host = MemoryHost::new();
        let err = host.create_object("ADODB.Connection").unwrap_err();
        match err {
            AutomationError::DispatchError(e) => {
                assert_eq!(e.kind(), Some(HResultKind::CO_E_NOTINITIALIZED))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_context_shares_host() {
        let host = Rc::new(MemoryHost::new());
        let ctx = Context::from_shared(host.clone());
        ctx.host().initialize().unwrap();
        assert_eq!(host.apartment_depth(), 1);
        ctx.host().uninitialize();
        assert_eq!(host.apartment_depth(), 0);
    }
}
