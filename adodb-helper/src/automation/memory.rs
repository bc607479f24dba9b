//! An [`Automation`] host backed by process memory.
//!
//! It models the slice of the ADO object model the driver talks to
//! (`Connection`, `Command`, `Parameters`, `Recordset`, `Fields`) over data
//! sources registered up front. Sources map command texts to captured tables,
//! so the same fixtures drive the test suite and the bridge's replay mode.

use super::{Automation, AutomationResult, Handle, Variant};
use adodb_common::error::{AutomationError, DispatchError};
use adodb_common::hresult::HResultKind;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

pub const CONNECTION_CLASS: &str = "ADODB.Connection";
pub const COMMAND_CLASS: &str = "ADODB.Command";

const AD_STATE_CLOSED: i32 = 0;
const AD_STATE_OPEN: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFixture {
    pub name: String,
    /// ADO `DataTypeEnum` code.
    #[serde(rename = "type")]
    pub ad_type: i32,
    #[serde(default)]
    pub scale: i32,
}

impl ColumnFixture {
    pub fn new<S: Into<String>>(name: S, ad_type: i32) -> Self {
        Self {
            name: name.into(),
            ad_type,
            scale: 0,
        }
    }

    pub fn scale(mut self, scale: i32) -> Self {
        self.scale = scale;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableFixture {
    pub columns: Vec<ColumnFixture>,
    #[serde(default)]
    pub rows: Vec<Vec<Variant>>,
}

impl TableFixture {
    pub fn new(columns: Vec<ColumnFixture>) -> Self {
        Self {
            columns,
            rows: vec![],
        }
    }

    pub fn row(mut self, row: Vec<Variant>) -> Self {
        self.rows.push(row);
        self
    }
}

/// A data source: command text to the table its execution yields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySource {
    #[serde(default)]
    pub tables: BTreeMap<String, TableFixture>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table<S: Into<String>>(mut self, command_text: S, table: TableFixture) -> Self {
        self.tables.insert(command_text.into(), table);
        self
    }
}

/// One journaled `Execute`, with the parameters bound at that moment.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub command_text: String,
    pub parameters: Vec<(String, Variant)>,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    state: RefCell<HostState>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source<S: Into<String>>(self, dsn: S, source: MemorySource) -> Self {
        self.register_source(dsn, source);
        self
    }

    pub fn register_source<S: Into<String>>(&self, dsn: S, source: MemorySource) {
        self.state.borrow_mut().sources.insert(dsn.into(), source);
    }

    /// Make every later call to `member` fail with `kind`.
    pub fn fail_on<S: Into<String>>(&self, member: S, kind: HResultKind) {
        self.state.borrow_mut().failures.insert(member.into(), kind);
    }

    pub fn clear_failures(&self) {
        self.state.borrow_mut().failures.clear();
    }

    /// Number of invocations and property accesses of `member`.
    pub fn calls(&self, member: &str) -> usize {
        self.state.borrow().calls.get(member).copied().unwrap_or(0)
    }

    pub fn executions(&self) -> Vec<Execution> {
        self.state.borrow().executions.clone()
    }

    /// Every handle passed to [`Automation::release`], in order.
    pub fn released(&self) -> Vec<Handle> {
        self.state.borrow().released.clone()
    }

    pub fn live_objects(&self) -> usize {
        self.state.borrow().objects.len()
    }

    /// Releases of handles that were not alive.
    pub fn invalid_releases(&self) -> usize {
        self.state.borrow().invalid_releases
    }

    pub fn apartment_depth(&self) -> usize {
        self.state.borrow().apartment
    }
}

impl Automation for MemoryHost {
    fn initialize(&self) -> AutomationResult<()> {
        let mut state = self.state.borrow_mut();
        state.enter("CoInitialize")?;
        state.apartment += 1;
        Ok(())
    }

    fn uninitialize(&self) {
        let mut state = self.state.borrow_mut();
        state.apartment = state.apartment.saturating_sub(1);
    }

    fn create_object(&self, class: &str) -> AutomationResult<Handle> {
        let mut state = self.state.borrow_mut();
        state.enter(class)?;
        if state.apartment == 0 {
            return Err(dispatch(HResultKind::CO_E_NOTINITIALIZED, class));
        }
        match class {
            CONNECTION_CLASS => Ok(state.alloc(Object::Connection(ConnectionObject::default()))),
            COMMAND_CLASS => {
                let parameters = state.alloc(Object::Parameters(ParametersObject::default()));
                Ok(state.alloc(Object::Command(CommandObject {
                    connection: None,
                    text: String::new(),
                    command_type: 0,
                    prepared: false,
                    parameters,
                })))
            }
            _ => Err(dispatch(HResultKind::REGDB_E_CLASSNOTREG, class)),
        }
    }

    fn invoke(&self, handle: Handle, method: &str, args: &[Variant]) -> AutomationResult<Variant> {
        let mut state = self.state.borrow_mut();
        state.enter(method)?;
        match state.kind(handle, method)? {
            Kind::Connection => state.connection_call(handle, method, args),
            Kind::Command => state.command_call(handle, method, args),
            Kind::Parameters => state.parameters_call(handle, method, args),
            Kind::Recordset => state.recordset_call(handle, method),
            Kind::Fields(recordset) => state.fields_call(recordset, method, args),
            Kind::Parameter | Kind::Field(..) => Err(dispatch(HResultKind::DISP_E_MEMBERNOTFOUND, method)),
        }
    }

    fn get_property(&self, handle: Handle, name: &str) -> AutomationResult<Variant> {
        let mut state = self.state.borrow_mut();
        state.enter(name)?;
        match state.kind(handle, name)? {
            Kind::Connection => state.connection_get(handle, name),
            Kind::Command => state.command_get(handle, name),
            Kind::Parameters => state.parameters_get(handle, name),
            Kind::Parameter => state.parameter_get(handle, name),
            Kind::Recordset => state.recordset_get(handle, name),
            Kind::Fields(recordset) => state.fields_get(recordset, name),
            Kind::Field(recordset, column) => state.field_get(recordset, column, name),
        }
    }

    fn set_property(&self, handle: Handle, name: &str, value: Variant) -> AutomationResult<()> {
        let mut state = self.state.borrow_mut();
        state.enter(name)?;
        match state.kind(handle, name)? {
            Kind::Command => state.command_set(handle, name, value),
            Kind::Parameter => state.parameter_set(handle, name, value),
            _ => Err(dispatch(HResultKind::DISP_E_UNKNOWNNAME, name)),
        }
    }

    fn release(&self, handle: Handle) {
        let mut state = self.state.borrow_mut();
        state.released.push(handle);
        state.release(handle);
    }
}

fn dispatch(kind: HResultKind, member: &str) -> AutomationError {
    DispatchError::new(kind.code(), member, kind.message()).into()
}

fn text_arg(args: &[Variant], index: usize, member: &str) -> AutomationResult<String> {
    let arg = args
        .get(index)
        .ok_or_else(|| dispatch(HResultKind::DISP_E_PARAMNOTOPTIONAL, member))?;
    arg.to_text()
        .ok_or_else(|| dispatch(HResultKind::DISP_E_TYPEMISMATCH, member))
}

fn int_arg(args: &[Variant], index: usize, default: i32) -> i32 {
    args.get(index)
        .and_then(Variant::as_i64)
        .and_then(|v| i32::try_from(v).ok())
        .unwrap_or(default)
}

/// Collection lookup key: ordinal or name.
enum Key {
    Index(usize),
    Name(String),
}

fn key_arg(args: &[Variant], member: &str) -> AutomationResult<Key> {
    match args.first() {
        None => Err(dispatch(HResultKind::DISP_E_PARAMNOTOPTIONAL, member)),
        Some(Variant::BStr(name)) => Ok(Key::Name(name.clone())),
        Some(v) => v
            .as_i64()
            .and_then(|i| usize::try_from(i).ok())
            .map(Key::Index)
            .ok_or_else(|| dispatch(HResultKind::DISP_E_BADINDEX, member)),
    }
}

#[derive(Debug, Default)]
struct HostState {
    apartment: usize,
    next_handle: usize,
    objects: HashMap<Handle, Entry>,
    sources: HashMap<String, MemorySource>,
    failures: HashMap<String, HResultKind>,
    calls: HashMap<String, usize>,
    executions: Vec<Execution>,
    released: Vec<Handle>,
    invalid_releases: usize,
}

#[derive(Debug)]
struct Entry {
    refs: usize,
    object: Object,
}

#[derive(Debug)]
enum Object {
    Connection(ConnectionObject),
    Command(CommandObject),
    Parameters(ParametersObject),
    Parameter(ParameterObject),
    Recordset(RecordsetObject),
    Fields { recordset: Handle },
    Field { recordset: Handle, column: usize },
}

impl Object {
    /// References held by this object, dropped with it.
    fn children(self) -> Vec<Handle> {
        match self {
            Object::Command(command) => {
                let mut children = vec![command.parameters];
                children.extend(command.connection);
                children
            }
            Object::Parameters(parameters) => parameters.items,
            Object::Fields { recordset } | Object::Field { recordset, .. } => vec![recordset],
            Object::Connection(_) | Object::Parameter(_) | Object::Recordset(_) => vec![],
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Connection,
    Command,
    Parameters,
    Parameter,
    Recordset,
    Fields(Handle),
    Field(Handle, usize),
}

#[derive(Debug, Default)]
struct ConnectionObject {
    dsn: Option<String>,
    in_transaction: bool,
}

#[derive(Debug)]
struct CommandObject {
    connection: Option<Handle>,
    text: String,
    command_type: i32,
    prepared: bool,
    parameters: Handle,
}

#[derive(Debug, Default)]
struct ParametersObject {
    items: Vec<Handle>,
    markers: usize,
    derived: bool,
}

#[derive(Debug)]
struct ParameterObject {
    name: String,
    ad_type: i32,
    direction: i32,
    value: Variant,
}

#[derive(Debug)]
struct RecordsetObject {
    table: TableFixture,
    position: usize,
    open: bool,
}

impl RecordsetObject {
    fn eof(&self) -> bool {
        self.position >= self.table.rows.len()
    }
}

impl HostState {
    fn enter(&mut self, member: &str) -> AutomationResult<()> {
        *self.calls.entry(member.to_string()).or_insert(0) += 1;
        match self.failures.get(member) {
            Some(kind) => Err(dispatch(*kind, member)),
            None => Ok(()),
        }
    }

    fn alloc(&mut self, object: Object) -> Handle {
        self.next_handle += 1;
        let handle = Handle::from_raw(self.next_handle);
        self.objects.insert(handle, Entry { refs: 1, object });
        handle
    }

    fn add_ref(&mut self, handle: Handle) {
        if let Some(entry) = self.objects.get_mut(&handle) {
            entry.refs += 1;
        }
    }

    fn release(&mut self, handle: Handle) {
        let mut pending = vec![handle];
        while let Some(handle) = pending.pop() {
            let entry = match self.objects.get_mut(&handle) {
                Some(entry) => entry,
                None => {
                    self.invalid_releases += 1;
                    continue;
                }
            };
            entry.refs -= 1;
            if entry.refs == 0 {
                if let Some(entry) = self.objects.remove(&handle) {
                    pending.extend(entry.object.children());
                }
            }
        }
    }

    fn object_mut(&mut self, handle: Handle, member: &str) -> AutomationResult<&mut Object> {
        self.objects
            .get_mut(&handle)
            .map(|entry| &mut entry.object)
            .ok_or_else(|| dispatch(HResultKind::E_POINTER, member))
    }

    fn kind(&mut self, handle: Handle, member: &str) -> AutomationResult<Kind> {
        Ok(match self.object_mut(handle, member)? {
            Object::Connection(_) => Kind::Connection,
            Object::Command(_) => Kind::Command,
            Object::Parameters(_) => Kind::Parameters,
            Object::Parameter(_) => Kind::Parameter,
            Object::Recordset(_) => Kind::Recordset,
            Object::Fields { recordset } => Kind::Fields(*recordset),
            Object::Field { recordset, column } => Kind::Field(*recordset, *column),
        })
    }

    fn connection_mut(&mut self, handle: Handle, member: &str) -> AutomationResult<&mut ConnectionObject> {
        match self.object_mut(handle, member)? {
            Object::Connection(conn) => Ok(conn),
            _ => Err(dispatch(HResultKind::DISP_E_TYPEMISMATCH, member)),
        }
    }

    /// The data source of an open connection.
    fn open_dsn(&mut self, handle: Handle, member: &str) -> AutomationResult<String> {
        self.connection_mut(handle, member)?
            .dsn
            .clone()
            .ok_or_else(|| dispatch(HResultKind::AD_E_OBJECT_CLOSED, member))
    }

    fn command_mut(&mut self, handle: Handle, member: &str) -> AutomationResult<&mut CommandObject> {
        match self.object_mut(handle, member)? {
            Object::Command(command) => Ok(command),
            _ => Err(dispatch(HResultKind::DISP_E_TYPEMISMATCH, member)),
        }
    }

    fn parameters_mut(&mut self, handle: Handle, member: &str) -> AutomationResult<&mut ParametersObject> {
        match self.object_mut(handle, member)? {
            Object::Parameters(parameters) => Ok(parameters),
            _ => Err(dispatch(HResultKind::DISP_E_TYPEMISMATCH, member)),
        }
    }

    fn parameter_mut(&mut self, handle: Handle, member: &str) -> AutomationResult<&mut ParameterObject> {
        match self.object_mut(handle, member)? {
            Object::Parameter(parameter) => Ok(parameter),
            _ => Err(dispatch(HResultKind::DISP_E_TYPEMISMATCH, member)),
        }
    }

    fn open_recordset_mut(&mut self, handle: Handle, member: &str) -> AutomationResult<&mut RecordsetObject> {
        match self.object_mut(handle, member)? {
            Object::Recordset(rs) if rs.open => Ok(rs),
            Object::Recordset(_) => Err(dispatch(HResultKind::AD_E_OBJECT_CLOSED, member)),
            _ => Err(dispatch(HResultKind::DISP_E_TYPEMISMATCH, member)),
        }
    }

    fn execute(&mut self, dsn: &str, command_text: String, parameters: Vec<(String, Variant)>) -> Variant {
        let table = self
            .sources
            .get(dsn)
            .and_then(|source| source.tables.get(&command_text))
            .cloned();
        self.executions.push(Execution {
            command_text,
            parameters,
        });
        match table {
            Some(table) => Variant::Dispatch(self.alloc(Object::Recordset(RecordsetObject {
                table,
                position: 0,
                open: true,
            }))),
            None => Variant::Empty,
        }
    }

    fn connection_call(&mut self, handle: Handle, method: &str, args: &[Variant]) -> AutomationResult<Variant> {
        match method {
            "Open" => {
                let dsn = text_arg(args, 0, method)?;
                if !self.sources.contains_key(&dsn) {
                    return Err(dispatch(HResultKind::AD_E_PROVIDER_NOT_FOUND, method));
                }
                let conn = self.connection_mut(handle, method)?;
                if conn.dsn.is_some() {
                    return Err(dispatch(HResultKind::AD_E_OBJECT_OPEN, method));
                }
                conn.dsn = Some(dsn);
            }
            "Close" => {
                let conn = self.connection_mut(handle, method)?;
                if conn.dsn.take().is_none() {
                    return Err(dispatch(HResultKind::AD_E_OBJECT_CLOSED, method));
                }
                conn.in_transaction = false;
            }
            "BeginTrans" => {
                self.open_dsn(handle, method)?;
                let conn = self.connection_mut(handle, method)?;
                if conn.in_transaction {
                    return Err(dispatch(HResultKind::AD_E_ILLEGAL_OPERATION, method));
                }
                conn.in_transaction = true;
                return Ok(Variant::I4(1));
            }
            "CommitTrans" | "Rollback" => {
                self.open_dsn(handle, method)?;
                let conn = self.connection_mut(handle, method)?;
                if !conn.in_transaction {
                    return Err(dispatch(HResultKind::AD_E_ILLEGAL_OPERATION, method));
                }
                conn.in_transaction = false;
            }
            "Execute" => {
                let text = text_arg(args, 0, method)?;
                let dsn = self.open_dsn(handle, method)?;
                return Ok(self.execute(&dsn, text, vec![]));
            }
            _ => return Err(dispatch(HResultKind::DISP_E_MEMBERNOTFOUND, method)),
        }
        Ok(Variant::Empty)
    }

    fn connection_get(&mut self, handle: Handle, name: &str) -> AutomationResult<Variant> {
        let conn = self.connection_mut(handle, name)?;
        match name {
            "State" => Ok(Variant::I4(if conn.dsn.is_some() {
                AD_STATE_OPEN
            } else {
                AD_STATE_CLOSED
            })),
            "ConnectionString" => Ok(Variant::BStr(conn.dsn.clone().unwrap_or_default())),
            _ => Err(dispatch(HResultKind::DISP_E_UNKNOWNNAME, name)),
        }
    }

    fn command_call(&mut self, handle: Handle, method: &str, args: &[Variant]) -> AutomationResult<Variant> {
        match method {
            "Execute" => {
                let command = self.command_mut(handle, method)?;
                let text = command.text.clone();
                let parameters = command.parameters;
                let connection = command
                    .connection
                    .ok_or_else(|| dispatch(HResultKind::AD_E_INVALID_CONNECTION, method))?;
                let dsn = self
                    .open_dsn(connection, method)
                    .map_err(|_| dispatch(HResultKind::AD_E_INVALID_CONNECTION, method))?;
                let items = self.parameters_mut(parameters, method)?.items.clone();
                let mut bound = Vec::with_capacity(items.len());
                for item in items {
                    let parameter = self.parameter_mut(item, method)?;
                    bound.push((parameter.name.clone(), parameter.value.clone()));
                }
                Ok(self.execute(&dsn, text, bound))
            }
            "CreateParameter" => {
                let name = args.first().and_then(Variant::to_text).unwrap_or_default();
                let parameter = ParameterObject {
                    name,
                    ad_type: int_arg(args, 1, 12),
                    direction: int_arg(args, 2, 1),
                    value: args.get(4).cloned().unwrap_or_default(),
                };
                Ok(Variant::Dispatch(self.alloc(Object::Parameter(parameter))))
            }
            _ => Err(dispatch(HResultKind::DISP_E_MEMBERNOTFOUND, method)),
        }
    }

    fn command_get(&mut self, handle: Handle, name: &str) -> AutomationResult<Variant> {
        let command = self.command_mut(handle, name)?;
        let value = match name {
            "CommandText" => Variant::BStr(command.text.clone()),
            "CommandType" => Variant::I4(command.command_type),
            "Prepared" => Variant::Bool(command.prepared),
            "ActiveConnection" => match command.connection {
                Some(conn) => {
                    self.add_ref(conn);
                    Variant::Dispatch(conn)
                }
                None => Variant::Empty,
            },
            "Parameters" => {
                let parameters = command.parameters;
                self.add_ref(parameters);
                Variant::Dispatch(parameters)
            }
            _ => return Err(dispatch(HResultKind::DISP_E_UNKNOWNNAME, name)),
        };
        Ok(value)
    }

    fn command_set(&mut self, handle: Handle, name: &str, value: Variant) -> AutomationResult<()> {
        match name {
            "ActiveConnection" => {
                let conn = value
                    .object()
                    .ok_or_else(|| dispatch(HResultKind::DISP_E_TYPEMISMATCH, name))?;
                self.connection_mut(conn, name)?;
                self.add_ref(conn);
                let previous = self.command_mut(handle, name)?.connection.replace(conn);
                if let Some(previous) = previous {
                    self.release(previous);
                }
            }
            "CommandText" => {
                let text = value
                    .to_text()
                    .ok_or_else(|| dispatch(HResultKind::DISP_E_TYPEMISMATCH, name))?;
                let markers = text.matches('?').count();
                let command = self.command_mut(handle, name)?;
                command.text = text;
                let parameters = command.parameters;
                let parameters = self.parameters_mut(parameters, name)?;
                parameters.markers = markers;
                parameters.derived = false;
            }
            "CommandType" => {
                let command_type = value
                    .as_i64()
                    .and_then(|v| i32::try_from(v).ok())
                    .ok_or_else(|| dispatch(HResultKind::DISP_E_TYPEMISMATCH, name))?;
                self.command_mut(handle, name)?.command_type = command_type;
            }
            "Prepared" => {
                let prepared = value
                    .as_i64()
                    .ok_or_else(|| dispatch(HResultKind::DISP_E_TYPEMISMATCH, name))?;
                self.command_mut(handle, name)?.prepared = prepared != 0;
            }
            _ => return Err(dispatch(HResultKind::DISP_E_UNKNOWNNAME, name)),
        }
        Ok(())
    }

    /// Rebuild one unnamed input slot per `?` marker of the command text.
    fn derive_parameters(&mut self, handle: Handle, member: &str) -> AutomationResult<()> {
        let parameters = self.parameters_mut(handle, member)?;
        let markers = parameters.markers;
        let stale = std::mem::take(&mut parameters.items);
        parameters.derived = true;
        for item in stale {
            self.release(item);
        }
        let mut items = Vec::with_capacity(markers);
        for index in 0..markers {
            items.push(self.alloc(Object::Parameter(ParameterObject {
                name: format!("Param{}", index + 1),
                ad_type: 12,
                direction: 1,
                value: Variant::Empty,
            })));
        }
        self.parameters_mut(handle, member)?.items = items;
        Ok(())
    }

    fn derive_lazily(&mut self, handle: Handle, member: &str) -> AutomationResult<()> {
        let parameters = self.parameters_mut(handle, member)?;
        if !parameters.derived && parameters.items.is_empty() {
            self.derive_parameters(handle, member)?;
        }
        Ok(())
    }

    fn find_parameter(&mut self, handle: Handle, key: &Key, member: &str) -> AutomationResult<usize> {
        let items = self.parameters_mut(handle, member)?.items.clone();
        let position = match key {
            Key::Index(index) => Some(*index).filter(|i| *i < items.len()),
            Key::Name(name) => {
                let mut found = None;
                for (position, item) in items.iter().enumerate() {
                    if self.parameter_mut(*item, member)?.name == *name {
                        found = Some(position);
                        break;
                    }
                }
                found
            }
        };
        position.ok_or_else(|| dispatch(HResultKind::AD_E_ITEM_NOT_FOUND, member))
    }

    fn parameters_call(&mut self, handle: Handle, method: &str, args: &[Variant]) -> AutomationResult<Variant> {
        match method {
            "Refresh" => self.derive_parameters(handle, method)?,
            "Item" => {
                self.derive_lazily(handle, method)?;
                let key = key_arg(args, method)?;
                let position = self.find_parameter(handle, &key, method)?;
                let item = self.parameters_mut(handle, method)?.items[position];
                self.add_ref(item);
                return Ok(Variant::Dispatch(item));
            }
            "Append" => {
                let item = args
                    .first()
                    .and_then(Variant::object)
                    .ok_or_else(|| dispatch(HResultKind::DISP_E_TYPEMISMATCH, method))?;
                self.parameter_mut(item, method)?;
                self.add_ref(item);
                self.parameters_mut(handle, method)?.items.push(item);
            }
            "Delete" => {
                let key = key_arg(args, method)?;
                let position = self.find_parameter(handle, &key, method)?;
                let item = self.parameters_mut(handle, method)?.items.remove(position);
                self.release(item);
            }
            _ => return Err(dispatch(HResultKind::DISP_E_MEMBERNOTFOUND, method)),
        }
        Ok(Variant::Empty)
    }

    fn parameters_get(&mut self, handle: Handle, name: &str) -> AutomationResult<Variant> {
        match name {
            "Count" => {
                self.derive_lazily(handle, name)?;
                let count = self.parameters_mut(handle, name)?.items.len();
                Ok(Variant::I4(i32::try_from(count).unwrap_or(i32::MAX)))
            }
            _ => Err(dispatch(HResultKind::DISP_E_UNKNOWNNAME, name)),
        }
    }

    fn parameter_get(&mut self, handle: Handle, name: &str) -> AutomationResult<Variant> {
        let parameter = self.parameter_mut(handle, name)?;
        match name {
            "Name" => Ok(Variant::BStr(parameter.name.clone())),
            "Value" => Ok(parameter.value.clone()),
            "Type" => Ok(Variant::I4(parameter.ad_type)),
            "Direction" => Ok(Variant::I4(parameter.direction)),
            _ => Err(dispatch(HResultKind::DISP_E_UNKNOWNNAME, name)),
        }
    }

    fn parameter_set(&mut self, handle: Handle, name: &str, value: Variant) -> AutomationResult<()> {
        let parameter = self.parameter_mut(handle, name)?;
        match name {
            "Value" => parameter.value = value,
            "Name" => {
                parameter.name = value
                    .to_text()
                    .ok_or_else(|| dispatch(HResultKind::DISP_E_TYPEMISMATCH, name))?
            }
            _ => return Err(dispatch(HResultKind::DISP_E_UNKNOWNNAME, name)),
        }
        Ok(())
    }

    fn recordset_call(&mut self, handle: Handle, method: &str) -> AutomationResult<Variant> {
        match method {
            "MoveNext" => {
                let rs = self.open_recordset_mut(handle, method)?;
                if rs.eof() {
                    return Err(dispatch(HResultKind::AD_E_NO_CURRENT_RECORD, method));
                }
                rs.position += 1;
            }
            "Close" => {
                self.open_recordset_mut(handle, method)?.open = false;
            }
            _ => return Err(dispatch(HResultKind::DISP_E_MEMBERNOTFOUND, method)),
        }
        Ok(Variant::Empty)
    }

    fn recordset_get(&mut self, handle: Handle, name: &str) -> AutomationResult<Variant> {
        if name == "State" {
            return match self.object_mut(handle, name)? {
                Object::Recordset(rs) => Ok(Variant::I4(if rs.open {
                    AD_STATE_OPEN
                } else {
                    AD_STATE_CLOSED
                })),
                _ => Err(dispatch(HResultKind::DISP_E_TYPEMISMATCH, name)),
            };
        }
        let rs = self.open_recordset_mut(handle, name)?;
        match name {
            "EOF" => Ok(Variant::Bool(rs.eof())),
            "BOF" => Ok(Variant::Bool(rs.table.rows.is_empty())),
            "Fields" => {
                self.add_ref(handle);
                Ok(Variant::Dispatch(self.alloc(Object::Fields { recordset: handle })))
            }
            _ => Err(dispatch(HResultKind::DISP_E_UNKNOWNNAME, name)),
        }
    }

    fn fields_call(&mut self, recordset: Handle, method: &str, args: &[Variant]) -> AutomationResult<Variant> {
        if method != "Item" {
            return Err(dispatch(HResultKind::DISP_E_MEMBERNOTFOUND, method));
        }
        let key = key_arg(args, method)?;
        let columns = &self.open_recordset_mut(recordset, method)?.table.columns;
        let column = match key {
            Key::Index(index) => Some(index).filter(|i| *i < columns.len()),
            Key::Name(name) => columns.iter().position(|c| c.name == name),
        }
        .ok_or_else(|| dispatch(HResultKind::AD_E_ITEM_NOT_FOUND, method))?;
        self.add_ref(recordset);
        Ok(Variant::Dispatch(
            self.alloc(Object::Field { recordset, column }),
        ))
    }

    fn fields_get(&mut self, recordset: Handle, name: &str) -> AutomationResult<Variant> {
        let rs = self.open_recordset_mut(recordset, name)?;
        match name {
            "Count" => Ok(Variant::I4(
                i32::try_from(rs.table.columns.len()).unwrap_or(i32::MAX),
            )),
            _ => Err(dispatch(HResultKind::DISP_E_UNKNOWNNAME, name)),
        }
    }

    fn field_get(&mut self, recordset: Handle, column: usize, name: &str) -> AutomationResult<Variant> {
        let rs = self.open_recordset_mut(recordset, name)?;
        let fixture = rs
            .table
            .columns
            .get(column)
            .ok_or_else(|| dispatch(HResultKind::AD_E_ITEM_NOT_FOUND, name))?;
        match name {
            "Name" => Ok(Variant::BStr(fixture.name.clone())),
            "Type" => Ok(Variant::I4(fixture.ad_type)),
            "NumericScale" => Ok(Variant::UI1(u8::try_from(fixture.scale).unwrap_or(0))),
            "Value" => {
                if rs.eof() {
                    return Err(dispatch(HResultKind::AD_E_NO_CURRENT_RECORD, name));
                }
                Ok(rs.table.rows[rs.position]
                    .get(column)
                    .cloned()
                    .unwrap_or(Variant::Null))
            }
            _ => Err(dispatch(HResultKind::DISP_E_UNKNOWNNAME, name)),
        }
    }
}
