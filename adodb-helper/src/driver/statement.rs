use crate::automation::{Automation, AutomationResult, Handle, Scoped, Variant};
use crate::driver::{item_index, AdodbConnection, AdodbRowSet, BindNamePolicy};
use crate::error::{AdodbError, AdodbResult};
use crate::executor::execute::ExecResult;
use crate::types::Value;
use crate::TryConvert;

/// `CommandTypeEnum::adCmdText`
const AD_CMD_TEXT: i32 = 1;
/// `DataTypeEnum::adVariant`
const AD_VARIANT: i32 = 12;
/// `ParameterDirectionEnum::adParamInput`
const AD_PARAM_INPUT: i32 = 1;

/// A prepared `ADODB.Command` and its parameter collection.
///
/// Arguments bind positionally into the slots the provider derived for the
/// command text, unless names were given with [`AdodbStatement::bind`]; then
/// every execution creates and appends its own parameters.
#[derive(Debug)]
pub struct AdodbStatement<'c> {
    conn: &'c AdodbConnection,
    command: Option<Handle>,
    parameters: Handle,
    binds: Vec<String>,
}

impl<'c> AdodbStatement<'c> {
    pub(crate) fn prepare(conn: &'c AdodbConnection, sql: &str) -> AdodbResult<Self> {
        let active = conn.handle()?;
        let host = conn.host();
        let command = host
            .create_object(&conn.options().command_class)
            .map_err(AdodbError::PrepareError)?;

        let parameters = Self::configure(host, command, active, sql).map_err(|e| {
            host.release(command);
            AdodbError::PrepareError(e)
        })?;
        debug!("command {} prepared: {}", command, sql);

        Ok(Self {
            conn,
            command: Some(command),
            parameters,
            binds: vec![],
        })
    }

    fn configure(
        host: &dyn Automation,
        command: Handle,
        conn: Handle,
        sql: &str,
    ) -> AutomationResult<Handle> {
        host.set_property(command, "ActiveConnection", Variant::Dispatch(conn))?;
        host.set_property(command, "CommandText", Variant::from(sql))?;
        host.set_property(command, "CommandType", Variant::I4(AD_CMD_TEXT))?;
        host.set_property(command, "Prepared", Variant::Bool(true))?;
        host.get_object(command, "Parameters")
    }

    /// Switch to explicit binding with `names`; an empty list switches back
    /// to positional binding.
    pub fn bind<S: Into<String>>(&mut self, names: impl IntoIterator<Item = S>) {
        self.binds = names.into_iter().map(Into::into).collect();
    }

    pub fn binds(&self) -> &[String] {
        &self.binds
    }

    /// Number of input parameters, `None` when the provider cannot tell.
    pub fn num_input(&self) -> Option<usize> {
        if !self.binds.is_empty() {
            return Some(self.binds.len());
        }
        let host = self.conn.host();
        let count = host
            .invoke(self.parameters, "Refresh", &[])
            .and_then(|_| host.get_property(self.parameters, "Count"));
        match count {
            Ok(count) => count.as_i64().and_then(|c| usize::try_from(c).ok()),
            Err(e) => {
                debug!("command parameter count unknown:{}", e);
                None
            }
        }
    }

    pub fn exec(&self, args: &[Value]) -> AdodbResult<ExecResult> {
        let command = self.command()?;
        self.bind_args(args)?;
        let host = self.conn.host();
        let result = host.invoke(command, "Execute", &[])?;
        if let Some(recordset) = result.object() {
            host.release(recordset);
        }
        debug!("command {} executed with {} args", command, args.len());
        Ok(ExecResult::default())
    }

    pub fn query(&self, args: &[Value]) -> AdodbResult<AdodbRowSet<'c>> {
        let command = self.command()?;
        self.bind_args(args)?;
        let recordset = self.conn.host().invoke_object(command, "Execute", &[])?;
        debug!("command {} opened recordset {}", command, recordset);
        Ok(AdodbRowSet::new(self.conn, recordset))
    }

    pub fn close(mut self) -> AdodbResult<()> {
        self.release();
        Ok(())
    }

    fn command(&self) -> AdodbResult<Handle> {
        self.command.ok_or(AdodbError::Closed("statement"))
    }

    fn release(&mut self) {
        if let Some(command) = self.command.take() {
            let host = self.conn.host();
            host.release(self.parameters);
            host.release(command);
        }
    }

    fn bind_args(&self, args: &[Value]) -> AdodbResult<()> {
        let host = self.conn.host();
        if self.binds.is_empty() {
            for (index, arg) in args.iter().enumerate() {
                let value: Variant = arg.try_convert()?;
                let item = host.invoke_object(self.parameters, "Item", &[item_index(index)?])?;
                let item = Scoped::new(host, item);
                host.set_property(item.handle(), "Value", value)?;
            }
            return Ok(());
        }

        self.clear_parameters()?;
        let command = self.command()?;
        for (index, arg) in args.iter().enumerate() {
            let value: Variant = arg.try_convert()?;
            let name = self.parameter_name(index);
            let parameter = host.invoke_object(
                command,
                "CreateParameter",
                &[
                    Variant::from(name),
                    Variant::I4(AD_VARIANT),
                    Variant::I4(AD_PARAM_INPUT),
                ],
            )?;
            let parameter = Scoped::new(host, parameter);
            host.set_property(parameter.handle(), "Value", value)?;
            host.invoke(
                self.parameters,
                "Append",
                &[Variant::Dispatch(parameter.handle())],
            )?;
        }
        Ok(())
    }

    fn parameter_name(&self, index: usize) -> &str {
        let options = self.conn.options();
        match options.bind_names {
            BindNamePolicy::ByIndex => self
                .binds
                .get(index)
                .map(String::as_str)
                .unwrap_or(&options.placeholder),
            BindNamePolicy::Placeholder => &options.placeholder,
        }
    }

    /// Remove parameters appended by an earlier explicit bind.
    fn clear_parameters(&self) -> AdodbResult<()> {
        let host = self.conn.host();
        let count = host
            .get_property(self.parameters, "Count")?
            .as_i64()
            .unwrap_or(0);
        for _ in 0..count {
            host.invoke(self.parameters, "Delete", &[Variant::I4(0)])?;
        }
        Ok(())
    }
}

impl Drop for AdodbStatement<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
