use crate::automation::{Automation, Context, Handle, Variant};
use crate::driver::{AdodbStatement, Options};
use crate::error::{AdodbError, AdodbResult};
use crate::executor::execute::ExecResult;

/// An open `ADODB.Connection`.
///
/// Owns the automation context it was opened with: closing the connection
/// closes the remote object, releases it and uninitializes the context.
#[derive(Debug)]
pub struct AdodbConnection {
    ctx: Context,
    conn: Option<Handle>,
    options: Options,
}

impl AdodbConnection {
    pub(crate) fn open(ctx: Context, dsn: &str, options: Options) -> AdodbResult<Self> {
        let host = ctx.host();
        host.initialize().map_err(AdodbError::ConnectionError)?;

        let conn = match host.create_object(&options.connection_class) {
            Ok(conn) => conn,
            Err(e) => {
                host.uninitialize();
                return Err(AdodbError::ConnectionError(e));
            }
        };
        if let Err(e) = host.invoke(conn, "Open", &[Variant::from(dsn)]) {
            host.release(conn);
            host.uninitialize();
            return Err(AdodbError::ConnectionError(e));
        }
        debug!("connection {} opened", conn);

        Ok(Self {
            ctx,
            conn: Some(conn),
            options,
        })
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub(crate) fn host(&self) -> &dyn Automation {
        self.ctx.host()
    }

    pub(crate) fn handle(&self) -> AdodbResult<Handle> {
        self.conn.ok_or(AdodbError::Closed("connection"))
    }

    /// Start a transaction. Only one may be outstanding; a second `begin`
    /// fails with whatever the provider reports.
    pub fn begin(&self) -> AdodbResult<AdodbTransaction<'_>> {
        let conn = self.handle()?;
        self.host().invoke(conn, "BeginTrans", &[])?;
        debug!("connection {} begin transaction", conn);
        Ok(AdodbTransaction { conn: self })
    }

    pub fn prepare(&self, sql: &str) -> AdodbResult<AdodbStatement<'_>> {
        AdodbStatement::prepare(self, sql)
    }

    /// Run command text on the connection itself, without preparing it.
    pub fn execute_direct(&self, sql: &str) -> AdodbResult<ExecResult> {
        let conn = self.handle()?;
        let host = self.host();
        let result = host.invoke(conn, "Execute", &[Variant::from(sql)])?;
        if let Some(recordset) = result.object() {
            host.release(recordset);
        }
        debug!("connection {} executed: {}", conn, sql);
        Ok(ExecResult::default())
    }

    pub fn close(mut self) -> AdodbResult<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> AdodbResult<()> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => return Ok(()),
        };
        let host = self.ctx.host();
        let closed = host.invoke(conn, "Close", &[]);
        host.release(conn);
        host.uninitialize();
        debug!("connection {} closed", conn);
        closed?;
        Ok(())
    }
}

impl Drop for AdodbConnection {
    fn drop(&mut self) {
        if self.conn.is_some() {
            if let Err(e) = self.shutdown() {
                warn!("close connection on drop error:{}", e);
            }
        }
    }
}

/// A begun transaction. Commit and rollback are terminal.
#[derive(Debug)]
pub struct AdodbTransaction<'c> {
    conn: &'c AdodbConnection,
}

impl AdodbTransaction<'_> {
    pub fn commit(self) -> AdodbResult<()> {
        self.finish("CommitTrans")
    }

    pub fn rollback(self) -> AdodbResult<()> {
        self.finish("Rollback")
    }

    fn finish(&self, method: &str) -> AdodbResult<()> {
        let conn = self.conn.handle()?;
        self.conn.host().invoke(conn, method, &[])?;
        debug!("connection {} {}", conn, method);
        Ok(())
    }
}
