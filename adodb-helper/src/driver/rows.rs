use crate::automation::{Handle, Scoped, Variant};
use crate::driver::{item_index, AdodbConnection, ColumnCache, UnsupportedPolicy};
use crate::error::{AdodbError, AdodbResult};
use crate::types::{decode, DecodeError, Value};
use adodb_common::error::AdodbStdError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Positioned,
    Eof,
    Closed,
}

/// Forward-only cursor over an `ADODB.Recordset`.
#[derive(Debug)]
pub struct AdodbRowSet<'c> {
    conn: &'c AdodbConnection,
    recordset: Option<Handle>,
    state: CursorState,
    cached_count: Option<usize>,
    columns: Vec<String>,
}

fn count_of(value: Variant) -> AdodbResult<usize> {
    let count = value.as_i64().ok_or_else(|| {
        AdodbStdError::TypeConversionError(format!("count, got {:?}", value))
    })?;
    Ok(usize::try_from(count).map_err(AdodbStdError::from)?)
}

/// Decode `value` by the code read from a field's `Type` property.
fn decode_field(code: &Variant, value: &Variant, scale: i32) -> Result<Value, DecodeError> {
    match code.as_i64() {
        Some(code) => decode(code, value, scale),
        None => Err(DecodeError::InvalidTypeCode { vt: code.vt() }),
    }
}

impl<'c> AdodbRowSet<'c> {
    pub(crate) fn new(conn: &'c AdodbConnection, recordset: Handle) -> Self {
        Self {
            conn,
            recordset: Some(recordset),
            state: CursorState::Positioned,
            cached_count: None,
            columns: vec![],
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    fn recordset(&self) -> AdodbResult<Handle> {
        match self.recordset {
            Some(recordset) if self.state != CursorState::Closed => Ok(recordset),
            _ => Err(AdodbError::Closed("row set")),
        }
    }

    /// Column names in field order.
    pub fn columns(&mut self) -> AdodbResult<&[String]> {
        let recordset = self.recordset()?;
        let conn = self.conn;
        let host = conn.host();

        let fields = Scoped::new(host, host.get_object(recordset, "Fields")?);
        let count = count_of(host.get_property(fields.handle(), "Count")?)?;
        let stale = match conn.options().column_cache {
            ColumnCache::ByCount => self.cached_count != Some(count),
            ColumnCache::Always => true,
        };
        if stale {
            let mut columns = Vec::with_capacity(count);
            for index in 0..count {
                let field = host.invoke_object(fields.handle(), "Item", &[item_index(index)?])?;
                let field = Scoped::new(host, field);
                let name = host.get_property(field.handle(), "Name")?;
                columns.push(name.to_text().unwrap_or_default());
            }
            debug!("recordset {} columns:{:?}", recordset, columns);
            self.columns = columns;
            self.cached_count = Some(count);
        }
        Ok(&self.columns)
    }

    /// Decode the current row into `dest` and advance.
    ///
    /// Returns `false` once the recordset is exhausted; every later call does
    /// too, without touching the recordset. Slot `i` is read from field `i`.
    ///
    /// A field that fails to decode is reported only after the rest of the
    /// row has been read and the cursor has advanced, so the following call
    /// moves on to the next row.
    pub fn next(&mut self, dest: &mut [Value]) -> AdodbResult<bool> {
        let recordset = match self.state {
            CursorState::Closed => return Err(AdodbError::Closed("row set")),
            CursorState::Eof => return Ok(false),
            CursorState::Positioned => self.recordset()?,
        };
        let conn = self.conn;
        let host = conn.host();

        if host.get_property(recordset, "EOF")?.raw() != 0 {
            debug!("recordset {} reached EOF", recordset);
            self.state = CursorState::Eof;
            return Ok(false);
        }

        let mut failed = None;
        let fields = Scoped::new(host, host.get_object(recordset, "Fields")?);
        for (column, slot) in dest.iter_mut().enumerate() {
            let field = host.invoke_object(fields.handle(), "Item", &[item_index(column)?])?;
            let field = Scoped::new(host, field);
            let code = host.get_property(field.handle(), "Type")?;
            let value = host.get_property(field.handle(), "Value")?;
            let scale = host.get_property(field.handle(), "NumericScale")?;
            if value.is_null() {
                *slot = Value::Null;
                continue;
            }

            let scale = scale
                .as_i64()
                .and_then(|s| i32::try_from(s).ok())
                .unwrap_or(0);
            match decode_field(&code, &value, scale) {
                Ok(decoded) => *slot = decoded,
                Err(DecodeError::Unsupported { code })
                    if conn.options().unsupported == UnsupportedPolicy::Skip =>
                {
                    warn!(
                        "recordset {} column {} has unsupported type code {}, left unchanged",
                        recordset, column, code
                    );
                }
                Err(source) => {
                    if failed.is_none() {
                        failed = Some(AdodbError::Decode { column, source });
                    }
                }
            }
        }

        host.invoke(recordset, "MoveNext", &[])?;
        match failed {
            Some(e) => Err(e),
            None => Ok(true),
        }
    }

    /// The next row sized to the current columns, `None` at the end.
    pub fn fetch(&mut self) -> AdodbResult<Option<Vec<Value>>> {
        if self.state == CursorState::Eof {
            return Ok(None);
        }
        let width = self.columns()?.len();
        let mut row = vec![Value::Null; width];
        Ok(if self.next(&mut row)? { Some(row) } else { None })
    }

    /// Close and release the recordset. Later calls fail with
    /// [`AdodbError::Closed`].
    pub fn close(&mut self) -> AdodbResult<()> {
        self.state = CursorState::Closed;
        let recordset = match self.recordset.take() {
            Some(recordset) => recordset,
            None => return Ok(()),
        };
        let host = self.conn.host();
        let closed = host.invoke(recordset, "Close", &[]);
        host.release(recordset);
        debug!("recordset {} closed", recordset);
        closed?;
        Ok(())
    }
}

impl Drop for AdodbRowSet<'_> {
    fn drop(&mut self) {
        if self.recordset.is_some() {
            if let Err(e) = self.close() {
                warn!("close recordset on drop error:{}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::memory::{ColumnFixture, MemoryHost, MemorySource, TableFixture};
    use crate::automation::Context;
    use crate::driver::{AdodbDriver, Options};
    use crate::tests_cfg::{self, DSN, TYPED, WIDGETS, WIDGET_BY_ID};
    use std::rc::Rc;
    use adodb_common::hresult::HResultKind;
    use bytes::Bytes;
    use chrono::NaiveDate;
    use num_bigint::BigInt;

    #[test]
    fn test_widgets() {
        let (host, conn) = tests_cfg::open(Options::default());
        let stmt = conn.prepare(WIDGETS).unwrap();
        let mut rows = stmt.query(&[]).unwrap();

        assert_eq!(rows.columns().unwrap(), &["id", "name", "price"]);
        let mut dest = vec![Value::Null; 3];
        assert!(rows.next(&mut dest).unwrap());
        assert_eq!(dest, vec![Value::Int(1), Value::Text("gear".into()), Value::Float(12.5)]);
        assert!(rows.next(&mut dest).unwrap());
        assert_eq!(dest, vec![Value::Int(2), Value::Null, Value::Float(0.99)]);
        assert_eq!(rows.state(), CursorState::Positioned);

        assert!(!rows.next(&mut dest).unwrap());
        assert_eq!(rows.state(), CursorState::Eof);
        let eof_reads = host.calls("EOF");
        assert!(!rows.next(&mut dest).unwrap());
        assert_eq!(host.calls("EOF"), eof_reads);
        assert_eq!(host.calls("MoveNext"), 2);

        rows.close().unwrap();
        assert_eq!(rows.state(), CursorState::Closed);
        assert!(matches!(rows.next(&mut dest), Err(AdodbError::Closed(_))));
        assert!(matches!(rows.columns(), Err(AdodbError::Closed(_))));
        drop(rows);

        stmt.close().unwrap();
        conn.close().unwrap();
        assert_eq!(host.live_objects(), 0);
        assert_eq!(host.invalid_releases(), 0);
    }

    #[test]
    fn test_columns_cached_by_count() {
        let (host, conn) = tests_cfg::open(Options::default());
        let stmt = conn.prepare(WIDGETS).unwrap();
        let mut rows = stmt.query(&[]).unwrap();

        let first = rows.columns().unwrap().to_vec();
        assert_eq!(host.calls("Name"), 3);
        let second = rows.columns().unwrap().to_vec();
        assert_eq!(first, second);
        assert_eq!(host.calls("Name"), 3);
    }

    #[test]
    fn test_columns_always_reread() {
        let (host, conn) = tests_cfg::open(Options::default().column_cache(ColumnCache::Always));
        let stmt = conn.prepare(WIDGETS).unwrap();
        let mut rows = stmt.query(&[]).unwrap();

        let first = rows.columns().unwrap().to_vec();
        let second = rows.columns().unwrap().to_vec();
        assert_eq!(first, second);
        assert_eq!(host.calls("Name"), 6);
    }

    #[test]
    fn test_query_with_argument() {
        let (host, conn) = tests_cfg::open(Options::default());
        let stmt = conn.prepare(WIDGET_BY_ID).unwrap();
        let mut rows = stmt.query(&[Value::from(2)]).unwrap();
        let row = rows.fetch().unwrap().unwrap();
        assert_eq!(row, vec![Value::Int(2), Value::Text("cog".into())]);
        assert_eq!(rows.fetch().unwrap(), None);
        assert_eq!(
            host.executions()[0].parameters,
            vec![("Param1".to_string(), Variant::I8(2))]
        );
    }

    #[test]
    fn test_typed_row() {
        let (_host, conn) = tests_cfg::open(Options::default().unsupported(UnsupportedPolicy::Skip));
        let stmt = conn.prepare(TYPED).unwrap();
        let mut rows = stmt.query(&[]).unwrap();
        let columns = rows.columns().unwrap().to_vec();
        let mut dest = vec![Value::Text("untouched".into()); columns.len()];
        assert!(rows.next(&mut dest).unwrap());

        let get = |name: &str| dest[columns.iter().position(|c| c == name).unwrap()].clone();
        assert_eq!(get("small"), Value::Int(-2));
        assert_eq!(get("single"), Value::Float(1.5));
        assert_eq!(get("price"), Value::Float(12.3456));
        assert_eq!(get("ratio"), Value::Float(3.14159));
        assert_eq!(get("flag"), Value::Bool(true));
        assert_eq!(get("tiny"), Value::TinyInt(-1));
        assert_eq!(get("big"), Value::BigInt(BigInt::from(-5)));
        assert_eq!(get("blob"), Value::Bytes(Bytes::from_static(&[0xDE, 0xAD, 0xBE])));
        assert_eq!(get("label"), Value::Text("hello".into()));
        assert_eq!(get("missing"), Value::Null);
        match get("created") {
            Value::DateTime(dt) => assert_eq!(
                dt.naive_local(),
                NaiveDate::from_ymd_opt(2022, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
            ),
            other => panic!("expected a date, got {:?}", other),
        }
        // skipped gaps keep whatever the slot held
        assert_eq!(get("error"), Value::Text("untouched".into()));
        assert_eq!(get("ubig"), Value::Text("untouched".into()));
        assert_eq!(get("varbin"), Value::Text("untouched".into()));
    }

    #[test]
    fn test_unsupported_fails_by_default() {
        let (_host, conn) = tests_cfg::open(Options::default());
        let stmt = conn.prepare(TYPED).unwrap();
        let mut rows = stmt.query(&[]).unwrap();
        let width = rows.columns().unwrap().len();
        let mut dest = vec![Value::Null; width];
        let err = rows.next(&mut dest).unwrap_err();
        match err {
            AdodbError::Decode { column, source } => {
                assert_eq!(source, DecodeError::Unsupported { code: 10 });
                assert_eq!(rows.columns().unwrap()[column], "error");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!rows.next(&mut dest).unwrap());
    }

    #[test]
    fn test_decode_error_advances() {
        let source = MemorySource::new().table(
            "select id, status from jobs",
            TableFixture::new(vec![ColumnFixture::new("id", 3), ColumnFixture::new("status", 10)])
                .row(vec![Variant::I4(1), Variant::Error(5)])
                .row(vec![Variant::I4(2), Variant::Error(6)]),
        );
        let host = Rc::new(MemoryHost::new().with_source(DSN, source));
        let conn = AdodbDriver::new(Options::default())
            .open(Context::from_shared(host.clone()), DSN)
            .unwrap();
        let stmt = conn.prepare("select id, status from jobs").unwrap();
        let mut rows = stmt.query(&[]).unwrap();
        let mut dest = vec![Value::Null; 2];

        for id in [1, 2] {
            match rows.next(&mut dest) {
                Err(AdodbError::Decode { column, source }) => {
                    assert_eq!(column, 1);
                    assert_eq!(source, DecodeError::Unsupported { code: 10 });
                }
                other => panic!("unexpected result: {:?}", other),
            }
            assert_eq!(dest[0], Value::Int(id));
            assert_eq!(rows.state(), CursorState::Positioned);
        }
        assert_eq!(host.calls("MoveNext"), 2);

        assert!(!rows.next(&mut dest).unwrap());
        assert_eq!(rows.state(), CursorState::Eof);
    }

    #[test]
    fn test_decode_field_type_code() {
        assert_eq!(
            decode_field(&Variant::I2(3), &Variant::I4(7), 0).unwrap(),
            Value::Int(7)
        );
        assert_eq!(
            decode_field(&Variant::BStr("adInteger".into()), &Variant::I4(7), 0).unwrap_err(),
            DecodeError::InvalidTypeCode { vt: 8 }
        );
        assert_eq!(
            decode_field(&Variant::Empty, &Variant::I4(7), 0).unwrap_err(),
            DecodeError::InvalidTypeCode { vt: 0 }
        );
    }

    #[test]
    fn test_next_releases_fields() {
        let (host, conn) = tests_cfg::open(Options::default());
        let stmt = conn.prepare(WIDGETS).unwrap();
        let mut rows = stmt.query(&[]).unwrap();
        // connection, command, parameters, recordset
        assert_eq!(host.live_objects(), 4);
        let mut dest = vec![Value::Null; 3];
        rows.next(&mut dest).unwrap();
        rows.columns().unwrap();
        assert_eq!(host.live_objects(), 4);
    }

    #[test]
    fn test_move_next_failure_propagates() {
        let (host, conn) = tests_cfg::open(Options::default());
        let stmt = conn.prepare(WIDGETS).unwrap();
        let mut rows = stmt.query(&[]).unwrap();
        host.fail_on("MoveNext", HResultKind::E_FAIL);
        let mut dest = vec![Value::Null; 3];
        assert!(matches!(rows.next(&mut dest), Err(AdodbError::AutomationError(_))));

        host.clear_failures();
        host.fail_on("EOF", HResultKind::AD_E_OBJECT_CLOSED);
        assert!(rows.next(&mut dest).is_err());
        assert_eq!(rows.state(), CursorState::Positioned);
    }

    #[test]
    fn test_drop_closes_recordset() {
        let (host, conn) = tests_cfg::open(Options::default());
        let stmt = conn.prepare(WIDGETS).unwrap();
        let rows = stmt.query(&[]).unwrap();
        drop(rows);
        assert_eq!(host.calls("Close"), 1);
        assert_eq!(host.live_objects(), 3);
    }
}
