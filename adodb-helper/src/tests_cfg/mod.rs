use crate::automation::memory::{ColumnFixture, MemoryHost, MemorySource, TableFixture};
use crate::automation::{Context, SafeArray, Variant};
use crate::driver::{AdodbConnection, AdodbDriver, Options};
use once_cell::sync::Lazy;
use std::rc::Rc;

pub const DSN: &str = "Provider=Memory;Data Source=fixtures";

pub const WIDGETS: &str = "select id, name, price from widgets";
pub const WIDGET_BY_ID: &str = "select id, name from widgets where id = ?";
pub const TYPED: &str = "select * from typed";

static SOURCE: Lazy<MemorySource> = Lazy::new(|| {
    MemorySource::new()
        .table(
            WIDGETS,
            TableFixture::new(vec![
                ColumnFixture::new("id", 3),
                ColumnFixture::new("name", 202),
                ColumnFixture::new("price", 6),
            ])
            .row(vec![Variant::I4(1), "gear".into(), Variant::Currency(125_000)])
            .row(vec![Variant::I4(2), Variant::Null, Variant::Currency(9_900)]),
        )
        .table(
            WIDGET_BY_ID,
            TableFixture::new(vec![ColumnFixture::new("id", 3), ColumnFixture::new("name", 202)])
                .row(vec![Variant::I4(2), "cog".into()]),
        )
        .table(TYPED, typed_table())
});

fn typed_table() -> TableFixture {
    let columns = vec![
        ColumnFixture::new("small", 2),
        ColumnFixture::new("single", 4),
        ColumnFixture::new("price", 6),
        ColumnFixture::new("ratio", 131).scale(5),
        ColumnFixture::new("flag", 11),
        ColumnFixture::new("tiny", 16),
        ColumnFixture::new("big", 20),
        ColumnFixture::new("blob", 128),
        ColumnFixture::new("label", 202),
        ColumnFixture::new("missing", 3),
        ColumnFixture::new("created", 7),
        ColumnFixture::new("error", 10),
        ColumnFixture::new("ubig", 21),
        ColumnFixture::new("varbin", 204),
    ];
    let row = vec![
        Variant::I2(-2),
        Variant::R4(1.5),
        Variant::Currency(123_456),
        Variant::Decimal(314_159),
        Variant::Bool(true),
        Variant::I1(-1),
        Variant::I8(-5),
        Variant::Array(SafeArray::new(vec![0xDEu8, 0xAD, 0xBE])),
        "hello".into(),
        Variant::Null,
        Variant::Date(44_562.0),
        Variant::Error(5),
        Variant::UI8(1),
        Variant::Array(SafeArray::new(vec![1u8, 2])),
    ];
    TableFixture::new(columns).row(row)
}

/// A fresh host serving the shared fixtures.
pub fn host() -> MemoryHost {
    MemoryHost::new().with_source(DSN, SOURCE.clone())
}

/// Open the fixture source on a fresh host, keeping a handle on the host for
/// assertions.
pub fn open(options: Options) -> (Rc<MemoryHost>, AdodbConnection) {
    let host = Rc::new(host());
    let driver = AdodbDriver::new(options);
    let conn = driver
        .open(Context::from_shared(host.clone()), DSN)
        .unwrap();
    (host, conn)
}
