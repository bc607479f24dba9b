#[macro_use]
extern crate log;

use adodb_common::Print;
use adodb_helper::automation::memory::{MemoryHost, MemorySource};
use adodb_helper::executor::database::ConnectionTrait;
use adodb_helper::executor::statement::Statement;
use adodb_helper::{AdodbDriver, Context, Options, Value};
use anyhow::Context as _;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;

/// Replay a statement against a captured data source
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path of the JSON config
    #[arg(short, long)]
    path: String,
    /// Execute the statement instead of printing its rows
    #[arg(short, long)]
    exec: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnvConfig {
    connection: String,
    sql: String,
    #[serde(default)]
    binds: Vec<String>,
    #[serde(default)]
    args: Vec<serde_json::Value>,
    #[serde(default)]
    options: Options,
    source: MemorySource,
}

fn to_value(arg: &serde_json::Value) -> anyhow::Result<Value> {
    use serde_json::Value as Json;
    Ok(match arg {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(
                n.as_f64()
                    .with_context(|| format!("number `{}` out of range", n))?,
            ),
        },
        Json::String(s) => Value::Text(s.clone()),
        other => anyhow::bail!("unsupported argument `{}`", other),
    })
}

fn main() -> anyhow::Result<()> {
    simple_log::quick!();

    let args = Args::parse();
    let json = fs::read_to_string(&args.path).with_context(|| format!("read {}", args.path))?;
    let config: EnvConfig = serde_json::from_str(&json)?;
    debug!("config:{:?}", config);

    let values = config
        .args
        .iter()
        .map(to_value)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let host = MemoryHost::new().with_source(config.connection.clone(), config.source);
    let driver = AdodbDriver::new(config.options);
    let connection = driver.open(Context::new(host), &config.connection)?;

    let stmt = Statement::new(config.sql, values).binds(config.binds);
    if args.exec {
        (&connection).execute(stmt)?;
        println!("ok");
    } else {
        let result = (&connection).query(stmt)?;
        println!("{}", result.table_string()?);
    }
    connection.close()?;
    Ok(())
}
