pub mod database;
pub mod execute;
pub mod query;
pub mod statement;
