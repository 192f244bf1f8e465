mod config;
mod result;
mod table;
pub mod user_ref;

pub use config::Credentials;
pub use result::{Error, Result};
pub use table::{Row, RowExt, Table};
pub use user_ref::{normalize_login, UserRef, UNKNOWN_LOGIN};
