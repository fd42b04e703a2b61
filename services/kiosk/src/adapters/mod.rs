pub mod db;
pub mod script_host;

pub use db::DbAdapter;
pub use script_host::LocalScriptHost;
