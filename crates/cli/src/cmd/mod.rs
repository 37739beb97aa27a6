mod audit;
mod fetch;
mod filename;
mod platform;

pub use audit::{AuditArgs, cmd_audit};
pub use fetch::{FetchArgs, cmd_fetch};
pub use filename::cmd_filename;
pub use platform::cmd_platform;
