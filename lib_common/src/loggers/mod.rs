/// Log record type and level constants.
pub mod logrecord;
/// Leveled logger with colored terminal output and rotated file output.
pub mod loggerlocal;

pub use loggerlocal::{default_log_dir, LoggerLocal, LoggerLocalOptions};
pub use logrecord::{level, Logrecord};
