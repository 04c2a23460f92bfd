/*!
 * Logging setup for the marktree CLI
 */

use std::io::Write;

use env_logger::{Builder, Env};
use log::Level;

/// Environment variable overriding the log filter
pub const LOG_ENV: &str = "MARKTREE_LOG";

/// Filter level for a `-v` count
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    }
}

/// Initialise env_logger on stderr
pub fn setup_logger(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let env = Env::default().filter_or(LOG_ENV, level_for(verbosity));

    Builder::from_env(env)
        .format(|buf, record| {
            let color = match record.level() {
                Level::Error => "31",
                Level::Warn => "33",
                Level::Info => "32",
                Level::Debug => "36",
                Level::Trace => "35",
            };
            writeln!(
                buf,
                "\x1B[{}m[{}]\x1B[0m [{}] {}",
                color,
                record.level(),
                buf.timestamp(),
                record.args()
            )
        })
        .format_timestamp_secs()
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(0), "error");
        assert_eq!(level_for(2), "info");
        assert_eq!(level_for(9), "debug");
    }

    #[test]
    fn test_setup_logger_twice_fails_gracefully() {
        let _ = setup_logger(0);
        assert!(setup_logger(0).is_err());
    }
}
