//! Logger setup.
//!
//! The crate itself only talks to the [`log`] facade. Applications that don't
//! bring their own logger can call [`init`] to get timestamped output on stderr.

use log::LevelFilter;

use crate::error::Result;

/// Installs a global stderr logger at the given level.
///
/// Fails if a logger has already been installed.
pub fn init(level: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}
