//! Ambient configuration loading (spec.md §6.1; SPEC_FULL.md §B).
//!
//! Conductor takes config as plain structs the caller builds and passes
//! in; there is no config-file format. The one piece of ambient wiring
//! this crate owns is loading process environment variables from a
//! `.env` file before anything reads them, the same way the teacher's
//! binaries do at startup.

/// Loads a `.env` file into the process environment if one is present.
/// Safe to call multiple times; missing file is not an error.
pub fn dotenv_init() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound) {
            tracing::debug!(target: "conductor::config", %err, "dotenv load skipped");
        }
    }
}
