//! Serial endpoint resolution.
//!
//! Selection policy is deliberately simple and reproducible: the first
//! endpoint in enumeration order wins. Early revisions of the bench scripts
//! picked a port "whichever came back first from the OS", which made runs
//! non-reproducible across hosts; fixing the tie-break to first-discovered
//! makes the choice deterministic for a given enumeration.
//!
//! [`resolve`] is pure selection over a candidate list; opening the chosen
//! endpoint is the caller's responsibility.

use dastest_core::error::{Error, Result};

/// Enumerate serial endpoints currently present on this host.
///
/// Returns endpoint paths in the order the OS reports them, which is the
/// order [`resolve`] ties-breaks on.
pub fn available_endpoints() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports()
        .map_err(|e| Error::Transport(format!("failed to enumerate serial ports: {e}")))?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

/// Select one endpoint from an ordered candidate list.
///
/// The first candidate wins. Fails with [`Error::NoPortAvailable`] when the
/// list is empty; this is a configuration error, fatal before any device
/// I/O.
pub fn resolve(candidates: &[String]) -> Result<&str> {
    candidates
        .first()
        .map(String::as_str)
        .ok_or(Error::NoPortAvailable)
}
