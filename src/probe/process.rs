use tracing::debug;

use super::ProbeOutcome;

/// Process liveness checking is not implemented; the check reports alive
/// unconditionally.
// TODO: look the path up in the process table via sysinfo.
pub fn check(path: &str) -> ProbeOutcome {
    debug!(path, "Process check is a stub; reporting alive.");
    ProbeOutcome::up()
}
