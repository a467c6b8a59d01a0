//! Fatal escalation support: debugger anchor and child-process teardown.

/// Replacement for the terminal action of a fatal report.
///
/// Production builds leave this unset and the routing pipeline ends the
/// process with [`std::process::abort`]; test harnesses install a hook to
/// observe the fatal path without dying. A hook that returns hands control
/// back to the routing call, which then returns normally. Shared ownership
/// lets the pipeline invoke the hook without holding its own registration
/// lock, so a hook may legally log again.
pub type FatalHook = std::sync::Arc<dyn Fn() + Send + Sync>;

/// Debugger anchor invoked for every Error- and Fatal-severity event.
///
/// The function body is deliberately empty: attach a breakpoint to the
/// `logfan_bp` symbol to stop on escalated reports. Without a debugger the
/// call is a no-op and never raises.
#[unsafe(no_mangle)]
pub extern "C" fn logfan_bp() {}

/// Sends SIGTERM to every tracked child process before the process aborts.
///
/// Best-effort: a pid that already exited or was never spawnable is skipped
/// silently, and the subsequent abort proceeds regardless.
#[cfg(unix)]
pub(crate) fn terminate_children(pids: &[u32]) {
    for &pid in pids {
        if let Ok(pid) = libc::pid_t::try_from(pid) {
            // SAFETY: kill with a valid signal number has no memory effects;
            // stale pids fail with ESRCH which is ignored.
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

#[cfg(not(unix))]
pub(crate) fn terminate_children(_pids: &[u32]) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_anchor_is_callable() {
        logfan_bp();
    }

    #[test]
    fn terminating_no_children_is_a_no_op() {
        terminate_children(&[]);
    }
}
