//! Process-group signalling for spawned tools.
//!
//! A build target usually runs the real tool as a grandchild (`make fmt`
//! forks `gofmt`), so stopping only the direct child leaves the tool
//! running. Every child is spawned as the leader of its own process group
//! and stopped by signalling the whole group.

/// The process group led by one spawned child.
///
/// Dropping an armed group SIGKILLs every member still alive.
#[derive(Debug)]
pub(crate) struct ProcessGroup {
    id: Option<i32>,
}

impl ProcessGroup {
    pub(crate) fn new(leader_pid: Option<u32>) -> Self {
        Self {
            id: leader_pid.and_then(|pid| i32::try_from(pid).ok()),
        }
    }

    /// Ask every member to exit.
    pub(crate) fn terminate(&self) {
        self.signal(Signal::Terminate);
    }

    pub(crate) fn kill(&self) {
        self.signal(Signal::Kill);
    }

    /// Forget the group so dropping it sends nothing.
    pub(crate) fn disarm(mut self) {
        self.id = None;
    }

    #[cfg(unix)]
    fn signal(&self, signal: Signal) {
        let Some(id) = self.id else {
            return;
        };
        let sig = match signal {
            Signal::Terminate => libc::SIGTERM,
            Signal::Kill => libc::SIGKILL,
        };
        // SAFETY: killpg only sends a signal; an empty group yields ESRCH.
        let result = unsafe { libc::killpg(id, sig) };
        if result != 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::ESRCH) {
                tracing::debug!(pgid = id, ?signal, error = %err, "Failed to signal process group");
            }
        }
    }

    #[cfg(not(unix))]
    fn signal(&self, _signal: Signal) {}
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Terminate,
    Kill,
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_group_is_ignored() {
        // No process has this id, so both signals see ESRCH.
        let group = ProcessGroup::new(Some(i32::MAX as u32));
        group.terminate();
        group.kill();
        group.disarm();
    }

    #[test]
    fn test_unknown_leader_sends_nothing() {
        let group = ProcessGroup::new(None);
        assert!(group.id.is_none());
        group.kill();
    }
}
