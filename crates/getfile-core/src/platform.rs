//! Process-wide socket subsystem setup and teardown.
//!
//! The standard library starts WinSock on first use, so there is nothing to
//! call here; the guard only scopes the subsystem's lifetime to the run.

/// Live socket subsystem. Dropping it is the teardown.
#[derive(Debug)]
pub struct SocketSubsystem {
    _private: (),
}

impl SocketSubsystem {
    pub fn startup() -> Self {
        tracing::debug!("socket subsystem up ({})", Self::platform_name());
        Self { _private: () }
    }

    /// Whether the platform has an explicit socket library initialization step.
    pub fn requires_explicit_init() -> bool {
        cfg!(windows)
    }

    pub fn platform_name() -> &'static str {
        if cfg!(windows) {
            "Windows"
        } else {
            "Unix"
        }
    }

    /// Line shown for the first diagnostic step.
    pub fn startup_message() -> &'static str {
        if Self::requires_explicit_init() {
            "Initializing WinSock (WSAStartup)..."
        } else {
            "(Unix) No WSAStartup needed."
        }
    }
}

impl Drop for SocketSubsystem {
    fn drop(&mut self) {
        tracing::debug!("socket subsystem down");
    }
}
