//! Navigation contract for unauthenticated mutation attempts.
//!
//! When a toggle arrives with no identity, the engine does not error; it
//! redirects the caller to the authentication entry point and reports the
//! toggle as not applied. The sink decides what a redirect means.

/// A sink invoked when a mutation is attempted without an identity.
pub trait NavigationSink: Send + Sync {
    /// Navigate the caller to the authentication entry point.
    ///
    /// No return value is expected; the engine fires this at most once per
    /// unauthenticated toggle.
    fn redirect_to_login(&self);
}

/// A no-op sink that ignores redirects.
#[derive(Debug, Default)]
pub struct NullNavigation;

impl NavigationSink for NullNavigation {
    fn redirect_to_login(&self) {
        // Intentionally empty - discard the redirect
    }
}

/// A sink that counts redirects for testing.
#[derive(Debug, Default)]
pub struct RecordingNavigation {
    redirects: std::sync::atomic::AtomicUsize,
}

impl RecordingNavigation {
    /// Creates a new recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of redirects fired so far.
    pub fn redirect_count(&self) -> usize {
        self.redirects.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl NavigationSink for RecordingNavigation {
    fn redirect_to_login(&self) {
        self.redirects
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}
