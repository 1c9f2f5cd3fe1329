//! Client settings and timeout classes.

use std::env;
use std::time::Duration;

/// Default timeout for ordinary API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
/// Timeout for tour generation. The backend runs an AI synthesis step, so
/// this is a different SLA, not an accidental value.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);
/// Timeout for on-demand guide research, the slowest backend operation.
pub const RESEARCH_TIMEOUT: Duration = Duration::from_secs(180);

/// Which timeout SLA a call runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutClass {
    /// Ordinary CRUD-style calls.
    #[default]
    Default,
    /// Tour generation calls.
    Generation,
    /// Guide research calls.
    Research,
}

/// Per-class timeout durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutClasses {
    /// Ordinary calls.
    pub default: Duration,
    /// Tour generation.
    pub generation: Duration,
    /// Guide research.
    pub research: Duration,
}

impl Default for TimeoutClasses {
    fn default() -> Self {
        Self {
            default: DEFAULT_TIMEOUT,
            generation: GENERATION_TIMEOUT,
            research: RESEARCH_TIMEOUT,
        }
    }
}

impl TimeoutClasses {
    /// Duration for a timeout class.
    #[must_use]
    pub fn duration(&self, class: TimeoutClass) -> Duration {
        match class {
            TimeoutClass::Default => self.default,
            TimeoutClass::Generation => self.generation,
            TimeoutClass::Research => self.research,
        }
    }
}

/// Settings for [`crate::Client`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Base URL of the TourCraft backend.
    pub base_url: String,
    /// Timeout class durations.
    pub timeouts: TimeoutClasses,
}

impl ClientSettings {
    /// Settings with default timeouts against the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeouts: TimeoutClasses::default(),
        }
    }

    /// Load settings from the environment.
    ///
    /// `TOURCRAFT_API_URL` is required; `TOURCRAFT_TIMEOUT_SECS`,
    /// `TOURCRAFT_GENERATION_TIMEOUT_SECS` and
    /// `TOURCRAFT_RESEARCH_TIMEOUT_SECS` optionally override the timeout
    /// classes. This is the only environment-driven behavior the client
    /// carries: the base URL selects between local and deployed backends.
    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("TOURCRAFT_API_URL")
            .map_err(|_| "Missing required env var: TOURCRAFT_API_URL".to_string())?;
        if base_url.trim().is_empty() {
            return Err("TOURCRAFT_API_URL cannot be empty".to_string());
        }

        let mut timeouts = TimeoutClasses::default();
        if let Some(secs) = env_secs("TOURCRAFT_TIMEOUT_SECS") {
            timeouts.default = secs;
        }
        if let Some(secs) = env_secs("TOURCRAFT_GENERATION_TIMEOUT_SECS") {
            timeouts.generation = secs;
        }
        if let Some(secs) = env_secs("TOURCRAFT_RESEARCH_TIMEOUT_SECS") {
            timeouts.research = secs;
        }

        Ok(Self { base_url, timeouts })
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}
