//! Build mode: whether the route registry may be replaced at runtime.

/// Build mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    /// Whether the hot-update coordinator accepts new registry snapshots.
    pub hot_update: bool,
}

impl BuildMode {
    /// Production mode: the registry is fixed for the lifetime of the process.
    pub const PRODUCTION: Self = Self { hot_update: false };

    /// Development mode: live-editing sessions may swap the registry.
    pub const DEVELOPMENT: Self = Self { hot_update: true };

    /// Check if this is development mode.
    #[inline]
    pub const fn is_dev(&self) -> bool {
        self.hot_update
    }

    /// Short label for log output.
    pub const fn label(&self) -> &'static str {
        if self.hot_update {
            "development"
        } else {
            "production"
        }
    }
}
