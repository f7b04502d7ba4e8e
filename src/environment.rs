//! Read access to process environment variables.

/// Source of environment variables. Tests inject a fixed map instead of
/// mutating the real process environment.
pub trait EnvironmentProvider: Send + Sync {
    /// The variable's value, or `None` when unset or not valid unicode.
    fn var(&self, name: &str) -> Option<String>;
}

/// `EnvironmentProvider` backed by `std::env`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEnvironment;

impl EnvironmentProvider for OsEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_var_is_none() {
        assert!(OsEnvironment
            .var("LOCKIFY_SURELY_UNSET_VARIABLE_42")
            .is_none());
    }
}
