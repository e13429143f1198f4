//! Compile-time limits and runtime preferences
//!
//! `compile_time` is generated by build.rs from `config/<profile>.toml` and
//! cannot change after the build. `runtime` holds what a user may change per run.

include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{ConfigError, RuntimeConfig};

pub mod build_info {
    /// `MGOL_BUILD_PROFILE` as seen by the build, `development` when unset
    pub fn profile() -> &'static str {
        option_env!("MGOL_BUILD_PROFILE").unwrap_or("development")
    }

    /// Profile file the limits were read from, relative to the workspace
    pub fn limits_file() -> String {
        let dir = option_env!("MGOL_CONFIG_DIR").unwrap_or("config");
        format!("{}/{}.toml", dir, profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_limits_are_sane() {
        assert!(compile_time::syntax::MAX_STACK_DEPTH > 0);
        assert!(compile_time::semantic::LITERAL_BUFFER_SIZE >= 2);
        assert!(
            compile_time::logging::MAX_LOG_EVENTS_PER_FILE
                <= compile_time::logging::LOG_BUFFER_SIZE
        );
    }

    #[test]
    fn test_limits_file_names_profile() {
        assert!(build_info::limits_file().ends_with(&format!("{}.toml", build_info::profile())));
    }
}
