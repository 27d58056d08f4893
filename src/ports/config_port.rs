//! Configuration access port trait.

/// Lookup of `[section] key` values. Blank values read as absent.
///
/// Typed parsing lives in `domain::config_validation::parse_value`, which
/// rejects malformed values instead of defaulting them.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
