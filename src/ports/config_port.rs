//! Configuration access port trait.

/// Section/key lookup over a scenario configuration source.
pub trait ConfigPort {
    /// Raw value, `None` when the section or key is absent.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Numeric value, `default` when absent or not a number.
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
}
