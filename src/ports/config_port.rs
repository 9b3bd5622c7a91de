//! Configuration access port trait.

use std::time::Duration;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Whole milliseconds; negative or missing values fall back to `default`.
    fn get_millis(&self, section: &str, key: &str, default: Duration) -> Duration {
        let fallback = i64::try_from(default.as_millis()).unwrap_or(i64::MAX);
        u64::try_from(self.get_int(section, key, fallback))
            .map(Duration::from_millis)
            .unwrap_or(default)
    }
}
