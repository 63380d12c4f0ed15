/// Environment keys mirrored into the published record when set.
pub const PROP_NET_SIGNAL: &str = "CAPSULE_NET_SIGNAL";
pub const PROP_BATTERY_LEVEL: &str = "CAPSULE_BATTERY_LEVEL";

/// Ambient device property store (signal strength, battery level).
/// Lookups are independent of fix success; a missing key is not an error.
pub trait DeviceProps: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads properties from process environment variables, the closest ambient
/// store a plain Linux process has to a handset's system properties.
pub struct EnvProps;

impl DeviceProps for EnvProps {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_none() {
        assert_eq!(EnvProps.get("CAPSULE_TEST_NO_SUCH_PROP"), None);
    }

    #[test]
    fn set_key_is_returned() {
        std::env::set_var("CAPSULE_TEST_PROP", "42%");
        assert_eq!(EnvProps.get("CAPSULE_TEST_PROP"), Some("42%".to_string()));
        std::env::remove_var("CAPSULE_TEST_PROP");
    }
}
