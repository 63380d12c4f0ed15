use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub const TYPE_LOCATION: &str = "location";

pub const KEY_TYPE: &str = "type";
pub const KEY_SENT_AT: &str = "ts";
pub const KEY_LAT: &str = "lat";
pub const KEY_LONG: &str = "long";
pub const KEY_ALT: &str = "alt";
pub const KEY_VACC: &str = "vacc";
pub const KEY_HACC: &str = "hacc";
pub const KEY_SPD: &str = "spd";
pub const KEY_MTHD: &str = "mthd";
pub const KEY_COURSE: &str = "course";
pub const KEY_TIME: &str = "time";
pub const KEY_SIG: &str = "sig";
pub const KEY_BAT: &str = "bat";

/// A complete position reading. Every field comes from the same fix; a
/// failed fix never produces a partial one of these.
#[derive(Debug, Clone, Serialize)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub vertical_accuracy: f64,
    pub horizontal_accuracy: f64,
    pub speed: f32,
    pub course: f32,
    pub method: i32,
    pub timestamp: DateTime<Utc>,
}

/// One tick's merged sensor + device-status reading.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Sample {
    pub fix: Option<PositionFix>,
    pub signal: Option<String>,
    pub battery: Option<String>,
}

impl Sample {
    /// Flat key/value body for the report sink. `ts` is the publish time,
    /// `time` the capture time of the fix.
    pub fn to_record(&self) -> BTreeMap<String, String> {
        let mut record = BTreeMap::new();
        record.insert(KEY_TYPE.to_string(), TYPE_LOCATION.to_string());
        record.insert(
            KEY_SENT_AT.to_string(),
            Utc::now().timestamp_millis().to_string(),
        );

        if let Some(fix) = &self.fix {
            record.insert(KEY_LAT.to_string(), fix.latitude.to_string());
            record.insert(KEY_LONG.to_string(), fix.longitude.to_string());
            record.insert(KEY_ALT.to_string(), fix.altitude.to_string());
            record.insert(KEY_VACC.to_string(), fix.vertical_accuracy.to_string());
            record.insert(KEY_HACC.to_string(), fix.horizontal_accuracy.to_string());
            record.insert(KEY_SPD.to_string(), fix.speed.to_string());
            record.insert(KEY_MTHD.to_string(), fix.method.to_string());
            record.insert(KEY_COURSE.to_string(), fix.course.to_string());
            record.insert(
                KEY_TIME.to_string(),
                fix.timestamp.timestamp_millis().to_string(),
            );
        }

        if let Some(signal) = &self.signal {
            record.insert(KEY_SIG.to_string(), signal.clone());
        }
        if let Some(battery) = &self.battery {
            record.insert(KEY_BAT.to_string(), battery.clone());
        }

        record
    }

    pub fn altitude_and_speed(&self) -> Option<(f64, f32)> {
        self.fix.as_ref().map(|fix| (fix.altitude, fix.speed))
    }
}
