#![forbid(unsafe_code)]

use std::env;

use sentinel_contracts::zone::GeoPoint;

/// Environment-driven configuration for the watch binary. The API base
/// URL is the only required setting; everything else has a safe
/// default.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
    pub api_base_url: String,
    pub auth_token: Option<String>,
    /// Fixed position for hosts without a GPS source; `None` runs with
    /// no location fix.
    pub fixed_position: Option<GeoPoint>,
    pub presentation_mode: bool,
    /// Offset applied to the UTC hour to derive the local hour for the
    /// time-of-day factor.
    pub utc_offset_hours: i8,
}

impl WatchConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let api_base_url = lookup("SENTINEL_API_BASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| "SENTINEL_API_BASE_URL is required".to_string())?;

        let auth_token = lookup("SENTINEL_AUTH_TOKEN")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let fixed_position = match (lookup("SENTINEL_LAT"), lookup("SENTINEL_LNG")) {
            (Some(lat), Some(lng)) => {
                let lat: f64 = lat
                    .trim()
                    .parse()
                    .map_err(|_| "SENTINEL_LAT must be a number".to_string())?;
                let lng: f64 = lng
                    .trim()
                    .parse()
                    .map_err(|_| "SENTINEL_LNG must be a number".to_string())?;
                Some(
                    GeoPoint::new(lat, lng)
                        .map_err(|_| "SENTINEL_LAT/SENTINEL_LNG out of range".to_string())?,
                )
            }
            (None, None) => None,
            _ => {
                return Err("SENTINEL_LAT and SENTINEL_LNG must be set together".to_string());
            }
        };

        let presentation_mode = lookup("SENTINEL_PRESENTATION_MODE")
            .map(|v| {
                matches!(
                    v.trim().to_ascii_lowercase().as_str(),
                    "1" | "true" | "on" | "yes"
                )
            })
            .unwrap_or(false);

        let utc_offset_hours = match lookup("SENTINEL_UTC_OFFSET_HOURS") {
            Some(v) => v
                .trim()
                .parse::<i8>()
                .ok()
                .filter(|o| (-12..=14).contains(o))
                .ok_or_else(|| "SENTINEL_UTC_OFFSET_HOURS must be within -12..=14".to_string())?,
            None => 0,
        };

        Ok(Self {
            api_base_url,
            auth_token,
            fixed_position,
            presentation_mode,
            utc_offset_hours,
        })
    }
}
