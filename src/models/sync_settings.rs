use serde::{Deserialize, Serialize};

/// Connection settings for the hosted backend, one row per configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSettings {
    pub id: i64,
    pub server_url: String,
    pub username: String,
    pub app_password: String,
    /// Band workspace this device belongs to
    pub band_id: String,
    pub enabled: bool,
    pub last_sync: Option<String>,
    pub device_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl SyncSettings {
    pub fn new(server_url: String, username: String, app_password: String, band_id: String) -> Self {
        Self {
            id: 0,
            server_url,
            username,
            app_password,
            band_id,
            enabled: false,
            last_sync: None,
            device_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    /// Base URL for this band's API, without trailing slash
    pub fn band_api_url(&self) -> String {
        format!(
            "{}/api/bands/{}",
            self.server_url.trim_end_matches('/'),
            self.band_id
        )
    }
}
