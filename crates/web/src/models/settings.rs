//! Restaurant settings (singleton record).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use qaima_core::SettingsId;

/// Default brand color used when no settings have been saved yet.
pub const DEFAULT_PRIMARY_COLOR: &str = "#f59e0b";
/// Default secondary color.
pub const DEFAULT_SECONDARY_COLOR: &str = "#ea580c";
/// Default page background color.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#fffbeb";
/// Name shown until an admin sets one.
pub const DEFAULT_RESTAURANT_NAME: &str = "مطعمنا";

/// The persisted restaurant settings row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSettings {
    pub id: SettingsId,
    #[serde(flatten)]
    pub fields: SettingsFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable content of the settings row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsFields {
    pub restaurant_name: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub address: Option<String>,
    pub working_hours: Option<String>,
    pub welcome_text: Option<String>,
}

impl Default for SettingsFields {
    /// Column defaults, used when settings are created from an empty request.
    fn default() -> Self {
        Self {
            restaurant_name: DEFAULT_RESTAURANT_NAME.to_owned(),
            logo_url: None,
            primary_color: DEFAULT_PRIMARY_COLOR.to_owned(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_owned(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_owned(),
            contact_phone: None,
            contact_email: None,
            address: None,
            working_hours: None,
            welcome_text: None,
        }
    }
}

/// Partial settings update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub restaurant_name: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub background_color: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub address: Option<String>,
    pub working_hours: Option<String>,
    pub welcome_text: Option<String>,
}

impl SettingsUpdate {
    /// Apply this update on top of `base`, returning the merged fields.
    #[must_use]
    pub fn apply(self, base: SettingsFields) -> SettingsFields {
        SettingsFields {
            restaurant_name: self.restaurant_name.unwrap_or(base.restaurant_name),
            logo_url: self.logo_url.or(base.logo_url),
            primary_color: self.primary_color.unwrap_or(base.primary_color),
            secondary_color: self.secondary_color.unwrap_or(base.secondary_color),
            background_color: self.background_color.unwrap_or(base.background_color),
            contact_phone: self.contact_phone.or(base.contact_phone),
            contact_email: self.contact_email.or(base.contact_email),
            address: self.address.or(base.address),
            working_hours: self.working_hours.or(base.working_hours),
            welcome_text: self.welcome_text.or(base.welcome_text),
        }
    }
}
