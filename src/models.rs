use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FERTILIZER_STATUS: &str = "Nominal";

/// Stored calendar dates are usually `YYYY-MM-DD`, but older records may carry
/// a full timestamp. Both load; only the calendar day is kept.
mod calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};

    use crate::dates::parse_date;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date '{raw}'")))
    }

    /// `null` and empty strings both mean "no date".
    pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_date(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date '{raw}'"))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlantType {
    #[serde(rename = "Leafy Green")]
    LeafyGreen,
    Fruiting,
    Herb,
    #[serde(rename = "Root Vegetable")]
    RootVegetable,
    Flower,
}

impl PlantType {
    pub const ALL: [PlantType; 5] = [
        PlantType::LeafyGreen,
        PlantType::Fruiting,
        PlantType::Herb,
        PlantType::RootVegetable,
        PlantType::Flower,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PlantType::LeafyGreen => "Leafy Green",
            PlantType::Fruiting => "Fruiting",
            PlantType::Herb => "Herb",
            PlantType::RootVegetable => "Root Vegetable",
            PlantType::Flower => "Flower",
        }
    }
}

impl fmt::Display for PlantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PlantType {
    type Err = String;

    /// Accepts the display label in any case, with spaces, dashes or underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        PlantType::ALL
            .into_iter()
            .find(|t| t.label().replace(' ', "").to_lowercase() == wanted)
            .ok_or_else(|| format!("tipo desconocido '{s}'"))
    }
}

/// A plant photo: a remote URL or an inline `data:image/...;base64,` payload.
///
/// Stored as a plain string; the `data:image` prefix decides which variant it is.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum Photo {
    Url(String),
    Embedded(String),
}

impl Photo {
    pub fn as_str(&self) -> &str {
        match self {
            Photo::Url(s) | Photo::Embedded(s) => s,
        }
    }

    /// A photo with nothing in it; the forms send these when no photo was picked.
    pub fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Photo::Embedded(_))
    }

    /// Read a local image file into an embedded payload.
    pub fn from_image_file(path: &Path) -> std::io::Result<Photo> {
        let bytes = std::fs::read(path)?;
        let mime = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("svg") => "image/svg+xml",
            Some("bmp") => "image/bmp",
            _ => "image/jpeg",
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(Photo::Embedded(format!("data:{mime};base64,{encoded}")))
    }
}

impl From<String> for Photo {
    fn from(s: String) -> Self {
        if s.starts_with("data:image") {
            Photo::Embedded(s)
        } else {
            Photo::Url(s)
        }
    }
}

impl From<Photo> for String {
    fn from(photo: Photo) -> Self {
        match photo {
            Photo::Url(s) | Photo::Embedded(s) => s,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub plant_type: PlantType,
    #[serde(deserialize_with = "calendar_date::deserialize")]
    pub planting_date: NaiveDate,
    #[serde(default, deserialize_with = "calendar_date::deserialize_optional")]
    pub transplant_date: Option<NaiveDate>,
    #[serde(default)]
    pub photo: Option<Photo>,
    #[serde(default)]
    pub last_irrigated: Option<DateTime<Utc>>,
    #[serde(default = "default_fertilizer_status")]
    pub fertilizer_status: String,
}

fn default_fertilizer_status() -> String {
    DEFAULT_FERTILIZER_STATUS.to_string()
}

/// Input for a new plant. Required fields are optional here so a missing one
/// can be reported instead of failing to build the input at all.
#[derive(Debug, Clone, Default)]
pub struct NewPlant {
    pub name: Option<String>,
    pub plant_type: Option<PlantType>,
    pub planting_date: Option<NaiveDate>,
    pub transplant_date: Option<NaiveDate>,
    pub photo: Option<Photo>,
}

/// Partial update; `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct PlantUpdate {
    pub name: Option<String>,
    pub plant_type: Option<PlantType>,
    pub planting_date: Option<NaiveDate>,
    /// `Some(None)` clears the transplant date.
    pub transplant_date: Option<Option<NaiveDate>>,
    pub photo: Option<Photo>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FertilizerLogEntry {
    pub id: String,
    pub fertilizer_name: String,
    pub quantity: String,
    #[serde(deserialize_with = "calendar_date::deserialize")]
    pub application_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewFertilizerEntry {
    pub fertilizer_name: String,
    pub quantity: String,
    pub application_date: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub id: String,
    pub url: String,
    #[serde(deserialize_with = "calendar_date::deserialize")]
    pub date: NaiveDate,
}

/// Singleton records stored whole under a fixed key.
pub trait SettingsRecord: Serialize + serde::de::DeserializeOwned + Default {
    const KEY: &'static str;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct IrrigationSettings {
    pub auto_irrigation_enabled: bool,
    pub irrigation_times: Vec<String>,
}

impl Default for IrrigationSettings {
    fn default() -> Self {
        Self {
            auto_irrigation_enabled: false,
            irrigation_times: vec!["08:00".into(), "14:00".into(), "20:00".into()],
        }
    }
}

impl SettingsRecord for IrrigationSettings {
    const KEY: &'static str = "irrigation_settings";
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct NotificationSettings(pub BTreeMap<String, bool>);

impl NotificationSettings {
    pub fn is_enabled(&self, category: &str) -> bool {
        self.0.get(category).copied().unwrap_or(false)
    }

    pub fn set(&mut self, category: impl Into<String>, enabled: bool) {
        self.0.insert(category.into(), enabled);
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self(BTreeMap::from([
            ("irrigation".to_string(), true),
            ("transplant".to_string(), true),
            ("fertilization".to_string(), false),
            ("lowWater".to_string(), true),
            ("phAlert".to_string(), false),
        ]))
    }
}

impl SettingsRecord for NotificationSettings {
    const KEY: &'static str = "notification_settings";
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncInterval {
    Hourly,
    #[default]
    Daily,
    Weekly,
    Manual,
}

impl FromStr for SyncInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hourly" => Ok(SyncInterval::Hourly),
            "daily" => Ok(SyncInterval::Daily),
            "weekly" => Ok(SyncInterval::Weekly),
            "manual" => Ok(SyncInterval::Manual),
            other => Err(format!("intervalo desconocido '{other}'")),
        }
    }
}

/// Stored fields are layered over the defaults, so a partial record still loads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub username: String,
    pub email: String,
    pub dark_mode: bool,
    pub data_sync_interval: SyncInterval,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            username: "HydroUser".into(),
            email: "user@example.com".into(),
            dark_mode: false,
            data_sync_interval: SyncInterval::Daily,
        }
    }
}

impl SettingsRecord for AppSettings {
    const KEY: &'static str = "app_settings";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plant_serializes_with_storage_field_names() {
        let plant = Plant {
            id: "1709251200000".into(),
            name: "Tomato".into(),
            plant_type: PlantType::RootVegetable,
            planting_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            transplant_date: None,
            photo: Some(Photo::Url("https://example.com/t.jpg".into())),
            last_irrigated: None,
            fertilizer_status: DEFAULT_FERTILIZER_STATUS.into(),
        };
        let json = serde_json::to_value(&plant).unwrap();
        assert_eq!(json["type"], "Root Vegetable");
        assert_eq!(json["plantingDate"], "2024-03-01");
        assert_eq!(json["photo"], "https://example.com/t.jpg");
        assert!(json["lastIrrigated"].is_null());
        assert_eq!(json["fertilizerStatus"], "Nominal");
    }

    #[test]
    fn timestamp_dates_load_as_calendar_days() {
        let plant: Plant = serde_json::from_str(
            r#"{"id":"1","name":"Tomato","type":"Fruiting",
                "plantingDate":"2024-03-01T00:00:00.000Z","transplantDate":"",
                "photo":null,"lastIrrigated":null,"fertilizerStatus":"Nominal"}"#,
        )
        .unwrap();
        assert_eq!(plant.planting_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(plant.transplant_date, None);

        let entry: FertilizerLogEntry = serde_json::from_str(
            r#"{"id":"2","fertilizerName":"Grow Big","quantity":"5ml/L","applicationDate":"2024-03-10T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(entry.application_date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());

        assert!(serde_json::from_str::<GalleryImage>(r#"{"id":"3","url":"x","date":"soon"}"#).is_err());
    }

    #[test]
    fn photo_kind_follows_prefix() {
        let photo: Photo = serde_json::from_str("\"data:image/png;base64,AAAA\"").unwrap();
        assert!(photo.is_embedded());
        let photo: Photo = serde_json::from_str("\"https://example.com/a.png\"").unwrap();
        assert_eq!(photo, Photo::Url("https://example.com/a.png".into()));
    }

    #[test]
    fn photo_from_file_embeds_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
        let photo = Photo::from_image_file(&path).unwrap();
        assert_eq!(photo.as_str(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn plant_type_parses_loosely() {
        assert_eq!("leafy-green".parse::<PlantType>(), Ok(PlantType::LeafyGreen));
        assert_eq!("Root Vegetable".parse::<PlantType>(), Ok(PlantType::RootVegetable));
        assert!("cactus".parse::<PlantType>().is_err());
    }

    #[test]
    fn app_settings_fill_in_missing_fields() {
        let settings: AppSettings = serde_json::from_str(r#"{"darkMode":true}"#).unwrap();
        assert!(settings.dark_mode);
        assert_eq!(settings.username, "HydroUser");
        assert_eq!(settings.data_sync_interval, SyncInterval::Daily);
    }
}
