use std::io::Read;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::workflows::outfits::color::{Rgb, CHANNEL_MAX};
use crate::workflows::outfits::domain::{
    Category, ItemSnapshot, ItemUrl, SavedOutfit, WardrobeItem,
};

/// Malformed field in a wardrobe or saved-outfit record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("{channel} channel {value} is outside 0-255")]
    InvalidChannel { channel: &'static str, value: f64 },
    #[error("unknown item type \"{0}\"")]
    UnknownCategory(String),
    #[error("invalid timestamp \"{0}\", expected RFC 3339")]
    InvalidTimestamp(String),
}

/// Channel triple as stored under `rgbValues`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RgbRecord {
    pub red: Option<f64>,
    pub green: Option<f64>,
    pub blue: Option<f64>,
}

impl TryFrom<RgbRecord> for Rgb {
    type Error = RecordError;

    fn try_from(record: RgbRecord) -> Result<Self, Self::Error> {
        Ok(Rgb::new(
            channel("red", record.red)?,
            channel("green", record.green)?,
            channel("blue", record.blue)?,
        ))
    }
}

/// Wardrobe item as exported by the photo pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeRecord {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub rgb_values: Option<RgbRecord>,
    pub rejection_count: Option<u32>,
}

impl TryFrom<WardrobeRecord> for WardrobeItem {
    type Error = RecordError;

    fn try_from(record: WardrobeRecord) -> Result<Self, Self::Error> {
        let snapshot = ItemSnapshot::try_from(SnapshotRecord {
            url: record.url,
            item_type: record.item_type,
            brand: record.brand,
            size: record.size,
            rgb_values: record.rgb_values,
        })?;
        Ok(WardrobeItem {
            url: snapshot.url,
            category: snapshot.category,
            brand: snapshot.brand,
            size: snapshot.size,
            rgb: snapshot.rgb,
            rejection_count: record.rejection_count.unwrap_or(0),
        })
    }
}

/// Item copy embedded in a saved outfit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub rgb_values: Option<RgbRecord>,
}

impl TryFrom<SnapshotRecord> for ItemSnapshot {
    type Error = RecordError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        let url = required("url", record.url)?;
        if url.trim().is_empty() {
            return Err(RecordError::EmptyField("url"));
        }
        let raw_type = required("type", record.item_type)?;
        let category =
            Category::parse(&raw_type).ok_or(RecordError::UnknownCategory(raw_type))?;
        let rgb = Rgb::try_from(required("rgbValues", record.rgb_values)?)?;

        Ok(ItemSnapshot {
            brand: required("brand", record.brand)?,
            size: required("size", record.size)?,
            category,
            url: ItemUrl(url),
            rgb,
        })
    }
}

/// Saved outfit document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedOutfitRecord {
    pub name: Option<String>,
    pub style: Option<String>,
    pub created_at: Option<String>,
    pub top: Option<SnapshotRecord>,
    pub bottom: Option<SnapshotRecord>,
    pub shoes: Option<SnapshotRecord>,
}

impl TryFrom<SavedOutfitRecord> for SavedOutfit {
    type Error = RecordError;

    fn try_from(record: SavedOutfitRecord) -> Result<Self, Self::Error> {
        let name = required("name", record.name)?;
        if name.trim().is_empty() {
            return Err(RecordError::EmptyField("name"));
        }
        let raw_created = required("createdAt", record.created_at)?;
        let created_at = DateTime::parse_from_rfc3339(raw_created.trim())
            .map_err(|_| RecordError::InvalidTimestamp(raw_created.clone()))?
            .with_timezone(&Utc);
        // Older documents have no style; listings show the name in its place.
        let style = record
            .style
            .filter(|style| !style.trim().is_empty())
            .unwrap_or_else(|| name.clone());

        Ok(SavedOutfit {
            style,
            created_at,
            top: ItemSnapshot::try_from(required("top", record.top)?)?,
            bottom: ItemSnapshot::try_from(required("bottom", record.bottom)?)?,
            shoes: ItemSnapshot::try_from(required("shoes", record.shoes)?)?,
            name,
        })
    }
}

/// Flat CSV row of a wardrobe export.
#[derive(Debug, Deserialize)]
struct WardrobeCsvRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    url: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "empty_string_as_none")]
    item_type: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    size: Option<String>,
    red: Option<f64>,
    green: Option<f64>,
    blue: Option<f64>,
    #[serde(default)]
    rejection_count: Option<u32>,
}

impl From<WardrobeCsvRow> for WardrobeRecord {
    fn from(row: WardrobeCsvRow) -> Self {
        let rgb_values = match (row.red, row.green, row.blue) {
            (None, None, None) => None,
            (red, green, blue) => Some(RgbRecord { red, green, blue }),
        };
        Self {
            url: row.url,
            item_type: row.item_type,
            brand: row.brand,
            size: row.size,
            rgb_values,
            rejection_count: row.rejection_count,
        }
    }
}

pub(crate) fn parse_csv_records<R: Read>(reader: R) -> Result<Vec<WardrobeRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<WardrobeCsvRow>() {
        records.push(WardrobeRecord::from(row?));
    }

    Ok(records)
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, RecordError> {
    value.ok_or(RecordError::MissingField(field))
}

fn channel(name: &'static str, value: Option<f64>) -> Result<f64, RecordError> {
    let value = value.ok_or(RecordError::MissingField(name))?;
    if !value.is_finite() || !(0.0..=CHANNEL_MAX).contains(&value) {
        return Err(RecordError::InvalidChannel {
            channel: name,
            value,
        });
    }
    Ok(value)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record() -> WardrobeRecord {
        serde_json::from_str(
            r#"{
                "url": "https://cdn.example/items/1.jpg",
                "type": "Tops",
                "brand": "Cos",
                "size": "M",
                "rgbValues": { "red": 150.0, "green": 148.5, "blue": 152.0 }
            }"#,
        )
        .expect("valid json")
    }

    #[test]
    fn record_converts_with_default_rejection_count() {
        let item = WardrobeItem::try_from(record()).expect("valid record");
        assert_eq!(item.category, Category::Top);
        assert_eq!(item.rejection_count, 0);
        assert_eq!(item.rgb, Rgb::new(150.0, 148.5, 152.0));
    }

    #[test]
    fn missing_channel_is_an_error_not_zero() {
        let mut record = record();
        record.rgb_values = Some(RgbRecord {
            red: Some(10.0),
            green: None,
            blue: Some(10.0),
        });
        assert_eq!(
            WardrobeItem::try_from(record),
            Err(RecordError::MissingField("green"))
        );
    }

    #[test]
    fn out_of_range_channels_and_unknown_types_are_rejected() {
        let mut bright = record();
        bright.rgb_values = Some(RgbRecord {
            red: Some(256.0),
            green: Some(0.0),
            blue: Some(0.0),
        });
        assert!(matches!(
            WardrobeItem::try_from(bright),
            Err(RecordError::InvalidChannel { channel: "red", .. })
        ));

        let mut hat = record();
        hat.item_type = Some("Hats".to_string());
        assert_eq!(
            WardrobeItem::try_from(hat),
            Err(RecordError::UnknownCategory("Hats".to_string()))
        );
    }

    #[test]
    fn saved_outfit_requires_rfc3339_and_falls_back_to_name_for_style() {
        let json = r#"{
            "name": "Weekend",
            "createdAt": "2025-04-12T10:30:00Z",
            "top":    { "url": "t", "type": "Tops",    "brand": "Cos",  "size": "M",  "rgbValues": { "red": 1, "green": 2, "blue": 3 } },
            "bottom": { "url": "b", "type": "Bottoms", "brand": "Levi", "size": "32", "rgbValues": { "red": 1, "green": 2, "blue": 3 } },
            "shoes":  { "url": "s", "type": "Shoes",   "brand": "Vans", "size": "9",  "rgbValues": { "red": 1, "green": 2, "blue": 3 } }
        }"#;
        let record: SavedOutfitRecord = serde_json::from_str(json).expect("valid json");
        let outfit = SavedOutfit::try_from(record.clone()).expect("valid outfit");
        assert_eq!(outfit.style, "Weekend");
        assert_eq!(outfit.bottom.category, Category::Bottom);

        let mut stale = record;
        stale.created_at = Some("12/04/2025".to_string());
        assert_eq!(
            SavedOutfit::try_from(stale),
            Err(RecordError::InvalidTimestamp("12/04/2025".to_string()))
        );
    }

    #[test]
    fn csv_rows_map_onto_records() {
        let csv = "url,type,brand,size,red,green,blue,rejection_count\n\
https://cdn.example/1.jpg, Shoes ,Vans,9,12,12,14,\n\
https://cdn.example/2.jpg,Bottoms,Levi's,32,,,,2\n";
        let records = parse_csv_records(Cursor::new(csv)).expect("parse");
        assert_eq!(records.len(), 2);

        let shoes = WardrobeItem::try_from(records[0].clone()).expect("valid shoes");
        assert_eq!(shoes.category, Category::Shoes);
        assert_eq!(shoes.rejection_count, 0);

        assert_eq!(
            WardrobeItem::try_from(records[1].clone()),
            Err(RecordError::MissingField("rgbValues"))
        );
    }
}
