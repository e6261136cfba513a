//! Typed intake of wardrobe exports and saved-outfit documents.

mod parser;

use std::io::Read;
use std::path::Path;

use crate::workflows::outfits::domain::{SavedOutfit, WardrobeItem};

pub use parser::{RecordError, RgbRecord, SavedOutfitRecord, SnapshotRecord, WardrobeRecord};

#[derive(Debug)]
pub enum WardrobeImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    Record { line: usize, source: RecordError },
}

impl std::fmt::Display for WardrobeImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WardrobeImportError::Io(err) => write!(f, "failed to read wardrobe export: {}", err),
            WardrobeImportError::Csv(err) => write!(f, "invalid wardrobe CSV data: {}", err),
            WardrobeImportError::Json(err) => write!(f, "invalid wardrobe JSON data: {}", err),
            WardrobeImportError::Record { line, source } => {
                write!(f, "malformed record {}: {}", line, source)
            }
        }
    }
}

impl std::error::Error for WardrobeImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WardrobeImportError::Io(err) => Some(err),
            WardrobeImportError::Csv(err) => Some(err),
            WardrobeImportError::Json(err) => Some(err),
            WardrobeImportError::Record { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for WardrobeImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for WardrobeImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for WardrobeImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

pub struct WardrobeImporter;

impl WardrobeImporter {
    /// Reads a `.json` export as JSON and anything else as CSV.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<WardrobeItem>, WardrobeImportError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let is_json = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map_or(false, |extension| extension.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_reader(file)
        } else {
            Self::from_reader(file)
        }
    }

    /// CSV with header `url,type,brand,size,red,green,blue[,rejection_count]`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<WardrobeItem>, WardrobeImportError> {
        convert_all(parser::parse_csv_records(reader)?)
    }

    /// JSON array of item documents.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Vec<WardrobeItem>, WardrobeImportError> {
        let records: Vec<WardrobeRecord> = serde_json::from_reader(reader)?;
        convert_all(records)
    }

    /// JSON array of saved-outfit documents.
    pub fn saved_outfits_from_json_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<SavedOutfit>, WardrobeImportError> {
        let records: Vec<SavedOutfitRecord> = serde_json::from_reader(reader)?;
        convert_all(records)
    }
}

fn convert_all<Rec, T>(records: Vec<Rec>) -> Result<Vec<T>, WardrobeImportError>
where
    T: TryFrom<Rec, Error = RecordError>,
{
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            T::try_from(record).map_err(|source| WardrobeImportError::Record {
                line: index + 1,
                source,
            })
        })
        .collect()
}
