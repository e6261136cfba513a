use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use wardrobe_ai::config::OutfitConfig;
use wardrobe_ai::error::AppError;
use wardrobe_ai::workflows::outfits::{
    InMemoryItemStore, InMemoryOutfitStore, OutfitSession, SavedOutfit, Style, WardrobeItem,
};
use wardrobe_ai::workflows::wardrobe::{WardrobeImportError, WardrobeImporter};

const SAMPLE_WARDROBE: &str = include_str!("../data/sample_wardrobe.json");

pub(crate) type MemorySession = OutfitSession<InMemoryOutfitStore, InMemoryItemStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_style(raw: &str) -> Result<Style, String> {
    Style::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = Style::ordered().iter().map(|style| style.label()).collect();
        format!("unknown style '{raw}' (expected one of: {})", known.join(", "))
    })
}

/// Ten-piece wardrobe bundled with the binary.
pub(crate) fn sample_wardrobe() -> Result<Vec<WardrobeItem>, WardrobeImportError> {
    WardrobeImporter::from_json_reader(Cursor::new(SAMPLE_WARDROBE.as_bytes()))
}

/// Reads a wardrobe export, or the bundled sample when no path is given.
pub(crate) fn load_wardrobe(path: Option<&Path>) -> Result<Vec<WardrobeItem>, AppError> {
    let items = match path {
        Some(path) => {
            info!(path = %path.display(), "importing wardrobe export");
            WardrobeImporter::from_path(path)?
        }
        None => sample_wardrobe()?,
    };
    Ok(items)
}

pub(crate) fn load_saved_outfits(path: Option<&Path>) -> Result<Vec<SavedOutfit>, AppError> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let file = File::open(path)?;
    Ok(WardrobeImporter::saved_outfits_from_json_reader(file)?)
}

/// Session backed by in-memory stores seeded with `items` and `saved`.
pub(crate) fn build_session(
    items: Vec<WardrobeItem>,
    saved: Vec<SavedOutfit>,
    config: &OutfitConfig,
) -> MemorySession {
    OutfitSession::new(
        Arc::new(InMemoryOutfitStore::with_outfits(saved)),
        Arc::new(InMemoryItemStore::with_items(items)),
        config.scoring(),
        config.session(),
    )
}
