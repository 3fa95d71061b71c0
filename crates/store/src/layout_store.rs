use crate::kv::KeyValueStore;
use crate::viewport::{sanitize_viewport, Viewport, ViewportBounds};
use chrono::Utc;
use kg_graph::XY;
use kg_layout::{hash_string_to_seed, LayoutKind};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Well-known outer storage key. Kept byte-identical to the original explorer
/// so snapshots written by existing sessions keep loading.
pub const LAYOUT_STORAGE_KEY: &str = "abstractuic_amx_saved_layouts_v1";

pub const SAVED_LAYOUT_VERSION: u32 = 1;

/// Point-in-time layout snapshot keyed by an opaque view key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedLayout {
    pub version: u32,
    pub kind: LayoutKind,
    pub seed: u32,
    pub positions: HashMap<String, XY>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    pub saved_at: String,
}

impl SavedLayout {
    /// New snapshot stamped with the current UTC time.
    pub fn new(
        kind: LayoutKind,
        seed: u32,
        positions: HashMap<String, XY>,
        viewport: Option<Viewport>,
    ) -> Self {
        Self {
            version: SAVED_LAYOUT_VERSION,
            kind,
            seed,
            positions,
            viewport,
            saved_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Why a snapshot could not be decoded. Internal only: the public loader maps
/// every failure to "treat the saved layout as absent".
#[derive(Debug, Error)]
enum SnapshotError {
    #[error("no snapshot stored for this view key")]
    Missing,
    #[error("snapshot payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot payload is not a JSON object")]
    NotAnObject,
    #[error("unsupported snapshot version {0}")]
    Version(i64),
}

/// Load the snapshot for `view_key`, or `None` when there is none or the
/// stored data is malformed in any way. Individual bad fields are defaulted
/// or dropped rather than failing the whole record.
pub fn load_saved_layout(store: &dyn KeyValueStore, view_key: &str) -> Option<SavedLayout> {
    let key = view_key.trim();
    match try_load(store, key) {
        Ok(layout) => Some(layout),
        Err(SnapshotError::Missing) => None,
        Err(e) => {
            log::debug!("discarding saved layout for '{key}': {e}");
            None
        }
    }
}

fn try_load(store: &dyn KeyValueStore, key: &str) -> Result<SavedLayout, SnapshotError> {
    if key.is_empty() {
        return Err(SnapshotError::Missing);
    }
    let raw = store.get(LAYOUT_STORAGE_KEY).ok_or(SnapshotError::Missing)?;
    let parsed: Value = serde_json::from_str(&raw)?;
    let map = parsed.as_object().ok_or(SnapshotError::NotAnObject)?;
    let entry = map.get(key).ok_or(SnapshotError::Missing)?;
    let obj = entry.as_object().ok_or(SnapshotError::NotAnObject)?;

    let version = obj.get("version").and_then(Value::as_i64).unwrap_or(-1);
    if version != i64::from(SAVED_LAYOUT_VERSION) {
        return Err(SnapshotError::Version(version));
    }

    let kind = obj
        .get("kind")
        .and_then(Value::as_str)
        .and_then(LayoutKind::parse)
        .unwrap_or_default();

    let seed = obj
        .get("seed")
        .and_then(Value::as_f64)
        .filter(|s| s.is_finite())
        .map(|s| s.trunc() as i64 as u32)
        .unwrap_or_else(|| hash_string_to_seed(key));

    let mut positions = HashMap::new();
    if let Some(raw_positions) = obj.get("positions").and_then(Value::as_object) {
        for (id, value) in raw_positions {
            if let Some(xy) = coerce_xy(value) {
                positions.insert(id.clone(), xy);
            }
        }
    }

    let viewport = obj
        .get("viewport")
        .and_then(|v| serde_json::from_value::<Viewport>(v.clone()).ok())
        .and_then(|vp| sanitize_viewport(vp, &ViewportBounds::default()));

    let saved_at = obj
        .get("saved_at")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("")
        .to_string();

    Ok(SavedLayout {
        version: SAVED_LAYOUT_VERSION,
        kind,
        seed,
        positions,
        viewport,
        saved_at,
    })
}

fn coerce_xy(value: &Value) -> Option<XY> {
    let obj = value.as_object()?;
    let x = obj.get("x").and_then(Value::as_f64).filter(|v| v.is_finite())?;
    let y = obj.get("y").and_then(Value::as_f64).filter(|v| v.is_finite())?;
    Some(XY::new(x, y))
}

/// Write the snapshot for `view_key` into the outer map, replacing any
/// previous entry. An unreadable outer map is replaced wholesale.
pub fn save_layout(store: &mut dyn KeyValueStore, view_key: &str, layout: &SavedLayout) {
    let key = view_key.trim();
    if key.is_empty() {
        return;
    }
    let mut map = read_outer_map(store);
    match serde_json::to_value(layout) {
        Ok(entry) => {
            map.insert(key.to_string(), entry);
        }
        Err(e) => {
            log::warn!("could not serialize layout snapshot for '{key}': {e}");
            return;
        }
    }
    write_outer_map(store, &map);
}

/// Remove the snapshot for `view_key`; a missing entry is a no-op.
pub fn delete_layout(store: &mut dyn KeyValueStore, view_key: &str) {
    let key = view_key.trim();
    if key.is_empty() {
        return;
    }
    let mut map = read_outer_map(store);
    if map.remove(key).is_some() {
        write_outer_map(store, &map);
    }
}

fn read_outer_map(store: &dyn KeyValueStore) -> Map<String, Value> {
    let Some(raw) = store.get(LAYOUT_STORAGE_KEY) else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => map,
        _ => {
            log::warn!("saved-layout store was unreadable; starting fresh");
            Map::new()
        }
    }
}

fn write_outer_map(store: &mut dyn KeyValueStore, map: &Map<String, Value>) {
    match serde_json::to_string(map) {
        Ok(raw) => store.set(LAYOUT_STORAGE_KEY, &raw),
        Err(e) => log::warn!("could not serialize saved-layout store: {e}"),
    }
}
