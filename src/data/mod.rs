/// Data layer: core types, ingestion, and the layer store.
///
/// Architecture:
/// ```text
///   .csv / .txt              .geojson / .shp / .gpkg
///        │                           │
///        ▼                           ▼
///   ┌──────────┐              ┌──────────┐
///   │  loader  │ → PointRecord│  vector  │ → FeatureCollection string
///   └──────────┘              └──────────┘
///        │                           │
///        └────────────┬──────────────┘
///                     ▼
///              ┌────────────┐
///              │ LayerStore │  point layers ++ vector layers, reorderable
///              └────────────┘
///                     │
///                     ▼
///               map::compose
/// ```

pub mod loader;
pub mod model;
pub mod store;
pub mod vector;
