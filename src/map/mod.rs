//! Map composition: layer store + base map → Leaflet page.

pub mod auth;
pub mod compose;
pub mod document;
pub mod icons;
