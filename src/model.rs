use std::collections::BTreeSet;

use crate::error::{RoomVibeError, RoomVibeResult};

/// Catalog payload delivered by the host's configuration fetch, keyed by an
/// opaque per-embed identifier. Immutable once loaded.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Catalog {
    pub artworks: Vec<Artwork>,
    pub rooms: Vec<RoomScene>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Artwork {
    pub id: String,
    pub title: String,
    pub image: String, // source reference resolved through the image store
    pub width: f64,
    pub height: f64,
    pub unit: DimensionUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_url: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    Cm,
    Inch,
}

impl DimensionUnit {
    pub fn to_cm(self, value: f64) -> f64 {
        match self {
            Self::Cm => value,
            Self::Inch => value * 2.54,
        }
    }
}

impl Artwork {
    /// Physical width in centimeters regardless of the declared unit.
    pub fn width_cm(&self) -> f64 {
        self.unit.to_cm(self.width)
    }

    pub fn height_cm(&self) -> f64 {
        self.unit.to_cm(self.height)
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RoomScene {
    pub id: String,
    pub name: String,
    pub background: String,
    pub thumbnail: String,
}

/// Fixed enumeration of frame treatments. Not fetched; hard-coded by design.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameStyle {
    #[default]
    None,
    Black,
    White,
    Wood,
    Gold,
}

impl FrameStyle {
    pub const ALL: [FrameStyle; 5] = [
        Self::None,
        Self::Black,
        Self::White,
        Self::Wood,
        Self::Gold,
    ];

    /// Border color as straight RGBA8. `None` carries no border at all.
    pub fn border_rgba(self) -> Option<[u8; 4]> {
        match self {
            Self::None => None,
            Self::Black => Some([17, 17, 17, 255]),
            Self::White => Some([245, 245, 245, 255]),
            Self::Wood => Some([212, 165, 116, 255]),
            Self::Gold => Some([201, 166, 70, 255]),
        }
    }

    pub fn parse(s: &str) -> RoomVibeResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "black" => Ok(Self::Black),
            "white" => Ok(Self::White),
            "wood" => Ok(Self::Wood),
            "gold" => Ok(Self::Gold),
            other => Err(RoomVibeError::validation(format!(
                "unknown frame style '{other}'"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Black => "black",
            Self::White => "white",
            Self::Wood => "wood",
            Self::Gold => "gold",
        }
    }
}

/// Plan flags supplied by the host's entitlement check. The engine only ever
/// reads them; it never talks to billing.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct Entitlements {
    pub free_tier: bool,
    pub hires_export: bool,
}

impl Default for Entitlements {
    fn default() -> Self {
        Self {
            free_tier: true,
            hires_export: false,
        }
    }
}

impl Catalog {
    /// Parse and validate a catalog payload as delivered by the host's
    /// configuration fetch.
    pub fn from_json(json: &str) -> RoomVibeResult<Self> {
        let catalog: Catalog = serde_json::from_str(json)
            .map_err(|e| RoomVibeError::serde(format!("catalog payload: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> RoomVibeResult<()> {
        if self.artworks.is_empty() {
            return Err(RoomVibeError::validation(
                "catalog must contain at least one artwork",
            ));
        }
        if self.rooms.is_empty() {
            return Err(RoomVibeError::validation(
                "catalog must contain at least one room",
            ));
        }
        let mut seen = BTreeSet::new();
        for art in &self.artworks {
            if art.id.trim().is_empty() {
                return Err(RoomVibeError::validation("artwork id must be non-empty"));
            }
            if !seen.insert(art.id.as_str()) {
                return Err(RoomVibeError::validation(format!(
                    "duplicate artwork id '{}'",
                    art.id
                )));
            }
            if !(art.width.is_finite() && art.width > 0.0) {
                return Err(RoomVibeError::validation(format!(
                    "artwork '{}' width must be finite and > 0",
                    art.id
                )));
            }
            if !(art.height.is_finite() && art.height > 0.0) {
                return Err(RoomVibeError::validation(format!(
                    "artwork '{}' height must be finite and > 0",
                    art.id
                )));
            }
            if art.image.trim().is_empty() {
                return Err(RoomVibeError::validation(format!(
                    "artwork '{}' has an empty image reference",
                    art.id
                )));
            }
        }

        let mut seen_rooms = BTreeSet::new();
        for room in &self.rooms {
            if room.id.trim().is_empty() {
                return Err(RoomVibeError::validation("room id must be non-empty"));
            }
            if !seen_rooms.insert(room.id.as_str()) {
                return Err(RoomVibeError::validation(format!(
                    "duplicate room id '{}'",
                    room.id
                )));
            }
            if room.background.trim().is_empty() {
                return Err(RoomVibeError::validation(format!(
                    "room '{}' has an empty background reference",
                    room.id
                )));
            }
        }

        Ok(())
    }

    pub fn artwork(&self, id: &str) -> Option<&Artwork> {
        self.artworks.iter().find(|a| a.id == id)
    }

    pub fn room(&self, id: &str) -> Option<&RoomScene> {
        self.rooms.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_catalog() -> Catalog {
        Catalog {
            artworks: vec![Artwork {
                id: "a0".to_string(),
                title: "Light My Fire".to_string(),
                image: "art/a0.png".to_string(),
                width: 140.0,
                height: 70.0,
                unit: DimensionUnit::Cm,
                price: Some(950.0),
                buy_url: None,
            }],
            rooms: vec![RoomScene {
                id: "living".to_string(),
                name: "Modern living room".to_string(),
                background: "rooms/living.png".to_string(),
                thumbnail: "rooms/living-thumb.png".to_string(),
            }],
        }
    }

    #[test]
    fn json_roundtrip() {
        let catalog = basic_catalog();
        let s = serde_json::to_string_pretty(&catalog).unwrap();
        let de: Catalog = serde_json::from_str(&s).unwrap();
        assert_eq!(de.artworks.len(), 1);
        assert_eq!(de.rooms[0].id, "living");
    }

    #[test]
    fn from_json_validates() {
        let s = serde_json::to_string(&basic_catalog()).unwrap();
        assert!(Catalog::from_json(&s).is_ok());
        assert!(matches!(
            Catalog::from_json("{not json"),
            Err(RoomVibeError::Serde(_))
        ));
        assert!(matches!(
            Catalog::from_json(r#"{"artworks":[],"rooms":[]}"#),
            Err(RoomVibeError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_duplicate_artwork_id() {
        let mut catalog = basic_catalog();
        let dup = catalog.artworks[0].clone();
        catalog.artworks.push(dup);
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn validate_rejects_nonpositive_size() {
        let mut catalog = basic_catalog();
        catalog.artworks[0].width = 0.0;
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn inch_dimensions_convert_to_cm() {
        let mut catalog = basic_catalog();
        catalog.artworks[0].unit = DimensionUnit::Inch;
        catalog.artworks[0].width = 10.0;
        assert!((catalog.artworks[0].width_cm() - 25.4).abs() < 1e-9);
    }

    #[test]
    fn frame_style_parse_aliases_and_colors() {
        assert_eq!(FrameStyle::parse(" Black ").unwrap(), FrameStyle::Black);
        assert_eq!(FrameStyle::parse("none").unwrap(), FrameStyle::None);
        assert!(FrameStyle::parse("chrome").is_err());
        assert!(FrameStyle::None.border_rgba().is_none());
        assert!(FrameStyle::Gold.border_rgba().is_some());
    }
}
