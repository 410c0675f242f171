use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// 醫療專科標籤，只能由 `SpecialtyCatalog` 產生
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Specialty(String);

impl Specialty {
    pub(crate) fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for Specialty {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub specialty: Specialty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorRecord {
    pub name: String,
    pub specialty: Specialty,
    pub distance: f64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// 不分大小寫的子字串比對
    #[default]
    Substring,
    /// 僅比對完整單字
    WordBoundary,
}

pub const MAP_DEFAULT_ZOOM: u8 = 12;
pub const MAP_TILE_URL: &str = "https://a.tile.openstreetmap.org/{z}/{x}/{y}.png";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
    pub tile_url: String,
    pub markers: Vec<MapMarker>,
}

impl MapView {
    /// 以所有醫師座標的平均值作為地圖中心；沒有醫師時回傳 None
    pub fn centered_on(doctors: &[DoctorRecord]) -> Option<Self> {
        if doctors.is_empty() {
            return None;
        }

        let count = doctors.len() as f64;
        let latitude = doctors.iter().map(|d| d.latitude).sum::<f64>() / count;
        let longitude = doctors.iter().map(|d| d.longitude).sum::<f64>() / count;

        Some(Self {
            latitude,
            longitude,
            zoom: MAP_DEFAULT_ZOOM,
            tile_url: MAP_TILE_URL.to_string(),
            markers: doctors
                .iter()
                .map(|d| MapMarker {
                    name: d.name.clone(),
                    latitude: d.latitude,
                    longitude: d.longitude,
                })
                .collect(),
        })
    }

    pub fn openstreetmap_link(&self) -> String {
        format!(
            "https://www.openstreetmap.org/?mlat={lat:.5}&mlon={lng:.5}#map={zoom}/{lat:.5}/{lng:.5}",
            lat = self.latitude,
            lng = self.longitude,
            zoom = self.zoom
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriageStatus {
    Matched,
    /// 建議文字中找不到任何專科，屬正常結果而非錯誤
    NoSpecialties,
    NoMatchingDoctors,
    DoctorsUnavailable { reason: String },
    GenerationFailed { reason: String },
}

impl TriageStatus {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::DoctorsUnavailable { .. } | Self::GenerationFailed { .. }
        )
    }

    pub fn message(&self) -> String {
        match self {
            Self::Matched => "Matching doctors found".to_string(),
            Self::NoSpecialties => "No specialties found".to_string(),
            Self::NoMatchingDoctors => "No doctors found for these specialties".to_string(),
            Self::DoctorsUnavailable { reason } => {
                format!("No doctors available: {}", reason)
            }
            Self::GenerationFailed { reason } => {
                format!("No advice available: {}", reason)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TriageOutcome {
    pub symptom: String,
    pub advice: Option<String>,
    pub specialties: BTreeSet<Specialty>,
    pub doctors: Vec<DoctorRecord>,
    pub map: Option<MapView>,
    pub status: TriageStatus,
}
