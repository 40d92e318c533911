use serde::{Deserialize, Serialize};

/// Crop families grouped by their effect on soil. Declaration order is the
/// order candidates are scanned when planning, so it also breaks ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropFamily {
    Grass,
    Legume,
    Nightshade,
    Brassica,
    Umbellifer,
    Mallow,
    Aster,
}

impl CropFamily {
    pub fn all() -> &'static [CropFamily] {
        &[
            CropFamily::Grass,
            CropFamily::Legume,
            CropFamily::Nightshade,
            CropFamily::Brassica,
            CropFamily::Umbellifer,
            CropFamily::Mallow,
            CropFamily::Aster,
        ]
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CropFamily::Grass => "Grass",
            CropFamily::Legume => "Legume",
            CropFamily::Nightshade => "Nightshade",
            CropFamily::Brassica => "Brassica",
            CropFamily::Umbellifer => "Umbellifer",
            CropFamily::Mallow => "Mallow",
            CropFamily::Aster => "Aster",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        CropFamily::all()
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for CropFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nutrient {
    N,
    P,
    K,
}

/// Signed soil nutrient levels: negative is deficient, positive is surplus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilHealth {
    #[serde(rename = "N")]
    pub n: i32,
    #[serde(rename = "P")]
    pub p: i32,
    #[serde(rename = "K")]
    pub k: i32,
}

impl SoilHealth {
    pub fn new(n: i32, p: i32, k: i32) -> Self {
        Self { n, p, k }
    }

    pub fn levels(&self) -> [(Nutrient, i32); 3] {
        [(Nutrient::N, self.n), (Nutrient::P, self.p), (Nutrient::K, self.k)]
    }
}
