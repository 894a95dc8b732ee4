use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Selects which backend classifier services a prediction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
    EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ModelKey {
    #[default]
    General,
    SoyNet,
    FiveCrop,
}

impl ModelKey {
    pub fn label(&self) -> &'static str {
        match self {
            ModelKey::General => "General",
            ModelKey::SoyNet => "SoyNet",
            ModelKey::FiveCrop => "FiveCrop",
        }
    }

    pub fn tip(&self) -> &'static str {
        match self {
            ModelKey::General => "ResNet · PlantVillage dataset",
            ModelKey::SoyNet => "Soybean specialist · Coming soon",
            ModelKey::FiveCrop => "Multi-crop ensemble · Coming soon",
        }
    }

    /// Placeholder models answer with a status message instead of a diagnosis.
    pub fn is_active(&self) -> bool {
        matches!(self, ModelKey::General)
    }
}
