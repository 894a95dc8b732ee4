use serde::{Deserialize, Serialize};

const PLACEHOLDER_FALLBACK: &str = "This model is not available yet.";

/// Body of `POST /api/predict`. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remedy: Option<RemedyCard>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub disease: String,
    pub confidence: f64,
    pub severity: f64,
    pub model_used: Option<String>,
    pub remedy: Option<RemedyCard>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Diagnosis(PredictionResult),
    /// A model that is not wired up yet answered with a status line.
    Placeholder {
        status: String,
        model_used: Option<String>,
    },
}

impl From<PredictResponse> for PredictionOutcome {
    fn from(resp: PredictResponse) -> Self {
        match resp.disease {
            Some(disease) => PredictionOutcome::Diagnosis(PredictionResult {
                disease,
                confidence: resp.confidence.unwrap_or(0.0),
                severity: resp.severity.unwrap_or(0.0),
                model_used: resp.model_used,
                remedy: resp.remedy,
            }),
            None => PredictionOutcome::Placeholder {
                status: resp
                    .status
                    .unwrap_or_else(|| PLACEHOLDER_FALLBACK.to_string()),
                model_used: resp.model_used,
            },
        }
    }
}

impl PredictionOutcome {
    pub fn diagnosis(&self) -> Option<&PredictionResult> {
        match self {
            PredictionOutcome::Diagnosis(result) => Some(result),
            PredictionOutcome::Placeholder { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityLevel {
    Mild,
    Moderate,
    Severe,
}

impl SeverityLevel {
    pub fn from_percent(severity: f64) -> Self {
        if severity < 30.0 {
            SeverityLevel::Mild
        } else if severity < 60.0 {
            SeverityLevel::Moderate
        } else {
            SeverityLevel::Severe
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SeverityLevel::Mild => "Mild",
            SeverityLevel::Moderate => "Moderate",
            SeverityLevel::Severe => "Severe",
        }
    }

    /// CSS tone used for the bar fill.
    pub fn tone(&self) -> &'static str {
        match self {
            SeverityLevel::Mild => "healthy",
            SeverityLevel::Moderate => "warning",
            SeverityLevel::Severe => "critical",
        }
    }
}

pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

pub fn format_severity(severity: f64) -> String {
    format!("{:.1}%", severity)
}

pub fn bar_width(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

/// `Tomato___Late_blight` -> `Tomato — Late blight`
pub fn display_disease_name(label: &str) -> String {
    label.replace("___", " — ").replace('_', " ")
}

/// Static remedy entry served by `GET /api/remedies/{disease}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RemedyCard {
    #[serde(default)]
    pub disease: String,
    #[serde(default)]
    pub commercial: Option<CommercialCard>,
    #[serde(default)]
    pub jugaad: Option<JugaadCard>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommercialCard {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// Home-made remedy ("jugaad" in the backend's vocabulary).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JugaadCard {
    #[serde(default)]
    pub recipe: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_buckets() {
        assert_eq!(SeverityLevel::from_percent(0.0), SeverityLevel::Mild);
        assert_eq!(SeverityLevel::from_percent(29.9), SeverityLevel::Mild);
        assert_eq!(SeverityLevel::from_percent(30.0), SeverityLevel::Moderate);
        assert_eq!(SeverityLevel::from_percent(59.99), SeverityLevel::Moderate);
        assert_eq!(SeverityLevel::from_percent(60.0), SeverityLevel::Severe);
        assert_eq!(SeverityLevel::from_percent(62.4).label(), "Severe");
        assert_eq!(SeverityLevel::Moderate.tone(), "warning");
    }

    #[test]
    fn placeholder_without_status_gets_a_message() {
        let outcome = PredictionOutcome::from(PredictResponse::default());
        assert_eq!(
            outcome,
            PredictionOutcome::Placeholder {
                status: "This model is not available yet.".into(),
                model_used: None,
            }
        );
        assert!(outcome.diagnosis().is_none());
    }

    #[test]
    fn missing_severity_defaults_to_zero() {
        let resp: PredictResponse = serde_json::from_str(
            r#"{"disease": "Tomato___Late_blight", "confidence": 0.87, "model_used": "general (demo)"}"#,
        )
        .unwrap();
        let outcome = PredictionOutcome::from(resp);
        let result = outcome.diagnosis().unwrap();
        assert_eq!(result.severity, 0.0);
        assert_eq!(SeverityLevel::from_percent(result.severity), SeverityLevel::Mild);
    }

    #[test]
    fn display_helpers() {
        assert_eq!(format_confidence(0.93), "93.0%");
        assert_eq!(format_severity(62.4), "62.4%");
        assert_eq!(
            display_disease_name("Corn_(maize)___Common_rust_"),
            "Corn (maize) — Common rust "
        );
        assert_eq!(bar_width(140.0), 100.0);
        assert_eq!(bar_width(-3.0), 0.0);
        assert_eq!(bar_width(f64::NAN), 0.0);
    }

    #[test]
    fn remedy_card_tolerates_missing_fields() {
        let card: RemedyCard = serde_json::from_str(
            r#"{
                "disease": "Apple___Apple_scab",
                "commercial": {"product": "Captan 50 WP", "dosage": "2 g/L", "notes": "Wear gloves."},
                "jugaad": {"recipe": "Neem oil spray", "frequency": "Every 5-7 days", "notes": ""}
            }"#,
        )
        .unwrap();
        let commercial = card.commercial.unwrap();
        assert_eq!(commercial.product, "Captan 50 WP");
        assert_eq!(commercial.frequency, None);
        assert_eq!(card.jugaad.unwrap().frequency, "Every 5-7 days");
    }
}
