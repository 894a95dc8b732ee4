use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumIter};

/// Body of `POST /api/chat/advisory`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    pub disease: String,
    pub confidence: f64,
    pub severity: f64,
}

impl AdvisoryRequest {
    pub fn new(disease: impl Into<String>, confidence: f64, severity: f64) -> Self {
        Self {
            disease: disease.into(),
            confidence,
            severity,
        }
    }
}

/// Seed user turn describing the diagnosis the advisory was generated for.
pub fn diagnosis_prompt(req: &AdvisoryRequest) -> String {
    format!(
        "Disease: {}, Confidence: {:.1}%, Severity: {:.1}%",
        req.disease,
        req.confidence * 100.0,
        req.severity
    )
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdvisoryBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english: Option<AdvisoryContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hindi: Option<AdvisoryContent>,
}

impl AdvisoryBundle {
    pub fn content(&self, lang: Language) -> Option<&AdvisoryContent> {
        match lang {
            Language::English => self.english.as_ref(),
            Language::Hindi => self.hindi.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdvisoryContent {
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commercial_remedy: Option<CommercialRemedy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traditional_remedy: Option<TraditionalRemedy>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommercialRemedy {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TraditionalRemedy {
    #[serde(default)]
    pub recipe: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
}

/// Static captions of the advisory panel in one language.
#[derive(Debug)]
pub struct Captions {
    pub toggle: &'static str,
    pub commercial_title: &'static str,
    pub traditional_title: &'static str,
    pub product: &'static str,
    pub dosage: &'static str,
    pub frequency: &'static str,
    pub recipe: &'static str,
    pub ask_title: &'static str,
    pub ask_placeholder: &'static str,
    pub limit_placeholder: &'static str,
}

const ENGLISH_CAPTIONS: Captions = Captions {
    toggle: "EN",
    commercial_title: "Commercial Treatment",
    traditional_title: "Traditional Remedy",
    product: "Product",
    dosage: "Dosage",
    frequency: "Frequency",
    recipe: "Recipe",
    ask_title: "Ask a Follow-up",
    ask_placeholder: "Ask about this disease…",
    limit_placeholder: "Follow-up limit reached",
};

const HINDI_CAPTIONS: Captions = Captions {
    toggle: "हिं",
    commercial_title: "व्यावसायिक उपचार",
    traditional_title: "पारंपरिक उपचार",
    product: "उत्पाद",
    dosage: "खुराक",
    frequency: "आवृत्ति",
    recipe: "नुस्खा",
    ask_title: "अनुवर्ती प्रश्न पूछें",
    ask_placeholder: "इस रोग के बारे में पूछें…",
    limit_placeholder: "अनुवर्ती सीमा समाप्त",
};

impl Language {
    pub fn captions(&self) -> &'static Captions {
        match self {
            Language::English => &ENGLISH_CAPTIONS,
            Language::Hindi => &HINDI_CAPTIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat/followup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpRequest {
    pub history: Vec<ChatTurn>,
    pub question: String,
}

/// Model turn returned by the follow-up endpoint, normally
/// `{"english": "...", "hindi": "..."}`. Any JSON body is accepted and
/// kept as-is so the turn can be echoed back as history unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FollowUpAnswer(Value);

impl FollowUpAnswer {
    pub fn bilingual(english: impl Into<String>, hindi: impl Into<String>) -> Self {
        Self(serde_json::json!({ "english": english.into(), "hindi": hindi.into() }))
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    fn field(&self, lang: Language) -> Option<&str> {
        self.0
            .get(lang.as_ref())
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Selected language, else English, else the body itself.
    pub fn text(&self, lang: Language) -> String {
        if let Some(text) = self.field(lang).or_else(|| self.field(Language::English)) {
            return text.to_string();
        }
        match &self.0 {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

impl From<Value> for FollowUpAnswer {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<String>,
}
