pub mod advisory;
pub mod diagnosis;
pub mod error;
pub mod model;
pub mod upload;

pub use advisory::{
    AdvisoryBundle, AdvisoryContent, AdvisoryRequest, ChatRole, ChatTurn, CommercialRemedy,
    ErrorDetail, FollowUpAnswer, FollowUpRequest, Language, TraditionalRemedy,
};
pub use diagnosis::{PredictResponse, PredictionOutcome, PredictionResult, RemedyCard, SeverityLevel};
pub use error::{ApiError, ValidationError};
pub use model::ModelKey;
pub use upload::FileMeta;
