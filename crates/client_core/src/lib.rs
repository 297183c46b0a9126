pub mod classifier;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod normalizer;

pub use classifier::{Classifier, HttpClassifier, MAX_BATCH_TEXTS};
pub use config::{load_settings, ClientSettings, SettingsError};
pub use controller::{Phase, SubmitOutcome, WorkflowController, WorkflowEvent, WorkflowState};
pub use error::{ClassifyError, WorkflowError};
pub use history::{HistoryList, HISTORY_CAP};
pub use normalizer::{confidence_percent, normalize, normalize_batch, Prediction};
