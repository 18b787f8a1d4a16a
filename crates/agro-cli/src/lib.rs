//! Session orchestration and terminal interface for AgroCast

pub mod commands;
pub mod debounce;
pub mod form_store;
pub mod session;
pub mod ui;

pub use commands::{parse_command, ReplCommand};
pub use debounce::{wait_for, Debouncer, AUTO_PREDICT_DELAY};
pub use form_store::{FormStore, FORM_STORAGE_KEY};
pub use session::{ChartSet, Completion, PredictionSession, Submission};

pub use agro_core::{Error, Result};
