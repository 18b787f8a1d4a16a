//! Prediction session: the single owner of the form and its results
//!
//! A submission is split in two halves so the session is never borrowed
//! while a request is in flight: [`PredictionSession::begin_submission`]
//! validates and snapshots the form, [`PredictionSession::complete`] applies
//! the response. Each submission carries a token; only the response to the
//! most recent submission is applied.

use chrono::Utc;

use agro_client::Enrichment;
use agro_core::{
    comparison_series, history_series, recommendation_ranking, report, to_clipboard_summary,
    to_detailed_summary, validate_all, validate_field, Artifact, ComparisonPoint, Error, Field,
    FormDraft, FormInput, HistoryEntry, HistoryPoint, HistoryStore, PredictionResult,
    PredictionService, RankedCrop, Result, ValidationErrors,
};

/// A validated snapshot of the form, tagged with its submission token
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    token: u64,
    input: FormInput,
}

impl Submission {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn input(&self) -> &FormInput {
        &self.input
    }
}

/// What happened to a finished submission
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The prediction was stored and is now the latest result
    Recorded(HistoryEntry),
    /// The request failed; the message is ready to show
    Failed(String),
    /// A newer submission was started (or the form was reset) in the meantime
    Stale,
}

/// Chart data for the latest prediction
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub comparison: [ComparisonPoint; 3],
    pub ranking: Vec<RankedCrop>,
    pub history: Vec<HistoryPoint>,
}

#[derive(Debug, Default)]
pub struct PredictionSession {
    draft: FormDraft,
    errors: ValidationErrors,
    history: HistoryStore,
    latest: Option<HistoryEntry>,
    last_error: Option<String>,
    last_token: u64,
    pending: Option<u64>,
}

impl PredictionSession {
    pub fn new() -> Self {
        Self::with_draft(FormDraft::default())
    }

    /// Start from a previously saved draft
    pub fn with_draft(draft: FormDraft) -> Self {
        let errors = validate_all(&draft);
        Self {
            draft,
            errors,
            ..Self::default()
        }
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.latest.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Edit one field; returns the message for that field, if any.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Option<String> {
        self.draft.set(field, value);
        self.errors = validate_all(&self.draft);
        validate_field(field, self.draft.get(field))
    }

    pub fn clear_field(&mut self, field: Field) {
        self.draft.clear(field);
        self.errors = validate_all(&self.draft);
    }

    /// Prefill the form from a location lookup. Weather values are only
    /// applied when the lookup produced them.
    pub fn apply_enrichment(&mut self, enrichment: &Enrichment) {
        self.draft.set(Field::Latitude, enrichment.coordinates.latitude.to_string());
        self.draft.set(Field::Longitude, enrichment.coordinates.longitude.to_string());
        if let Some(weather) = enrichment.weather {
            self.draft.set(Field::Temperature, weather.temperature.to_string());
            self.draft.set(Field::Humidity, weather.humidity.to_string());
        }
        self.errors = validate_all(&self.draft);
    }

    /// Validate the form and issue a new submission token.
    ///
    /// Nothing is sent when the form has errors.
    pub fn begin_submission(&mut self) -> std::result::Result<Submission, ValidationErrors> {
        self.errors = validate_all(&self.draft);
        let input = self.draft.parse()?;

        self.last_token += 1;
        self.pending = Some(self.last_token);
        self.last_error = None;

        tracing::debug!(token = self.last_token, "submission started");
        Ok(Submission {
            token: self.last_token,
            input,
        })
    }

    /// Apply the outcome of a submission.
    pub fn complete(&mut self, submission: Submission, outcome: Result<PredictionResult>) -> Completion {
        if self.pending != Some(submission.token) {
            tracing::debug!(token = submission.token, "discarding stale prediction response");
            return Completion::Stale;
        }
        self.pending = None;

        match outcome {
            Ok(result) => {
                let entry = self.history.record(result, submission.input);
                self.latest = Some(entry.clone());
                Completion::Recorded(entry)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(token = submission.token, error = %message, "prediction failed");
                self.last_error = Some(message.clone());
                Completion::Failed(message)
            }
        }
    }

    /// Validate, call the service and apply the response in one go.
    pub async fn submit<S>(&mut self, service: &S) -> Result<Completion>
    where
        S: PredictionService + ?Sized,
    {
        let submission = self.begin_submission().map_err(Error::Validation)?;
        let outcome = service.predict(submission.input()).await;
        Ok(self.complete(submission, outcome))
    }

    /// Restore the default form and drop the latest result. The history is
    /// kept, and any in-flight response will be discarded.
    pub fn reset(&mut self) {
        self.draft = FormDraft::default();
        self.errors = validate_all(&self.draft);
        self.latest = None;
        self.last_error = None;
        self.pending = None;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn charts(&self) -> Option<ChartSet> {
        let latest = self.latest.as_ref()?;
        Some(ChartSet {
            comparison: comparison_series(&latest.result),
            ranking: recommendation_ranking(&latest.result),
            history: history_series(self.history.iter()),
        })
    }

    pub fn export(&self) -> Result<Artifact> {
        let latest = self.latest.as_ref().ok_or(Error::NoResult)?;
        report::to_downloadable_artifact(&latest.result, &latest.inputs)
    }

    pub fn clipboard_summary(&self) -> Result<String> {
        let latest = self.latest.as_ref().ok_or(Error::NoResult)?;
        Ok(to_clipboard_summary(&latest.result))
    }

    pub fn detailed_summary(&self) -> Result<String> {
        let latest = self.latest.as_ref().ok_or(Error::NoResult)?;
        Ok(to_detailed_summary(&latest.result, &latest.inputs, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agro_core::{AmbientWeather, Coordinates, DiseaseResult, HealthStatus};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed result and counts calls
    struct StubService {
        response: std::result::Result<PredictionResult, String>,
        calls: AtomicUsize,
    }

    impl StubService {
        fn ok(predicted_yield: f64, crops: &[&str]) -> Self {
            Self {
                response: Ok(PredictionResult {
                    predicted_yield,
                    recommended_crops: crops.iter().map(|c| c.to_string()).collect(),
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PredictionService for StubService {
        async fn predict(&self, _input: &FormInput) -> Result<PredictionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response
                .clone()
                .map_err(|message| Error::service(Some(400), message))
        }

        async fn detect_disease(&self, _file_name: &str, _image: Vec<u8>) -> Result<DiseaseResult> {
            Err(Error::service(Some(503), "Disease model unavailable"))
        }

        async fn health(&self) -> Result<HealthStatus> {
            Err(Error::Transport("not implemented".to_string()))
        }
    }

    fn filled_session() -> PredictionSession {
        let mut session = PredictionSession::new();
        for (field, value) in [
            (Field::Temperature, "25"),
            (Field::Humidity, "65"),
            (Field::SoilType, "loamy"),
            (Field::CropType, "wheat"),
            (Field::WaterFlow, "45"),
            (Field::Latitude, "28.6139"),
            (Field::Longitude, "77.209"),
        ] {
            session.set_field(field, value);
        }
        session
    }

    fn prediction(predicted_yield: f64) -> PredictionResult {
        PredictionResult {
            predicted_yield,
            recommended_crops: vec!["Wheat".to_string()],
        }
    }

    #[tokio::test]
    async fn test_successful_submission_is_recorded() {
        let service = StubService::ok(4.5, &["Wheat", "Maize"]);
        let mut session = filled_session();

        let completion = session.submit(&service).await.unwrap();
        assert!(matches!(completion, Completion::Recorded(_)));
        assert!(!session.is_pending());
        assert_eq!(session.history().len(), 1);

        let charts = session.charts().unwrap();
        assert_eq!(charts.ranking[1], RankedCrop { rank: 2, crop: "Maize".to_string() });
        assert_eq!(charts.history.len(), 1);
        assert_eq!(session.clipboard_summary().unwrap(), "Predicted Yield: 4.50 tons/hectare");
    }

    #[tokio::test]
    async fn test_invalid_form_is_never_sent() {
        let service = StubService::ok(4.5, &["Wheat"]);
        let mut session = filled_session();
        session.set_field(Field::Humidity, "150");

        let err = session.submit(&service).await.unwrap_err();
        match err {
            Error::Validation(errors) => {
                assert_eq!(errors.get(Field::Humidity), Some("Value must be between 0 and 100"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_failure_clears_pending_and_keeps_history() {
        let mut session = filled_session();
        session.submit(&StubService::ok(3.0, &["Rice"])).await.unwrap();

        let completion = session.submit(&StubService::failing("bad soil_type")).await.unwrap();
        assert_eq!(completion, Completion::Failed("bad soil_type".to_string()));
        assert!(!session.is_pending());
        assert_eq!(session.last_error(), Some("bad soil_type"));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.latest().map(|e| e.result.predicted_yield), Some(3.0));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = filled_session();
        let first = session.begin_submission().unwrap();
        let second = session.begin_submission().unwrap();
        assert!(second.token() > first.token());

        let recorded = session.complete(second, Ok(prediction(5.0)));
        assert!(matches!(recorded, Completion::Recorded(_)));

        assert_eq!(session.complete(first, Ok(prediction(1.0))), Completion::Stale);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.latest().map(|e| e.result.predicted_yield), Some(5.0));
    }

    #[test]
    fn test_older_response_arriving_first_is_discarded() {
        let mut session = filled_session();
        let first = session.begin_submission().unwrap();
        let second = session.begin_submission().unwrap();

        assert_eq!(session.complete(first, Ok(prediction(1.0))), Completion::Stale);
        assert!(session.is_pending());
        assert!(matches!(session.complete(second, Ok(prediction(2.0))), Completion::Recorded(_)));
        assert!(!session.is_pending());
    }

    #[test]
    fn test_submission_snapshots_the_form() {
        let mut session = filled_session();
        let submission = session.begin_submission().unwrap();
        session.set_field(Field::Temperature, "30");

        assert_eq!(submission.input().temperature, 25.0);
        let completion = session.complete(submission, Ok(prediction(4.0)));
        match completion {
            Completion::Recorded(entry) => assert_eq!(entry.inputs.temperature, 25.0),
            other => panic!("unexpected completion: {:?}", other),
        }
    }

    #[test]
    fn test_reset_keeps_history_and_drops_in_flight() {
        let mut session = filled_session();
        let done = session.begin_submission().unwrap();
        session.complete(done, Ok(prediction(4.0)));

        let in_flight = session.begin_submission().unwrap();
        session.reset();

        assert!(session.latest().is_none());
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.draft(), &FormDraft::default());
        assert_eq!(session.complete(in_flight, Ok(prediction(9.0))), Completion::Stale);
        assert!(matches!(session.export(), Err(Error::NoResult)));
    }

    #[test]
    fn test_set_field_reports_field_error() {
        let mut session = PredictionSession::new();
        assert_eq!(
            session.set_field(Field::Latitude, "95"),
            Some("Value must be between -90 and 90".to_string())
        );
        assert_eq!(session.set_field(Field::Latitude, "45"), None);
        assert!(session.errors().get(Field::Latitude).is_none());
        assert!(session.errors().get(Field::Temperature).is_some());

        session.clear_field(Field::Latitude);
        assert_eq!(session.errors().get(Field::Latitude), Some("Latitude is required"));
    }

    #[test]
    fn test_enrichment_prefills_form() {
        let mut session = PredictionSession::new();
        session.apply_enrichment(&Enrichment {
            coordinates: Coordinates::new(28.6139, 77.209),
            weather: Some(AmbientWeather::new(24.3, 61.0)),
            advisory: None,
        });
        assert_eq!(session.draft().get(Field::Latitude), Some("28.6139"));
        assert_eq!(session.draft().get(Field::Temperature), Some("24.3"));

        let mut session = PredictionSession::new();
        session.apply_enrichment(&Enrichment {
            coordinates: Coordinates::new(10.0, 20.0),
            weather: None,
            advisory: Some("Weather lookup failed".to_string()),
        });
        assert_eq!(session.draft().get(Field::Longitude), Some("20"));
        assert_eq!(session.draft().get(Field::Temperature), None);
    }

    #[test]
    fn test_export_latest() {
        let mut session = filled_session();
        let submission = session.begin_submission().unwrap();
        session.complete(submission, Ok(prediction(4.5)));

        let artifact = session.export().unwrap();
        assert!(artifact.file_name.starts_with("crop-yield-report-"));
        let report: agro_core::YieldReport = serde_json::from_slice(&artifact.content).unwrap();
        assert_eq!(report.result, prediction(4.5));
        assert_eq!(report.inputs.latitude, 28.6139);

        let summary = session.detailed_summary().unwrap();
        assert!(summary.contains("Expected Yield: 4.50 tons/hectare"));
        assert!(summary.contains("Location: 28.6139, 77.209"));
    }
}
