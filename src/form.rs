//! Prediction Form Controller
//!
//! Drives one prediction form: holds the field values, runs the
//! submit/reset flow and updates a [`FormView`].
//!
//! ## State machine
//!
//! ```text
//! Idle --submit--> Submitting --request settles--> Idle
//! ```
//!
//! There is no error state; a failure is reported through
//! [`FormView::alert`] and the form returns to Idle. A submit arriving
//! while another is in flight is rejected with [`PredictionError::Busy`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;
use tracing::Instrument;

use crate::prediction::{
    Field, FormValues, PredictionError, PredictionRequest, PredictionResult, Predictor,
};
use crate::verdict::UiResult;

/// The UI surface a form controller draws on
///
/// Implementations use interior mutability; every method is called from the
/// controller's task only.
pub trait FormView: Send + Sync {
    /// Show or hide the loading indicator
    fn set_loading(&self, visible: bool);

    /// Show or hide the result panel
    fn set_result_panel(&self, visible: bool);

    /// Write the status text, color, icon and description
    fn render_result(&self, result: &UiResult);

    /// Blocking user-facing alert
    fn alert(&self, message: &str);

    /// Empty the visible input fields
    fn clear_fields(&self);
}

/// Lifecycle of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

/// Message shown when a prediction cannot be made
pub fn failure_message(port: Option<u16>) -> String {
    match port {
        Some(port) => format!(
            "Error making prediction. Ensure Logistic Regression backend is running on port {}.",
            port
        ),
        None => "Error making prediction. Ensure Logistic Regression backend is running."
            .to_string(),
    }
}

/// Controller for a single prediction form
pub struct FormController<V: FormView> {
    predictor: Arc<dyn Predictor>,
    view: V,
    fields: RwLock<FormValues>,
    phase: Mutex<Phase>,
}

/// Returns the form to Idle and hides the loader when dropped, so a
/// cancelled or panicking submission still settles.
struct SettleGuard<'a, V: FormView> {
    controller: &'a FormController<V>,
}

impl<V: FormView> Drop for SettleGuard<'_, V> {
    fn drop(&mut self) {
        self.controller.view.set_loading(false);
        *self.controller.lock_phase() = Phase::Idle;
    }
}

impl<V: FormView> FormController<V> {
    pub fn new(predictor: Arc<dyn Predictor>, view: V) -> Self {
        Self {
            predictor,
            view,
            fields: RwLock::new(FormValues::new()),
            phase: Mutex::new(Phase::Idle),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn phase(&self) -> Phase {
        *self.lock_phase()
    }

    // Phase is a plain value, a poisoned lock still holds a valid one
    fn lock_phase(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current field values
    pub async fn values(&self) -> FormValues {
        self.fields.read().await.clone()
    }

    /// Set the raw text of one field
    pub async fn set_field(&self, field: Field, value: impl Into<String>) {
        self.fields.write().await.set(field, value);
    }

    /// Replace every field at once
    pub async fn fill(&self, values: FormValues) {
        *self.fields.write().await = values;
    }

    /// Submit the current field values
    ///
    /// On success the result is rendered and the result panel shown. On
    /// failure exactly one alert is raised and the panel is left alone.
    /// The loading indicator is hidden once the request settles either way,
    /// including when the returned future is dropped before completion.
    pub async fn submit(&self) -> PredictionResult<UiResult> {
        {
            let mut phase = self.lock_phase();
            if *phase == Phase::Submitting {
                tracing::warn!("Submission ignored, a prediction is already in flight");
                return Err(PredictionError::Busy);
            }
            *phase = Phase::Submitting;
        }

        let _settle = SettleGuard { controller: self };
        self.view.set_loading(true);

        let request = PredictionRequest::from_form(&*self.fields.read().await);
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("submit", request_id = %request_id);

        self.run(&request).instrument(span).await
    }

    async fn run(&self, request: &PredictionRequest) -> PredictionResult<UiResult> {
        let unparsed = request.unparsed_fields();
        if !unparsed.is_empty() {
            tracing::debug!(fields = ?unparsed, "Sending fields that did not parse as numbers");
        }

        match self.predictor.predict(request).await {
            Ok(response) => {
                let result = UiResult::from_response(&response);
                tracing::info!(
                    probability = response.probability_diabetic,
                    label = result.label,
                    "Prediction received"
                );
                self.view.render_result(&result);
                self.view.set_result_panel(true);
                Ok(result)
            }
            Err(e) => {
                tracing::error!(error = %e, "Prediction failed");
                self.view
                    .alert(&failure_message(self.predictor.backend_port()));
                Err(e)
            }
        }
    }

    /// Clear every field and hide the result panel. No network traffic.
    pub async fn reset(&self) {
        self.fields.write().await.clear();
        self.view.clear_fields();
        self.view.set_result_panel(false);
        tracing::debug!("Form reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::test_support::StubBackend;
    use crate::prediction::{ClientConfig, PredictionClient, PredictionResponse};
    use crate::verdict::Verdict;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use tokio::sync::Notify;

    /// View that records every call
    #[derive(Default)]
    struct RecordingView {
        loading: Mutex<bool>,
        panel: Mutex<bool>,
        rendered: Mutex<Vec<UiResult>>,
        alerts: Mutex<Vec<String>>,
        clears: Mutex<usize>,
        loading_history: Mutex<Vec<bool>>,
    }

    impl FormView for RecordingView {
        fn set_loading(&self, visible: bool) {
            *self.loading.lock().unwrap() = visible;
            self.loading_history.lock().unwrap().push(visible);
        }

        fn set_result_panel(&self, visible: bool) {
            *self.panel.lock().unwrap() = visible;
        }

        fn render_result(&self, result: &UiResult) {
            self.rendered.lock().unwrap().push(result.clone());
        }

        fn alert(&self, message: &str) {
            self.alerts.lock().unwrap().push(message.to_string());
        }

        fn clear_fields(&self) {
            *self.clears.lock().unwrap() += 1;
        }
    }

    impl RecordingView {
        fn loading(&self) -> bool {
            *self.loading.lock().unwrap()
        }

        fn panel(&self) -> bool {
            *self.panel.lock().unwrap()
        }

        fn alerts(&self) -> Vec<String> {
            self.alerts.lock().unwrap().clone()
        }
    }

    fn sample_form() -> FormValues {
        FormValues::new()
            .with(Field::Pregnancies, "2")
            .with(Field::Glucose, "120")
            .with(Field::BloodPressure, "70")
            .with(Field::SkinThickness, "20")
            .with(Field::Insulin, "80")
            .with(Field::Bmi, "28.5")
            .with(Field::DiabetesPedigreeFunction, "0.3")
            .with(Field::Age, "35")
    }

    async fn controller_for(stub: &StubBackend) -> FormController<RecordingView> {
        let client = PredictionClient::new(ClientConfig {
            base_url: stub.spawn().await,
            request_timeout: None,
        })
        .unwrap();
        let controller = FormController::new(Arc::new(client), RecordingView::default());
        controller.fill(sample_form()).await;
        controller
    }

    #[tokio::test]
    async fn test_submit_diabetic() {
        let stub = StubBackend::probability(0.72);
        let controller = controller_for(&stub).await;

        let result = controller.submit().await.unwrap();
        assert_eq!(result.label, "Diabetic");

        let view = controller.view();
        assert!(view.panel());
        assert!(!view.loading());
        assert_eq!(*view.loading_history.lock().unwrap(), vec![true, false]);
        assert_eq!(view.rendered.lock().unwrap()[0].verdict, Verdict::Diabetic);
        assert!(view.alerts().is_empty());
        assert_eq!(controller.phase(), Phase::Idle);

        let sent = &stub.received()[0].body;
        assert_eq!(sent["Pregnancies"], 2.0);
        assert_eq!(sent["DiabetesPedigreeFunction"], 0.3);
    }

    #[tokio::test]
    async fn test_submit_non_diabetic() {
        let stub = StubBackend::probability(0.40);
        let controller = controller_for(&stub).await;

        let result = controller.submit().await.unwrap();
        assert_eq!(result.label, "Non-Diabetic");
        assert!(controller.view().panel());
    }

    #[tokio::test]
    async fn test_submit_boundary_is_non_diabetic() {
        let stub = StubBackend::probability(0.5);
        let controller = controller_for(&stub).await;

        let result = controller.submit().await.unwrap();
        assert_eq!(result.verdict, Verdict::NonDiabetic);
    }

    #[tokio::test]
    async fn test_submit_server_error() {
        let stub = StubBackend::failing(StatusCode::INTERNAL_SERVER_ERROR);
        let controller = controller_for(&stub).await;

        let err = controller.submit().await.unwrap_err();
        assert!(err.is_request_failure());

        let view = controller.view();
        assert_eq!(
            view.alerts(),
            vec![failure_message(controller.predictor.backend_port())]
        );
        assert_eq!(view.alerts().len(), 1);
        assert!(!view.panel());
        assert!(!view.loading());
        assert!(view.rendered.lock().unwrap().is_empty());
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_submit_invalid_response_alerts_once() {
        let stub = StubBackend::raw(StatusCode::OK, r#"{"probability_diabetic": null}"#);
        let controller = controller_for(&stub).await;

        let err = controller.submit().await.unwrap_err();
        assert!(matches!(err, PredictionError::InvalidResponse(_)));
        assert_eq!(controller.view().alerts().len(), 1);
        assert!(!controller.view().panel());
        assert!(!controller.view().loading());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_panel() {
        let ok = StubBackend::probability(0.9);
        let controller = controller_for(&ok).await;
        controller.submit().await.unwrap();
        assert!(controller.view().panel());

        let failing: Arc<dyn Predictor> = Arc::new(AlwaysFails);
        let controller = FormController {
            predictor: failing,
            ..controller
        };
        controller.submit().await.unwrap_err();
        assert!(controller.view().panel());
        assert_eq!(controller.view().alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_reset() {
        let stub = StubBackend::probability(0.72);
        let controller = controller_for(&stub).await;
        controller.submit().await.unwrap();

        controller.reset().await;
        assert!(controller.values().await.is_empty());
        assert!(!controller.view().panel());
        assert_eq!(*controller.view().clears.lock().unwrap(), 1);

        // Reset from a fresh state behaves the same
        controller.reset().await;
        assert!(!controller.view().panel());
        assert_eq!(stub.received().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_message_port() {
        assert_eq!(
            failure_message(Some(8001)),
            "Error making prediction. Ensure Logistic Regression backend is running on port 8001."
        );
        assert!(!failure_message(None).contains("port"));
    }

    struct AlwaysFails;

    #[async_trait]
    impl Predictor for AlwaysFails {
        async fn predict(
            &self,
            _request: &PredictionRequest,
        ) -> PredictionResult<PredictionResponse> {
            Err(PredictionError::status(503))
        }

        fn backend_port(&self) -> Option<u16> {
            Some(8001)
        }
    }

    /// Holds every request until released
    struct Gated {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Predictor for Gated {
        async fn predict(
            &self,
            _request: &PredictionRequest,
        ) -> PredictionResult<PredictionResponse> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(PredictionResponse::with_probability(0.8))
        }

        fn backend_port(&self) -> Option<u16> {
            Some(8001)
        }
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_busy() {
        let gated = Arc::new(Gated {
            started: Notify::new(),
            release: Notify::new(),
        });
        let controller = Arc::new(FormController::new(
            gated.clone() as Arc<dyn Predictor>,
            RecordingView::default(),
        ));
        controller.fill(sample_form()).await;

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.submit().await })
        };

        gated.started.notified().await;
        assert_eq!(controller.phase(), Phase::Submitting);
        assert!(controller.view().loading());

        let second = controller.submit().await;
        assert!(matches!(second, Err(PredictionError::Busy)));
        assert!(controller.view().alerts().is_empty());

        gated.release.notify_one();
        let result = first.await.unwrap().unwrap();
        assert_eq!(result.verdict, Verdict::Diabetic);
        assert_eq!(controller.phase(), Phase::Idle);
        assert!(!controller.view().loading());
    }

    #[tokio::test]
    async fn test_dropped_submit_returns_to_idle() {
        let gated = Arc::new(Gated {
            started: Notify::new(),
            release: Notify::new(),
        });
        let controller = FormController::new(
            gated.clone() as Arc<dyn Predictor>,
            RecordingView::default(),
        );
        controller.fill(sample_form()).await;

        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            controller.submit(),
        )
        .await;
        assert!(timed_out.is_err());

        assert_eq!(controller.phase(), Phase::Idle);
        assert!(!controller.view().loading());
        assert!(controller.view().alerts().is_empty());

        gated.release.notify_one();
        let result = controller.submit().await.unwrap();
        assert_eq!(result.verdict, Verdict::Diabetic);
        assert_eq!(controller.phase(), Phase::Idle);
        assert!(!controller.view().loading());
    }
}
