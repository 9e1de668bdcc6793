//! HTTP client for an external flow-prediction service.
//!
//! The service answers `GET <endpoint>?node=<sensor>&time=<t>` with a JSON
//! body such as `{"volume": 23.4}`.  A 404 means the model does not know the
//! sensor; any other failure is reported as `Unavailable` so the planner can
//! abort the run instead of guessing a volume.

use std::time::Duration;

use serde::Deserialize;

use fr_core::{SensorId, TimePoint};

use crate::{FlowError, FlowOracle, FlowResult};

#[derive(Deserialize)]
struct PredictResponse {
    volume: f64,
}

/// A [`FlowOracle`] backed by a prediction HTTP endpoint.
pub struct HttpOracle {
    client:   reqwest::blocking::Client,
    endpoint: String,
}

impl HttpOracle {
    /// Create a client for `endpoint` (e.g. `http://127.0.0.1:5000/predict`)
    /// with a per-request `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> FlowResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FlowError::Http(e.to_string()))?;
        Ok(Self { client, endpoint: endpoint.into() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl FlowOracle for HttpOracle {
    fn estimate(&self, sensor: SensorId, time: TimePoint) -> FlowResult<f64> {
        let unavailable = |reason: String| FlowError::Unavailable { sensor, time, reason };

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("node", sensor.0), ("time", time.0)])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FlowError::UnknownSensor(sensor));
        }
        if !status.is_success() {
            return Err(unavailable(format!("HTTP status {status}")));
        }

        response
            .json::<PredictResponse>()
            .map(|body| body.volume)
            .map_err(|e| unavailable(format!("malformed response: {e}")))
    }
}
