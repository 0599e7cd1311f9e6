//! Score aggregation and the signed report sent on "analyze".

use serde::{Deserialize, Serialize};
use sha2::Digest as _;

use crate::config::ScoringConfig;
use crate::controller::platform::DeviceInfo;
use crate::foundation::core::Viewport;
use crate::foundation::error::{BenchError, BenchResult};
use crate::stage::StageData;

/// Aggregated scores of one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub overall: i64,
    pub cpu: i64,
    pub fill_rate: i64,
    pub load_time: i64,
}

/// `numerator / total_load_secs`, truncated; zero when nothing was timed.
pub fn load_time_score(total_load_secs: f64, numerator: f64) -> i64 {
    if total_load_secs > 0.0 && total_load_secs.is_finite() {
        (numerator / total_load_secs) as i64
    } else {
        0
    }
}

impl Scoreboard {
    pub fn aggregate<'a>(
        stages: impl IntoIterator<Item = &'a StageData>,
        scoring: &ScoringConfig,
    ) -> Self {
        let mut board = Self::default();
        let mut total_load = 0.0f64;
        for data in stages {
            board.overall += data.score;
            board.cpu += data.cpu_score;
            board.fill_rate += data.fill_rate_score;
            total_load += f64::from(data.load_time);
        }
        board.load_time = load_time_score(total_load, scoring.load_time_numerator);
        board.overall += board.load_time;
        board
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceSection {
    pub platform: String,
    #[serde(flatten)]
    pub info: DeviceInfo,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Space separated feature tags the stages found missing.
    pub missing_features: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageEntry {
    pub name: String,
    #[serde(flatten)]
    pub data: StageData,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSection {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Random v4 UUID; lets the backend drop duplicate submissions.
    pub submit_id: String,
    pub version: String,
    pub device: DeviceSection,
    pub score: Scoreboard,
    pub stages: Vec<StageEntry>,
    pub user: UserSection,
}

impl ScoreReport {
    pub fn build<'a>(
        info: &DeviceInfo,
        viewport: Viewport,
        stages: impl IntoIterator<Item = (&'a str, &'a StageData)>,
        score: Scoreboard,
    ) -> Self {
        let stages: Vec<StageEntry> = stages
            .into_iter()
            .map(|(name, data)| StageEntry {
                name: name.to_string(),
                data: data.clone(),
            })
            .collect();
        let missing_features = stages
            .iter()
            .filter_map(|s| s.data.missing_features.as_deref())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            submit_id: uuid::Uuid::new_v4().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            device: DeviceSection {
                platform: std::env::consts::OS.to_string(),
                info: info.clone(),
                screen_width: viewport.width,
                screen_height: viewport.height,
                missing_features,
            },
            score,
            stages,
            user: UserSection::default(),
        }
    }

    pub fn to_json(&self) -> BenchResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BenchError::report(format!("encode score report: {e}")))
    }
}

/// Hex SHA-256 of `body` followed by `salt`.
pub fn sign(body: &str, salt: &str) -> String {
    let mut hasher = sha2::Sha256::new();
    hasher.update(body.as_bytes());
    hasher.update(salt.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Backend reply to a successful submission.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SubmitResponse {
    pub score_uuid: String,
    pub nonce: String,
}

impl SubmitResponse {
    pub fn parse(body: &str) -> BenchResult<Self> {
        serde_json::from_str(body)
            .map_err(|e| BenchError::report(format!("parse server response: {e}")))
    }

    /// Results page for this score under `view_url_prefix`.
    pub fn view_url(&self, view_url_prefix: &str) -> String {
        format!("{view_url_prefix}{}&nonce={}", self.score_uuid, self.nonce)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/controller/report.rs"]
mod tests;
