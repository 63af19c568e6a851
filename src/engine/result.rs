//! Stage and run result types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The three gated stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Authenticate,
    Publish,
    Retrieve,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Authenticate, Stage::Publish, Stage::Retrieve];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Authenticate => "authenticate",
            Stage::Publish => "publish",
            Stage::Retrieve => "retrieve",
        }
    }

    /// Capitalized name used in the summary
    pub fn title(&self) -> &'static str {
        match self {
            Stage::Authenticate => "Authenticate",
            Stage::Publish => "Publish",
            Stage::Retrieve => "Retrieve",
        }
    }

    fn index(&self) -> usize {
        match self {
            Stage::Authenticate => 0,
            Stage::Publish => 1,
            Stage::Retrieve => 2,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Passed,
    Failed,
    /// Not attempted because the preceding stage did not pass
    Skipped,
}

/// Outcome of one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageResult {
    pub stage: Stage,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    pub duration_ms: u64,
}

impl StageResult {
    pub fn passed(stage: Stage, duration_ms: u64) -> Self {
        Self {
            stage,
            status: StageStatus::Passed,
            diagnostic: None,
            duration_ms,
        }
    }

    pub fn failed(stage: Stage, diagnostic: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            stage,
            status: StageStatus::Failed,
            diagnostic: Some(diagnostic.into()),
            duration_ms,
        }
    }

    pub fn skipped(stage: Stage) -> Self {
        Self {
            stage,
            status: StageStatus::Skipped,
            diagnostic: None,
            duration_ms: 0,
        }
    }

    pub fn success(&self) -> bool {
        self.status == StageStatus::Passed
    }
}

/// Per-stage results of a completed run, in execution order
#[derive(Debug, Clone, Serialize)]
pub struct ResultTable {
    run_id: String,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    stages: [StageResult; 3],
}

impl ResultTable {
    /// Assemble the table; each result must belong to the slot it is passed in
    pub fn new(
        run_id: impl Into<String>,
        started_at: DateTime<Utc>,
        authenticate: StageResult,
        publish: StageResult,
        retrieve: StageResult,
    ) -> Self {
        debug_assert_eq!(authenticate.stage, Stage::Authenticate);
        debug_assert_eq!(publish.stage, Stage::Publish);
        debug_assert_eq!(retrieve.stage, Stage::Retrieve);

        Self {
            run_id: run_id.into(),
            started_at,
            finished_at: Utc::now(),
            stages: [authenticate, publish, retrieve],
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn get(&self, stage: Stage) -> &StageResult {
        &self.stages[stage.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageResult> {
        self.stages.iter()
    }

    /// True only when every stage passed
    pub fn success(&self) -> bool {
        self.stages.iter().all(StageResult::success)
    }

    pub fn exit_code(&self) -> u8 {
        if self.success() {
            0
        } else {
            1
        }
    }
}
