//! Workflow recording, stage timing, and structured run artifacts.

use crate::runtime::artifacts::ArtifactManager;
use crate::runtime::error::{XtaskError, XtaskResult};
use serde::Serialize;
use std::env;
use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize)]
struct StageRecord {
    name: String,
    started_unix_ms: u64,
    duration_ms: u128,
    status: &'static str,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct RunManifest<'a> {
    workflow: &'a str,
    started_unix_ms: u64,
    finished_unix_ms: u64,
    duration_ms: u128,
    status: &'static str,
    error: Option<String>,
    command: &'a str,
    failed_stages: usize,
    stages: &'a [StageRecord],
}

#[derive(Debug)]
struct ActiveRun {
    workflow: String,
    started_unix_ms: u64,
    started: Instant,
    manifest_path: PathBuf,
    events_path: PathBuf,
    command: String,
    stages: Vec<StageRecord>,
}

/// Shared workflow recorder service.
///
/// A run started with [`with_workflow_run`](Self::with_workflow_run) gets its own directory under
/// `.artifacts/automation/runs/` holding `events.jsonl` and `manifest.json`. Work nested in
/// [`stage`](Self::stage) is timed, echoed to the terminal, and recorded as stage events. Stages
/// outside a run are still timed and echoed.
#[derive(Clone, Debug)]
pub struct WorkflowRecorder {
    artifacts: ArtifactManager,
    active: Arc<Mutex<Option<ActiveRun>>>,
}

impl WorkflowRecorder {
    /// Create a recorder service.
    pub fn new(artifacts: ArtifactManager) -> Self {
        Self {
            artifacts,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Run a workflow with manifest and event recording.
    pub fn with_workflow_run<T, F>(&self, workflow: &str, action: F) -> XtaskResult<T>
    where
        F: FnOnce() -> XtaskResult<T>,
    {
        let run = self.begin(workflow)?;
        *self.lock()? = Some(run);

        let result = action();
        self.finish(result.as_ref().err())?;
        result
    }

    fn lock(&self) -> XtaskResult<std::sync::MutexGuard<'_, Option<ActiveRun>>> {
        self.active
            .lock()
            .map_err(|_| XtaskError::io("failed to lock workflow recorder"))
    }

    fn begin(&self, workflow: &str) -> XtaskResult<ActiveRun> {
        let started_unix_ms = unix_timestamp_millis();
        let run_dir = self
            .artifacts
            .automation_runs_dir()
            .join(format!("{started_unix_ms}-{workflow}"));
        self.artifacts.ensure_dir(&run_dir)?;

        let events_path = run_dir.join("events.jsonl");
        fs::write(&events_path, "").map_err(|err| {
            XtaskError::io(format!(
                "failed to initialize {}: {err}",
                events_path.display()
            ))
        })?;
        append_event(
            &events_path,
            serde_json::json!({
                "type": "workflow_started",
                "workflow": workflow,
                "timestamp_unix_ms": started_unix_ms
            }),
        )?;

        Ok(ActiveRun {
            workflow: workflow.to_string(),
            started_unix_ms,
            started: Instant::now(),
            manifest_path: run_dir.join("manifest.json"),
            events_path,
            command: env::args().collect::<Vec<_>>().join(" "),
            stages: Vec::new(),
        })
    }

    fn finish(&self, error: Option<&XtaskError>) -> XtaskResult<()> {
        let Some(run) = self.lock()?.take() else {
            return Ok(());
        };

        let finished_unix_ms = unix_timestamp_millis();
        let status = if error.is_none() { "ok" } else { "failed" };
        let error = error.map(ToString::to_string);
        append_event(
            &run.events_path,
            serde_json::json!({
                "type": "workflow_finished",
                "workflow": run.workflow,
                "timestamp_unix_ms": finished_unix_ms,
                "status": status,
                "error": error
            }),
        )?;

        let manifest = RunManifest {
            workflow: &run.workflow,
            started_unix_ms: run.started_unix_ms,
            finished_unix_ms,
            duration_ms: run.started.elapsed().as_millis(),
            status,
            error,
            command: &run.command,
            failed_stages: run.stages.iter().filter(|s| s.status != "ok").count(),
            stages: &run.stages,
        };
        let body = serde_json::to_string_pretty(&manifest)
            .map_err(|err| XtaskError::io(format!("failed to serialize run manifest: {err}")))?;
        fs::write(&run.manifest_path, body).map_err(|err| {
            XtaskError::io(format!(
                "failed to write {}: {err}",
                run.manifest_path.display()
            ))
        })?;
        println!("    run artifact: {}", run.manifest_path.display());
        Ok(())
    }

    /// Time a stage, echo it, and record it in the active run.
    ///
    /// The stage result is returned unchanged. Recording problems are reported as warnings
    /// because they must not change the outcome of the work being recorded.
    pub fn stage<T, E, F>(&self, name: &str, action: F) -> Result<T, E>
    where
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        println!("\n==> {name}");
        let started = Instant::now();
        let started_unix_ms = unix_timestamp_millis();
        self.record_event(serde_json::json!({
            "type": "stage_started",
            "name": name,
            "timestamp_unix_ms": started_unix_ms
        }));

        let result = action();
        let elapsed = started.elapsed();
        let stage = StageRecord {
            name: name.to_string(),
            started_unix_ms,
            duration_ms: elapsed.as_millis(),
            status: if result.is_ok() { "ok" } else { "failed" },
            error: result.as_ref().err().map(ToString::to_string),
        };
        println!(
            "    {} in {}",
            if result.is_ok() { "done" } else { "failed" },
            format_duration(elapsed)
        );
        self.record_stage(stage);
        result
    }

    fn record_event(&self, event: serde_json::Value) {
        let outcome = self.lock().and_then(|guard| match guard.as_ref() {
            Some(run) => append_event(&run.events_path, event),
            None => Ok(()),
        });
        if let Err(err) = outcome {
            self.warn(&format!("failed to record workflow event: {err}"));
        }
    }

    fn record_stage(&self, stage: StageRecord) {
        let outcome = self.lock().and_then(|mut guard| {
            let Some(run) = guard.as_mut() else {
                return Ok(());
            };
            append_event(
                &run.events_path,
                serde_json::json!({
                    "type": "stage_finished",
                    "name": stage.name,
                    "started_unix_ms": stage.started_unix_ms,
                    "duration_ms": stage.duration_ms,
                    "status": stage.status,
                    "error": stage.error
                }),
            )?;
            run.stages.push(stage);
            Ok(())
        });
        if let Err(err) = outcome {
            self.warn(&format!("failed to record workflow stage: {err}"));
        }
    }

    /// Print a warning using the shared workflow output style.
    pub fn warn(&self, message: &str) {
        println!("[warn] {message}");
    }
}

fn append_event(path: &Path, event: serde_json::Value) -> XtaskResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| XtaskError::io(format!("failed to open {}: {err}", path.display())))?;
    let line = serde_json::to_string(&event)
        .map_err(|err| XtaskError::io(format!("failed to serialize run event: {err}")))?;
    writeln!(&mut file, "{line}")
        .map_err(|err| XtaskError::io(format!("failed to append {}: {err}", path.display())))
}

/// Format a duration for human-readable terminal output.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();
    if secs >= 60 {
        format!("{}m {}.{millis:03}s", secs / 60, secs % 60)
    } else {
        format!("{secs}.{millis:03}s")
    }
}

fn unix_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
