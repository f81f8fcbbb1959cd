//! Generate Baseline use case
//!
//! Captures a tool's `--help` output, fingerprints it, and writes the
//! baseline when the fingerprint differs from the one in the tool index.

use crate::config::CaptureParams;
use crate::ports::capturer::{CaptureRequest, Capturer};
use crate::ports::discovery::ToolDiscovery;
use crate::ports::tool_store::{StoreError, ToolStore};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use warden_domain::{CommandSequence, Fingerprint, ToolDefinition, ToolIndex, normalize_baseline};

/// Errors that can occur while generating one baseline
#[derive(Error, Debug)]
pub enum BaselineError {
    #[error("{program} is not installed; cannot capture help for {tool_id}")]
    NotInstalled { tool_id: String, program: String },

    #[error("Capturing help for {tool_id} failed with exit code {exit_code}")]
    CaptureFailed { tool_id: String, exit_code: i32 },

    #[error("Could not persist files for {tool_id}: {source}")]
    Store {
        tool_id: String,
        #[source]
        source: StoreError,
    },

    #[error("Worker for {tool_id} did not finish: {reason}")]
    Aborted { tool_id: String, reason: String },
}

impl BaselineError {
    pub fn tool_id(&self) -> &str {
        match self {
            BaselineError::NotInstalled { tool_id, .. }
            | BaselineError::CaptureFailed { tool_id, .. }
            | BaselineError::Store { tool_id, .. }
            | BaselineError::Aborted { tool_id, .. } => tool_id,
        }
    }
}

/// Whether the stored baseline had to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BaselineOutcome {
    UpToDate,
    Updated,
}

impl BaselineOutcome {
    pub fn as_str(&self) -> &str {
        match self {
            BaselineOutcome::UpToDate => "UP_TO_DATE",
            BaselineOutcome::Updated => "UPDATED",
        }
    }
}

impl fmt::Display for BaselineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one generate-or-verify run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaselineReport {
    pub tool_id: String,
    pub sequence: CommandSequence,
    pub outcome: BaselineOutcome,
    pub fingerprint: Fingerprint,
    /// Fingerprint the index held before this run
    pub previous: Option<Fingerprint>,
    pub skeleton_created: bool,
}

/// Shell command that prints the help text without invoking a pager.
///
/// Piping through `cat` makes stdout a pipe, which most pagers detect and
/// skip, while the tool itself still sees the pseudo-terminal on stderr.
/// The tool's own exit status is passed back over fd 4, so the script exits
/// with it instead of with `cat`'s.
pub fn help_command(sequence: &CommandSequence) -> Vec<String> {
    let quoted: Vec<String> = sequence.tokens().iter().map(|t| shell_escape(t)).collect();
    vec![
        "sh".to_string(),
        "-c".to_string(),
        format!(
            "exec 3>&1; status=$({{ {{ {} --help; echo $? >&4; }} | cat >&3 4>&-; }} 4>&1); exit ${{status:-1}}",
            quoted.join(" ")
        ),
    ]
}

fn shell_escape(s: &str) -> String {
    if !s.is_empty()
        && s.chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '/')
    {
        return s.to_string();
    }

    let mut escaped = String::with_capacity(s.len() + 4);
    escaped.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            escaped.push_str("'\\''");
        } else {
            escaped.push(ch);
        }
    }
    escaped.push('\'');
    escaped
}

/// Use case for generating or verifying a single baseline
pub struct GenerateBaselineUseCase<C: Capturer, S: ToolStore> {
    capturer: Arc<C>,
    store: Arc<S>,
    params: CaptureParams,
    discovery: Option<Arc<dyn ToolDiscovery>>,
}

impl<C: Capturer, S: ToolStore> GenerateBaselineUseCase<C, S> {
    pub fn new(capturer: Arc<C>, store: Arc<S>, params: CaptureParams) -> Self {
        Self {
            capturer,
            store,
            params,
            discovery: None,
        }
    }

    /// Refuse to capture tools `discovery` cannot resolve.
    pub fn with_discovery(mut self, discovery: Arc<dyn ToolDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Capture, fingerprint, and write the baseline if it differs from
    /// `current`. Does not touch the index; the caller applies the report.
    pub fn generate_or_verify(
        &self,
        sequence: &CommandSequence,
        current: Option<Fingerprint>,
    ) -> Result<BaselineReport, BaselineError> {
        let tool_id = sequence.tool_id();
        if let Some(discovery) = &self.discovery
            && !discovery.is_available(sequence.tool_name())
        {
            return Err(BaselineError::NotInstalled {
                tool_id,
                program: sequence.tool_name().to_string(),
            });
        }

        debug!("Capturing help for {}", tool_id);

        let request = CaptureRequest::new(
            help_command(sequence),
            self.params.rows,
            self.params.cols,
            self.params.timeout,
        );
        let result = self.capturer.capture(&request);
        if result.exit_code != 0 {
            return Err(BaselineError::CaptureFailed {
                tool_id,
                exit_code: result.exit_code,
            });
        }

        let text = normalize_baseline(&String::from_utf8_lossy(&result.stdout));
        let fingerprint = Fingerprint::of_text(&text);

        let outcome = if current == Some(fingerprint) {
            debug!("{} is up to date ({})", tool_id, fingerprint);
            BaselineOutcome::UpToDate
        } else {
            self.store
                .write_baseline(&tool_id, &text)
                .map_err(|source| BaselineError::Store {
                    tool_id: tool_id.clone(),
                    source,
                })?;
            info!(
                "Baseline for {} updated: {} -> {}",
                tool_id,
                current.map_or_else(|| "none".to_string(), |c| c.to_string()),
                fingerprint
            );
            BaselineOutcome::Updated
        };

        let skeleton_created = self
            .store
            .ensure_skeleton(&ToolDefinition::skeleton(sequence.clone()))
            .map_err(|source| BaselineError::Store {
                tool_id: tool_id.clone(),
                source,
            })?;
        if skeleton_created {
            info!("Created skeleton definition for {}", tool_id);
        }

        Ok(BaselineReport {
            tool_id,
            sequence: sequence.clone(),
            outcome,
            fingerprint,
            previous: current,
            skeleton_created,
        })
    }

    /// Lookup, generate, and record in one step.
    pub fn generate_or_verify_in(
        &self,
        sequence: &CommandSequence,
        index: &mut ToolIndex,
    ) -> Result<BaselineReport, BaselineError> {
        let report = self.generate_or_verify(sequence, index.lookup(sequence))?;
        if report.outcome == BaselineOutcome::Updated {
            index.record(sequence, report.fingerprint);
        }
        Ok(report)
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use crate::ports::capturer::CaptureError;
    use crate::ports::tool_store::LoadedDefinitions;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use warden_domain::CaptureResult;

    /// Returns canned output per tool, keyed by the shell script.
    #[derive(Default)]
    pub struct FakeCapturer {
        pub outputs: Mutex<BTreeMap<String, (Vec<u8>, i32)>>,
        pub calls: Mutex<Vec<Vec<String>>>,
    }

    impl FakeCapturer {
        pub fn with(self, tokens: &[&str], output: &str, exit_code: i32) -> Self {
            let seq = CommandSequence::new(tokens.iter().copied()).unwrap();
            self.outputs
                .lock()
                .unwrap()
                .insert(help_command(&seq)[2].clone(), (output.as_bytes().to_vec(), exit_code));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Capturer for FakeCapturer {
        fn try_capture(&self, request: &CaptureRequest) -> Result<CaptureResult, CaptureError> {
            self.calls.lock().unwrap().push(request.command.clone());
            match self.outputs.lock().unwrap().get(&request.command[2]) {
                Some((bytes, code)) => Ok(CaptureResult::new(bytes.clone(), *code)),
                None => Err(CaptureError::Spawn {
                    program: request.command[2].clone(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                }),
            }
        }
    }

    /// In-memory store; `read_only` makes every write fail.
    #[derive(Default)]
    pub struct MemoryStore {
        pub baselines: Mutex<BTreeMap<String, String>>,
        pub skeletons: Mutex<BTreeMap<String, ToolDefinition>>,
        pub definitions: Vec<ToolDefinition>,
        pub read_only: Vec<String>,
    }

    impl MemoryStore {
        pub fn with_definitions(definitions: Vec<ToolDefinition>) -> Self {
            Self {
                definitions,
                ..Self::default()
            }
        }

        pub fn baseline_writes(&self) -> usize {
            self.baselines.lock().unwrap().len()
        }
    }

    impl ToolStore for MemoryStore {
        fn load_definitions(&self) -> LoadedDefinitions {
            LoadedDefinitions {
                definitions: self.definitions.clone(),
                errors: Vec::new(),
            }
        }

        fn write_baseline(&self, tool_id: &str, text: &str) -> Result<PathBuf, StoreError> {
            let path = PathBuf::from(format!("{}.txt", tool_id));
            if self.read_only.iter().any(|id| id == tool_id) {
                return Err(StoreError::io(
                    path,
                    std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                ));
            }
            self.baselines
                .lock()
                .unwrap()
                .insert(tool_id.to_string(), text.to_string());
            Ok(path)
        }

        fn ensure_skeleton(&self, definition: &ToolDefinition) -> Result<bool, StoreError> {
            let mut skeletons = self.skeletons.lock().unwrap();
            let tool_id = definition.tool_id();
            if skeletons.contains_key(&tool_id) {
                return Ok(false);
            }
            skeletons.insert(tool_id, definition.clone());
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::{FakeCapturer, MemoryStore};
    use super::*;

    fn seq(tokens: &[&str]) -> CommandSequence {
        CommandSequence::new(tokens.iter().copied()).unwrap()
    }

    fn use_case(
        capturer: FakeCapturer,
        store: MemoryStore,
    ) -> (
        GenerateBaselineUseCase<FakeCapturer, MemoryStore>,
        Arc<FakeCapturer>,
        Arc<MemoryStore>,
    ) {
        let capturer = Arc::new(capturer);
        let store = Arc::new(store);
        let uc = GenerateBaselineUseCase::new(
            Arc::clone(&capturer),
            Arc::clone(&store),
            CaptureParams::default(),
        );
        (uc, capturer, store)
    }

    #[test]
    fn test_help_command_bypasses_pager() {
        let command = help_command(&seq(&["git", "log"]));
        assert_eq!(command[..2], ["sh", "-c"]);
        assert!(command[2].contains("{ git log --help; echo $? >&4; } | cat >&3"));
        assert!(command[2].ends_with("exit ${status:-1}"));
        assert!(help_command(&seq(&["it's"]))[2].contains("{ 'it'\\''s' --help;"));
    }

    #[test]
    fn test_new_tool_is_updated_and_recorded() {
        let (uc, _, store) = use_case(
            FakeCapturer::default().with(&["ruff"], "usage: ruff\r\n\r\n", 0),
            MemoryStore::default(),
        );
        let mut index = ToolIndex::new();

        let report = uc.generate_or_verify_in(&seq(&["ruff"]), &mut index).unwrap();

        assert_eq!(report.outcome, BaselineOutcome::Updated);
        assert!(report.skeleton_created);
        assert_eq!(report.previous, None);
        assert_eq!(index.lookup(&seq(&["ruff"])), Some(report.fingerprint));
        assert_eq!(
            store.baselines.lock().unwrap().get("ruff").map(String::as_str),
            Some("usage: ruff\n")
        );
        let skeleton = store.skeletons.lock().unwrap().get("ruff").cloned().unwrap();
        assert!(skeleton.metadata.ground_truth_crc.is_unverified());
    }

    #[test]
    fn test_unchanged_output_is_up_to_date_with_zero_writes() {
        let (uc, _, store) = use_case(
            FakeCapturer::default().with(&["ruff"], "usage: ruff\n", 0),
            MemoryStore::default(),
        );
        let mut index = ToolIndex::new();
        uc.generate_or_verify_in(&seq(&["ruff"]), &mut index).unwrap();
        store.baselines.lock().unwrap().clear();

        let report = uc.generate_or_verify_in(&seq(&["ruff"]), &mut index).unwrap();

        assert_eq!(report.outcome, BaselineOutcome::UpToDate);
        assert!(!report.skeleton_created);
        assert_eq!(store.baseline_writes(), 0);
    }

    #[test]
    fn test_drift_is_detected() {
        let (uc, _, _) = use_case(
            FakeCapturer::default().with(&["ruff"], "usage: ruff v2\n", 0),
            MemoryStore::default(),
        );
        let old = Fingerprint::of_baseline("usage: ruff v1\n");
        let report = uc.generate_or_verify(&seq(&["ruff"]), Some(old)).unwrap();
        assert_eq!(report.outcome, BaselineOutcome::Updated);
        assert_eq!(report.previous, Some(old));
    }

    #[test]
    fn test_subcommand_recorded_under_base_tool() {
        let (uc, _, _) = use_case(
            FakeCapturer::default().with(&["git", "commit"], "usage: git commit\n", 0),
            MemoryStore::default(),
        );
        let mut index = ToolIndex::new();
        uc.generate_or_verify_in(&seq(&["git", "commit"]), &mut index)
            .unwrap();

        let base = index.get("git").unwrap();
        assert!(base.crc.is_none());
        assert!(base.subcommands.contains_key("git_commit"));
    }

    #[test]
    fn test_nonzero_exit_fails_for_that_tool() {
        let (uc, _, store) = use_case(
            FakeCapturer::default().with(&["bad"], "oops", 2),
            MemoryStore::default(),
        );
        let err = uc.generate_or_verify(&seq(&["bad"]), None).unwrap_err();
        assert!(matches!(
            err,
            BaselineError::CaptureFailed { ref tool_id, exit_code: 2 } if tool_id == "bad"
        ));
        assert_eq!(store.baseline_writes(), 0);
    }

    #[test]
    fn test_capture_error_reported_as_sentinel() {
        let (uc, _, _) = use_case(FakeCapturer::default(), MemoryStore::default());
        let err = uc.generate_or_verify(&seq(&["missing"]), None).unwrap_err();
        assert!(matches!(err, BaselineError::CaptureFailed { exit_code: -1, .. }));
    }

    #[test]
    fn test_write_failure_is_store_error() {
        let store = MemoryStore {
            read_only: vec!["ruff".to_string()],
            ..MemoryStore::default()
        };
        let (uc, _, _) = use_case(FakeCapturer::default().with(&["ruff"], "usage\n", 0), store);
        let err = uc.generate_or_verify(&seq(&["ruff"]), None).unwrap_err();
        assert!(matches!(err, BaselineError::Store { .. }));
        assert_eq!(err.tool_id(), "ruff");
    }

    struct OnlyInstalled(&'static [&'static str]);

    impl ToolDiscovery for OnlyInstalled {
        fn discover(&self) -> std::collections::BTreeSet<String> {
            self.0.iter().map(|s| s.to_string()).collect()
        }
    }

    #[test]
    fn test_uninstalled_tool_is_never_captured() {
        let capturer = Arc::new(FakeCapturer::default().with(&["git", "log"], "usage\n", 0));
        let store = Arc::new(MemoryStore::default());
        let uc = GenerateBaselineUseCase::new(
            Arc::clone(&capturer),
            Arc::clone(&store),
            CaptureParams::default(),
        )
        .with_discovery(Arc::new(OnlyInstalled(&["ruff"])));

        let err = uc.generate_or_verify(&seq(&["git", "log"]), None).unwrap_err();

        assert!(matches!(
            err,
            BaselineError::NotInstalled { ref tool_id, ref program }
                if tool_id == "git_log" && program == "git"
        ));
        assert_eq!(capturer.call_count(), 0);
        assert_eq!(store.baseline_writes(), 0);
    }
}
