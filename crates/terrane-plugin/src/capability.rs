//! The [`Algorithm`] and [`Action`] capability traits.
//!
//! Both follow a two-phase protocol. The first phase (`initialize` /
//! `init`) sees the project read-only and validates its inputs,
//! recording every problem in an [`ErrorReport`]. The second phase
//! (`execute` / `exec`) may mutate the project. A rejected first phase
//! therefore never leaves partial changes behind.

use terrane_core::CancelToken;
use terrane_model::Project;

use crate::error::{ActionError, AlgorithmError};
use crate::params::Parameters;
use crate::report::ErrorReport;

/// How an algorithm run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// Every node was visited.
    Completed {
        /// Nodes visited.
        visited: usize,
    },
    /// The cancel token fired between two nodes. Values already
    /// written remain.
    Cancelled {
        /// Nodes visited before cancellation.
        visited: usize,
    },
}

/// Result of a successful action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Non-fatal per-item problems (e.g. one property of a batch could
    /// not be swapped).
    pub warnings: Vec<String>,
}

impl ActionOutcome {
    /// An outcome with no warnings.
    pub fn done() -> Self {
        Self::default()
    }

    /// Whether the action completed without warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// A named computation over grid properties.
///
/// # Examples
///
/// ```
/// use terrane_core::CancelToken;
/// use terrane_model::{Project, ProjectConfig};
/// use terrane_plugin::{Algorithm, AlgorithmError, ErrorReport, Parameters, RunStatus};
///
/// #[derive(Default)]
/// struct CountGrids {
///     ready: bool,
/// }
///
/// impl Algorithm for CountGrids {
///     fn name(&self) -> &str {
///         "count_grids"
///     }
///
///     fn initialize(&mut self, _: &Parameters, _: &Project, _: &mut ErrorReport) -> bool {
///         self.ready = true;
///         true
///     }
///
///     fn execute(&mut self, project: &mut Project, _: &CancelToken) -> Result<RunStatus, AlgorithmError> {
///         Ok(RunStatus::Completed { visited: project.len() })
///     }
/// }
///
/// let mut project = Project::new(ProjectConfig::default()).unwrap();
/// let mut algo = CountGrids::default();
/// assert!(algo.initialize(&Parameters::new(), &project, &mut ErrorReport::new()));
/// let status = algo.execute(&mut project, &CancelToken::new()).unwrap();
/// assert_eq!(status, RunStatus::Completed { visited: 0 });
/// ```
pub trait Algorithm: Send {
    /// Registry key and display name.
    fn name(&self) -> &str;

    /// Validate `params` against `project`. Returns `false` (with the
    /// reasons in `errors`) if the algorithm cannot run.
    fn initialize(&mut self, params: &Parameters, project: &Project, errors: &mut ErrorReport)
        -> bool;

    /// Run over the project, checking `cancel` between node visits.
    fn execute(
        &mut self,
        project: &mut Project,
        cancel: &CancelToken,
    ) -> Result<RunStatus, AlgorithmError>;
}

/// A named, argument-string-driven project operation.
pub trait Action: Send {
    /// Registry key and display name.
    fn name(&self) -> &str;

    /// Parse and validate the `::`-separated `args` against `project`.
    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool;

    /// Apply the action.
    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError>;
}

/// Initialize and execute `algorithm` in one step.
pub fn run_algorithm(
    algorithm: &mut dyn Algorithm,
    params: &Parameters,
    project: &mut Project,
    cancel: &CancelToken,
) -> Result<RunStatus, AlgorithmError> {
    let mut errors = ErrorReport::new();
    if !algorithm.initialize(params, project, &mut errors) {
        return Err(AlgorithmError::InvalidParameters {
            name: algorithm.name().to_owned(),
            report: errors,
        });
    }
    algorithm.execute(project, cancel)
}

/// Initialize and execute `action` in one step.
pub fn run_action(
    action: &mut dyn Action,
    args: &str,
    project: &mut Project,
) -> Result<ActionOutcome, ActionError> {
    let mut errors = ErrorReport::new();
    if !action.init(args, project, &mut errors) {
        return Err(ActionError::InvalidArguments {
            name: action.name().to_owned(),
            report: errors,
        });
    }
    action.exec(project)
}
