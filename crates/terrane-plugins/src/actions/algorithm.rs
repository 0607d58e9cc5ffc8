//! Launching registered algorithms by name.

use terrane_core::CancelToken;
use terrane_model::Project;
use terrane_plugin::{
    global, split_args, Action, ActionError, ActionOutcome, Algorithm, ErrorReport, Parameters,
    RunStatus,
};

/// `run_algorithm key::k1=v1::k2=v2...`
///
/// Resolves `key` in the process-wide algorithm registry and initializes
/// the algorithm during `init`, so a rejected parameter set never touches
/// the project.
///
/// The run observes the project's cancel token unless one was supplied
/// through [`RunAlgorithm::with_cancel`]. A cancelled run re-arms the
/// token it observed.
#[derive(Default)]
pub struct RunAlgorithm {
    cancel: Option<CancelToken>,
    algorithm: Option<Box<dyn Algorithm>>,
}

impl RunAlgorithm {
    /// Registry key.
    pub const NAME: &'static str = "run_algorithm";

    /// Registry factory.
    pub fn create(_: &str) -> Box<dyn Action> {
        Box::new(Self::default())
    }

    /// A run that observes `cancel` instead of the project's token.
    pub fn with_cancel(cancel: CancelToken) -> Self {
        Self {
            cancel: Some(cancel),
            algorithm: None,
        }
    }
}

impl std::fmt::Debug for RunAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunAlgorithm")
            .field("algorithm", &self.algorithm.as_ref().map(|a| a.name().to_owned()))
            .finish()
    }
}

impl Action for RunAlgorithm {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool {
        self.algorithm = None;
        let args = split_args(args);
        let Some((key, rest)) = args.split_first() else {
            errors.push("args", "usage: key::k1=v1::k2=v2...");
            return false;
        };
        let params = Parameters::from_assignments(rest.iter().copied(), errors);
        let mut algorithm = match global::algorithms().and_then(|r| r.create(key, "")) {
            Ok(algorithm) => algorithm,
            Err(e) => {
                errors.push("algorithm", e.to_string());
                return false;
            }
        };
        if !errors.is_empty() || !algorithm.initialize(&params, project, errors) {
            return false;
        }
        self.algorithm = Some(algorithm);
        true
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let mut algorithm = self.algorithm.take().ok_or_else(|| ActionError::NotInitialized {
            name: Self::NAME.to_owned(),
        })?;
        let cancel = self
            .cancel
            .clone()
            .unwrap_or_else(|| project.cancel_token().clone());
        let mut outcome = ActionOutcome::done();
        if let RunStatus::Cancelled { visited } = algorithm.execute(project, &cancel)? {
            cancel.reset();
            outcome
                .warnings
                .push(format!("{} cancelled after {visited} nodes", algorithm.name()));
        }
        Ok(outcome)
    }
}
