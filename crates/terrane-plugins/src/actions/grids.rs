//! Grid creation and deletion.

use terrane_model::Project;
use terrane_plugin::{split_args, Action, ActionError, ActionOutcome, ErrorReport};
use terrane_space::CartesianGrid;
use tracing::info;

use super::{check_arity, parse_arg};

/// `new_cartesian_grid name::nx::ny::nz[::sx::sy::sz[::ox::oy::oz]]`
///
/// Spacing defaults to 1 and origin to 0 on every axis.
#[derive(Debug, Default)]
pub struct NewCartesianGrid {
    pending: Option<(String, CartesianGrid)>,
}

impl NewCartesianGrid {
    /// Registry key.
    pub const NAME: &'static str = "new_cartesian_grid";
    const USAGE: &'static str = "name::nx::ny::nz[::sx::sy::sz[::ox::oy::oz]]";

    /// Registry factory.
    pub fn create(_: &str) -> Box<dyn Action> {
        Box::new(Self::default())
    }
}

impl Action for NewCartesianGrid {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool {
        self.pending = None;
        let args = split_args(args);
        if !check_arity(&args, 4, Self::USAGE, errors) {
            return false;
        }
        if errors.report(
            !matches!(args.len(), 4 | 7 | 10),
            "args",
            format!("usage: {}", Self::USAGE),
        ) {
            return false;
        }
        let name = args[0];
        errors.report(name.is_empty(), "name", "grid name is empty");
        errors.report(
            project.contains_grid(name),
            "name",
            format!("grid '{name}' already exists"),
        );

        let mut dims = [0u32; 3];
        let mut spacing = [1.0f64; 3];
        let mut origin = [0.0f64; 3];
        for axis in 0..3 {
            if let Some(v) = parse_arg(args[1 + axis], "dims", errors) {
                dims[axis] = v;
            }
            if let Some(raw) = args.get(4 + axis) {
                if let Some(v) = parse_arg(raw, "spacing", errors) {
                    spacing[axis] = v;
                }
            }
            if let Some(raw) = args.get(7 + axis) {
                if let Some(v) = parse_arg(raw, "origin", errors) {
                    origin[axis] = v;
                }
            }
        }
        if !errors.is_empty() {
            return false;
        }
        match CartesianGrid::new(dims, spacing, origin) {
            Ok(geometry) => {
                self.pending = Some((name.to_owned(), geometry));
                true
            }
            Err(e) => {
                errors.push("dims", e.to_string());
                false
            }
        }
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let (name, geometry) = self.pending.take().ok_or_else(|| ActionError::NotInitialized {
            name: Self::NAME.to_owned(),
        })?;
        project.add_grid(&name, geometry)?;
        Ok(ActionOutcome::done())
    }
}

/// `delete_objects g1::g2...`
///
/// Missing grids produce a warning; the others are still deleted.
#[derive(Debug, Default)]
pub struct DeleteObjects {
    names: Option<Vec<String>>,
}

impl DeleteObjects {
    /// Registry key.
    pub const NAME: &'static str = "delete_objects";

    /// Registry factory.
    pub fn create(_: &str) -> Box<dyn Action> {
        Box::new(Self::default())
    }
}

impl Action for DeleteObjects {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, args: &str, _: &Project, errors: &mut ErrorReport) -> bool {
        let args = split_args(args);
        if !check_arity(&args, 1, "g1::g2...", errors) {
            return false;
        }
        self.names = Some(args.into_iter().map(str::to_owned).collect());
        true
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let names = self.names.take().ok_or_else(|| ActionError::NotInitialized {
            name: Self::NAME.to_owned(),
        })?;
        let mut outcome = ActionOutcome::done();
        for name in &names {
            if let Err(e) = project.remove_grid(name) {
                outcome.warnings.push(e.to_string());
            }
        }
        info!(requested = names.len(), missing = outcome.warnings.len(), "deleted grids");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{project_with, run};
    use terrane_model::ProjectConfig;
    use terrane_space::{Geometry, GeometryDescriptor};

    #[test]
    fn creates_grid_with_defaults_and_overrides() {
        let mut project = Project::new(ProjectConfig::default()).unwrap();
        run(NewCartesianGrid::default(), "a::2::3::4", &mut project).unwrap();
        run(
            NewCartesianGrid::default(),
            "b::2::2::1::10::10::5::100::200::0",
            &mut project,
        )
        .unwrap();
        assert_eq!(project.grid("a").unwrap().node_count(), 24);
        let b = project.grid("b").unwrap();
        assert_eq!(
            b.geometry().descriptor(),
            GeometryDescriptor::Cartesian {
                dims: [2, 2, 1],
                spacing: [10.0, 10.0, 5.0],
                origin: [100.0, 200.0, 0.0],
            }
        );
    }

    #[test]
    fn rejects_bad_grid_arguments() {
        let mut project = Project::new(ProjectConfig::default()).unwrap();
        for args in ["a::2::2", "a::2::2::1::1", "a::x::2::1", "a::0::2::1", "a::2::2::1::-1::1::1"] {
            let err = run(NewCartesianGrid::default(), args, &mut project).unwrap_err();
            assert!(matches!(err, ActionError::InvalidArguments { .. }), "{args}");
        }
        assert!(project.is_empty());
        run(NewCartesianGrid::default(), "a::1::1::1", &mut project).unwrap();
        assert!(run(NewCartesianGrid::default(), "a::1::1::1", &mut project).is_err());
    }

    #[test]
    fn delete_warns_about_missing_grids() {
        let mut project = project_with(vec![1.0]);
        let outcome = run(DeleteObjects::default(), "g::ghost", &mut project).unwrap();
        assert!(project.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
    }
}
