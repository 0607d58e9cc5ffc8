//! Moving average: each node takes the mean of the informed values in its
//! search ellipsoid.

use terrane_core::{CancelToken, PropertyKind};
use terrane_model::{ModelError, Project};
use terrane_plugin::{Algorithm, AlgorithmError, ErrorReport, Parameters, RunStatus};
use terrane_search::{NeighborhoodParams, SearchError};
use tracing::{debug, info};

/// Registry key.
pub const NAME: &str = "moving_average";

/// Neighbor cap used when `max_size` is not given.
pub const DEFAULT_MAX_SIZE: usize = 100_000;

#[derive(Clone, Debug)]
struct Setup {
    grid: String,
    property: String,
    output: String,
    params: NeighborhoodParams,
}

/// Smooths `property` into a new `output` property.
///
/// Parameters:
///
/// | key        | meaning                                         |
/// |------------|-------------------------------------------------|
/// | `grid`     | grid to work on                                 |
/// | `property` | input property                                  |
/// | `output`   | output name (suffixed `_1`, `_2`, ... if taken) |
/// | `ranges`   | three ellipsoid ranges                          |
/// | `angles`   | azimuth, dip, rake in degrees (default `0 0 0`) |
/// | `max_size` | neighbor cap (default 100000)                   |
///
/// The query node counts as its own neighbor. Nodes with no informed
/// neighbor keep the no-data value. Only the grid's active nodes are
/// visited.
#[derive(Debug, Default)]
pub struct MovingAverage {
    setup: Option<Setup>,
}

impl MovingAverage {
    /// Registry factory.
    pub fn create(_: &str) -> Box<dyn Algorithm> {
        Box::new(Self::default())
    }
}

impl Algorithm for MovingAverage {
    fn name(&self) -> &str {
        NAME
    }

    fn initialize(&mut self, params: &Parameters, project: &Project, errors: &mut ErrorReport) -> bool {
        self.setup = None;
        let grid = params.require("grid", errors);
        let property = params.require("property", errors);
        let output = params.require("output", errors);
        let ranges = params.triple("ranges", errors);
        let angles = match params.get("angles") {
            Some(_) => params.triple("angles", errors),
            None => Some([0.0; 3]),
        };
        let max_size = params.parse_or("max_size", DEFAULT_MAX_SIZE, errors);

        if let Some(name) = grid {
            match project.grid(name) {
                Ok(g) => {
                    if let Some(p) = property {
                        errors.report(
                            !g.properties().contains(p),
                            "property",
                            "no such property in selected grid",
                        );
                    }
                }
                Err(e) => errors.push("grid", e.to_string()),
            }
        }

        let (Some(ranges), Some(angles), Some(max_size)) = (ranges, angles, max_size) else {
            return false;
        };
        let search = NeighborhoodParams::new(ranges)
            .with_angles(angles)
            .with_max_size(max_size)
            .with_center(true);
        match search.validate() {
            Ok(()) => {}
            Err(e @ SearchError::InvalidAngle { .. }) => errors.push("angles", e.to_string()),
            Err(e) => errors.push("ranges", e.to_string()),
        }

        if !errors.is_empty() {
            return false;
        }
        let (Some(grid), Some(property), Some(output)) = (grid, property, output) else {
            return false;
        };
        self.setup = Some(Setup {
            grid: grid.to_owned(),
            property: property.to_owned(),
            output: output.to_owned(),
            params: search,
        });
        true
    }

    fn execute(&mut self, project: &mut Project, cancel: &CancelToken) -> Result<RunStatus, AlgorithmError> {
        let setup = self.setup.clone().ok_or_else(|| AlgorithmError::NotInitialized {
            name: NAME.to_owned(),
        })?;

        let grid = project.grid_mut(&setup.grid)?;
        let (output_name, output) = grid
            .properties_mut()
            .add_unique(&setup.output, PropertyKind::Numeric)
            .map_err(ModelError::from)?;
        grid.select_property(&output_name)?;
        debug!(grid = %setup.grid, output = %output_name, "created moving average output");

        let grid = &*grid;
        let mut hood = grid.neighborhood(setup.params)?;
        hood.select_property(&setup.property).map_err(ModelError::from)?;

        let mut visited = 0;
        for node in grid.active_nodes() {
            if cancel.is_cancelled() {
                info!(grid = %setup.grid, output = %output_name, visited, "moving average cancelled");
                return Ok(RunStatus::Cancelled { visited });
            }
            hood.find_neighbors(node).map_err(ModelError::from)?;
            visited += 1;
            if hood.is_empty() {
                continue;
            }
            let sum: f64 = hood.iter().map(|n| f64::from(n.value)).sum();
            let mean = (sum / hood.size() as f64) as f32;
            output.set_value(node, mean).map_err(ModelError::from)?;
        }
        info!(grid = %setup.grid, output = %output_name, visited, "moving average finished");
        Ok(RunStatus::Completed { visited })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrane_core::{NodeId, NO_DATA_VALUE};
    use terrane_model::ProjectConfig;
    use terrane_space::{CartesianGrid, Region};
    use terrane_store::StoreConfig;

    fn project_with(values: Vec<f32>) -> Project {
        project_with_config(values, ProjectConfig::default())
    }

    fn project_with_config(values: Vec<f32>, config: ProjectConfig) -> Project {
        let mut project = Project::new(config).unwrap();
        let n = values.len() as u32;
        project
            .add_grid("g", CartesianGrid::with_unit_cells([n, 1, 1]).unwrap())
            .unwrap()
            .add_property("p")
            .unwrap()
            .replace_values(values)
            .unwrap();
        project
    }

    fn params(output: &str) -> Parameters {
        Parameters::new()
            .with("grid", "g")
            .with("property", "p")
            .with("output", output)
            .with("ranges", "1 1 1")
    }

    fn run(project: &mut Project, params: &Parameters) -> RunStatus {
        let mut algo = MovingAverage::default();
        let mut errors = ErrorReport::new();
        assert!(algo.initialize(params, project, &mut errors), "{errors}");
        algo.execute(project, &CancelToken::new()).unwrap()
    }

    fn values(project: &Project, name: &str) -> Vec<f32> {
        project.grid("g").unwrap().property(name).unwrap().to_vec().unwrap()
    }

    #[test]
    fn averages_include_the_center() {
        let mut project = project_with(vec![1.0, 2.0, 3.0]);
        assert_eq!(run(&mut project, &params("avg")), RunStatus::Completed { visited: 3 });
        assert_eq!(values(&project, "avg"), vec![1.5, 2.0, 2.5]);
        assert_eq!(project.grid("g").unwrap().selected_property(), Some("avg"));
    }

    #[test]
    fn one_property_budget_holds_while_smoothing() {
        let config = ProjectConfig {
            store: StoreConfig::with_budget(20),
            ..ProjectConfig::default()
        };
        let mut project = project_with_config(vec![1.0, 2.0, 3.0, 4.0, 5.0], config);
        assert_eq!(run(&mut project, &params("avg")), RunStatus::Completed { visited: 5 });

        let store = project.grid("g").unwrap().properties();
        assert!(store.budget().resident_bytes() <= 20);
        assert_eq!(values(&project, "avg"), vec![1.5, 2.0, 3.0, 4.0, 4.5]);
        assert_eq!(values(&project, "p"), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(store.budget().resident_bytes() <= 20);
    }

    #[test]
    fn isolated_nodes_stay_no_data() {
        let mut project = project_with(vec![1.0, NO_DATA_VALUE, NO_DATA_VALUE, NO_DATA_VALUE, 5.0]);
        run(&mut project, &params("avg"));
        let avg = values(&project, "avg");
        assert_eq!(avg[1], 1.0);
        assert_eq!(avg[2].to_bits(), NO_DATA_VALUE.to_bits());
        assert_eq!(avg[3], 5.0);
    }

    #[test]
    fn taken_output_name_gets_a_suffix() {
        let mut project = project_with(vec![1.0, 1.0]);
        run(&mut project, &params("p"));
        assert!(project.grid("g").unwrap().properties().contains("p_1"));
        assert_eq!(values(&project, "p_1"), vec![1.0, 1.0]);
    }

    #[test]
    fn only_active_nodes_are_written() {
        let mut project = project_with(vec![2.0, 4.0, 6.0]);
        let grid = project.grid_mut("g").unwrap();
        grid.add_region("first", Region::from_nodes(3, [NodeId(0)]).unwrap())
            .unwrap();
        grid.select_region("first").unwrap();
        assert_eq!(run(&mut project, &params("avg")), RunStatus::Completed { visited: 1 });
        let avg = values(&project, "avg");
        assert_eq!(avg[0], 3.0);
        assert_eq!(avg[1].to_bits(), NO_DATA_VALUE.to_bits());
    }

    #[test]
    fn cancellation_stops_between_nodes() {
        let mut project = project_with(vec![1.0; 4]);
        let mut algo = MovingAverage::default();
        assert!(algo.initialize(&params("avg"), &project, &mut ErrorReport::new()));
        let cancel = CancelToken::new();
        cancel.cancel();
        let status = algo.execute(&mut project, &cancel).unwrap();
        assert_eq!(status, RunStatus::Cancelled { visited: 0 });
        assert_eq!(
            project.grid("g").unwrap().property("avg").unwrap().informed_count().unwrap(),
            0
        );
    }

    #[test]
    fn invalid_parameters_are_all_reported() {
        let project = project_with(vec![1.0]);
        let mut algo = MovingAverage::default();
        let mut errors = ErrorReport::new();
        let params = Parameters::new()
            .with("grid", "g")
            .with("property", "missing")
            .with("ranges", "1 0 1");
        assert!(!algo.initialize(&params, &project, &mut errors));
        assert!(errors.has_field("output"));
        assert!(errors.has_field("property"));
        assert!(errors.has_field("ranges"));
        assert!(matches!(
            algo.execute(&mut project_with(vec![1.0]), &CancelToken::new()),
            Err(AlgorithmError::NotInitialized { .. })
        ));
    }

    #[test]
    fn unknown_grid_is_reported() {
        let project = project_with(vec![1.0]);
        let mut errors = ErrorReport::new();
        let params = params("avg").with("grid", "nope");
        assert!(!MovingAverage::default().initialize(&params, &project, &mut errors));
        assert!(errors.has_field("grid"));
    }
}
