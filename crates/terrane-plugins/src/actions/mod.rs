//! Object-management actions.
//!
//! Every action takes a `::`-separated argument string whose first item
//! names the grid it works on (except `new_cartesian_grid`, where it
//! names the grid to create, and `run_algorithm`). Arguments are parsed
//! and checked against the project in `init`, so `exec` only fails on
//! storage errors.

mod algorithm;
mod grids;
mod properties;
mod regions;

use std::str::FromStr;

use terrane_model::{Grid, Project};
use terrane_plugin::{ActionOutcome, ErrorReport};
use terrane_store::SwapReport;

pub use algorithm::RunAlgorithm;
pub use grids::{DeleteObjects, NewCartesianGrid};
pub use properties::{
    ClearPropertyValueFromProperty, ClearPropertyValueIf, CopyProperty, CreateIndicatorProperties, DeleteProperties,
    SwapProperties,
};
pub use regions::{
    DeleteRegions, MergeMode, MergeRegions, SetActiveRegion, SetRegionComplement, SetRegionFromCategories,
    SetRegionFromProperty,
};

/// Report a usage error unless at least `min` arguments were given.
fn check_arity(args: &[&str], min: usize, usage: &str, errors: &mut ErrorReport) -> bool {
    !errors.report(args.len() < min, "args", format!("usage: {usage}"))
}

/// The named grid, reporting it under `grid` if absent.
fn lookup_grid<'p>(project: &'p Project, name: &str, errors: &mut ErrorReport) -> Option<&'p Grid> {
    let grid = project.grid(name).ok();
    errors.report(grid.is_none(), "grid", format!("no grid named '{name}'"));
    grid
}

/// Report `name` under `field` if the grid has no such property.
fn check_property(grid: &Grid, name: &str, field: &str, errors: &mut ErrorReport) -> bool {
    !errors.report(
        !grid.properties().contains(name),
        field,
        format!("no property '{name}' on grid '{}'", grid.name()),
    )
}

/// Report `name` under `field` if the grid has no such region.
fn check_region(grid: &Grid, name: &str, field: &str, errors: &mut ErrorReport) -> bool {
    !errors.report(
        grid.region(name).is_err(),
        field,
        format!("no region '{name}' on grid '{}'", grid.name()),
    )
}

/// Parse `raw`, reporting it under `field` on failure.
fn parse_arg<T: FromStr>(raw: &str, field: &str, errors: &mut ErrorReport) -> Option<T> {
    let parsed = raw.parse().ok();
    errors.report(parsed.is_none(), field, format!("cannot parse '{raw}'"));
    parsed
}

/// One warning per property that did not change tier.
fn swap_outcome(report: &SwapReport) -> ActionOutcome {
    let mut warnings: Vec<String> = report
        .failures()
        .map(|(name, e)| format!("{name}: {e}"))
        .collect();
    warnings.extend(report.skipped.iter().map(|name| format!("{name}: skipped")));
    ActionOutcome { warnings }
}
