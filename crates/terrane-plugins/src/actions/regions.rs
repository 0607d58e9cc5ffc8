//! Region selection, construction, and algebra.

use terrane_core::PropertyKind;
use terrane_model::{ModelError, Project};
use terrane_plugin::{split_args, Action, ActionError, ActionOutcome, ErrorReport};
use terrane_space::Region;

use super::{check_arity, check_property, check_region, lookup_grid, parse_arg};

fn not_initialized(name: &str) -> ActionError {
    ActionError::NotInitialized { name: name.to_owned() }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| (*s).to_owned()).collect()
}

/// `set_active_region g[::region]`
///
/// Without a region name, every node becomes active again.
#[derive(Debug, Default)]
pub struct SetActiveRegion {
    target: Option<(String, Option<String>)>,
}

impl SetActiveRegion {
    /// Registry key.
    pub const NAME: &'static str = "set_active_region";

    /// Registry factory.
    pub fn create(_: &str) -> Box<dyn Action> {
        Box::new(Self::default())
    }
}

impl Action for SetActiveRegion {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool {
        let args = split_args(args);
        if !check_arity(&args, 1, "grid[::region]", errors) {
            return false;
        }
        let Some(grid) = lookup_grid(project, args[0], errors) else {
            return false;
        };
        let region = args.get(1).filter(|r| !r.is_empty());
        if let Some(region) = region {
            if !check_region(grid, region, "region", errors) {
                return false;
            }
        }
        self.target = Some((args[0].to_owned(), region.map(|r| (*r).to_owned())));
        true
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let (grid, region) = self.target.take().ok_or_else(|| not_initialized(Self::NAME))?;
        let grid = project.grid_mut(&grid)?;
        match region {
            Some(region) => grid.select_region(&region)?,
            None => grid.clear_region_selection(),
        }
        Ok(ActionOutcome::done())
    }
}

/// `delete_regions g::r1::r2...`
#[derive(Debug, Default)]
pub struct DeleteRegions {
    target: Option<(String, Vec<String>)>,
}

impl DeleteRegions {
    /// Registry key.
    pub const NAME: &'static str = "delete_regions";

    /// Registry factory.
    pub fn create(_: &str) -> Box<dyn Action> {
        Box::new(Self::default())
    }
}

impl Action for DeleteRegions {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool {
        let args = split_args(args);
        if !check_arity(&args, 2, "grid::r1::r2...", errors) {
            return false;
        }
        if lookup_grid(project, args[0], errors).is_none() {
            return false;
        }
        self.target = Some((args[0].to_owned(), owned(&args[1..])));
        true
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let (grid, names) = self.target.take().ok_or_else(|| not_initialized(Self::NAME))?;
        let grid = project.grid_mut(&grid)?;
        let mut outcome = ActionOutcome::done();
        for name in &names {
            if let Err(e) = grid.remove_region(name) {
                outcome.warnings.push(e.to_string());
            }
        }
        Ok(outcome)
    }
}

/// `set_region_from_property g::p::region::min::max`
///
/// Creates or replaces `region` with the nodes whose informed value lies
/// in `min..=max`.
#[derive(Debug, Default)]
pub struct SetRegionFromProperty {
    target: Option<(String, String, String, f32, f32)>,
}

impl SetRegionFromProperty {
    /// Registry key.
    pub const NAME: &'static str = "set_region_from_property";

    /// Registry factory.
    pub fn create(_: &str) -> Box<dyn Action> {
        Box::new(Self::default())
    }
}

impl Action for SetRegionFromProperty {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool {
        let args = split_args(args);
        if !check_arity(&args, 5, "grid::property::region::min::max", errors) {
            return false;
        }
        if let Some(grid) = lookup_grid(project, args[0], errors) {
            check_property(grid, args[1], "property", errors);
        }
        errors.report(args[2].is_empty(), "region", "region name is empty");
        let min: Option<f32> = parse_arg(args[3], "min", errors);
        let max: Option<f32> = parse_arg(args[4], "max", errors);
        let (Some(min), Some(max)) = (min, max) else {
            return false;
        };
        errors.report(min > max, "min", "min is greater than max");
        if !errors.is_empty() {
            return false;
        }
        self.target = Some((args[0].to_owned(), args[1].to_owned(), args[2].to_owned(), min, max));
        true
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let (grid, property, region, min, max) =
            self.target.take().ok_or_else(|| not_initialized(Self::NAME))?;
        let grid = project.grid_mut(&grid)?;
        let mask = grid.region_from_property(&property, min, max)?;
        grid.set_region(&region, mask)?;
        Ok(ActionOutcome::done())
    }
}

/// `set_region_from_categorical_property g::p::region::c1::c2...`
///
/// Categories are given as numeric ids or, for categorical properties,
/// as labels.
#[derive(Debug, Default)]
pub struct SetRegionFromCategories {
    target: Option<(String, String, String, Vec<u32>)>,
}

impl SetRegionFromCategories {
    /// Registry key.
    pub const NAME: &'static str = "set_region_from_categorical_property";

    /// Registry factory.
    pub fn create(_: &str) -> Box<dyn Action> {
        Box::new(Self::default())
    }
}

impl Action for SetRegionFromCategories {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool {
        let args = split_args(args);
        if !check_arity(&args, 4, "grid::property::region::c1::c2...", errors) {
            return false;
        }
        let Some(grid) = lookup_grid(project, args[0], errors) else {
            return false;
        };
        let Ok(property) = grid.property(args[1]) else {
            check_property(grid, args[1], "property", errors);
            return false;
        };
        errors.report(args[2].is_empty(), "region", "region name is empty");

        let mut ids = Vec::with_capacity(args.len() - 3);
        for token in &args[3..] {
            let id = token.parse::<u32>().ok().or_else(|| match property.kind() {
                PropertyKind::Categorical(map) => map.id_of(token),
                PropertyKind::Numeric => None,
            });
            match id {
                Some(id) => ids.push(id),
                None => errors.push("categories", format!("unknown category '{token}'")),
            }
        }
        if !errors.is_empty() {
            return false;
        }
        self.target = Some((args[0].to_owned(), args[1].to_owned(), args[2].to_owned(), ids));
        true
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let (grid, property, region, ids) =
            self.target.take().ok_or_else(|| not_initialized(Self::NAME))?;
        let grid = project.grid_mut(&grid)?;
        let mask = grid.region_from_categories(&property, &ids)?;
        grid.set_region(&region, mask)?;
        Ok(ActionOutcome::done())
    }
}

/// How [`MergeRegions`] combines its inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeMode {
    /// Nodes in any input.
    Union,
    /// Nodes in every input.
    Intersection,
}

/// `merge_regions_union g::new::r1::r2...` and
/// `merge_regions_intersection g::new::r1::r2...`
#[derive(Debug)]
pub struct MergeRegions {
    mode: MergeMode,
    target: Option<(String, String, Vec<String>)>,
}

impl MergeRegions {
    /// Registry key for [`MergeMode::Union`].
    pub const UNION: &'static str = "merge_regions_union";
    /// Registry key for [`MergeMode::Intersection`].
    pub const INTERSECTION: &'static str = "merge_regions_intersection";

    /// A merge action combining regions with `mode`.
    pub fn new(mode: MergeMode) -> Self {
        Self { mode, target: None }
    }

    /// Registry factory for `merge_regions_union`.
    pub fn create_union(_: &str) -> Box<dyn Action> {
        Box::new(Self::new(MergeMode::Union))
    }

    /// Registry factory for `merge_regions_intersection`.
    pub fn create_intersection(_: &str) -> Box<dyn Action> {
        Box::new(Self::new(MergeMode::Intersection))
    }
}

impl Action for MergeRegions {
    fn name(&self) -> &str {
        match self.mode {
            MergeMode::Union => Self::UNION,
            MergeMode::Intersection => Self::INTERSECTION,
        }
    }

    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool {
        let args = split_args(args);
        if !check_arity(&args, 3, "grid::new_region::r1::r2...", errors) {
            return false;
        }
        let Some(grid) = lookup_grid(project, args[0], errors) else {
            return false;
        };
        errors.report(args[1].is_empty(), "new_region", "region name is empty");
        for name in &args[2..] {
            check_region(grid, name, "regions", errors);
        }
        if !errors.is_empty() {
            return false;
        }
        self.target = Some((args[0].to_owned(), args[1].to_owned(), owned(&args[2..])));
        true
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let name = self.name().to_owned();
        let (grid, new_region, inputs) = self.target.take().ok_or_else(|| not_initialized(&name))?;
        let grid = project.grid_mut(&grid)?;
        let mut merged: Option<Region> = None;
        for input in &inputs {
            let region = grid.region(input)?;
            merged = Some(match (merged, self.mode) {
                (None, _) => region.clone(),
                (Some(acc), MergeMode::Union) => acc.union(region).map_err(ModelError::from)?,
                (Some(acc), MergeMode::Intersection) => {
                    acc.intersection(region).map_err(ModelError::from)?
                }
            });
        }
        if let Some(merged) = merged {
            grid.set_region(&new_region, merged)?;
        }
        Ok(ActionOutcome::done())
    }
}

/// `set_region_complement g::region::new_region`
#[derive(Debug, Default)]
pub struct SetRegionComplement {
    target: Option<(String, String, String)>,
}

impl SetRegionComplement {
    /// Registry key.
    pub const NAME: &'static str = "set_region_complement";

    /// Registry factory.
    pub fn create(_: &str) -> Box<dyn Action> {
        Box::new(Self::default())
    }
}

impl Action for SetRegionComplement {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool {
        let args = split_args(args);
        if !check_arity(&args, 3, "grid::region::new_region", errors) {
            return false;
        }
        let Some(grid) = lookup_grid(project, args[0], errors) else {
            return false;
        };
        check_region(grid, args[1], "region", errors);
        errors.report(args[2].is_empty(), "new_region", "region name is empty");
        if !errors.is_empty() {
            return false;
        }
        self.target = Some((args[0].to_owned(), args[1].to_owned(), args[2].to_owned()));
        true
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let (grid, region, new_region) =
            self.target.take().ok_or_else(|| not_initialized(Self::NAME))?;
        let grid = project.grid_mut(&grid)?;
        let complement = grid.region(&region)?.complement();
        grid.set_region(&new_region, complement)?;
        Ok(ActionOutcome::done())
    }
}
