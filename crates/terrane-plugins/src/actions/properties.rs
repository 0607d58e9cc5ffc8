//! Property copying, tier transitions, deletion, masking, and indicator
//! coding.

use terrane_core::{is_informed, PropertyKind, NO_DATA_VALUE};
use terrane_model::{CopyPolicy, ModelError, Project};
use terrane_plugin::{split_args, Action, ActionError, ActionOutcome, ErrorReport};
use terrane_store::SwapDirection;
use tracing::{debug, info};

use super::{check_arity, check_property, lookup_grid, parse_arg, swap_outcome};

fn not_initialized(name: &str) -> ActionError {
    ActionError::NotInitialized { name: name.to_owned() }
}

/// `copy_property source_grid::source_prop::dest_grid::dest_prop`
#[derive(Debug, Default)]
pub struct CopyProperty {
    args: Option<[String; 4]>,
}

impl CopyProperty {
    /// Registry key.
    pub const NAME: &'static str = "copy_property";

    /// Registry factory.
    pub fn create(_: &str) -> Box<dyn Action> {
        Box::new(Self::default())
    }
}

impl Action for CopyProperty {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool {
        let args = split_args(args);
        if !check_arity(&args, 4, "source_grid::source_prop::dest_grid::dest_prop", errors) {
            return false;
        }
        let source = lookup_grid(project, args[0], errors);
        let dest = lookup_grid(project, args[2], errors);
        if let Some(source) = source {
            check_property(source, args[1], "source_property", errors);
        }
        if let (Some(source), Some(dest)) = (source, dest) {
            if let Err(e) = CopyPolicy::between(source.geometry(), dest.geometry()) {
                errors.push("dest_grid", e.to_string());
            }
        }
        errors.report(args[3].is_empty(), "dest_property", "property name is empty");
        if !errors.is_empty() {
            return false;
        }
        self.args = Some([args[0], args[1], args[2], args[3]].map(str::to_owned));
        true
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let [sg, sp, dg, dp] = self.args.take().ok_or_else(|| not_initialized(Self::NAME))?;
        let report = project.copy_property(&sg, &sp, &dg, &dp)?;
        let mut outcome = ActionOutcome::done();
        if report.unmapped > 0 {
            outcome.warnings.push(format!(
                "{} of {} nodes of '{dg}' had no source value",
                report.unmapped,
                report.mapped + report.unmapped
            ));
        }
        Ok(outcome)
    }
}

/// `swap_properties_to_disk g::p1::p2...` and `swap_properties_to_ram g::p1::p2...`
///
/// Names that are unknown or already in the target tier become warnings.
#[derive(Debug)]
pub struct SwapProperties {
    direction: SwapDirection,
    target: Option<(String, Vec<String>)>,
}

impl SwapProperties {
    /// Registry key for the `ToDisk` direction.
    pub const TO_DISK: &'static str = "swap_properties_to_disk";
    /// Registry key for the `ToRam` direction.
    pub const TO_RAM: &'static str = "swap_properties_to_ram";

    /// An action moving properties in `direction`.
    pub fn new(direction: SwapDirection) -> Self {
        Self {
            direction,
            target: None,
        }
    }

    /// Registry factory for `swap_properties_to_disk`.
    pub fn create_to_disk(_: &str) -> Box<dyn Action> {
        Box::new(Self::new(SwapDirection::ToDisk))
    }

    /// Registry factory for `swap_properties_to_ram`.
    pub fn create_to_ram(_: &str) -> Box<dyn Action> {
        Box::new(Self::new(SwapDirection::ToRam))
    }
}

impl Action for SwapProperties {
    fn name(&self) -> &str {
        match self.direction {
            SwapDirection::ToDisk => Self::TO_DISK,
            SwapDirection::ToRam => Self::TO_RAM,
        }
    }

    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool {
        let args = split_args(args);
        if !check_arity(&args, 2, "grid::p1::p2...", errors) {
            return false;
        }
        if lookup_grid(project, args[0], errors).is_none() {
            return false;
        }
        let names = args[1..].iter().map(|s| (*s).to_owned()).collect();
        self.target = Some((args[0].to_owned(), names));
        true
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let name = self.name().to_owned();
        let (grid, names) = self.target.take().ok_or_else(|| not_initialized(&name))?;
        let grid = project.grid(&grid)?;
        let report = match self.direction {
            SwapDirection::ToDisk => grid.swap_to_disk(names.as_slice()),
            SwapDirection::ToRam => grid.swap_to_ram(names.as_slice()),
        };
        Ok(swap_outcome(&report))
    }
}

/// `delete_properties g::p1::p2...`
#[derive(Debug, Default)]
pub struct DeleteProperties {
    target: Option<(String, Vec<String>)>,
}

impl DeleteProperties {
    /// Registry key.
    pub const NAME: &'static str = "delete_properties";

    /// Registry factory.
    pub fn create(_: &str) -> Box<dyn Action> {
        Box::new(Self::default())
    }
}

impl Action for DeleteProperties {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool {
        let args = split_args(args);
        if !check_arity(&args, 2, "grid::p1::p2...", errors) {
            return false;
        }
        if lookup_grid(project, args[0], errors).is_none() {
            return false;
        }
        let names = args[1..].iter().map(|s| (*s).to_owned()).collect();
        self.target = Some((args[0].to_owned(), names));
        true
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let (grid_name, names) = self.target.take().ok_or_else(|| not_initialized(Self::NAME))?;
        let grid = project.grid_mut(&grid_name)?;
        let mut outcome = ActionOutcome::done();
        for name in &names {
            if let Err(e) = grid.remove_property(name) {
                outcome.warnings.push(e.to_string());
            }
        }
        info!(grid = %grid_name, requested = names.len(), "deleted properties");
        Ok(outcome)
    }
}

/// `clear_property_value_if g::p::min::max`
///
/// Sets no-data wherever `min <= value <= max`.
#[derive(Debug, Default)]
pub struct ClearPropertyValueIf {
    target: Option<(String, String, f32, f32)>,
}

impl ClearPropertyValueIf {
    /// Registry key.
    pub const NAME: &'static str = "clear_property_value_if";

    /// Registry factory.
    pub fn create(_: &str) -> Box<dyn Action> {
        Box::new(Self::default())
    }
}

impl Action for ClearPropertyValueIf {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool {
        let args = split_args(args);
        if !check_arity(&args, 4, "grid::property::min::max", errors) {
            return false;
        }
        if let Some(grid) = lookup_grid(project, args[0], errors) {
            check_property(grid, args[1], "property", errors);
        }
        let min: Option<f32> = parse_arg(args[2], "min", errors);
        let max: Option<f32> = parse_arg(args[3], "max", errors);
        let (Some(min), Some(max)) = (min, max) else {
            return false;
        };
        errors.report(!min.is_finite(), "min", "min must be finite");
        errors.report(!max.is_finite(), "max", "max must be finite");
        errors.report(min > max, "min", "min is greater than max");
        if !errors.is_empty() {
            return false;
        }
        self.target = Some((args[0].to_owned(), args[1].to_owned(), min, max));
        true
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let (grid, property, min, max) =
            self.target.take().ok_or_else(|| not_initialized(Self::NAME))?;
        let cleared = project
            .grid(&grid)?
            .property(&property)?
            .clear_if(min, max)
            .map_err(ModelError::from)?;
        info!(grid = %grid, property = %property, cleared, "cleared property values");
        Ok(ActionOutcome::done())
    }
}

/// `clear_property_value_from_property g::target::mask`
///
/// Sets no-data in `target` wherever `mask` is informed. Both properties
/// live on the same grid; they may be the same property.
#[derive(Debug, Default)]
pub struct ClearPropertyValueFromProperty {
    target: Option<[String; 3]>,
}

impl ClearPropertyValueFromProperty {
    /// Registry key.
    pub const NAME: &'static str = "clear_property_value_from_property";

    /// Registry factory.
    pub fn create(_: &str) -> Box<dyn Action> {
        Box::new(Self::default())
    }
}

impl Action for ClearPropertyValueFromProperty {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool {
        let args = split_args(args);
        if !check_arity(&args, 3, "grid::target::mask", errors) {
            return false;
        }
        if let Some(grid) = lookup_grid(project, args[0], errors) {
            check_property(grid, args[1], "target", errors);
            check_property(grid, args[2], "mask", errors);
        }
        if !errors.is_empty() {
            return false;
        }
        self.target = Some([args[0], args[1], args[2]].map(str::to_owned));
        true
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let [grid, target, mask] = self.target.take().ok_or_else(|| not_initialized(Self::NAME))?;
        let g = project.grid(&grid)?;
        // Snapshot first: `mask` and `target` may share a lock.
        let informed: Vec<bool> = g
            .property(&mask)?
            .with_values(|v| v.iter().map(|&x| is_informed(x)).collect())
            .map_err(ModelError::from)?;
        let cleared = g
            .property(&target)?
            .with_values_mut(|values| {
                let mut cleared = 0usize;
                for (v, &masked) in values.iter_mut().zip(&informed) {
                    if masked && is_informed(*v) {
                        *v = NO_DATA_VALUE;
                        cleared += 1;
                    }
                }
                cleared
            })
            .map_err(ModelError::from)?;
        info!(grid = %grid, target = %target, mask = %mask, cleared, "cleared property values under mask");
        Ok(ActionOutcome::done())
    }
}

/// One 0/1 coding produced by [`CreateIndicatorProperties`].
#[derive(Clone, Debug, PartialEq)]
enum Indicator {
    /// 1 where `value <= threshold`.
    AtMost(f32),
    /// 1 where the value is this category id.
    Category { id: u32, label: String },
}

impl Indicator {
    fn suffix(&self) -> String {
        match self {
            Self::AtMost(t) => format!("le_{t}"),
            Self::Category { label, .. } => format!("is_{label}"),
        }
    }

    fn code(&self, value: f32) -> f32 {
        if !is_informed(value) {
            return NO_DATA_VALUE;
        }
        let hit = match self {
            Self::AtMost(t) => value <= *t,
            Self::Category { id, .. } => value == *id as f32,
        };
        if hit {
            1.0
        } else {
            0.0
        }
    }
}

/// `create_indicator_properties g::p::t1::t2...`
///
/// Numeric properties need one or more finite, strictly increasing
/// thresholds; each yields a property `{p}_le_{t}` holding 1 where the
/// value is at most `t` and 0 elsewhere. Categorical properties take no
/// thresholds and yield one property `{p}_is_{label}` per category.
/// No-data stays no-data. Taken names get a numeric suffix.
#[derive(Debug, Default)]
pub struct CreateIndicatorProperties {
    target: Option<(String, String, Vec<Indicator>)>,
}

impl CreateIndicatorProperties {
    /// Registry key.
    pub const NAME: &'static str = "create_indicator_properties";

    /// Registry factory.
    pub fn create(_: &str) -> Box<dyn Action> {
        Box::new(Self::default())
    }
}

impl Action for CreateIndicatorProperties {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, args: &str, project: &Project, errors: &mut ErrorReport) -> bool {
        self.target = None;
        let args = split_args(args);
        if !check_arity(&args, 2, "grid::property::t1::t2...", errors) {
            return false;
        }
        let Some(grid) = lookup_grid(project, args[0], errors) else {
            return false;
        };
        let Ok(property) = grid.property(args[1]) else {
            check_property(grid, args[1], "property", errors);
            return false;
        };
        let thresholds = &args[2..];
        let indicators: Vec<Indicator> = match property.kind() {
            PropertyKind::Categorical(map) => {
                errors.report(
                    !thresholds.is_empty(),
                    "thresholds",
                    "categorical properties take no thresholds",
                );
                errors.report(map.is_empty(), "property", "categorical property has no categories");
                map.iter()
                    .map(|(id, label)| Indicator::Category {
                        id,
                        label: label.to_owned(),
                    })
                    .collect()
            }
            PropertyKind::Numeric => {
                errors.report(thresholds.is_empty(), "thresholds", "at least one threshold is required");
                let parsed: Vec<f32> = thresholds
                    .iter()
                    .filter_map(|raw| parse_arg::<f32>(raw, "thresholds", errors))
                    .collect();
                errors.report(
                    parsed.iter().any(|t| !t.is_finite()),
                    "thresholds",
                    "thresholds must be finite",
                );
                errors.report(
                    parsed.windows(2).any(|w| w[0] >= w[1]),
                    "thresholds",
                    "thresholds must be strictly increasing",
                );
                parsed.into_iter().map(Indicator::AtMost).collect()
            }
        };
        if !errors.is_empty() {
            return false;
        }
        self.target = Some((args[0].to_owned(), args[1].to_owned(), indicators));
        true
    }

    fn exec(&mut self, project: &mut Project) -> Result<ActionOutcome, ActionError> {
        let (grid_name, source, indicators) =
            self.target.take().ok_or_else(|| not_initialized(Self::NAME))?;
        let grid = project.grid_mut(&grid_name)?;
        let values = grid.property(&source)?.to_vec().map_err(ModelError::from)?;
        for indicator in &indicators {
            let base = format!("{source}_{}", indicator.suffix());
            let (name, property) = grid
                .properties_mut()
                .add_unique(&base, PropertyKind::Numeric)
                .map_err(ModelError::from)?;
            property
                .replace_values(values.iter().map(|&v| indicator.code(v)).collect())
                .map_err(ModelError::from)?;
            debug!(grid = %grid_name, property = %name, "created indicator property");
        }
        info!(grid = %grid_name, property = %source, count = indicators.len(), "created indicator properties");
        Ok(ActionOutcome::done())
    }
}
