//! Registries pre-populated with every built-in capability.

use terrane_plugin::{
    Action, Algorithm, CollisionPolicy, Registries, Registry, RegistryBuilder, RegistryError,
};

use crate::actions::{
    ClearPropertyValueFromProperty, ClearPropertyValueIf, CopyProperty, CreateIndicatorProperties, DeleteObjects, DeleteProperties, DeleteRegions,
    MergeRegions, NewCartesianGrid, RunAlgorithm, SetActiveRegion, SetRegionComplement,
    SetRegionFromCategories, SetRegionFromProperty, SwapProperties,
};
use crate::moving_average::{self, MovingAverage};

/// Register the built-in algorithms on `builder`.
pub fn register_algorithms(builder: &mut RegistryBuilder<dyn Algorithm>) -> Result<(), RegistryError> {
    builder.register(moving_average::NAME, MovingAverage::create)
}

/// Register the built-in actions on `builder`.
pub fn register_actions(builder: &mut RegistryBuilder<dyn Action>) -> Result<(), RegistryError> {
    builder.register(NewCartesianGrid::NAME, NewCartesianGrid::create)?;
    builder.register(DeleteObjects::NAME, DeleteObjects::create)?;
    builder.register(CopyProperty::NAME, CopyProperty::create)?;
    builder.register(SwapProperties::TO_DISK, SwapProperties::create_to_disk)?;
    builder.register(SwapProperties::TO_RAM, SwapProperties::create_to_ram)?;
    builder.register(DeleteProperties::NAME, DeleteProperties::create)?;
    builder.register(ClearPropertyValueIf::NAME, ClearPropertyValueIf::create)?;
    builder.register(ClearPropertyValueFromProperty::NAME, ClearPropertyValueFromProperty::create)?;
    builder.register(CreateIndicatorProperties::NAME, CreateIndicatorProperties::create)?;
    builder.register(SetActiveRegion::NAME, SetActiveRegion::create)?;
    builder.register(DeleteRegions::NAME, DeleteRegions::create)?;
    builder.register(SetRegionFromProperty::NAME, SetRegionFromProperty::create)?;
    builder.register(SetRegionFromCategories::NAME, SetRegionFromCategories::create)?;
    builder.register(MergeRegions::UNION, MergeRegions::create_union)?;
    builder.register(MergeRegions::INTERSECTION, MergeRegions::create_intersection)?;
    builder.register(SetRegionComplement::NAME, SetRegionComplement::create)?;
    builder.register(RunAlgorithm::NAME, RunAlgorithm::create)?;
    Ok(())
}

/// Sealed algorithm registry holding the built-ins.
pub fn algorithm_registry() -> Result<Registry<dyn Algorithm>, RegistryError> {
    let mut builder = RegistryBuilder::new(CollisionPolicy::Reject);
    register_algorithms(&mut builder)?;
    Ok(builder.build())
}

/// Sealed action registry holding the built-ins.
pub fn action_registry() -> Result<Registry<dyn Action>, RegistryError> {
    let mut builder = RegistryBuilder::new(CollisionPolicy::Reject);
    register_actions(&mut builder)?;
    Ok(builder.build())
}

/// Both built-in registries, ready for [`terrane_plugin::global::install`].
pub fn builtin_registries() -> Result<Registries, RegistryError> {
    Ok(Registries {
        algorithms: algorithm_registry()?,
        actions: action_registry()?,
    })
}
