/// Implements [`Component`](crate::comp::Component) for the applied type.
/// This macro does not modify the input.
///
/// The [component type](crate::comp::ComponentType) is derived from the type name
/// by stripping a trailing `Component` and lowercasing the first letter.
/// A type named exactly `Component` has no derivable name
/// and must use the `name` option.
/// Generic types are not supported.
///
/// # Options
/// Options are applied behind the attribute name in the form `#[comp(...)]`.
/// Multiple options are separated by commas.
///
/// ## `name = "..."`
/// Uses the given component type instead of deriving it from the type name.
///
/// ## `attach = $path`, `detach = $path`
/// Calls `$path(&mut self, EntityId)`
/// from [`on_attach`](crate::comp::Component::on_attach)
/// or [`on_detach`](crate::comp::Component::on_detach).
///
/// ## `patch`
/// Implements [`Patch`](crate::comp::Patch),
/// which [`set_component_value`](crate::Entity::set_component_value) requires.
/// The type must implement `serde::Deserialize`.
/// For structs with named fields, an object patch only writes the fields it names,
/// keyed by field name or `#[serde(rename = "...")]`.
/// Fields with `#[serde(skip)]` cannot be patched and keep their value.
///
/// ```
/// #[archon::comp(patch)]
/// #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// struct RangeComponent { min: f32, max: f32 }
///
/// let mut world = archon::World::new();
/// let id = world.create_entity(archon::comps![RangeComponent { min: 0.0, max: f32::INFINITY }])?;
/// world.entity_mut(id)?.set_component_value::<RangeComponent, _>(serde_json::json!({ "min": 1.0 }))?;
/// assert_eq!(
///     world.entity(id)?.get::<RangeComponent>(),
///     Some(&RangeComponent { min: 1.0, max: f32::INFINITY }),
/// );
/// # Ok::<(), archon::Error>(())
/// ```
///
/// ## `archon_as($path)`
/// Refers to the crate as `$path` instead of `::archon` in the generated code.
///
/// # Example
/// ```
/// use archon::comp::{Component, ComponentType};
/// use archon::entity::EntityId;
///
/// #[archon::comp]
/// struct BorderRadiusComponent(f32);
/// assert_eq!(BorderRadiusComponent::TYPE, ComponentType::new("borderRadius"));
///
/// #[archon::comp(name = "hp", attach = Self::reset)]
/// struct Health(u32);
///
/// impl Health {
///     fn reset(&mut self, _: EntityId) { self.0 = 100; }
/// }
///
/// assert_eq!(Health::TYPE.name(), "hp");
/// ```
///
/// A type whose name cannot be converted must be named explicitly:
/// ```compile_fail
/// #[archon::comp]
/// struct Component;
/// ```
#[doc(inline)]
pub use archon_codegen::comp;

/// Creates a [`comp::Batch`](crate::comp::Batch) from a list of components.
///
/// The components are attached in the listed order.
///
/// # Example
/// ```
/// #[archon::comp]
/// struct PositionComponent { x: i32, y: i32 }
/// #[archon::comp]
/// struct HoverComponent;
///
/// let empty = archon::comps![];
/// assert_eq!(empty.len(), 0);
///
/// let batch = archon::comps![PositionComponent { x: 1, y: 2 }, HoverComponent];
/// assert_eq!(batch.len(), 2);
/// assert_eq!(batch[1].component_type().name(), "hover");
/// ```
#[macro_export]
macro_rules! comps {
    ($($component:expr),* $(,)?) => {
        <$crate::comp::Batch>::from([
            $(::std::boxed::Box::new($component) as ::std::boxed::Box<dyn $crate::comp::AnyComponent>),*
        ])
    };
}
