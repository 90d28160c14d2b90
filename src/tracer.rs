//! Exposes testing, profiling and tracing capabilities.

use crate::archetype::ArchetypeId;
use crate::comp::{AnyComponent, ComponentType};
use crate::entity::EntityId;

/// Defines the [`Tracer`] trait and implements the [`Log`] and [`Aggregate`] types.
///
/// All tracer method parameters must be [`Copy`]
/// (immutable references included),
/// since [`Aggregate`] passes the same arguments to every child.
///
/// Use the `{@LOG_WITH = transformer}` syntax to transform an argument for log printing,
/// where `transformer` is an invokable that accepts the argument
/// and returns any [`fmt::Debug`](std::fmt::Debug) type.
macro_rules! define_tracer {
    (
        $(
            $(#[$meta:meta])*
            fn $name:ident(
                &self
                $(,$logged_ident:ident: $logged_ty:ty $({@LOG_WITH = $log_with:expr})?)*
                $(; @NOLOG $($nolog_ident:ident: $nolog_ty:ty),*)?
                $(,)?
            );
        )*
    ) => {
        /// A tracer used for recording the events that happen in a world.
        ///
        /// Can be used for profiling and testing.
        pub trait Tracer {
            $(
                $(#[$meta])*
                #[allow(unused_variables)]
                fn $name(&self, $($logged_ident: $logged_ty,)* $($($nolog_ident: $nolog_ty,)*)?) {}
            )*
        }

        impl Tracer for Log {
            $(
                #[allow(unused_variables)]
                fn $name(&self, $($logged_ident: $logged_ty,)* $($($nolog_ident: $nolog_ty,)*)?) {
                    log::log!(self.0, concat!(stringify!($name), "(", $(
                        stringify!($logged_ident),
                        " = {",
                        stringify!($logged_ident),
                        ":?}, ",
                    )* ")"), $(
                        $logged_ident = define_tracer!(@LOG_EXPR $logged_ident $(@LOG_WITH = $log_with)?),
                    )*);
                }
            )*
        }

        impl_tuple_accumulate! {
            @TYPES (T1, T2, T3, T4, T5, T6, T7, T8);
            $(
                @VARS (t1, t2, t3, t4, t5, t6, t7, t8);
                @METHOD {fn $name(&self, $($logged_ident: $logged_ty,)* $($($nolog_ident: $nolog_ty,)*)?);}
            )*
        }
    };

    (@LOG_EXPR $ident:ident) => { $ident };
    (@LOG_EXPR $ident:ident @LOG_WITH = $closure:expr) => { ($closure)($ident) }
}

macro_rules! impl_tuple {
    (
        @TYPES ($($ty:ident),* $(,)?);
        $(
            @VARS ($($vars:ident),* $(,)?);
            @METHOD {fn $name:ident(&self, $($arg_ident:ident: $arg_ty:ty,)*);}
        )*
    ) => {
        impl<$($ty: Tracer),*> Tracer for Aggregate<($($ty,)*)> {
            $(
                fn $name(&self, $($arg_ident: $arg_ty),*) {
                    #[allow(unused_variables)]
                    let args = ($($arg_ident,)*);

                    #[allow(dead_code)]
                    fn call_with_args(tracer: &impl Tracer, ($($arg_ident,)*): ($($arg_ty,)*)) {
                        tracer.$name($($arg_ident,)*);
                    }

                    #[allow(unused_variables)]
                    let Aggregate(($($vars,)*)) = self;
                    $(
                        call_with_args($vars, args);
                    )*
                }
            )*
        }
    };
}

macro_rules! impl_tuple_accumulate {
    (@TYPES (); $(@VARS (); @METHOD {$($body:tt)*})*) => {
        impl_tuple! {
            @TYPES ();
            $(
                @VARS ();
                @METHOD {$($body)*}
            )*
        }
    };
    (
        @TYPES ($first_ty:ident $(, $rest_ty:ident)* $(,)?);
        $(
            @VARS ($first_var:ident $(, $rest_var:ident)* $(,)?);
            @METHOD {$($body:tt)*}
        )*
    ) => {
        impl_tuple! {
            @TYPES ($first_ty $(, $rest_ty)* );
            $(
                @VARS ($first_var $(, $rest_var)*);
                @METHOD {$($body)*}
            )*
        }

        impl_tuple_accumulate! {
            @TYPES ($($rest_ty),*);
            $(
                @VARS ($($rest_var),*);
                @METHOD {$($body)*}
            )*
        }
    };
}

define_tracer! {
    /// An entity is created, with `components` components.
    fn entity_created(&self, entity: EntityId, components: usize);

    /// An entity is destroyed.
    fn entity_destroyed(&self, entity: EntityId);

    /// An entity is stripped of its components and assigned a new ID.
    fn entity_reset(&self, old: EntityId, new: EntityId);

    /// A component is attached to an entity.
    fn component_added(
        &self,
        entity: EntityId,
        component: &dyn AnyComponent {@LOG_WITH = |component: &dyn AnyComponent| component.component_type()},
    );

    /// A component is detached from an entity.
    fn component_removed(
        &self,
        entity: EntityId,
        component: &dyn AnyComponent {@LOG_WITH = |component: &dyn AnyComponent| component.component_type()},
    );

    /// The value of a component is written through the world.
    fn component_modified(&self, entity: EntityId, ty: ComponentType);

    /// An archetype is registered with `members` initial members.
    fn archetype_registered(&self, archetype: ArchetypeId, members: usize);

    /// An archetype is unregistered.
    fn archetype_unregistered(&self, archetype: ArchetypeId);

    /// An entity joins an archetype.
    fn membership_gained(&self, archetype: ArchetypeId, entity: EntityId);

    /// An entity leaves an archetype.
    fn membership_lost(&self, archetype: ArchetypeId, entity: EntityId);

    /// A destroyed entity is kept for reuse. `pool_size` includes it.
    fn entity_pooled(&self, pool_size: usize);

    /// A pooled entity is reused for a new entity.
    fn entity_reused(&self, entity: EntityId);
}

/// An empty tracer.
pub struct Noop;

impl Tracer for Noop {}

/// Groups multiple tracers into a tuple and dispatches each call to them in serial.
pub struct Aggregate<T>(
    /// A tuple of child tracers to execute in serial.
    pub T,
);

/// A tracer that logs all events.
pub struct Log(
    /// The log level to log events with.
    pub log::Level,
);

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::{Aggregate, Log, Noop, Tracer};
    use crate::entity::Ealloc;

    #[derive(Default)]
    struct Count(RefCell<usize>);

    impl Tracer for Count {
        fn entity_destroyed(&self, _: crate::entity::EntityId) { *self.0.borrow_mut() += 1; }
    }

    #[test]
    fn test_aggregate_dispatches_to_all() {
        crate::test_util::init_log();

        let tracer = Aggregate((Count::default(), Log(log::Level::Trace), Noop, Count::default()));
        let id = Ealloc::new().allocate();
        tracer.entity_destroyed(id);
        tracer.entity_created(id, 0);

        let Aggregate((first, _, _, last)) = &tracer;
        assert_eq!(*first.0.borrow(), 1);
        assert_eq!(*last.0.borrow(), 1);
    }
}
