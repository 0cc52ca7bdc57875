//! Lifecycle event logging.
//!
//! With the `tracing` feature enabled, every lifecycle transition of an erased
//! representation emits a `TRACE` event with the target `clutch::lifecycle`.
//! Without the feature the macro expands to nothing.

/// Emits a lifecycle event for the representation described by `$vtable`,
/// stored in the backend `$storage`.
macro_rules! lifecycle_event {
    ($event:literal, $vtable:expr, $storage:ty) => {{
        #[cfg(feature = "tracing")]
        ::tracing::trace!(
            target: "clutch::lifecycle",
            repr = $vtable.type_name(),
            storage = <$storage as $crate::storage::Storage>::NAME,
            $event
        );
        #[cfg(not(feature = "tracing"))]
        let _ = &$vtable;
    }};
}
