//! Macros for ergonomic state and trigger declaration.

/// Generate a state enum implementing [`State`](crate::core::State).
///
/// # Example
///
/// ```
/// use parastate::core::State;
/// use parastate::state_enum;
///
/// state_enum! {
///     pub enum WorkflowState {
///         Start,
///         Processing,
///         Done,
///     }
/// }
///
/// assert_eq!(WorkflowState::Processing.name(), "Processing");
/// ```
#[macro_export]
macro_rules! state_enum {
    ($($body:tt)*) => {
        $crate::__key_enum! { $crate::core::State; $($body)* }
    };
}

/// Generate a trigger enum implementing [`Trigger`](crate::core::Trigger).
///
/// # Example
///
/// ```
/// use parastate::core::Trigger;
/// use parastate::trigger_enum;
///
/// trigger_enum! {
///     pub enum DoorTrigger {
///         Open,
///         Close,
///     }
/// }
///
/// assert_eq!(DoorTrigger::Close.name(), "Close");
/// ```
#[macro_export]
macro_rules! trigger_enum {
    ($($body:tt)*) => {
        $crate::__key_enum! { $crate::core::Trigger; $($body)* }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __key_enum {
    (
        $key:path;
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $key for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
