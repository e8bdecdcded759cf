//! `define_port_error!` declares a port's error enum plus one snake_case
//! constructor per variant.
//!
//! Constructor arguments take `impl Into<T>`, so adapters can pass a `&str`,
//! a `String` from `format!` or any other convertible value.

macro_rules! define_port_error {
    (
        $(#[$enum_meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),+ $(,)? } )? => $message:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field: $ty),+ } )?,
            )+
        }

        ::paste::paste! {
            impl $name {
                $(
                    #[must_use]
                    pub fn [<$variant:snake>]($( $($field: impl Into<$ty>),+ )?) -> Self {
                        Self::$variant $( { $($field: $field.into()),+ } )?
                    }
                )+
            }
        }
    };
}

pub(crate) use define_port_error;
