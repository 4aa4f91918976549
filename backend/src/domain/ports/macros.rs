//! Helper macro for generating domain port error enums.
//!
//! Each port declares its failure modes with `define_port_error!`, which
//! derives `thiserror::Error` and emits a snake_case constructor per variant
//! accepting `impl Into<FieldType>` arguments.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( {
                    $(
                        #[doc = "See the variant message."]
                        $field : $ty
                    ),*
                } )?,
            )*
        }

        ::paste::paste! {
            impl $name {
                $(
                    /// Construct the corresponding variant.
                    pub fn [<$variant:snake>]( $( $($field: impl Into<$ty>),* )? ) -> Self {
                        Self::$variant $( { $($field: $field.into()),* } )?
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;
