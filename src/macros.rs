/// ffi_enum! {}
///
/// Declares an "open" enum: a transparent wrapper around the native integer with an associated
/// constant per known variant. Unknown values coming from the kernel remain representable.
macro_rules! ffi_enum {
    (
        $( #[$attrs:meta] )*
        $v:vis enum $name:ident: $native:ty {
            $(
                $( #[$variant_attrs:meta] )*
                $variant:ident = $value:expr
            ),+
            $(,)?
        }
    ) => {
        $( #[$attrs] )*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        $v struct $name(pub(crate) $native);

        impl $name {
            $(
                $( #[$variant_attrs] )*
                $v const $variant: Self = Self($value);
            )+

            /// Returns the raw kernel value.
            #[inline]
            $v const fn raw(self) -> $native {
                self.0
            }

            /// Creates a value from its raw kernel representation.
            #[inline]
            $v const fn from_raw(raw: $native) -> Self {
                Self(raw)
            }

            #[allow(dead_code, unreachable_patterns)]
            pub(crate) fn variant_name(&self) -> Option<&'static str> {
                match self {
                    $(
                        &Self::$variant => Some(stringify!($variant)),
                    )*
                    _ => None,
                }
            }

            #[allow(dead_code)]
            pub(crate) fn from_variant_name(name: &str) -> Option<Self> {
                match name {
                    $(
                        stringify!($variant) => Some(Self::$variant),
                    )*
                    _ => None,
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_variant_name(s).ok_or($crate::UnknownVariant { _p: () })
            }
        }
    };
}
