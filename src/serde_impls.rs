use std::{any::type_name, fmt, marker::PhantomData, str::FromStr};

use serde::{Deserialize, Serialize, de};

use crate::{Bus, event::EventType, event::ReportType};

struct NamedOrRawVisitor<T, N> {
    _p: PhantomData<(T, N)>,
}

impl<T, N> NamedOrRawVisitor<T, N> {
    fn new() -> Self {
        Self { _p: PhantomData }
    }
}

impl<'de, T, N> de::Visitor<'de> for NamedOrRawVisitor<T, N>
where
    T: FromStr + From<N>,
    N: TryFrom<u64>,
{
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("named variant or raw value")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        T::from_str(v).map_err(|_| {
            E::custom(format!(
                "unknown variant '{v}' for type '{}'",
                type_name::<T>()
            ))
        })
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match N::try_from(v) {
            Ok(raw) => Ok(T::from(raw)),
            Err(_) => Err(E::invalid_value(
                de::Unexpected::Unsigned(v),
                &type_name::<N>(),
            )),
        }
    }
}

macro_rules! serde_impls {
    ( $($t:ident: $native:ty),* ) => {
        $(
            impl From<$native> for $t {
                #[inline]
                fn from(raw: $native) -> Self {
                    Self::from_raw(raw)
                }
            }

            /// Deserialization from a raw value or a named constant.
            impl<'a> Deserialize<'a> for $t {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: serde::Deserializer<'a>,
                {
                    if deserializer.is_human_readable() {
                        // Human-readable formats accept both names (`USB`, `CREATE2`) and raw
                        // numbers. They are assumed to be self-describing.
                        deserializer.deserialize_any(NamedOrRawVisitor::<$t, $native>::new())
                    } else {
                        let raw = <$native>::deserialize(deserializer)?;
                        Ok(<$t>::from_raw(raw))
                    }
                }
            }

            impl Serialize for $t {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    if serializer.is_human_readable() {
                        match self.variant_name() {
                            Some(name) => serializer.collect_str(name),
                            None => self.raw().serialize(serializer),
                        }
                    } else {
                        self.raw().serialize(serializer)
                    }
                }
            }
        )*
    };
}

serde_impls!(Bus: u16, EventType: u32, ReportType: u8);
