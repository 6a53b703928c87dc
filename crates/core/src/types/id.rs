//! Newtype IDs for type-safe entity references.
//!
//! Every table row is addressed through its own ID type so an offer-card id
//! can never be passed where a news id is expected.

/// Declare an `i32`-backed row id.
///
/// The generated type is `Copy`, ordered, hashable and serializes as a bare
/// number. It parses from trimmed text (path segments, form fields) and
/// binds directly in `sqlx` queries when the `postgres` feature is on.
///
/// ```rust
/// # use lakeside_core::define_id;
/// define_id!(HeroImageId);
/// define_id!(BannerId);
///
/// let hero = HeroImageId::new(1);
/// assert_eq!(i32::from(hero), 1);
/// // `let _: HeroImageId = BannerId::new(1);` is a type error.
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Raw column value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

// Admin
define_id!(AdminUserId);
define_id!(AdminSessionId);

// Uploaded media (hero, about, feature, offer, service, news, video)
define_id!(MediaItemId);

// Content lists
define_id!(OfferCardId);
define_id!(TeamMemberId);
define_id!(TestimonialId);
define_id!(ServiceCategoryId);
define_id!(ServiceProductId);
define_id!(NewsId);
define_id!(BranchId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id: NewsId = " 42 ".parse().unwrap();
        assert_eq!(id.as_i32(), 42);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("abc".parse::<BranchId>().is_err());
        assert!("".parse::<BranchId>().is_err());
    }

    #[test]
    fn test_ordering_follows_inner_value() {
        assert!(MediaItemId::new(2) < MediaItemId::new(10));
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&OfferCardId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
