//! Status enums for projects and releases.
//!
//! Statuses are stored as lowercase `TEXT` guarded by `CHECK` constraints and
//! travel over JSON as the same lowercase strings. Parsing rejects anything
//! outside the listed values.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored/serialized form.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {} '{other}'. Must be one of: {}",
                        stringify!($name),
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

define_status_enum! {
    /// Publishing state of a whole project.
    ProjectStatus {
        #[default]
        Ongoing => "ongoing",
        Published => "published",
    }
}

define_status_enum! {
    /// Release state of a chapter/version.
    ///
    /// Any transition is allowed; this is a plain field, not a guarded
    /// state machine.
    ReleaseStatus {
        #[default]
        Draft => "draft",
        Released => "released",
    }
}
