//! Newtype identifiers for the three levels of the model hierarchy.
//!
//! Wrapping each kind of key in its own type (rather than passing bare
//! `String`s around) makes a mismatched lookup — e.g. using a component id
//! where a core id is expected — a compile error instead of a silent bug.

use std::fmt;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name(value)
            }
        }
    };
}

id_newtype!(TaskId);
id_newtype!(ComponentId);
id_newtype!(CoreId);
