//! Signature metadata tags: source database, input device, split and origin.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Returned when a metadata tag cannot be parsed from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} \"{value}\"")]
pub struct ParseMetaError {
    /// Which tag was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Generates `ALL`, `name`, `Display` and case-insensitive `FromStr` for a
/// fieldless tag enum. Aliases are matched after lower-casing.
macro_rules! tag_enum {
    ($ty:ident, $kind:literal, [$($variant:ident => $name:literal $(| $alias:literal)*),+ $(,)?]) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Canonical display name.
            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = ParseMetaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lower = s.trim().to_ascii_lowercase();
                $(
                    if lower == $name.to_ascii_lowercase() $(|| lower == $alias)* {
                        return Ok($ty::$variant);
                    }
                )+
                Err(ParseMetaError { kind: $kind, value: s.to_string() })
            }
        }
    };
}

/// Source database a signature was collected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Database {
    Mcyt,
    #[serde(rename = "eBioSignDS1")]
    EBioSignDs1,
    #[serde(rename = "eBioSignDS2")]
    EBioSignDs2,
    #[serde(rename = "BiosecurID")]
    BiosecurId,
    #[serde(rename = "BiosecureDS2")]
    BiosecureDs2,
    #[serde(rename = "EvalDB")]
    EvalDb,
}

tag_enum!(Database, "database", [
    Mcyt => "Mcyt",
    EBioSignDs1 => "eBioSignDS1" | "ebiosign-ds1",
    EBioSignDs2 => "eBioSignDS2" | "ebiosign-ds2",
    BiosecurId => "BiosecurID",
    BiosecureDs2 => "BiosecureDS2" | "biosecure-ds2",
    EvalDb => "EvalDB",
]);

/// Device used to capture a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum InputDevice {
    Unknown,
    Finger,
    Stylus,
}

tag_enum!(InputDevice, "input device", [
    Unknown => "Unknown",
    Finger => "Finger",
    Stylus => "Stylus",
]);

/// Dataset partition baked into the source file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Split {
    Unknown,
    Development,
    Evaluation,
}

tag_enum!(Split, "split", [
    Unknown => "Unknown",
    Development => "Development",
    Evaluation => "Evaluation",
]);

/// Whether a signature was produced by its signer or forged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Origin {
    Genuine,
    Forged,
    Unknown,
}

tag_enum!(Origin, "origin", [
    Genuine => "Genuine",
    Forged => "Forged",
    Unknown => "Unknown",
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("STYLUS".parse::<InputDevice>(), Ok(InputDevice::Stylus));
        assert_eq!("development".parse::<Split>(), Ok(Split::Development));
        assert_eq!("ebiosignds1".parse::<Database>(), Ok(Database::EBioSignDs1));
        assert_eq!("ebiosign-ds2".parse::<Database>(), Ok(Database::EBioSignDs2));
    }

    #[test]
    fn rejects_unknown_tags() {
        let err = "pencil".parse::<InputDevice>().unwrap_err();
        assert_eq!(err.kind, "input device");
        assert_eq!(err.to_string(), "unknown input device \"pencil\"");
    }

    #[test]
    fn display_round_trips() {
        for &db in Database::ALL {
            assert_eq!(db.to_string().parse::<Database>(), Ok(db));
        }
    }
}
