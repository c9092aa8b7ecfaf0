use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        $(#[$meta])*
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(
    #[serde(rename_all = "kebab-case")]
    Condition {
        Diabetes => "diabetes",
        HeartDisease => "heart-disease",
        KidneyDisease => "kidney-disease",
        LiverDisease => "liver-disease",
    }
);

str_enum!(RiskCategory {
    Low => "Low",
    Moderate => "Moderate",
    High => "High",
});

str_enum!(
    #[serde(rename_all = "lowercase")]
    ChatRole {
        System => "system",
        User => "user",
        Assistant => "assistant",
    }
);

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::Diabetes,
        Condition::HeartDisease,
        Condition::KidneyDisease,
        Condition::LiverDisease,
    ];

    /// Human-readable name ("heart disease").
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes",
            Self::HeartDisease => "heart disease",
            Self::KidneyDisease => "kidney disease",
            Self::LiverDisease => "liver disease",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn condition_slugs_match_route_segments() {
        for (variant, s) in [
            (Condition::Diabetes, "diabetes"),
            (Condition::HeartDisease, "heart-disease"),
            (Condition::KidneyDisease, "kidney-disease"),
            (Condition::LiverDisease, "liver-disease"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Condition::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn condition_serde_uses_slug() {
        let json = serde_json::to_string(&Condition::KidneyDisease).unwrap();
        assert_eq!(json, "\"kidney-disease\"");
        let parsed: Condition = serde_json::from_str("\"heart-disease\"").unwrap();
        assert_eq!(parsed, Condition::HeartDisease);
    }

    #[test]
    fn risk_category_serializes_capitalized() {
        let json = serde_json::to_string(&RiskCategory::Moderate).unwrap();
        assert_eq!(json, "\"Moderate\"");
        assert_eq!(RiskCategory::from_str("High").unwrap(), RiskCategory::High);
    }

    #[test]
    fn chat_role_round_trip() {
        assert_eq!(ChatRole::from_str("assistant").unwrap(), ChatRole::Assistant);
        assert_eq!(serde_json::to_string(&ChatRole::User).unwrap(), "\"user\"");
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(Condition::from_str("gout").is_err());
        assert!(RiskCategory::from_str("low").is_err());
        assert!(ChatRole::from_str("").is_err());
    }
}
