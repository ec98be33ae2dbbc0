use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// JSON and the database share the same snake_case string form.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
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
    };
}

str_enum!(EventType {
    Consultation => "consultation",
    Exam => "exam",
    Procedure => "procedure",
    Medication => "medication",
});

str_enum!(FileSlot {
    Report => "report",
    Prescription => "prescription",
    Invoice => "invoice",
    Result => "result",
    Certificate => "certificate",
    Other => "other",
});

impl FileSlot {
    /// Display order for grouped repository listings.
    pub const ALL: &'static [FileSlot] = &[
        FileSlot::Report,
        FileSlot::Prescription,
        FileSlot::Invoice,
        FileSlot::Result,
        FileSlot::Certificate,
        FileSlot::Other,
    ];
}

str_enum!(NotificationStatus {
    Pending => "pending",
    Archived => "archived",
});

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn event_type_round_trips_through_str() {
        for raw in ["consultation", "exam", "procedure", "medication"] {
            let parsed = EventType::from_str(raw).unwrap();
            assert_eq!(parsed.as_str(), raw);
        }
    }

    #[test]
    fn unknown_value_is_invalid_enum_error() {
        let err = FileSlot::from_str("receipt").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn json_form_matches_db_form() {
        let json = serde_json::to_string(&FileSlot::Prescription).unwrap();
        assert_eq!(json, "\"prescription\"");
        let back: FileSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "prescription");
    }

    #[test]
    fn slot_display_order_covers_every_variant() {
        for raw in ["report", "prescription", "invoice", "result", "certificate", "other"] {
            let slot = FileSlot::from_str(raw).unwrap();
            assert!(FileSlot::ALL.contains(&slot));
        }
    }
}
