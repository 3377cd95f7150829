use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
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

str_enum!(ReminderStatus {
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(ItemStatus {
    Pending => "pending",
    Completed => "completed",
    Cancelled => "cancelled",
    Error => "error",
});

/// The channel archetype of a notification item.
str_enum!(Channel {
    Email => "email",
    Sms => "sms",
    Print => "print",
    Export => "export",
    List => "list",
});

impl Channel {
    /// Channels that deliver to a customer contact. `export` and `list`
    /// are staff-facing and need neither contact nor template.
    pub fn needs_contact(&self) -> bool {
        matches!(self, Self::Email | Self::Sms | Self::Print)
    }

    pub fn needs_template(&self) -> bool {
        matches!(self, Self::Email | Self::Sms | Self::Print)
    }

    pub fn all() -> &'static [Channel] {
        &[Self::Email, Self::Sms, Self::Print, Self::Export, Self::List]
    }
}

str_enum!(DateUnits {
    Days => "days",
    Weeks => "weeks",
    Months => "months",
    Years => "years",
});

/// How many qualifying contacts a rule needs before its channels fire.
str_enum!(SendTo {
    Any => "any",
    All => "all",
});

str_enum!(DueState {
    NotDue => "not_due",
    Due => "due",
    Overdue => "overdue",
});

str_enum!(ContactKind {
    Email => "email",
    Phone => "phone",
    Location => "location",
});

/// Grouping policy lattice. `All` is the top, `None` the bottom;
/// `Patient` and `Customer` are incomparable siblings.
str_enum!(GroupBy {
    None => "none",
    Patient => "patient",
    Customer => "customer",
    All => "all",
});

impl GroupBy {
    /// Greatest lower bound of two policies on the diamond lattice.
    ///
    /// A declared `Customer` grouping met with an allowed policy of
    /// `Patient` yields `None`: the two are incomparable, so disallowing
    /// customer grouping downgrades a customer-declared type all the way
    /// rather than sideways to patient grouping.
    pub fn meet(self, other: GroupBy) -> GroupBy {
        match (self, other) {
            (GroupBy::All, x) | (x, GroupBy::All) => x,
            (a, b) if a == b => a,
            _ => GroupBy::None,
        }
    }

    /// Allowed policy expressed by the two practice-level switches.
    pub fn from_allowed(customer_allowed: bool, patient_allowed: bool) -> GroupBy {
        match (customer_allowed, patient_allowed) {
            (true, true) => GroupBy::All,
            (true, false) => GroupBy::Customer,
            (false, true) => GroupBy::Patient,
            (false, false) => GroupBy::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn channel_round_trips() {
        for ch in Channel::all() {
            assert_eq!(Channel::from_str(ch.as_str()).unwrap(), *ch);
        }
    }

    #[test]
    fn unknown_value_is_invalid_enum() {
        let err = ItemStatus::from_str("archived").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn meet_is_lattice_glb() {
        assert_eq!(GroupBy::All.meet(GroupBy::Customer), GroupBy::Customer);
        assert_eq!(GroupBy::Customer.meet(GroupBy::Customer), GroupBy::Customer);
        assert_eq!(GroupBy::Customer.meet(GroupBy::Patient), GroupBy::None);
        assert_eq!(GroupBy::Patient.meet(GroupBy::None), GroupBy::None);
        assert_eq!(GroupBy::None.meet(GroupBy::All), GroupBy::None);
    }

    #[test]
    fn allowed_policy_from_switches() {
        assert_eq!(GroupBy::from_allowed(true, true), GroupBy::All);
        assert_eq!(GroupBy::from_allowed(false, true), GroupBy::Patient);
        assert_eq!(GroupBy::from_allowed(true, false), GroupBy::Customer);
        assert_eq!(GroupBy::from_allowed(false, false), GroupBy::None);
    }
}
