//! Due-date, cancel-date and due-state arithmetic.
//!
//! Pure functions over `chrono::NaiveDate`. Interval units missing from
//! configuration default to years; the product-linked period keeps the
//! same default (legacy behavior, preserved exactly).

use chrono::{Duration, Months, NaiveDate};

use super::error::ReminderError;
use crate::models::{DateUnits, DueState, Patient, Reminder, ReminderType};

/// Add `amount` in `units` to a date. Calendar-aware for months and years
/// (chrono clamps to the end of shorter months). `None` on overflow.
pub fn add_units(date: NaiveDate, amount: i32, units: DateUnits) -> Option<NaiveDate> {
    match units {
        DateUnits::Days => date.checked_add_signed(Duration::days(amount as i64)),
        DateUnits::Weeks => date.checked_add_signed(Duration::weeks(amount as i64)),
        DateUnits::Months => add_months(date, amount),
        DateUnits::Years => add_months(date, amount.checked_mul(12)?),
    }
}

fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    }
}

fn checked(
    date: NaiveDate,
    amount: i32,
    units: DateUnits,
) -> Result<NaiveDate, ReminderError> {
    add_units(date, amount, units).ok_or(ReminderError::DateOverflow {
        base: date,
        amount,
        units,
    })
}

/// Due date for a reminder triggered on `trigger_date`:
/// trigger plus the type's default interval, units defaulting to years.
pub fn calculate_due_date(
    trigger_date: NaiveDate,
    reminder_type: &ReminderType,
) -> Result<NaiveDate, ReminderError> {
    checked(
        trigger_date,
        reminder_type.default_interval,
        reminder_type.default_units.unwrap_or(DateUnits::Years),
    )
}

/// Due date for a product-linked reminder: the product relationship carries
/// its own period and units, with the same missing-units default.
pub fn calculate_product_due_date(
    trigger_date: NaiveDate,
    period: i32,
    units: Option<DateUnits>,
) -> Result<NaiveDate, ReminderError> {
    checked(trigger_date, period, units.unwrap_or(DateUnits::Years))
}

/// Cancel date, or `None` when the type has no cancel units configured
/// (no cancellation is ever computed from this path).
pub fn calculate_cancel_date(
    due_date: NaiveDate,
    reminder_type: &ReminderType,
) -> Result<Option<NaiveDate>, ReminderError> {
    match reminder_type.cancel_units {
        Some(units) => Ok(Some(checked(due_date, reminder_type.cancel_interval, units)?)),
        None => Ok(None),
    }
}

/// True when the reminder should be cancelled as of `as_of`: the patient is
/// deceased, or a cancel date is computable and strictly past.
pub fn should_cancel(
    reminder: &Reminder,
    reminder_type: &ReminderType,
    patient: &Patient,
    as_of: NaiveDate,
) -> Result<bool, ReminderError> {
    if patient.deceased {
        return Ok(true);
    }
    match calculate_cancel_date(reminder.due_date, reminder_type)? {
        Some(cancel_date) => Ok(as_of > cancel_date),
        None => Ok(false),
    }
}

/// Where `as_of` sits relative to the due date, within the type's
/// sensitivity window (zero when unconfigured).
pub fn due_state(
    reminder: &Reminder,
    reminder_type: &ReminderType,
    as_of: NaiveDate,
) -> Result<DueState, ReminderError> {
    let (lower, upper) = match reminder_type.sensitivity_units {
        Some(units) => (
            checked(reminder.due_date, -reminder_type.sensitivity_interval, units)?,
            checked(reminder.due_date, reminder_type.sensitivity_interval, units)?,
        ),
        None => (reminder.due_date, reminder.due_date),
    };

    if as_of < lower {
        Ok(DueState::NotDue)
    } else if as_of > upper {
        Ok(DueState::Overdue)
    } else {
        Ok(DueState::Due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReminderStatus;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_type(interval: i32, units: Option<DateUnits>) -> ReminderType {
        ReminderType {
            id: Uuid::new_v4(),
            name: "Vaccination".into(),
            default_interval: interval,
            default_units: units,
            cancel_interval: 0,
            cancel_units: None,
            sensitivity_interval: 0,
            sensitivity_units: None,
            group_by: None,
            interactive: false,
            counts: vec![],
        }
    }

    fn make_reminder(due: NaiveDate) -> Reminder {
        Reminder {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            reminder_type_id: Uuid::new_v4(),
            due_date: due,
            status: ReminderStatus::InProgress,
            reminder_count: 0,
            product_id: None,
            created_at: due.and_hms_opt(0, 0, 0).unwrap(),
        }
    }

    fn make_patient(deceased: bool) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            name: "Rex".into(),
            species: None,
            deceased,
            active: true,
        }
    }

    #[test]
    fn due_date_arithmetic() {
        let months = make_type(2, Some(DateUnits::Months));
        assert_eq!(
            calculate_due_date(date(2007, 1, 1), &months).unwrap(),
            date(2007, 3, 1)
        );

        let years = make_type(5, Some(DateUnits::Years));
        assert_eq!(
            calculate_due_date(date(2007, 1, 1), &years).unwrap(),
            date(2012, 1, 1)
        );
    }

    #[test]
    fn missing_units_default_to_years() {
        let bare = make_type(1, None);
        assert_eq!(
            calculate_due_date(date(2007, 1, 1), &bare).unwrap(),
            date(2008, 1, 1)
        );
    }

    #[test]
    fn month_addition_clamps_to_month_end() {
        let months = make_type(1, Some(DateUnits::Months));
        assert_eq!(
            calculate_due_date(date(2007, 1, 31), &months).unwrap(),
            date(2007, 2, 28)
        );
    }

    #[test]
    fn product_period_defaults_to_years() {
        assert_eq!(
            calculate_product_due_date(date(2007, 1, 1), 3, None).unwrap(),
            date(2010, 1, 1)
        );
        assert_eq!(
            calculate_product_due_date(date(2007, 1, 1), 6, Some(DateUnits::Weeks)).unwrap(),
            date(2007, 2, 12)
        );
    }

    #[test]
    fn cancel_date_requires_units() {
        let mut rt = make_type(1, Some(DateUnits::Years));
        assert_eq!(calculate_cancel_date(date(2007, 1, 1), &rt).unwrap(), None);

        rt.cancel_interval = 2;
        rt.cancel_units = Some(DateUnits::Weeks);
        assert_eq!(
            calculate_cancel_date(date(2007, 1, 31), &rt).unwrap(),
            Some(date(2007, 2, 14))
        );
    }

    #[test]
    fn cancellation_boundary_is_strictly_past() {
        let mut rt = make_type(1, Some(DateUnits::Years));
        rt.cancel_interval = 2;
        rt.cancel_units = Some(DateUnits::Weeks);

        let reminder = make_reminder(date(2007, 1, 31));
        let patient = make_patient(false);

        // Cancel date is 2007-02-14: still live that day, gone the next
        assert!(!should_cancel(&reminder, &rt, &patient, date(2007, 2, 14)).unwrap());
        assert!(should_cancel(&reminder, &rt, &patient, date(2007, 2, 15)).unwrap());
    }

    #[test]
    fn deceased_patient_forces_cancellation() {
        let rt = make_type(1, Some(DateUnits::Years));
        let reminder = make_reminder(date(2007, 1, 1));
        let patient = make_patient(true);

        // No cancel units configured, date is well before due
        assert!(should_cancel(&reminder, &rt, &patient, date(2006, 1, 1)).unwrap());
    }

    #[test]
    fn due_state_with_zero_sensitivity() {
        let rt = make_type(1, Some(DateUnits::Years));
        let reminder = make_reminder(date(2007, 6, 1));

        assert_eq!(
            due_state(&reminder, &rt, date(2007, 5, 31)).unwrap(),
            DueState::NotDue
        );
        assert_eq!(
            due_state(&reminder, &rt, date(2007, 6, 1)).unwrap(),
            DueState::Due
        );
        assert_eq!(
            due_state(&reminder, &rt, date(2007, 6, 2)).unwrap(),
            DueState::Overdue
        );
    }

    #[test]
    fn due_state_with_sensitivity_window() {
        let mut rt = make_type(1, Some(DateUnits::Years));
        rt.sensitivity_interval = 1;
        rt.sensitivity_units = Some(DateUnits::Weeks);
        let reminder = make_reminder(date(2007, 6, 8));

        assert_eq!(
            due_state(&reminder, &rt, date(2007, 5, 31)).unwrap(),
            DueState::NotDue
        );
        assert_eq!(
            due_state(&reminder, &rt, date(2007, 6, 1)).unwrap(),
            DueState::Due
        );
        assert_eq!(
            due_state(&reminder, &rt, date(2007, 6, 15)).unwrap(),
            DueState::Due
        );
        assert_eq!(
            due_state(&reminder, &rt, date(2007, 6, 16)).unwrap(),
            DueState::Overdue
        );
    }
}
