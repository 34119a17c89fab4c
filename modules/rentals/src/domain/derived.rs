//! Fields computed at request time for the user listing.

use chrono::{Datelike, NaiveDate};
use listing_query::{Record, Value};

use crate::contract::model::UserSummary;
use crate::domain::fields::user;

/// Whole years between `birth` and `today`. A 29 February birthday counts
/// as passed on 1 March of non-leap years.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    if today < birth {
        return 0;
    }
    let years = today.year() - birth.year();
    let before_birthday = (today.month(), today.day()) < (birth.month(), birth.day());
    let age = if before_birthday { years - 1 } else { years };
    u32::try_from(age).unwrap_or(0)
}

impl Record for UserSummary {
    fn field(&self, name: &str) -> Value {
        let u = &self.user;
        match name {
            user::FIRST_NAME => Value::Text(u.first_name.clone()),
            user::LAST_NAME => Value::Text(u.last_name.clone()),
            user::EMAIL => Value::Text(u.email.clone()),
            user::ROLE => Value::Text(u.role.as_str().to_string()),
            user::AGE => Value::Integer(i64::from(self.age)),
            user::PUBLISHED_FLATS_COUNT => {
                Value::Integer(i64::try_from(self.published_flats_count).unwrap_or(i64::MAX))
            }
            user::CREATED_AT => Value::DateTime(u.created_at),
            user::ID => Value::Uuid(u.id),
            _ => Value::Null,
        }
    }
}
