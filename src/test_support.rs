//! Shared fixtures for unit tests

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::condition::{NumericType, ValueKind};
use crate::property::{Number, PropertyCollection, PropertyDescriptor, PropertyRegistry, Value};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Person {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub score: u8,
    pub rating: f64,
    pub balance: Decimal,
    pub active: bool,
    pub verified: Option<bool>,
    pub born: Option<NaiveDateTime>,
    pub joined: NaiveDateTime,
}

impl Person {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn aged(age: Option<i32>) -> Self {
        Self {
            age,
            ..Default::default()
        }
    }
}

/// Route `tracing` output to the test harness; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid test date")
}

pub fn person_properties() -> PropertyCollection<Person> {
    PropertyCollection::new(vec![
        PropertyDescriptor::new("Person", "Name", ValueKind::String, true, |p: &Person| {
            p.name.clone().into()
        })
        .with_setter(|p: &mut Person, v| {
            p.name = v.as_str().map(str::to_string);
            Ok(())
        }),
        PropertyDescriptor::new(
            "Person",
            "Age",
            ValueKind::Numeric(NumericType::I32),
            true,
            |p: &Person| p.age.into(),
        )
        .with_setter(|p: &mut Person, v| {
            p.age = match v {
                Value::Number(Number::Signed(n)) => Some(n as i32),
                _ => None,
            };
            Ok(())
        }),
        PropertyDescriptor::new(
            "Person",
            "Score",
            ValueKind::Numeric(NumericType::U8),
            false,
            |p: &Person| p.score.into(),
        ),
        PropertyDescriptor::new(
            "Person",
            "Rating",
            ValueKind::Numeric(NumericType::F64),
            false,
            |p: &Person| p.rating.into(),
        ),
        PropertyDescriptor::new(
            "Person",
            "Balance",
            ValueKind::Numeric(NumericType::Decimal),
            false,
            |p: &Person| p.balance.into(),
        ),
        PropertyDescriptor::new("Person", "Active", ValueKind::Boolean, false, |p: &Person| {
            p.active.into()
        }),
        PropertyDescriptor::new("Person", "Verified", ValueKind::Boolean, true, |p: &Person| {
            p.verified.into()
        }),
        PropertyDescriptor::new("Person", "Born", ValueKind::DateTime, true, |p: &Person| {
            p.born.into()
        }),
        PropertyDescriptor::new("Person", "Joined", ValueKind::DateTime, false, |p: &Person| {
            p.joined.into()
        }),
    ])
}

pub fn person_registry() -> PropertyRegistry<Person> {
    let registry = PropertyRegistry::new();
    registry.register("Person", person_properties());
    registry
}

pub fn property(name: &str) -> PropertyDescriptor<Person> {
    person_properties()
        .get(name)
        .cloned()
        .expect("known test property")
}
