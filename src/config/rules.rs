//! Per-field checks used by configuration validation.

use crate::config::error::ConfigViolation;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

pub(crate) type Check = Validation<(), NonEmptyVec<ConfigViolation>>;

fn check(ok: bool, violation: impl FnOnce() -> ConfigViolation) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

pub(crate) fn non_negative(field: &'static str, value: f32) -> Check {
    check(value.is_finite() && value >= 0.0, || {
        ConfigViolation::Negative { field, value }
    })
}

pub(crate) fn positive(field: &'static str, value: f32) -> Check {
    check(value.is_finite() && value > 0.0, || {
        ConfigViolation::NotPositive { field, value }
    })
}

pub(crate) fn unit_range(field: &'static str, value: f32) -> Check {
    check((0.0..=1.0).contains(&value), || {
        ConfigViolation::OutsideUnitRange { field, value }
    })
}

pub(crate) fn at_least(field: &'static str, value: u64, min: u64) -> Check {
    check(value >= min, || ConfigViolation::TooSmall { field, value, min })
}
