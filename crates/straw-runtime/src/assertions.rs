use std::cmp::Ordering;

use straw_core::{Failure, StrawValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    True,
    False,
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
}

impl Predicate {
    pub const ALL: [Predicate; 8] = [
        Self::True,
        Self::False,
        Self::Equal,
        Self::NotEqual,
        Self::LessThan,
        Self::LessThanEqual,
        Self::GreaterThan,
        Self::GreaterThanEqual,
    ];

    /// Script-facing name, also stored on the raised failure.
    pub fn name(self) -> &'static str {
        match self {
            Self::True => "assertTrue",
            Self::False => "assertFalse",
            Self::Equal => "assertEqual",
            Self::NotEqual => "assertNotEqual",
            Self::LessThan => "assertLessThan",
            Self::LessThanEqual => "assertLessThanEqual",
            Self::GreaterThan => "assertGreaterThan",
            Self::GreaterThanEqual => "assertGreaterThanEqual",
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Self::True | Self::False)
    }

    fn description(self) -> &'static str {
        match self {
            Self::True => "Parameter does not evaluate to true",
            Self::False => "Parameter does not evaluate to false",
            Self::Equal => "Parameters are not equal",
            Self::NotEqual => "Parameters are equal",
            Self::LessThan => "Parameter a is not less than b",
            Self::LessThanEqual => "Parameter a is not less than or equal to b",
            Self::GreaterThan => "Parameter a is not greater than b",
            Self::GreaterThanEqual => "Parameter a is not greater than or equal to b",
        }
    }

    fn operator(self) -> &'static str {
        match self {
            Self::True | Self::False | Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
        }
    }
}

/// Checks a unary predicate against an already evaluated truth value.
/// `rendered` is how the operand shows up in the failure message.
pub fn check_truth(predicate: Predicate, truthy: bool, rendered: &str) -> Result<(), Failure> {
    let holds = match predicate {
        Predicate::True => truthy,
        Predicate::False => !truthy,
        other => {
            return Err(Failure::internal(format!(
                "{} takes two operands",
                other.name()
            )))
        }
    };
    if holds {
        return Ok(());
    }
    Err(Failure::assertion(
        predicate.name(),
        format!(
            "{}: {} (got {})",
            predicate.name(),
            predicate.description(),
            rendered
        ),
    )
    .with_operands(rendered, None))
}

/// Checks an equality or ordering predicate. Mixed kinds are unequal; ordering
/// mixed kinds is an internal failure since no order exists between them.
pub fn check_comparison(
    predicate: Predicate,
    actual: &StrawValue,
    expected: &StrawValue,
) -> Result<(), Failure> {
    let holds = match predicate {
        Predicate::Equal => actual.loosely_equals(expected),
        Predicate::NotEqual => !actual.loosely_equals(expected),
        Predicate::LessThan => actual.compare(expected)? == Ordering::Less,
        Predicate::LessThanEqual => actual.compare(expected)? != Ordering::Greater,
        Predicate::GreaterThan => actual.compare(expected)? == Ordering::Greater,
        Predicate::GreaterThanEqual => actual.compare(expected)? != Ordering::Less,
        Predicate::True | Predicate::False => {
            return Err(Failure::internal(format!(
                "{} takes a single operand",
                predicate.name()
            )))
        }
    };
    if holds {
        return Ok(());
    }

    let actual = actual.to_literal();
    let expected = expected.to_literal();
    Err(Failure::assertion(
        predicate.name(),
        format!(
            "{}: {} (expected {} {} {})",
            predicate.name(),
            predicate.description(),
            actual,
            predicate.operator(),
            expected
        ),
    )
    .with_operands(actual, Some(expected)))
}

pub fn assert_true(value: &StrawValue) -> Result<(), Failure> {
    check_truth(Predicate::True, value.is_truthy(), &value.to_literal())
}

pub fn assert_false(value: &StrawValue) -> Result<(), Failure> {
    check_truth(Predicate::False, value.is_truthy(), &value.to_literal())
}

pub fn assert_equal(a: &StrawValue, b: &StrawValue) -> Result<(), Failure> {
    check_comparison(Predicate::Equal, a, b)
}

pub fn assert_not_equal(a: &StrawValue, b: &StrawValue) -> Result<(), Failure> {
    check_comparison(Predicate::NotEqual, a, b)
}

pub fn assert_less_than(a: &StrawValue, b: &StrawValue) -> Result<(), Failure> {
    check_comparison(Predicate::LessThan, a, b)
}

pub fn assert_less_than_equal(a: &StrawValue, b: &StrawValue) -> Result<(), Failure> {
    check_comparison(Predicate::LessThanEqual, a, b)
}

pub fn assert_greater_than(a: &StrawValue, b: &StrawValue) -> Result<(), Failure> {
    check_comparison(Predicate::GreaterThan, a, b)
}

pub fn assert_greater_than_equal(a: &StrawValue, b: &StrawValue) -> Result<(), Failure> {
    check_comparison(Predicate::GreaterThanEqual, a, b)
}
