//! Rotation schedules

use crate::error::{Error, Result};
use std::ops::RangeInclusive;
use tessera_core::{LogicalId, Token};

/// Rotation interval used when none is given
pub const DEFAULT_ROTATION_DAYS: u32 = 30;

/// Intervals accepted by the service
pub const ROTATION_DAYS_RANGE: RangeInclusive<u32> = 1..=1000;

/// The function that performs the rotation
#[derive(Debug, Clone, PartialEq)]
pub struct RotationLambda {
    function_arn: Token,
}

impl RotationLambda {
    pub fn from_function_arn(function_arn: impl Into<Token>) -> Self {
        Self {
            function_arn: function_arn.into(),
        }
    }

    /// A function resource node of this stack
    pub fn from_resource(logical_id: &LogicalId) -> Self {
        Self::from_function_arn(Token::get_att(logical_id, "Arn"))
    }

    pub fn function_arn(&self) -> &Token {
        &self.function_arn
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotationScheduleOptions {
    pub rotation_lambda: RotationLambda,
    /// Defaults to [`DEFAULT_ROTATION_DAYS`]
    pub automatically_after_days: Option<u32>,
}

impl RotationScheduleOptions {
    pub fn new(rotation_lambda: RotationLambda) -> Self {
        Self {
            rotation_lambda,
            automatically_after_days: None,
        }
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.automatically_after_days = Some(days);
        self
    }

    /// The interval to emit, checked against [`ROTATION_DAYS_RANGE`]
    pub fn rotation_days(&self) -> Result<u32> {
        let days = self.automatically_after_days.unwrap_or(DEFAULT_ROTATION_DAYS);
        if !ROTATION_DAYS_RANGE.contains(&days) {
            return Err(Error::invalid_rotation(format!(
                "automatically_after_days must be between {} and {} days, got {}",
                ROTATION_DAYS_RANGE.start(),
                ROTATION_DAYS_RANGE.end(),
                days
            )));
        }
        Ok(days)
    }
}

/// Handle to a rotation schedule resource
#[derive(Debug, Clone, PartialEq)]
pub struct RotationSchedule {
    logical_id: LogicalId,
    permission: LogicalId,
}

impl RotationSchedule {
    pub(crate) fn new(logical_id: LogicalId, permission: LogicalId) -> Self {
        Self {
            logical_id,
            permission,
        }
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    /// The permission that lets the service invoke the rotation function
    pub fn permission(&self) -> &LogicalId {
        &self.permission
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn options() -> RotationScheduleOptions {
        RotationScheduleOptions::new(RotationLambda::from_function_arn(
            "arn:aws:lambda:us-east-1:111122223333:function:rotate",
        ))
    }

    #[test]
    fn test_default_days() {
        assert_eq!(options().rotation_days().unwrap(), DEFAULT_ROTATION_DAYS);
    }

    #[test_case(1 ; "lower bound")]
    #[test_case(1000 ; "upper bound")]
    fn test_accepts(days: u32) {
        assert_eq!(options().with_days(days).rotation_days().unwrap(), days);
    }

    #[test_case(0 ; "zero")]
    #[test_case(1001 ; "too long")]
    fn test_rejects(days: u32) {
        assert!(matches!(
            options().with_days(days).rotation_days(),
            Err(Error::InvalidRotation { .. })
        ));
    }
}
