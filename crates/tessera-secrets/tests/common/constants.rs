//! Shared test constants

pub const ACCOUNT: &str = "111122223333";
pub const REGION: &str = "us-east-1";

pub const SECRET_ARN: &str =
    "arn:aws:secretsmanager:us-east-1:111122223333:secret:prod/db-credentials-f3gDy9";
pub const SECRET_NAME: &str = "prod/db-credentials";

pub const KEY_ARN: &str =
    "arn:aws:kms:us-east-1:111122223333:key/1234abcd-12ab-34cd-56ef-1234567890ab";

pub const ROTATION_FUNCTION_ARN: &str =
    "arn:aws:lambda:us-east-1:111122223333:function:rotate-credentials";

pub const READ_ACTIONS: [&str; 2] = [
    "secretsmanager:GetSecretValue",
    "secretsmanager:DescribeSecret",
];
