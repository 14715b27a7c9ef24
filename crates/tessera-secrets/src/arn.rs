//! ARN parsing
//!
//! Only the shape needed to import a secret is checked. Secret ARNs end in
//! `secret:<name>-<suffix>`, where the suffix is six random characters added
//! by the service. Stripping it is a heuristic: a name that itself ends in
//! `-<alphanumerics>` cannot be told apart from a suffixed name.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Length of the random suffix the service appends to secret names
pub const SECRET_SUFFIX_LEN: usize = 6;

static SECRET_RESOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^secret:(?P<name>.+)-(?P<suffix>[A-Za-z0-9]+)$")
        .expect("secret resource regex is valid")
});

/// The components of `arn:partition:service:region:account:resource`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account: String,
    pub resource: String,
}

impl Arn {
    pub fn parse(arn: &str) -> Result<Self> {
        let parts: Vec<&str> = arn.splitn(6, ':').collect();
        if parts.len() != 6 {
            return Err(Error::invalid_arn(arn, "expected 6 colon-separated components"));
        }
        if parts[0] != "arn" {
            return Err(Error::invalid_arn(arn, "must start with 'arn:'"));
        }
        if parts[5].is_empty() {
            return Err(Error::invalid_arn(arn, "missing resource component"));
        }

        Ok(Self {
            partition: parts[1].to_string(),
            service: parts[2].to_string(),
            region: parts[3].to_string(),
            account: parts[4].to_string(),
            resource: parts[5].to_string(),
        })
    }
}

/// Extract the secret name from a full secret ARN, dropping the random suffix
pub fn parse_secret_name(arn: &str) -> Result<String> {
    let parsed = Arn::parse(arn)?;
    let captures = SECRET_RESOURCE_RE
        .captures(&parsed.resource)
        .ok_or_else(|| {
            Error::invalid_arn(arn, "resource must have the form 'secret:<name>-<suffix>'")
        })?;

    let suffix = &captures["suffix"];
    if suffix.len() != SECRET_SUFFIX_LEN {
        warn!(
            "Secret ARN suffix '{}' is {} characters, expected {}; name may be truncated",
            suffix,
            suffix.len(),
            SECRET_SUFFIX_LEN
        );
    }

    Ok(captures["name"].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_parse_components() {
        let arn = Arn::parse("arn:aws:secretsmanager:eu-west-1:111122223333:secret:db-AbC123")
            .unwrap();
        assert_eq!(arn.partition, "aws");
        assert_eq!(arn.service, "secretsmanager");
        assert_eq!(arn.region, "eu-west-1");
        assert_eq!(arn.account, "111122223333");
        assert_eq!(arn.resource, "secret:db-AbC123");
    }

    #[test_case("arn:aws:secretsmanager:us-east-1:111122223333:secret:MySecret-f3gDy9", "MySecret" ; "simple")]
    #[test_case("arn:aws:secretsmanager:us-east-1:111122223333:secret:prod/db-creds-f3gDy9", "prod/db-creds" ; "hyphenated path")]
    #[test_case("arn:aws-cn:secretsmanager:cn-north-1:111122223333:secret:a-b-c-XYZ789", "a-b-c" ; "other partition")]
    fn test_secret_name(arn: &str, expected: &str) {
        assert_eq!(parse_secret_name(arn).unwrap(), expected);
    }

    #[test_case("arn:aws:secretsmanager:us-east-1:111122223333:" ; "empty resource")]
    #[test_case("arn:aws:secretsmanager:us-east-1:111122223333" ; "missing resource")]
    #[test_case("aws:secretsmanager:us-east-1:111122223333:secret:x-abcdef:1" ; "no arn prefix")]
    #[test_case("arn:aws:secretsmanager:us-east-1:111122223333:secret:nosuffix" ; "no suffix")]
    #[test_case("arn:aws:secretsmanager:us-east-1:111122223333:key:name-abcdef" ; "not a secret")]
    fn test_rejects(arn: &str) {
        assert!(matches!(
            parse_secret_name(arn),
            Err(Error::InvalidArn { .. })
        ));
    }
}
