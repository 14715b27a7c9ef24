//! Principals that policy statements can name

use crate::token::{Pseudo, Token};
use std::fmt;

/// An identity a statement grants to or denies
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyPrincipal {
    /// An IAM entity by ARN
    Arn(Token),
    /// Every identity of an account, rendered as the account's root ARN
    Account(Token),
    /// An AWS service, e.g. `lambda.amazonaws.com`
    Service(String),
    /// Anyone
    Any,
}

impl PolicyPrincipal {
    pub fn arn(arn: impl Into<Token>) -> Self {
        PolicyPrincipal::Arn(arn.into())
    }

    pub fn account(account_id: impl Into<Token>) -> Self {
        PolicyPrincipal::Account(account_id.into())
    }

    /// The account the stack is deployed into
    pub fn account_root() -> Self {
        PolicyPrincipal::Account(Token::pseudo(Pseudo::AccountId))
    }

    pub fn service(service: impl Into<String>) -> Self {
        PolicyPrincipal::Service(service.into())
    }

    /// Key under `Principal` and the value placed there
    pub fn policy_fragment(&self) -> (&'static str, Token) {
        match self {
            PolicyPrincipal::Arn(arn) => ("AWS", arn.clone()),
            PolicyPrincipal::Account(account) => (
                "AWS",
                Token::concat([
                    Token::literal("arn:"),
                    Token::pseudo(Pseudo::Partition),
                    Token::literal(":iam::"),
                    account.clone(),
                    Token::literal(":root"),
                ]),
            ),
            PolicyPrincipal::Service(service) => ("Service", Token::literal(service.as_str())),
            PolicyPrincipal::Any => ("AWS", Token::literal("*")),
        }
    }
}

impl fmt::Display for PolicyPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyPrincipal::Arn(arn) => write!(f, "ArnPrincipal({})", arn),
            PolicyPrincipal::Account(account) => write!(f, "AccountPrincipal({})", account),
            PolicyPrincipal::Service(service) => write!(f, "ServicePrincipal({})", service),
            PolicyPrincipal::Any => write!(f, "AnyPrincipal"),
        }
    }
}
