//! Expansion of grant intents into concrete policy statements.
//!
//! Named access levels map to fixed action sets per target kind. Statement
//! resources are written as output references (`${Table.tableArn}`), so they
//! are bound to literal ARNs together with the rest of the principal's
//! configuration.

use plinth_ir::{
    Access, Grant, GrantIntent, OutputRef, Policy, PolicyStatement, ResourceDescriptor,
    ResourceKind,
};

use crate::GrantError;

const TABLE_READ: &[&str] = &[
    "dynamodb:BatchGetItem",
    "dynamodb:ConditionCheckItem",
    "dynamodb:DescribeTable",
    "dynamodb:GetItem",
    "dynamodb:GetRecords",
    "dynamodb:GetShardIterator",
    "dynamodb:Query",
    "dynamodb:Scan",
];

const TABLE_WRITE: &[&str] = &[
    "dynamodb:BatchWriteItem",
    "dynamodb:DeleteItem",
    "dynamodb:DescribeTable",
    "dynamodb:PutItem",
    "dynamodb:UpdateItem",
];

const BUCKET_READ: &[&str] = &["s3:GetBucket*", "s3:GetObject*", "s3:List*"];

const BUCKET_PUT: &[&str] = &[
    "s3:Abort*",
    "s3:PutObject",
    "s3:PutObjectLegalHold",
    "s3:PutObjectRetention",
    "s3:PutObjectTagging",
    "s3:PutObjectVersionTagging",
];

const BUCKET_DELETE: &[&str] = &["s3:DeleteObject*"];

const LOG_WRITE: &[&str] = &["logs:CreateLogStream", "logs:PutLogEvents"];

/// Action granted to callers of a function.
pub const INVOKE_FUNCTION: &str = "lambda:InvokeFunction";

/// Resolves grants against the descriptors they name.
pub struct GrantResolver<'a> {
    lookup: Box<dyn Fn(&str) -> Option<&'a ResourceDescriptor> + 'a>,
}

impl<'a> GrantResolver<'a> {
    /// Create a resolver that finds descriptors through `lookup`.
    pub fn new(lookup: impl Fn(&str) -> Option<&'a ResourceDescriptor> + 'a) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Expand a grant into the statements it stands for.
    pub fn statements(&self, grant: &Grant) -> Result<Vec<PolicyStatement>, GrantError> {
        let principal = (self.lookup)(&grant.principal).ok_or_else(|| {
            GrantError::UnknownPrincipal {
                principal: grant.principal.clone(),
            }
        })?;
        if !principal.kind().is_principal() {
            return Err(GrantError::NotAPrincipal {
                principal: grant.principal.clone(),
                kind: principal.kind(),
            });
        }

        match (&grant.target, grant.global) {
            (Some(target), true) => Err(GrantError::GlobalWithTarget {
                principal: grant.principal.clone(),
                target: target.clone(),
            }),
            (None, false) => Err(GrantError::Unscoped {
                principal: grant.principal.clone(),
            }),
            (None, true) => match &grant.intent {
                GrantIntent::Custom { effect, actions } if !actions.is_empty() => {
                    Ok(vec![PolicyStatement::allow(actions.iter().cloned(), ["*"]).with_effect(*effect)])
                }
                GrantIntent::Custom { .. } => Err(GrantError::NoActions {
                    principal: grant.principal.clone(),
                }),
                GrantIntent::Access(_) => Err(GrantError::Unscoped {
                    principal: grant.principal.clone(),
                }),
            },
            (Some(target), false) => {
                let descriptor = (self.lookup)(target).ok_or_else(|| GrantError::UnknownTarget {
                    principal: grant.principal.clone(),
                    target: target.clone(),
                })?;
                self.scoped(grant, descriptor)
            }
        }
    }

    /// Expand a grant and append its statements to `policy`.
    ///
    /// Returns the number of statements that were not already present, so
    /// resolving the same grant twice adds nothing the second time.
    pub fn resolve(&self, grant: &Grant, policy: &mut Policy) -> Result<usize, GrantError> {
        let added = self
            .statements(grant)?
            .into_iter()
            .filter(|statement| policy.add(statement.clone()))
            .count();
        Ok(added)
    }

    fn scoped(
        &self,
        grant: &Grant,
        target: &ResourceDescriptor,
    ) -> Result<Vec<PolicyStatement>, GrantError> {
        let kind = target.kind();
        let arn_key = kind.arn_output().ok_or_else(|| GrantError::NoArn {
            principal: grant.principal.clone(),
            target: target.id().to_string(),
            kind,
        })?;
        let arn = OutputRef::new(target.id(), arn_key).token();

        let access = match &grant.intent {
            GrantIntent::Custom { effect, actions } => {
                if actions.is_empty() {
                    return Err(GrantError::NoActions {
                        principal: grant.principal.clone(),
                    });
                }
                return Ok(vec![
                    PolicyStatement::allow(actions.iter().cloned(), [arn]).with_effect(*effect),
                ]);
            }
            GrantIntent::Access(access) => *access,
        };

        let unsupported = || GrantError::Unsupported {
            principal: grant.principal.clone(),
            target: target.id().to_string(),
            kind,
            access,
        };

        let statement = match (kind, access) {
            (ResourceKind::Table, Access::Read) => table(&arn, &[TABLE_READ]),
            (ResourceKind::Table, Access::Write) => table(&arn, &[TABLE_WRITE]),
            (ResourceKind::Table, Access::ReadWrite) => table(&arn, &[TABLE_READ, TABLE_WRITE]),
            (ResourceKind::Bucket, Access::Read) => bucket(&arn, &[BUCKET_READ]),
            (ResourceKind::Bucket, Access::Write) => bucket(&arn, &[BUCKET_DELETE, BUCKET_PUT]),
            (ResourceKind::Bucket, Access::ReadWrite) => {
                bucket(&arn, &[BUCKET_READ, BUCKET_DELETE, BUCKET_PUT])
            }
            (ResourceKind::Bucket, Access::Put) => {
                PolicyStatement::allow(BUCKET_PUT.iter().copied(), [format!("{}/*", arn)])
            }
            (ResourceKind::LogGroup, Access::Write) => {
                PolicyStatement::allow(LOG_WRITE.iter().copied(), [arn])
            }
            (ResourceKind::Function, Access::Invoke) => {
                PolicyStatement::allow([INVOKE_FUNCTION], [arn])
            }
            _ => return Err(unsupported()),
        };
        Ok(vec![statement])
    }
}

fn table(arn: &str, action_sets: &[&[&str]]) -> PolicyStatement {
    PolicyStatement::allow(
        action_sets.iter().flat_map(|set| set.iter().copied()),
        [arn.to_string(), format!("{}/index/*", arn)],
    )
}

fn bucket(arn: &str, action_sets: &[&[&str]]) -> PolicyStatement {
    PolicyStatement::allow(
        action_sets.iter().flat_map(|set| set.iter().copied()),
        [arn.to_string(), format!("{}/*", arn)],
    )
}
