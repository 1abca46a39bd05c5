use plinth_ir::{EventType, HttpMethod};
use serde::Deserialize;

use crate::{ParseContext, Result};

/// A gateway route bound to a function
///
/// ```toml
/// [[route]]
/// api = "ApiGateway"
/// path = "/users"
/// method = "POST"
/// function = "ApiHandler"
/// authorizer = "CognitoAuthorizer"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteDecl {
    pub api: String,
    pub path: String,
    pub method: HttpMethod,
    pub function: String,
    pub authorizer: Option<String>,
}

impl RouteDecl {
    pub(crate) fn validate(&self, ctx: &ParseContext) -> Result<()> {
        ctx.validate_id(&self.api, "route api", ctx.find_span(&self.api))?;
        ctx.validate_id(&self.function, "route function", ctx.find_span(&self.function))?;
        if let Some(authorizer) = &self.authorizer {
            ctx.validate_id(authorizer, "route authorizer", ctx.find_span(authorizer))?;
        }

        if !self.path.starts_with('/') {
            return Err(ctx.source_context().validation_error(
                format!("route path '{}' must start with '/'", self.path),
                ctx.find_span(&self.path),
            ));
        }
        Ok(())
    }
}

/// A bucket event notification bound to a function
///
/// ```toml
/// [[notification]]
/// bucket = "UploadBucket"
/// event = "object-created"
/// function = "FileProcessor"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationDecl {
    pub bucket: String,
    #[serde(default = "default_event")]
    pub event: EventType,
    pub function: String,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

fn default_event() -> EventType {
    EventType::ObjectCreated
}

impl NotificationDecl {
    pub(crate) fn validate(&self, ctx: &ParseContext) -> Result<()> {
        ctx.validate_id(&self.bucket, "notification bucket", ctx.find_span(&self.bucket))?;
        ctx.validate_id(
            &self.function,
            "notification function",
            ctx.find_span(&self.function),
        )
    }
}
