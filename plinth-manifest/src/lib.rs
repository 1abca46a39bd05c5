//! TOML declaration parsing and validation for plinth.
//!
//! A `plinth.toml` file declares a stack: its resources, the grants between
//! them, gateway routes, and bucket notifications. Parsing produces a
//! [`Manifest`]; structural problems that can be pointed at in the source
//! (bad ids, duplicate ids, contradictory grant fields) are reported as
//! [`miette`] diagnostics. Graph-level checks (unknown references, cycles)
//! happen later in `plinth-engine`.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod grant;
mod manifest;
mod resource;
mod wiring;

pub use error::{Error, Result, SourceContext};
pub use grant::GrantDecl;
pub use manifest::{Manifest, ParseContext, StackConfig, StackToml, parse_manifest};
pub use resource::ResourceDecl;
pub use wiring::{NotificationDecl, RouteDecl};

/// Default manifest filename.
pub const MANIFEST_FILE: &str = "plinth.toml";
