//! Directive handling for the bridge
//!
//! This module handles:
//! - Routing inbound directives by namespace
//! - Validating tokens and resolving the caller's devices
//! - Delivering power commands and shaping protocol responses

mod router;
pub mod handlers;

pub use handlers::HandlerContext;
pub use router::DirectiveRouter;
