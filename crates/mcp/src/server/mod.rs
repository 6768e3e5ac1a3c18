mod core;
mod errors;
mod http;
mod services;
mod stdio;

pub use self::core::N8nMcpCore;
pub use http::{DEFAULT_HTTP_BIND, McpHttpServer, RunningMcpHttpServer, resolve_bind_address};
pub use services::WorkflowServices;
pub use stdio::serve_stdio;
