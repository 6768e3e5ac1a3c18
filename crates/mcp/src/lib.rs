//! Model Context Protocol (MCP) tool server for n8n workflows.
//!
//! Exposes create, get, list, activation, update and delete operations on an
//! n8n instance as MCP tools, served over stdio or streamable HTTP.

pub mod server;

pub use server::{DEFAULT_HTTP_BIND, McpHttpServer, N8nMcpCore, RunningMcpHttpServer, WorkflowServices, resolve_bind_address, serve_stdio};
