//! MCP server module for Meridian.

mod http;
mod server;
mod session;
mod transport;

pub use http::{create_router, SESSION_HEADER};
pub use server::{GetContextParams, MeridianServer, SERVER_INSTRUCTIONS};
pub use session::{Session, SessionRegistry};
pub use transport::{run_http, run_server, run_stdio};
