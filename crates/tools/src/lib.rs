//! Client tools for the voice concierge
//!
//! Tools are merged per session from page-supplied entries and two
//! built-ins (`get_current_time`, `navigate_to_menu`). The first registration
//! of a name wins, so a page can replace a built-in but the built-ins never
//! clobber a page tool.

pub mod function;
pub mod lease;
pub mod navigate;
pub mod pending;
pub mod registry;
pub mod time;

pub use function::FnTool;
pub use lease::SessionLease;
pub use navigate::NavigateToMenuTool;
pub use pending::PendingNavigation;
pub use registry::{create_session_registry, ToolRegistry};
pub use time::GetCurrentTimeTool;

pub use voice_concierge_core::{Tool, ToolError, ToolExecutor, ToolOutput, ToolSchema};
