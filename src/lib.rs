pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod http_server;
pub mod locale;
pub mod metrics;
pub mod session;
pub mod studio;
pub mod workspace;

pub use engine::{StudioEngine, StudioHandle};
pub use studio::{Studio, StudioView};
pub use workspace::WorkspaceStore;
