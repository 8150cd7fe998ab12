//! SkyPath web app: an interactive flight globe with model-backed flight
//! lookups, compiled to wasm.

pub mod config;
pub mod gemini;
pub mod logging;
pub mod orchestrator;
pub mod pointer;
pub mod state_cell;
pub mod ticket;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod dom;

pub use config::AppConfig;
pub use gemini::{SearchError, SearchOutcome};
pub use orchestrator::{Orchestrator, SearchTicket};
pub use ticket::TicketView;
