//! Rust client SDK for the TourCraft AI tour-generation backend.
//!
//! The SDK is the resilient layer between a UI and the remote backend: an
//! authenticated HTTP client with per-call timeout classes, the bearer-token
//! lifecycle, and the multi-step fallback workflow that generates a tour and
//! then resolves local guides for it.
//!
//! # Architecture
//!
//! - [`token`]: injectable bearer-token storage (in-memory and file-backed)
//! - [`client`]: typed HTTP client — timeout classes, auth-header injection,
//!   uniform error decoding, session teardown on 401
//! - [`auth`]: login/register/verify/logout over the client
//! - [`tours`]: tour generation (saved and sample) with local validation
//! - [`guides`]: guide matching — search → research → static fallback,
//!   memoized per tour
//! - [`workflow`]: the generation state machine a UI drives
//!
//! # Example
//!
//! ```rust,no_run
//! use tourcraft_sdk::{Client, ClientSettings, GenerationWorkflow, TourRequest, WorkflowState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(ClientSettings::from_env().map_err(tourcraft_sdk::Error::Config)?)?;
//!     let mut workflow = GenerationWorkflow::new(client);
//!
//!     let request = TourRequest {
//!         destination: "Paris".to_string(),
//!         duration: 4,
//!         interests: vec!["food".to_string(), "art".to_string()],
//!         travel_style: "Cultural".to_string(),
//!         budget: 120.0,
//!         group_size: 2,
//!     };
//!
//!     if let WorkflowState::Success = workflow.submit(&request, false).await {
//!         let tour = workflow.last_tour().unwrap();
//!         println!("{}: {} stops", tour.title, tour.itinerary.len());
//!
//!         if let Some(resolved) = workflow.toggle_guides().await {
//!             for view in &resolved.guides {
//!                 println!("{} — ${:.0}", view.guide.name, view.estimated_cost);
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod guides;
pub mod token;
pub mod tours;
pub mod types;
pub mod workflow;

// Re-exports
pub use client::{CallOptions, Client, ClientBuilder, SessionInvalidatedHook};
pub use config::{ClientSettings, TimeoutClass, TimeoutClasses};
pub use error::{Error, Result};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use types::*;
pub use workflow::{GenerationWorkflow, WorkflowState, PROGRESS_STEPS, STEP_COMPLETE};
