//! Per-actor action queues and the use-object-on-target pipeline for the
//! Artisan server.
//!
//! This crate wraps the synchronous rules core in `artisan-rules` with the
//! concurrency it needs: one tokio task per actor, a busy flag, timed
//! pipeline steps, and confirmation dialogs that suspend an attempt until
//! the player answers.
//!
//! # Modules
//!
//! - [`actor`] -- Serialized per-actor queues ([`ActorHandle`]).
//! - [`config`] -- Server configuration loaded from YAML ([`ServerConfig`]).
//! - [`confirm`] -- One open confirmation dialog per actor.
//! - [`error`] -- Pipeline errors ([`PipelineError`]).
//! - [`notify`] -- Broadcast fan-out of rules-core notices.
//! - [`pipeline`] -- The ordered steps of one attempt.
//! - [`services`] -- Shared engine, data, dice, and guid allocation.

pub mod actor;
pub mod config;
pub mod confirm;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod services;

pub use actor::{ActorHandle, ActorState};
pub use config::{ConfigError, LoggingConfig, PipelineConfig, ServerConfig, WorldConfig};
pub use confirm::{ConfirmationManager, Reply, Ticket};
pub use error::PipelineError;
pub use notify::BroadcastNotifier;
pub use pipeline::UseRequest;
pub use services::{GuidAllocator, Services};
