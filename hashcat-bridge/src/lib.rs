//! hashcat bridge library
//!
//! Host-side plumbing between an application and the hashcat compute engine.
//!
//! # Architecture
//!
//! The library is intentionally small and sits exactly at the boundary:
//! - Relays engine events to host handlers through a C callback
//! - Owns the argument vectors handed to the engine and releases them
//! - Marshals session options into engine arguments (and parses them back)
//! - Drives an engine through the [`Engine`] trait
//! - Builds a hash-type catalog from engine module sources
//!
//! The library does NOT:
//! - Schedule work, dispatch kernels, or crack anything
//! - Decide what to do with events (that is the handler's job)
//!
//! # Example Usage
//!
//! ```no_run
//! use hashcat_bridge::{Engine, Event, HostOptions, Payload, Session, SessionOptions};
//!
//! fn crack<E: Engine>(engine: E) -> hashcat_bridge::Result<()> {
//!     let options = HostOptions::new().with_shared_path("/usr/local/share/hashcat");
//!
//!     let session = Session::new(options, engine, |event: &Event<'_>| {
//!         if let Payload::Cracked { hash, plain } = event.payload() {
//!             println!("{} -> {}", hash, plain);
//!         }
//!     })?;
//!
//!     let job = SessionOptions {
//!         hash_type: Some(0),
//!         attack_mode: Some(0),
//!         potfile_disable: Some(true),
//!         ..SessionOptions::new("5d41402abc4b2a76b9719d911017c592")
//!     }
//!     .with_dictionary("./wordlist.txt");
//!
//!     session.run_job_with_options(&job)
//! }
//! ```

// Public modules
pub mod argv;
pub mod catalog;
pub mod config;
pub mod options;
pub mod relay;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use argv::{hashcat_bridge_free_argv, Argv};
pub use catalog::HashType;
pub use config::HostOptions;
pub use options::SessionOptions;
pub use relay::{hashcat_bridge_event, Event, EventHandler, EventSink, Registration, EVENT_SINK};
pub use session::{Engine, Session};
pub use types::{
    BridgeError, ContextId, EventId, HostHandle, LogLevel, Payload, Result, StatusReport,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
