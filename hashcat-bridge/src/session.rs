//! Engine sessions
//!
//! A [`Session`] ties one engine instance to one host event handler. It
//! validates the host options, initialises the engine, registers the relay for
//! the engine's context, and builds the argument vector for each job. The
//! engine itself sits behind the [`Engine`] trait.

use crate::argv::Argv;
use crate::config::HostOptions;
use crate::options::SessionOptions;
use crate::relay::{self, Event, EventHandler, EventSink, Registration};
use crate::types::{BridgeError, EventId, HostHandle, Result};
use parking_lot::Mutex;
use std::os::raw::c_void;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A native compute engine driven by a [`Session`]
///
/// Implementations call `sink` with [`Engine::context`] for every event they
/// emit during [`Engine::run`], from whichever thread they emit on.
pub trait Engine: Send + Sync {
    /// Context pointer passed back with every event
    ///
    /// Must stay stable for the lifetime of the engine, so it should point at
    /// heap storage rather than into the engine value itself.
    fn context(&self) -> *mut c_void;

    /// Prepare the engine for jobs
    fn init(&mut self, options: &HostOptions) -> Result<()>;

    /// Run one job to completion
    fn run(&self, argv: &Argv, sink: EventSink) -> Result<()>;

    /// Ask a running job to stop at its next checkpoint
    ///
    /// Returns false if the engine could not honour the request.
    fn stop_at_checkpoint(&self) -> bool;
}

// Modes collected while an identify job runs; `None` otherwise.
type IdentifyTap = Arc<Mutex<Option<Vec<u32>>>>;

/// Host handler plus the identify tap every session event passes through
struct Tapped<H> {
    handler: H,
    identified: IdentifyTap,
}

impl<H: EventHandler> EventHandler for Tapped<H> {
    fn on_event(&self, event: &Event<'_>) {
        if event.id == EventId::LOG_INFO {
            if let Some(modes) = self.identified.lock().as_mut() {
                let text = String::from_utf8_lossy(event.buffer());
                for mode in text.lines().filter_map(identified_mode) {
                    if !modes.contains(&mode) {
                        modes.push(mode);
                    }
                }
            }
        }
        self.handler.on_event(event);
    }
}

/// Mode from one row of the engine's identify table (`   0 | MD5 | Raw Hash`)
fn identified_mode(line: &str) -> Option<u32> {
    let mut columns = line.trim_end_matches('\0').split('|');
    let mode = columns.next()?.trim().parse().ok()?;
    columns.next()?;
    Some(mode)
}

/// One engine plus the host handler its events are relayed to
pub struct Session<E: Engine> {
    engine: E,
    options: HostOptions,
    registration: Registration,
    running: AtomicBool,
    identified: IdentifyTap,
}

impl<E: Engine> Session<E> {
    /// Create a session
    ///
    /// # Arguments
    /// * `options` - Host options, validated here
    /// * `engine` - Engine to drive
    /// * `handler` - Target for every event the engine emits
    pub fn new<H>(mut options: HostOptions, mut engine: E, handler: H) -> Result<Self>
    where
        H: EventHandler + 'static,
    {
        options.validate()?;
        engine.init(&options)?;

        let identified = IdentifyTap::default();
        let tapped = Tapped {
            handler,
            identified: Arc::clone(&identified),
        };
        let registration = relay::register(engine.context(), Arc::new(tapped));
        log::info!(
            "Session created: {} shared={:?}",
            registration.host(),
            options.shared_path
        );

        Ok(Self {
            engine,
            options,
            registration,
            running: AtomicBool::new(false),
            identified,
        })
    }

    /// Host handle events from this session carry
    pub fn host(&self) -> HostHandle {
        self.registration.host()
    }

    /// Validated host options
    pub fn options(&self) -> &HostOptions {
        &self.options
    }

    /// Engine driven by this session
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Whether a job is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run a job with raw engine arguments
    ///
    /// The executable path is prepended as argv[0]. The session can run
    /// several jobs one after another.
    pub fn run_job<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let executable = self.options.executable().to_string_lossy().into_owned();
        let argv = Argv::new(std::iter::once(executable).chain(args.into_iter().map(Into::into)))?;
        self.execute(argv)
    }

    /// Run a job described by [`SessionOptions`]
    pub fn run_job_with_options(&self, options: &SessionOptions) -> Result<()> {
        self.run_job(options.to_args())
    }

    /// Find the hash modes that can parse `hash`
    ///
    /// Runs an `--identify` job and collects the modes the engine lists as
    /// info log rows (`mode | name | category`), in the order reported. The
    /// events still reach the session's handler. No matching mode is
    /// [`BridgeError::UnidentifiedHash`].
    pub fn identify_hash(&self, hash: &str) -> Result<Vec<u32>> {
        if self.is_running() {
            return Err(BridgeError::Engine("a job is already running".to_string()));
        }

        let job = SessionOptions {
            identify: Some(true),
            ..SessionOptions::new(hash)
        };

        *self.identified.lock() = Some(Vec::new());
        let result = self.run_job_with_options(&job);
        let modes = self.identified.lock().take().unwrap_or_default();
        result?;

        if modes.is_empty() {
            return Err(BridgeError::UnidentifiedHash(hash.to_string()));
        }
        log::info!("Identified {} candidate modes on {}", modes.len(), self.host());
        Ok(modes)
    }

    /// Ask the running job to stop at its next checkpoint
    pub fn stop_at_checkpoint(&self) -> Result<()> {
        if !self.is_running() || !self.engine.stop_at_checkpoint() {
            return Err(BridgeError::UnableToStopAtCheckpoint);
        }
        log::info!("Stop at checkpoint requested for {}", self.host());
        Ok(())
    }

    fn execute(&self, argv: Argv) -> Result<()> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(BridgeError::Engine("a job is already running".to_string()));
        }

        log::info!("Running job on {}: {:?}", self.host(), argv.to_strings());
        let result = self.engine.run(&argv, relay::EVENT_SINK);
        self.running.store(false, Ordering::Release);

        match &result {
            Ok(()) => log::info!("Job finished on {}", self.host()),
            Err(e) => log::warn!("Job failed on {}: {}", self.host(), e),
        }
        result
    }
}
