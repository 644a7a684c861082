//! Event relay from the engine to host handlers
//!
//! The engine reports progress through a single C callback carrying an event
//! id, its own context pointer, and a buffer. This module exports that callback
//! ([`hashcat_bridge_event`]) and finds the host handler for the context in a
//! process-wide side-table, so no assumption is made about the layout of the
//! engine's context object.
//!
//! The relay runs on whatever thread the engine emits events from, often a hot
//! compute loop. It only takes a read lock long enough to clone the handler and
//! never copies or transforms the buffer. Handlers inherit the same constraint
//! and should hand long work off to another thread.

use crate::types::{ContextId, EventId, HostHandle, Payload};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::os::raw::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Signature of the event callback registered with the engine
pub type EventSink =
    unsafe extern "C" fn(id: u32, context: *mut c_void, buf: *const c_void, len: usize);

/// The relay as an [`EventSink`], ready to hand to an engine
pub const EVENT_SINK: EventSink = hashcat_bridge_event;

/// One relayed event, borrowed from the engine for the duration of the call
pub struct Event<'a> {
    /// Event identifier, unchanged
    pub id: EventId,
    /// Engine context the event was emitted on
    pub context: ContextId,
    /// Host handle registered for the context
    pub host: HostHandle,
    raw: *const c_void,
    len: usize,
    buffer: &'a [u8],
}

impl<'a> Event<'a> {
    /// Event bytes, exactly as the engine passed them
    ///
    /// Empty when the engine passed a null pointer, whatever [`Event::len`]
    /// says.
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    /// The engine's buffer pointer, unchanged
    pub fn buffer_ptr(&self) -> *const c_void {
        self.raw
    }

    /// Length reported by the engine
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the engine reported a zero length
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decode the buffer into an owned [`Payload`]
    pub fn payload(&self) -> Payload {
        Payload::decode(self.id, self.buffer)
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("context", &self.context)
            .field("host", &self.host)
            .field("buffer", &format_args!("{:p}", self.raw))
            .field("len", &self.len)
            .finish()
    }
}

/// Host-side target of relayed events
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &Event<'_>);
}

impl<F> EventHandler for F
where
    F: Fn(&Event<'_>) + Send + Sync,
{
    fn on_event(&self, event: &Event<'_>) {
        self(event)
    }
}

struct Entry {
    host: HostHandle,
    handler: Arc<dyn EventHandler>,
}

static TABLE: Lazy<RwLock<HashMap<ContextId, Entry>>> = Lazy::new(|| RwLock::new(HashMap::new()));

// Zero is never handed out.
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Association between an engine context and a host handler
///
/// Dropping the registration removes the association. Events arriving for the
/// context afterwards are dropped.
#[derive(Debug)]
pub struct Registration {
    context: ContextId,
    host: HostHandle,
}

impl Registration {
    /// Context this registration is keyed on
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Host handle allocated for this registration
    pub fn host(&self) -> HostHandle {
        self.host
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut table = TABLE.write();
        // A newer registration on the same context owns the slot now.
        if table.get(&self.context).map(|e| e.host) == Some(self.host) {
            table.remove(&self.context);
            log::debug!("Relay unregistered: {} ({})", self.context, self.host);
        }
    }
}

/// Register `handler` as the target for events emitted on `context`
///
/// Registering a context that already has a handler replaces it; the older
/// [`Registration`] then becomes inert.
pub fn register(context: *mut c_void, handler: Arc<dyn EventHandler>) -> Registration {
    let context = ContextId::of(context);
    let host = HostHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));

    let previous = TABLE.write().insert(context, Entry { host, handler });
    if let Some(previous) = previous {
        log::warn!(
            "Relay for {} replaced: {} -> {}",
            context,
            previous.host,
            host
        );
    }

    log::debug!("Relay registered: {} ({})", context, host);
    Registration { context, host }
}

/// Host handle currently registered for `context`
pub fn lookup(context: *const c_void) -> Option<HostHandle> {
    TABLE.read().get(&ContextId::of(context)).map(|e| e.host)
}

/// Forward one engine event to the host handler registered for `context`
///
/// The id, context, buffer pointer and length reach the handler unchanged,
/// together with the host handle. Events for unregistered contexts are
/// dropped.
///
/// # Safety
///
/// When `buf` is non-null it must be valid for reads of `len` bytes for the
/// duration of the call.
pub unsafe fn relay(id: u32, context: *mut c_void, buf: *const c_void, len: usize) {
    let context_id = ContextId::of(context);

    let target = TABLE
        .read()
        .get(&context_id)
        .map(|e| (e.host, Arc::clone(&e.handler)));

    let Some((host, handler)) = target else {
        log::trace!("Dropping event {} for unregistered {}", EventId(id), context_id);
        return;
    };

    let buffer: &[u8] = if buf.is_null() || len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(buf as *const u8, len) }
    };

    let event = Event {
        id: EventId(id),
        context: context_id,
        host,
        raw: buf,
        len,
        buffer,
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| handler.on_event(&event)));
    if result.is_err() {
        log::error!("Event handler for {} panicked on event {}", host, event.id);
    }
}

/// C entry point for engine events
///
/// Register this with the engine together with the context pointer used in
/// [`register`].
///
/// # Safety
///
/// See [`relay`].
#[no_mangle]
pub unsafe extern "C" fn hashcat_bridge_event(
    id: u32,
    context: *mut c_void,
    buf: *const c_void,
    len: usize,
) {
    unsafe { relay(id, context, buf, len) }
}
