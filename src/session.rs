//! The session context threaded through every operation.
//!
//! One `Session` owns the core handle, the runtime handle, the capture
//! sinks and the event pump. There is no global state; a host embeds the
//! binding layer by constructing a session and routing script calls into
//! [`Session::call`] or [`Session::call_line`].

use std::collections::HashMap;
use std::time::Duration;

use crate::bindings::{self, CallOutcome};
use crate::debugger::{BreakpointInfo, CoreOutput, DebuggerCore, TracepointInfo};
use crate::pump::EventPump;
use crate::runtime::{PointEvent, ScriptRuntime};
use crate::sink::{Sinks, Stream};

pub struct Session {
    pub(crate) core: Box<dyn DebuggerCore>,
    pub(crate) runtime: Box<dyn ScriptRuntime>,
    pub(crate) sinks: Sinks,
    pub(crate) pump: EventPump,
    /// Mirrors the GUI busy state; forced back to false on a failed call.
    pub(crate) running: bool,
    pub(crate) load_in_progress: bool,
    pub(crate) cancel_requested: bool,
    /// Register snapshot from the last changed-register diff.
    pub(crate) old_regs: HashMap<usize, Vec<u8>>,
}

impl Session {
    pub fn new(core: Box<dyn DebuggerCore>, runtime: Box<dyn ScriptRuntime>) -> Self {
        Self {
            core,
            runtime,
            sinks: Sinks::new(),
            pump: EventPump::default(),
            running: false,
            load_in_progress: false,
            cancel_requested: false,
            old_regs: HashMap::new(),
        }
    }

    pub fn set_pump_interval(&mut self, interval: Duration) {
        self.pump = EventPump::new(interval);
    }

    /// Invoke a named operation through the call-isolation wrapper.
    pub fn call(&mut self, name: &str, args: &[&str]) -> CallOutcome {
        bindings::call(self, name, args)
    }

    /// Split a raw command line and dispatch it.
    pub fn call_line(&mut self, line: &str) -> CallOutcome {
        let words = shlex::split(line).unwrap_or_default();
        match words.split_first() {
            None => CallOutcome {
                success: false,
                transcript: "empty command line".to_string(),
                body: None,
            },
            Some((name, rest)) => {
                let args: Vec<&str> = rest.iter().map(String::as_str).collect();
                self.call(name, &args)
            }
        }
    }

    /// The output funnel. Hosts route core-generated text through here when
    /// it originates outside a dispatched call (hook output, async target
    /// chatter); dispatched calls get the same funnel via [`CoreOutput`].
    pub fn write(&mut self, stream: Stream, text: &str) {
        self.sinks.begin_put();
        if !self.sinks.append(stream, text) {
            self.runtime.display(text);
        }
        self.sinks.end_put();
    }

    /// Start pumping GUI events at yield points. Hosts wrap long target
    /// waits in `pump_start`/`pump_stop`; `cmd` does the same around bulk
    /// transfers.
    pub fn pump_start(&mut self) {
        self.pump.start();
    }

    pub fn pump_stop(&mut self) {
        self.pump.stop();
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    /// Cooperative cancellation: flags the in-progress long operation, which
    /// must poll for it. Nothing is interrupted forcibly.
    pub fn request_cancel(&mut self) {
        self.cancel_requested = true;
    }

    pub fn clear_cancel(&mut self) {
        self.cancel_requested = false;
    }

    pub fn notify_breakpoint(&mut self, event: PointEvent, info: &BreakpointInfo) {
        self.runtime.breakpoint_event(event, info);
    }

    pub fn notify_tracepoint(&mut self, event: PointEvent, info: &TracepointInfo) {
        self.runtime.tracepoint_event(event, info);
    }

    /// Split the session into the core handle and an output handle the core
    /// can write through.
    pub(crate) fn parts(&mut self) -> (&mut dyn DebuggerCore, SessionOutput<'_>) {
        let Session {
            core,
            runtime,
            sinks,
            pump,
            cancel_requested,
            load_in_progress,
            ..
        } = self;
        (
            core.as_mut(),
            SessionOutput {
                sinks,
                runtime: runtime.as_mut(),
                pump,
                cancel_requested,
                load_in_progress: *load_in_progress,
            },
        )
    }
}

/// Borrowed view handed to core operations as their `CoreOutput`.
pub(crate) struct SessionOutput<'a> {
    sinks: &'a mut Sinks,
    runtime: &'a mut dyn ScriptRuntime,
    pump: &'a mut EventPump,
    cancel_requested: &'a mut bool,
    load_in_progress: bool,
}

impl SessionOutput<'_> {
    /// Service the pump if a tick is due. A tick that would land
    /// re-entrantly, inside the funnel, or while normal output is being
    /// captured is dropped; it never interleaves into a capture buffer.
    fn maybe_pump(&mut self) {
        if !self.pump.due() {
            return;
        }
        if self.pump.in_tick() || self.sinks.in_put() || self.sinks.buffering() {
            return;
        }
        self.pump.begin_tick();
        self.runtime.pump_events();
        if self.load_in_progress && self.runtime.cancel_requested() {
            *self.cancel_requested = true;
        }
        self.pump.end_tick();
    }
}

impl CoreOutput for SessionOutput<'_> {
    fn put(&mut self, stream: Stream, text: &str) {
        self.sinks.begin_put();
        if !self.sinks.append(stream, text) {
            self.runtime.display(text);
        }
        self.sinks.end_put();
    }

    fn check_cancelled(&mut self) -> bool {
        self.maybe_pump();
        *self.cancel_requested
    }
}
