//! Output routing.
//!
//! All debugger-generated text funnels through one decision: append to the
//! active capture frame, or hand it to the live display. Frames nest
//! strictly; the call wrapper pushes one per dispatched operation and pops
//! it on every exit path, so capture state can never leak across calls.

/// Which stream a piece of text was produced on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Output,
    Error,
}

#[derive(Debug, Default)]
struct CaptureFrame {
    result: String,
    error: String,
    /// Set while a bulk transfer wants its normal output streamed to the
    /// display instead of buffered. Error output is still captured.
    result_suspended: bool,
}

/// The stack of capture frames plus the in-funnel marker.
#[derive(Debug, Default)]
pub struct Sinks {
    frames: Vec<CaptureFrame>,
    in_put: bool,
}

impl Sinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_capture(&mut self) {
        self.frames.push(CaptureFrame::default());
    }

    /// Pop the active frame, returning (normal, error) buffers.
    pub(crate) fn pop_capture(&mut self) -> (String, String) {
        self.frames
            .pop()
            .map(|f| (f.result, f.error))
            .unwrap_or_default()
    }

    /// Route `text`. Returns true when it was captured; false means the
    /// caller must forward it to the display.
    ///
    /// Priority: an unsuspended frame takes everything; a suspended frame
    /// still takes error-stream text; anything else goes to the display.
    pub(crate) fn append(&mut self, stream: Stream, text: &str) -> bool {
        match self.frames.last_mut() {
            Some(f) if !f.result_suspended => {
                f.result.push_str(text);
                true
            }
            Some(f) if stream == Stream::Error => {
                f.error.push_str(text);
                true
            }
            _ => false,
        }
    }

    /// Append directly to the active frame's error buffer, regardless of
    /// suspension. Returns false when no frame is active.
    pub(crate) fn append_error(&mut self, text: &str) -> bool {
        match self.frames.last_mut() {
            Some(f) => {
                f.error.push_str(text);
                true
            }
            None => false,
        }
    }

    pub(crate) fn suspend_result(&mut self) {
        if let Some(f) = self.frames.last_mut() {
            f.result_suspended = true;
        }
    }

    pub(crate) fn resume_result(&mut self) {
        if let Some(f) = self.frames.last_mut() {
            f.result_suspended = false;
        }
    }

    /// True while an unsuspended frame is accumulating normal output.
    pub(crate) fn buffering(&self) -> bool {
        self.frames
            .last()
            .map(|f| !f.result_suspended)
            .unwrap_or(false)
    }

    pub(crate) fn begin_put(&mut self) {
        self.in_put = true;
    }

    pub(crate) fn end_put(&mut self) {
        self.in_put = false;
    }

    pub(crate) fn in_put(&self) -> bool {
        self.in_put
    }
}
