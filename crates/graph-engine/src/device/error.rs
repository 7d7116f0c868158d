/// What the frame loop should do after a surface acquisition error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; the next frame may render normally.
    Reconfigured,
    /// Transient error; drop this frame.
    SkipFrame,
    /// Unrecoverable (out of memory); the run must stop.
    Fatal,
}

impl SurfaceErrorAction {
    /// True when the frame was not rendered but the loop may continue.
    pub fn is_recoverable(self) -> bool {
        !matches!(self, SurfaceErrorAction::Fatal)
    }
}
