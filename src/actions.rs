//! represents the decision the probe loop makes after each result

/// whether the probe loop should keep going after the current candidate
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum FlowControl {
    /// move on to the next candidate, after the configured delay
    #[default]
    Continue,

    /// break out of the probe loop; no further candidates will be requested
    Stop,
}

impl FlowControl {
    /// true if the loop should stop
    #[must_use]
    #[inline]
    pub const fn is_stop(self) -> bool {
        matches!(self, Self::Stop)
    }
}
