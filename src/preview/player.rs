use crate::{
    foundation::core::FrameRGBA, preview::compositor::PreviewCompositor,
    timing::schedule::PlayheadState,
};

/// Transport state of a [`Player`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transport {
    /// No frames are produced.
    Stopped,
    /// Advancing with the host clock; `origin_ms` is the host time of timeline position 0.
    Playing {
        /// Host timestamp that maps to timeline position zero.
        origin_ms: f64,
    },
    /// Holding one position.
    Paused {
        /// Held timeline position.
        at_ms: f64,
    },
}

/// Host-driven playback over a [`PreviewCompositor`].
///
/// The host calls [`Player::tick`] from its animation callback with a monotonic timestamp.
/// Cancelling playback means no longer calling `tick` (or calling [`Player::stop`]).
pub struct Player {
    compositor: PreviewCompositor,
    transport: Transport,
    frame: FrameRGBA,
    last_state: Option<PlayheadState>,
}

impl Player {
    /// Stopped player at position zero.
    pub fn new(compositor: PreviewCompositor) -> Self {
        let frame = compositor.render_at(0.0);
        Self {
            compositor,
            transport: Transport::Stopped,
            frame,
            last_state: None,
        }
    }

    /// Current transport.
    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Underlying compositor.
    pub fn compositor(&self) -> &PreviewCompositor {
        &self.compositor
    }

    /// Swap in a rebuilt compositor (after an edit), keeping the transport.
    pub fn replace_compositor(&mut self, compositor: PreviewCompositor) {
        self.compositor = compositor;
    }

    /// Start or resume at host time `now_ms`.
    pub fn play(&mut self, now_ms: f64) {
        let at = match self.transport {
            Transport::Playing { .. } => return,
            Transport::Paused { at_ms } => at_ms,
            Transport::Stopped => 0.0,
        };
        self.transport = Transport::Playing {
            origin_ms: now_ms - at,
        };
    }

    /// Freeze at the position reached by `now_ms`.
    pub fn pause(&mut self, now_ms: f64) {
        if let Some(at_ms) = self.position_ms(now_ms) {
            self.transport = Transport::Paused { at_ms };
        }
    }

    /// Jump to timeline position `to_ms`; a stopped player becomes paused there.
    pub fn seek(&mut self, now_ms: f64, to_ms: f64) {
        let to_ms = self.wrap(to_ms);
        self.transport = match self.transport {
            Transport::Playing { .. } => Transport::Playing {
                origin_ms: now_ms - to_ms,
            },
            Transport::Paused { .. } | Transport::Stopped => Transport::Paused { at_ms: to_ms },
        };
    }

    /// Stop and rewind.
    pub fn stop(&mut self) {
        self.transport = Transport::Stopped;
        self.last_state = None;
    }

    /// Timeline position at host time `now_ms`, looped at the total duration.
    pub fn position_ms(&self, now_ms: f64) -> Option<f64> {
        match self.transport {
            Transport::Stopped => None,
            Transport::Playing { origin_ms } => Some(self.wrap(now_ms - origin_ms)),
            Transport::Paused { at_ms } => Some(at_ms),
        }
    }

    /// What the last produced frame showed.
    pub fn last_state(&self) -> Option<PlayheadState> {
        self.last_state
    }

    /// Render the frame for host time `now_ms`; `None` once stopped.
    pub fn tick(&mut self, now_ms: f64) -> Option<&FrameRGBA> {
        let t = self.position_ms(now_ms)?;
        self.last_state = self.compositor.render_into(t, &mut self.frame);
        Some(&self.frame)
    }

    fn wrap(&self, t_ms: f64) -> f64 {
        let total = self.compositor.total_ms() as f64;
        if total <= 0.0 || !t_ms.is_finite() {
            0.0
        } else {
            t_ms.rem_euclid(total)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preview/player.rs"]
mod tests;
