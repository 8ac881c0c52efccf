// SPDX-License-Identifier: GPL-3.0-only

//! Frame-driven animated values
//!
//! An [`AnimatedValue`] owns a scalar and an optional chain of timed
//! segments. Every query takes an explicit `now`, so the same instance can
//! be driven by the terminal's frame tick or by a test clock.
//!
//! Starting a new animation always begins from the value the current one
//! has reached at `now`. An interrupted fade therefore continues from
//! where it was instead of jumping back to its start.

use std::time::{Duration, Instant};

/// Easing curve applied to the normalised progress of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant rate
    Linear,
    /// Cubic ease in, ease out
    #[default]
    EaseInOut,
}

impl Easing {
    /// Map progress in `[0, 1]` to eased progress in `[0, 1]`
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let f = -2.0 * t + 2.0;
                    1.0 - f * f * f / 2.0
                }
            }
        }
    }
}

/// One timed interpolation between two values
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    from: f32,
    to: f32,
    start: Instant,
    duration: Duration,
    easing: Easing,
}

impl Segment {
    fn end(&self) -> Instant {
        self.start + self.duration
    }

    fn sample(&self, now: Instant) -> f32 {
        if self.duration.is_zero() || now >= self.end() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.start);
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * self.easing.apply(t)
    }
}

/// A scalar that animates towards targets over time
#[derive(Debug, Clone)]
pub struct AnimatedValue {
    /// Value once all segments have run
    resting: f32,
    /// Consecutive segments, each starting where the previous one ends
    segments: Vec<Segment>,
    easing: Easing,
}

impl AnimatedValue {
    /// Create a value at rest
    pub fn new(value: f32) -> Self {
        Self {
            resting: value,
            segments: Vec::new(),
            easing: Easing::default(),
        }
    }

    /// Use a different easing curve for animations started afterwards
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Current value at `now`
    pub fn value_at(&self, now: Instant) -> f32 {
        let Some(first) = self.segments.first() else {
            return self.resting;
        };
        if now < first.start {
            return first.from;
        }
        self.segments
            .iter()
            .rev()
            .find(|segment| segment.start <= now)
            .map(|segment| segment.sample(now))
            .unwrap_or(self.resting)
    }

    /// Value the animation will settle at
    pub fn target(&self) -> f32 {
        self.resting
    }

    /// Animate from the current value to `target` over `duration`
    ///
    /// Supersedes whatever was in flight.
    pub fn animate_to(&mut self, target: f32, duration: Duration, now: Instant) {
        self.animate_sequence(&[(target, duration)], now);
    }

    /// Run consecutive `(target, duration)` steps starting at `now`
    ///
    /// Supersedes whatever was in flight.
    pub fn animate_sequence(&mut self, steps: &[(f32, Duration)], now: Instant) {
        let mut from = self.value_at(now);
        let mut start = now;
        let mut segments = Vec::with_capacity(steps.len());

        for &(to, duration) in steps {
            segments.push(Segment {
                from,
                to,
                start,
                duration,
                easing: self.easing,
            });
            from = to;
            start += duration;
        }

        self.resting = from;
        self.segments = segments;
    }

    /// Stop animating and hold `value`
    pub fn jump_to(&mut self, value: f32) {
        self.resting = value;
        self.segments.clear();
    }

    /// Instant at which the last segment ends, if anything is in flight
    pub fn finishes_at(&self) -> Option<Instant> {
        self.segments.last().map(Segment::end)
    }

    /// Whether no segment is still running at `now`
    pub fn is_settled(&self, now: Instant) -> bool {
        self.finishes_at().is_none_or(|end| now >= end)
    }

    /// Drop finished segments so later queries are cheap
    pub fn settle(&mut self, now: Instant) {
        if !self.segments.is_empty() && self.is_settled(now) {
            self.segments.clear();
        }
    }
}
