use std::fmt;
use thiserror::Error;

use super::timeline::{Timeline, TimelinePlan};
use super::trigger::{PointerEvent, ScrollMetrics};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnimationError {
    #[error("trigger region does not resolve to a mounted element")]
    InvalidRegion,
    #[error("scroll/pointer observation unavailable: {0}")]
    ObserverUnavailable(String),
    #[error("animation target missing: {0}")]
    AnimationTargetMissing(String),
    #[error("animation primitive failed: {0}")]
    Primitive(String),
}

/// Releases a registered listener exactly once, either explicitly or on drop.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    pub fn release(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("live", &self.release.is_some()).finish()
    }
}

/// Everything the controller needs from its surroundings: element lookup,
/// the animation primitive and the observer layer.
pub trait Stage {
    type Target: Clone + fmt::Debug;
    type Timeline: Timeline;

    fn is_mounted(&self, target: &Self::Target) -> bool;

    fn measure(&self, region: &Self::Target) -> Option<ScrollMetrics>;

    fn build_timeline(&self, plan: &TimelinePlan<Self::Target>) -> Result<Self::Timeline, AnimationError>;

    fn observe_scroll(
        &self,
        region: &Self::Target,
        listener: Box<dyn FnMut(ScrollMetrics)>,
    ) -> Result<Subscription, AnimationError>;

    fn observe_pointer(
        &self,
        region: &Self::Target,
        listener: Box<dyn FnMut(PointerEvent)>,
    ) -> Result<Subscription, AnimationError>;
}
