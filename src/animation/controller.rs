use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};

use log::{debug, warn};

use super::stage::{AnimationError, Stage, Subscription};
use super::timeline::{AnimationDescriptor, Keyframes, Repeat, Timeline, TimelinePlan};
use super::trigger::{PointerEvent, PointerOffset, ScrollMetrics, TriggerRegion};

/// Maps the pointer's offset from the region centre to the properties to tween towards.
pub type HoverResponse = Rc<dyn Fn(PointerOffset) -> Keyframes>;

/// Called with scrub progress in [0, 1] whenever it changes.
pub type ProgressListener = Rc<dyn Fn(f64)>;

#[derive(Clone)]
pub enum Mode {
    /// Timeline time follows scroll progress through the region.
    Scrub,
    /// Play forward past the start threshold, reverse when scrolling back above it.
    Toggle,
    /// Play the first time the start threshold is crossed, never again.
    OnceForward,
    /// Pointer driven. Descriptors' `to` frames are the resting state restored on leave.
    Hover(HoverResponse),
    /// Yoyo loop while the region is inside its window, killed outside it.
    PersistentLoop,
}

impl fmt::Debug for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Scrub => "Scrub",
            Mode::Toggle => "Toggle",
            Mode::OnceForward => "OnceForward",
            Mode::Hover(_) => "Hover",
            Mode::PersistentLoop => "PersistentLoop",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Bound,
    Active,
    Reversing,
    TornDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimelineId(u64);

/// Extras a section can hang off a binding.
pub struct BindOptions<T> {
    pub on_progress: Option<ProgressListener>,
    /// Played once when a persistent loop leaves its window, from wherever the loop stopped.
    pub settle: Vec<AnimationDescriptor<T>>,
}

impl<T> Default for BindOptions<T> {
    fn default() -> Self {
        Self { on_progress: None, settle: Vec::new() }
    }
}

struct LiveTimeline<T> {
    id: TimelineId,
    timeline: T,
}

pub struct ControllerState<S: Stage> {
    phase: Phase,
    region: TriggerRegion<S::Target>,
    descriptors: Vec<AnimationDescriptor<S::Target>>,
    mode: Mode,
    current: Option<LiveTimeline<S::Timeline>>,
    settling: Option<S::Timeline>,
    options: BindOptions<S::Target>,
    /// Nothing could be built; ticks are ignored until the next bind.
    static_fallback: bool,
    last_progress: Option<f64>,
    inside: bool,
    fired: bool,
    playbacks: u32,
    last_pointer: Option<PointerOffset>,
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

/// Owning reference to one bound trigger region. Clones share the same state.
pub struct ControllerHandle<S: Stage> {
    stage: Rc<S>,
    state: Rc<RefCell<ControllerState<S>>>,
}

impl<S: Stage> Clone for ControllerHandle<S> {
    fn clone(&self) -> Self {
        Self { stage: self.stage.clone(), state: self.state.clone() }
    }
}

/// Register observers for `region` and return the handle that owns them.
///
/// Nothing is left registered when this fails: observers attached before the
/// failing one are released through the same path as [`ControllerHandle::teardown`].
pub fn bind<S: Stage + 'static>(
    stage: Rc<S>,
    region: TriggerRegion<S::Target>,
    descriptors: Vec<AnimationDescriptor<S::Target>>,
    mode: Mode,
    options: BindOptions<S::Target>,
) -> Result<ControllerHandle<S>, AnimationError> {
    if !stage.is_mounted(&region.element) {
        return Err(AnimationError::InvalidRegion);
    }

    let pointer_driven = matches!(mode, Mode::Hover(_));
    let handle = ControllerHandle {
        stage: stage.clone(),
        state: Rc::new(RefCell::new(ControllerState {
            phase: Phase::Idle,
            region: region.clone(),
            descriptors,
            mode,
            current: None,
            settling: None,
            options,
            static_fallback: false,
            last_progress: None,
            inside: false,
            fired: false,
            playbacks: 0,
            last_pointer: None,
            next_id: 0,
            subscriptions: Vec::new(),
        })),
    };

    let registered = if pointer_driven {
        let weak = handle.downgrade();
        stage.observe_pointer(
            &region.element,
            Box::new(move |event| {
                if let Some(handle) = weak.upgrade() {
                    handle.notify_pointer(event);
                }
            }),
        )
    } else {
        let weak = handle.downgrade();
        stage.observe_scroll(
            &region.element,
            Box::new(move |metrics| {
                if let Some(handle) = weak.upgrade() {
                    handle.notify_scroll(metrics);
                }
            }),
        )
    };

    match registered {
        Ok(subscription) => {
            let mut state = handle.state.borrow_mut();
            state.subscriptions.push(subscription);
            state.phase = Phase::Bound;
        }
        Err(e) => {
            handle.teardown();
            return Err(e);
        }
    }

    // Sections already past their threshold on load start in the right state.
    if !pointer_driven {
        if let Some(metrics) = stage.measure(&region.element) {
            handle.notify_scroll(metrics);
        }
    }

    debug!("Bound {:?} controller to {:?}", handle.state.borrow().mode, region.element);
    Ok(handle)
}

struct WeakHandle<S: Stage> {
    stage: Weak<S>,
    state: Weak<RefCell<ControllerState<S>>>,
}

impl<S: Stage> WeakHandle<S> {
    fn upgrade(&self) -> Option<ControllerHandle<S>> {
        Some(ControllerHandle { stage: self.stage.upgrade()?, state: self.state.upgrade()? })
    }
}

impl<S: Stage> ControllerHandle<S> {
    fn downgrade(&self) -> WeakHandle<S> {
        WeakHandle { stage: Rc::downgrade(&self.stage), state: Rc::downgrade(&self.state) }
    }

    /// Kill any running timeline and release every observer. Calling it again does nothing.
    pub fn teardown(&self) {
        let (subscriptions, current, settling) = {
            let mut state = self.state.borrow_mut();
            if state.phase == Phase::TornDown {
                return;
            }
            state.phase = Phase::TornDown;
            (mem::take(&mut state.subscriptions), state.current.take(), state.settling.take())
        };

        if let Some(mut live) = current {
            debug!("Killing timeline {:?}", live.id);
            live.timeline.kill();
        }
        if let Some(mut settle) = settling {
            settle.kill();
        }
        for subscription in subscriptions {
            subscription.release();
        }
        debug!("Controller torn down");
    }

    /// Observer entry point. Returns whether the timeline was touched.
    pub(crate) fn notify_scroll(&self, metrics: ScrollMetrics) -> bool {
        // A tick arriving while another is being applied is superseded by it.
        let Ok(mut state) = self.state.try_borrow_mut() else {
            return false;
        };
        state.on_scroll(&self.stage, metrics)
    }

    pub(crate) fn notify_pointer(&self, event: PointerEvent) -> bool {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            return false;
        };
        state.on_pointer(&self.stage, event)
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    #[cfg(test)]
    pub fn timeline_id(&self) -> Option<TimelineId> {
        self.state.borrow().current.as_ref().map(|live| live.id)
    }

    #[cfg(test)]
    pub fn timeline_time(&self) -> Option<f64> {
        self.state.borrow().current.as_ref().map(|live| live.timeline.time())
    }

    #[cfg(test)]
    pub fn last_progress(&self) -> Option<f64> {
        self.state.borrow().last_progress
    }

    /// Number of times a timeline was started playing forward.
    #[cfg(test)]
    pub fn playbacks(&self) -> u32 {
        self.state.borrow().playbacks
    }

    #[cfg(test)]
    pub fn last_pointer(&self) -> Option<PointerOffset> {
        self.state.borrow().last_pointer
    }
}

impl<S: Stage> ControllerState<S> {
    fn is_listening(&self) -> bool {
        !matches!(self.phase, Phase::Idle | Phase::TornDown)
    }

    fn on_scroll(&mut self, stage: &S, metrics: ScrollMetrics) -> bool {
        if !self.is_listening() {
            return false;
        }
        match self.mode {
            Mode::Scrub => self.scrub(stage, &metrics),
            Mode::Toggle => self.toggle(stage, &metrics),
            Mode::OnceForward => self.once_forward(stage, &metrics),
            Mode::PersistentLoop => self.persistent_loop(stage, &metrics),
            Mode::Hover(_) => false,
        }
    }

    fn scrub(&mut self, stage: &S, metrics: &ScrollMetrics) -> bool {
        // Absolute progress every tick, so a fast fling cannot skip a descriptor.
        let progress = self.region.progress(metrics);
        if self.last_progress == Some(progress) && (self.current.is_some() || self.static_fallback) {
            return false;
        }
        self.last_progress = Some(progress);
        if let Some(report) = &self.options.on_progress {
            report(progress);
        }

        let Some(timeline) = self.ensure_timeline(stage, Repeat::Once) else {
            return false;
        };
        let duration = timeline.duration();
        timeline.set_time(progress * duration);
        self.phase = Phase::Active;
        true
    }

    fn toggle(&mut self, stage: &S, metrics: &ScrollMetrics) -> bool {
        let inside = self.region.is_past_start(metrics);
        if inside == self.inside {
            return false;
        }
        self.inside = inside;

        if inside {
            let Some(timeline) = self.ensure_timeline(stage, Repeat::Once) else {
                debug!("Toggle entered its region with nothing to play");
                return false;
            };
            timeline.play();
            self.started(Phase::Active);
        } else {
            // Redirect from the current playhead instead of restarting.
            let Some(live) = self.current.as_mut() else {
                debug!("Toggle left its region with no timeline to reverse");
                return false;
            };
            live.timeline.reverse();
            self.phase = Phase::Reversing;
        }
        true
    }

    fn once_forward(&mut self, stage: &S, metrics: &ScrollMetrics) -> bool {
        if self.fired || !self.region.is_past_start(metrics) {
            return false;
        }
        self.fired = true;

        let Some(timeline) = self.ensure_timeline(stage, Repeat::Once) else {
            return false;
        };
        timeline.play();
        self.started(Phase::Active);
        true
    }

    fn persistent_loop(&mut self, stage: &S, metrics: &ScrollMetrics) -> bool {
        if self.region.contains(metrics) {
            if self.current.as_ref().map_or(false, |live| !live.timeline.is_killed()) {
                return false;
            }
            if let Some(mut settle) = self.settling.take() {
                settle.kill();
            }
            let Some(timeline) = self.ensure_timeline(stage, Repeat::Yoyo) else {
                return false;
            };
            timeline.play();
            self.started(Phase::Active);
            true
        } else {
            // Killed rather than paused so an off-screen loop costs no ticks.
            let Some(mut live) = self.current.take() else {
                return false;
            };
            debug!("Loop {:?} left its window", live.id);
            if self.options.settle.is_empty() {
                live.timeline.kill();
            } else {
                live.timeline.stop_in_place();
                self.settling = build_timeline(stage, &self.options.settle, Repeat::Once).map(|mut settle| {
                    settle.play();
                    settle
                });
            }
            self.phase = Phase::Bound;
            true
        }
    }

    fn on_pointer(&mut self, stage: &S, event: PointerEvent) -> bool {
        if !self.is_listening() || self.static_fallback {
            return false;
        }
        let response = match &self.mode {
            Mode::Hover(response) => response.clone(),
            _ => return false,
        };

        let (descriptors, phase) = match event {
            PointerEvent::Move(metrics) => {
                let offset = metrics.offset();
                if self.last_pointer == Some(offset) {
                    return false;
                }
                self.last_pointer = Some(offset);
                let to = response(offset);
                let descriptors: Vec<_> = self
                    .descriptors
                    .iter()
                    .map(|d| AnimationDescriptor { from: Keyframes::new(), to: to.clone(), ..d.clone() })
                    .collect();
                (descriptors, Phase::Active)
            }
            PointerEvent::Leave => {
                self.last_pointer = None;
                let descriptors: Vec<_> = self
                    .descriptors
                    .iter()
                    .map(|d| AnimationDescriptor { from: Keyframes::new(), ..d.clone() })
                    .collect();
                (descriptors, Phase::Bound)
            }
        };

        // Latest pointer position wins; the previous tween is dropped mid-flight.
        if let Some(mut live) = self.current.take() {
            live.timeline.kill();
        }
        let Some(timeline) = build_timeline(stage, &descriptors, Repeat::Once) else {
            self.give_up();
            return false;
        };
        let id = self.allocate_id();
        let live = self.current.insert(LiveTimeline { id, timeline });
        live.timeline.play();
        self.started(phase);
        true
    }

    fn started(&mut self, phase: Phase) {
        self.playbacks += 1;
        self.phase = phase;
        debug!("{:?} timeline started (run {})", self.mode, self.playbacks);
    }

    fn give_up(&mut self) {
        if !self.static_fallback {
            debug!("{:?} controller has nothing to animate; staying static", self.mode);
            self.static_fallback = true;
        }
    }

    fn allocate_id(&mut self) -> TimelineId {
        self.next_id += 1;
        TimelineId(self.next_id)
    }

    fn ensure_timeline(&mut self, stage: &S, repeat: Repeat) -> Option<&mut S::Timeline> {
        if self.static_fallback {
            return None;
        }
        if self.current.as_ref().map_or(false, |live| live.timeline.is_killed()) {
            self.current = None;
        }
        if self.current.is_none() {
            let Some(timeline) = build_timeline(stage, &self.descriptors, repeat) else {
                self.give_up();
                return None;
            };
            let id = self.allocate_id();
            debug!("Built timeline {:?}", id);
            self.current = Some(LiveTimeline { id, timeline });
        }
        self.current.as_mut().map(|live| &mut live.timeline)
    }
}

/// Lay out the descriptors whose targets are on the page and hand them to the primitive.
/// A descriptor with no mounted target is skipped; the rest still animate.
pub(crate) fn build_timeline<S: Stage>(
    stage: &S,
    descriptors: &[AnimationDescriptor<S::Target>],
    repeat: Repeat,
) -> Option<S::Timeline> {
    let mut live = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let targets: Vec<S::Target> =
            descriptor.targets.iter().filter(|t| stage.is_mounted(t)).cloned().collect();
        if targets.is_empty() {
            warn!("{}", AnimationError::AnimationTargetMissing(format!("{:?}", descriptor.targets)));
            continue;
        }
        live.push(AnimationDescriptor { targets, ..descriptor.clone() });
    }
    if live.is_empty() {
        return None;
    }

    let plan = TimelinePlan::layout(&live, repeat);
    match stage.build_timeline(&plan) {
        Ok(timeline) => Some(timeline),
        Err(e) => {
            warn!("Skipping animation: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::testing::FakeStage;
    use crate::animation::timeline::Keyframes;
    use crate::animation::trigger::{PointerMetrics, Threshold};

    fn fade(target: &'static str, duration: f64) -> AnimationDescriptor<&'static str> {
        AnimationDescriptor::new(
            target,
            Keyframes::new().set("opacity", "0"),
            Keyframes::new().set("opacity", "1"),
            duration,
        )
    }

    fn window(start: f64, end: f64) -> TriggerRegion<&'static str> {
        TriggerRegion::with_thresholds("section", Threshold::Absolute(start), Threshold::Absolute(end))
    }

    fn bind_plain(
        stage: Rc<FakeStage>,
        region: TriggerRegion<&'static str>,
        descriptors: Vec<AnimationDescriptor<&'static str>>,
        mode: Mode,
    ) -> Result<ControllerHandle<FakeStage>, AnimationError> {
        bind(stage, region, descriptors, mode, BindOptions::default())
    }

    fn stage() -> Rc<FakeStage> {
        let stage = Rc::new(FakeStage::new());
        stage.mount("section");
        stage.mount("card");
        stage
    }

    #[test]
    fn bind_requires_mounted_region() {
        let stage = Rc::new(FakeStage::new());
        let result = bind_plain(stage.clone(), window(0.0, 100.0), vec![fade("card", 1.0)], Mode::Scrub);
        assert!(matches!(result, Err(AnimationError::InvalidRegion)));
        assert_eq!(stage.live_listeners(), 0);
    }

    #[test]
    fn scrub_follows_scroll_and_stops_after_unmount() {
        let stage = stage();
        let handle = bind_plain(stage.clone(), window(100.0, 900.0), vec![fade("card", 2.0)], Mode::Scrub).unwrap();
        // initial measurement already pinned the timeline at progress 0
        assert_eq!(handle.timeline_time(), Some(0.0));

        stage.scroll_to(500.0);
        assert_eq!(handle.timeline_time(), Some(1.0));
        assert_eq!(handle.phase(), Phase::Active);

        let timeline = stage.timeline(0);
        handle.teardown();
        assert_eq!(stage.live_listeners(), 0);
        assert!(timeline.borrow().killed);

        let writes = timeline.borrow().set_time_calls;
        stage.scroll_to(800.0);
        assert_eq!(timeline.borrow().set_time_calls, writes);
        assert_eq!(handle.last_progress(), Some(0.5));
    }

    #[test]
    fn scrub_progress_is_monotonic_and_clamped() {
        let stage = stage();
        let handle = bind_plain(stage.clone(), window(100.0, 900.0), vec![fade("card", 1.0)], Mode::Scrub).unwrap();
        let mut last = -1.0;
        for y in (0..=1000).step_by(50) {
            stage.scroll_to(y as f64);
            let p = handle.last_progress().unwrap();
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= last);
            last = p;
        }
    }

    #[test]
    fn scrub_same_progress_is_not_reapplied() {
        let stage = stage();
        let handle = bind_plain(stage.clone(), window(100.0, 900.0), vec![fade("card", 1.0)], Mode::Scrub).unwrap();
        stage.scroll_to(300.0);
        let timeline = stage.timeline(0);
        let writes = timeline.borrow().set_time_calls;
        assert!(!handle.notify_scroll(stage.metrics_at(300.0)));
        assert_eq!(timeline.borrow().set_time_calls, writes);
    }

    #[test]
    fn scrub_fast_fling_lands_on_absolute_position() {
        let stage = stage();
        let descriptors = vec![fade("card", 1.0), fade("section", 1.0)];
        let handle = bind_plain(stage.clone(), window(0.0, 1000.0), descriptors, Mode::Scrub).unwrap();
        stage.scroll_to(0.0);
        stage.scroll_to(1000.0);
        assert_eq!(handle.timeline_time(), Some(2.0));
        let steps = stage.timeline(0).borrow().steps.clone();
        assert_eq!(steps, vec![("card".to_string(), 0.0), ("section".to_string(), 1.0)]);
    }

    #[test]
    fn teardown_twice_is_a_no_op() {
        let stage = stage();
        let handle = bind_plain(stage.clone(), window(0.0, 100.0), vec![fade("card", 1.0)], Mode::Toggle).unwrap();
        handle.teardown();
        handle.teardown();
        assert_eq!(stage.released(), 1);
        assert_eq!(handle.phase(), Phase::TornDown);
    }

    #[test]
    fn toggle_reverse_redirects_from_current_time() {
        let stage = stage();
        let handle = bind_plain(stage.clone(), window(100.0, 900.0), vec![fade("card", 1.0)], Mode::Toggle).unwrap();
        stage.scroll_to(200.0);
        assert_eq!(handle.phase(), Phase::Active);
        stage.advance(0.4);
        let before = handle.timeline_time().unwrap();

        stage.scroll_to(50.0);
        assert_eq!(handle.phase(), Phase::Reversing);
        let after = handle.timeline_time().unwrap();
        assert!(after <= before);
        assert!(after > 0.0);

        stage.advance(0.1);
        assert!(handle.timeline_time().unwrap() < before);
        // playing forward again reuses the same timeline
        let id = handle.timeline_id();
        stage.scroll_to(300.0);
        assert_eq!(handle.timeline_id(), id);
        assert_eq!(handle.playbacks(), 2);
    }

    #[test]
    fn once_forward_plays_exactly_once() {
        let stage = stage();
        let handle = bind_plain(stage.clone(), window(100.0, 900.0), vec![fade("card", 1.0)], Mode::OnceForward).unwrap();
        for _ in 0..5 {
            stage.scroll_to(500.0);
            stage.scroll_to(0.0);
        }
        assert_eq!(handle.playbacks(), 1);
        assert_eq!(stage.timeline(0).borrow().plays, 1);
        assert_eq!(stage.timeline(0).borrow().reverses, 0);
    }

    #[test]
    fn loop_is_never_duplicated() {
        let stage = stage();
        let handle =
            bind_plain(stage.clone(), window(100.0, 900.0), vec![fade("card", 0.4)], Mode::PersistentLoop).unwrap();
        stage.scroll_to(200.0);
        let id = handle.timeline_id().unwrap();
        stage.scroll_to(300.0);
        stage.scroll_to(400.0);
        assert_eq!(handle.timeline_id(), Some(id));
        assert_eq!(stage.timeline_count(), 1);
        assert_eq!(stage.timeline(0).borrow().repeat, Some(Repeat::Yoyo));

        stage.scroll_to(1200.0);
        assert!(stage.timeline(0).borrow().killed);
        assert_eq!(handle.timeline_id(), None);
        assert_eq!(handle.phase(), Phase::Bound);

        stage.scroll_to(500.0);
        assert_eq!(stage.timeline_count(), 2);
        assert_ne!(handle.timeline_id(), Some(id));
    }

    #[test]
    fn missing_target_skips_only_that_descriptor() {
        let stage = stage();
        let descriptors = vec![fade("ghost", 1.0), fade("card", 1.0)];
        let handle = bind_plain(stage.clone(), window(0.0, 100.0), descriptors, Mode::OnceForward).unwrap();
        stage.scroll_to(50.0);
        assert_eq!(handle.playbacks(), 1);
        let steps = stage.timeline(0).borrow().steps.clone();
        assert_eq!(steps, vec![("card".to_string(), 0.0)]);
    }

    #[test]
    fn all_targets_missing_leaves_section_static() {
        let stage = stage();
        let handle = bind_plain(stage.clone(), window(0.0, 100.0), vec![fade("ghost", 1.0)], Mode::Scrub).unwrap();
        stage.scroll_to(50.0);
        assert_eq!(stage.timeline_count(), 0);
        assert_eq!(handle.phase(), Phase::Bound);
    }

    #[test]
    fn observer_failure_degrades_without_leaking() {
        let stage = stage();
        stage.disable_observers();
        let result = bind_plain(stage.clone(), window(0.0, 100.0), vec![fade("card", 1.0)], Mode::Scrub);
        assert!(matches!(result, Err(AnimationError::ObserverUnavailable(_))));
        assert_eq!(stage.live_listeners(), 0);
    }

    #[test]
    fn initial_measurement_applies_current_position() {
        let stage = stage();
        stage.scroll_to(950.0);
        let handle = bind_plain(stage.clone(), window(100.0, 900.0), vec![fade("card", 1.0)], Mode::OnceForward).unwrap();
        assert_eq!(handle.playbacks(), 1);
    }

    #[test]
    fn hover_tracks_pointer_and_resets_on_leave() {
        let stage = stage();
        let response: HoverResponse = Rc::new(|offset: PointerOffset| {
            Keyframes::new().set("transform", format!("rotateY({}deg)", offset.x * 16.0))
        });
        let rest = AnimationDescriptor::new(
            "card",
            Keyframes::new(),
            Keyframes::new().set("transform", "rotateY(0deg)"),
            0.4,
        );
        let handle = bind_plain(stage.clone(), window(0.0, 0.0), vec![rest], Mode::Hover(response)).unwrap();
        assert_eq!(stage.live_pointer_listeners(), 1);

        let metrics = PointerMetrics {
            client_x: 175.0,
            client_y: 50.0,
            rect_left: 100.0,
            rect_top: 0.0,
            rect_width: 100.0,
            rect_height: 100.0,
        };
        stage.pointer(PointerEvent::Move(metrics));
        assert_eq!(handle.last_pointer(), Some(PointerOffset { x: 0.25, y: 0.0 }));
        assert_eq!(stage.timeline(0).borrow().last_to.as_deref(), Some("rotateY(4deg)"));

        stage.pointer(PointerEvent::Leave);
        assert!(stage.timeline(0).borrow().killed);
        assert_eq!(stage.timeline(1).borrow().last_to.as_deref(), Some("rotateY(0deg)"));
        assert_eq!(handle.phase(), Phase::Bound);

        handle.teardown();
        assert_eq!(stage.live_pointer_listeners(), 0);
        stage.pointer(PointerEvent::Move(metrics));
        assert_eq!(stage.timeline_count(), 2);
    }

    #[test]
    fn missing_targets_are_looked_up_once_per_bind() {
        let stage = stage();
        let handle = bind_plain(stage.clone(), window(0.0, 1000.0), vec![fade("ghost", 1.0)], Mode::Scrub).unwrap();
        let after_bind = stage.lookups();
        for y in 1..=100 {
            stage.scroll_to(y as f64 * 10.0);
        }
        assert_eq!(stage.lookups(), after_bind);
        assert_eq!(stage.timeline_count(), 0);
        // progress is still tracked for listeners
        assert_eq!(handle.last_progress(), Some(1.0));
    }

    #[test]
    fn loop_without_targets_stays_static() {
        let stage = stage();
        bind_plain(stage.clone(), window(100.0, 900.0), vec![fade("ghost", 0.4)], Mode::PersistentLoop).unwrap();
        stage.scroll_to(200.0);
        let after_first = stage.lookups();
        stage.scroll_to(1200.0);
        stage.scroll_to(300.0);
        stage.scroll_to(400.0);
        assert_eq!(stage.lookups(), after_first);
        assert_eq!(stage.timeline_count(), 0);
    }

    #[test]
    fn toggle_without_targets_ignores_flips() {
        let stage = stage();
        bind_plain(stage.clone(), window(100.0, 900.0), vec![fade("ghost", 0.4)], Mode::Toggle).unwrap();
        stage.scroll_to(200.0);
        stage.scroll_to(0.0);
        stage.scroll_to(200.0);
        assert_eq!(stage.timeline_count(), 0);
    }

    #[test]
    fn scrub_reports_progress_changes() {
        let stage = stage();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let options = BindOptions {
            on_progress: Some(Rc::new(move |p: f64| sink.borrow_mut().push(p)) as ProgressListener),
            ..BindOptions::default()
        };
        let handle = bind(stage.clone(), window(100.0, 900.0), Vec::new(), Mode::Scrub, options).unwrap();
        stage.scroll_to(500.0);
        stage.scroll_to(500.0);
        stage.scroll_to(2000.0);
        assert_eq!(*seen.borrow(), vec![0.0, 0.5, 1.0]);

        handle.teardown();
        stage.scroll_to(300.0);
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn loop_settles_from_where_it_stopped() {
        let stage = stage();
        let options = BindOptions { settle: vec![fade("card", 0.2)], ..BindOptions::default() };
        let handle = bind(
            stage.clone(),
            window(100.0, 900.0),
            vec![fade("card", 0.4)],
            Mode::PersistentLoop,
            options,
        )
        .unwrap();
        stage.scroll_to(200.0);
        stage.scroll_to(1200.0);

        let pulse = stage.timeline(0);
        assert!(pulse.borrow().stopped_in_place);
        let settle = stage.timeline(1);
        assert_eq!(settle.borrow().repeat, Some(Repeat::Once));
        assert_eq!(settle.borrow().plays, 1);

        // coming back cuts the settle short and starts a fresh loop
        stage.scroll_to(500.0);
        assert!(settle.borrow().killed);
        assert_eq!(stage.timeline(2).borrow().repeat, Some(Repeat::Yoyo));
        assert_eq!(handle.phase(), Phase::Active);

        handle.teardown();
        assert!(stage.timeline(2).borrow().killed);
    }

    #[test]
    fn loop_without_settle_snaps_back() {
        let stage = stage();
        bind_plain(stage.clone(), window(100.0, 900.0), vec![fade("card", 0.4)], Mode::PersistentLoop).unwrap();
        stage.scroll_to(200.0);
        stage.scroll_to(1200.0);
        assert!(stage.timeline(0).borrow().killed);
        assert!(!stage.timeline(0).borrow().stopped_in_place);
        assert_eq!(stage.timeline_count(), 1);
    }
}
