//! In-memory stage for exercising controllers without a browser.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::mem;
use std::rc::Rc;

use super::stage::{AnimationError, Stage, Subscription};
use super::timeline::{Repeat, Timeline, TimelinePlan};
use super::trigger::{PointerEvent, ScrollMetrics};

#[derive(Debug, Default)]
pub struct FakeTimelineState {
    pub duration: f64,
    pub time: f64,
    /// 1.0 forward, -1.0 backward, 0.0 stopped.
    pub direction: f64,
    pub killed: bool,
    pub stopped_in_place: bool,
    pub plays: u32,
    pub reverses: u32,
    pub set_time_calls: u32,
    pub repeat: Option<Repeat>,
    pub steps: Vec<(String, f64)>,
    pub last_to: Option<String>,
}

pub struct FakeTimeline(Rc<RefCell<FakeTimelineState>>);

impl Timeline for FakeTimeline {
    fn duration(&self) -> f64 {
        self.0.borrow().duration
    }

    fn time(&self) -> f64 {
        self.0.borrow().time
    }

    fn set_time(&mut self, seconds: f64) {
        let mut state = self.0.borrow_mut();
        state.time = seconds.clamp(0.0, state.duration);
        state.set_time_calls += 1;
    }

    fn play(&mut self) {
        let mut state = self.0.borrow_mut();
        state.direction = 1.0;
        state.plays += 1;
    }

    fn reverse(&mut self) {
        let mut state = self.0.borrow_mut();
        state.direction = -1.0;
        state.reverses += 1;
    }

    fn kill(&mut self) {
        let mut state = self.0.borrow_mut();
        state.killed = true;
        state.direction = 0.0;
    }

    fn stop_in_place(&mut self) {
        self.kill();
        self.0.borrow_mut().stopped_in_place = true;
    }

    fn is_killed(&self) -> bool {
        self.0.borrow().killed
    }
}

#[derive(Default)]
struct Registry {
    next_id: usize,
    scroll: Vec<(usize, Box<dyn FnMut(ScrollMetrics)>)>,
    pointer: Vec<(usize, Box<dyn FnMut(PointerEvent)>)>,
    released_ids: HashSet<usize>,
    released: usize,
}

impl Registry {
    fn release(&mut self, id: usize) {
        self.scroll.retain(|(i, _)| *i != id);
        self.pointer.retain(|(i, _)| *i != id);
        self.released_ids.insert(id);
        self.released += 1;
    }
}

pub struct FakeStage {
    mounted: RefCell<HashSet<&'static str>>,
    lookups: Cell<u32>,
    scroll_y: Cell<f64>,
    observers_available: Cell<bool>,
    registry: Rc<RefCell<Registry>>,
    timelines: RefCell<Vec<Rc<RefCell<FakeTimelineState>>>>,
}

impl FakeStage {
    pub fn new() -> Self {
        Self {
            mounted: RefCell::new(HashSet::new()),
            lookups: Cell::new(0),
            scroll_y: Cell::new(0.0),
            observers_available: Cell::new(true),
            registry: Rc::new(RefCell::new(Registry::default())),
            timelines: RefCell::new(Vec::new()),
        }
    }

    pub fn mount(&self, target: &'static str) {
        self.mounted.borrow_mut().insert(target);
    }

    pub fn disable_observers(&self) {
        self.observers_available.set(false);
    }

    pub fn metrics_at(&self, scroll_y: f64) -> ScrollMetrics {
        ScrollMetrics { scroll_y, viewport_height: 1000.0, element_top: 0.0, element_height: 1000.0 }
    }

    pub fn scroll_to(&self, scroll_y: f64) {
        self.scroll_y.set(scroll_y);
        let metrics = self.metrics_at(scroll_y);
        let mut listeners = mem::take(&mut self.registry.borrow_mut().scroll);
        for (_, listener) in listeners.iter_mut() {
            listener(metrics);
        }
        let mut registry = self.registry.borrow_mut();
        listeners.retain(|(id, _)| !registry.released_ids.contains(id));
        listeners.append(&mut registry.scroll);
        registry.scroll = listeners;
    }

    pub fn pointer(&self, event: PointerEvent) {
        let mut listeners = mem::take(&mut self.registry.borrow_mut().pointer);
        for (_, listener) in listeners.iter_mut() {
            listener(event.clone());
        }
        let mut registry = self.registry.borrow_mut();
        listeners.retain(|(id, _)| !registry.released_ids.contains(id));
        listeners.append(&mut registry.pointer);
        registry.pointer = listeners;
    }

    /// Move every running timeline's playhead by `dt` seconds.
    pub fn advance(&self, dt: f64) {
        for timeline in self.timelines.borrow().iter() {
            let mut state = timeline.borrow_mut();
            if !state.killed {
                state.time = (state.time + dt * state.direction).clamp(0.0, state.duration);
            }
        }
    }

    pub fn timeline(&self, index: usize) -> Rc<RefCell<FakeTimelineState>> {
        self.timelines.borrow()[index].clone()
    }

    pub fn timeline_count(&self) -> usize {
        self.timelines.borrow().len()
    }

    pub fn live_listeners(&self) -> usize {
        let registry = self.registry.borrow();
        registry.scroll.len() + registry.pointer.len()
    }

    pub fn live_pointer_listeners(&self) -> usize {
        self.registry.borrow().pointer.len()
    }

    /// How many times anything asked whether a target is on the page.
    pub fn lookups(&self) -> u32 {
        self.lookups.get()
    }

    pub fn released(&self) -> usize {
        self.registry.borrow().released
    }

    fn subscription(&self, id: usize) -> Subscription {
        let registry = self.registry.clone();
        Subscription::new(move || registry.borrow_mut().release(id))
    }
}

impl Stage for FakeStage {
    type Target = &'static str;
    type Timeline = FakeTimeline;

    fn is_mounted(&self, target: &&'static str) -> bool {
        self.lookups.set(self.lookups.get() + 1);
        self.mounted.borrow().contains(target)
    }

    fn measure(&self, region: &&'static str) -> Option<ScrollMetrics> {
        self.is_mounted(region).then(|| self.metrics_at(self.scroll_y.get()))
    }

    fn build_timeline(&self, plan: &TimelinePlan<&'static str>) -> Result<FakeTimeline, AnimationError> {
        let state = Rc::new(RefCell::new(FakeTimelineState {
            duration: plan.duration,
            repeat: Some(plan.repeat),
            steps: plan.steps.iter().map(|s| (s.target.to_string(), s.start)).collect(),
            last_to: plan.steps.last().and_then(|s| s.to.0.values().next().cloned()),
            ..FakeTimelineState::default()
        }));
        self.timelines.borrow_mut().push(state.clone());
        Ok(FakeTimeline(state))
    }

    fn observe_scroll(
        &self,
        _region: &&'static str,
        listener: Box<dyn FnMut(ScrollMetrics)>,
    ) -> Result<Subscription, AnimationError> {
        if !self.observers_available.get() {
            return Err(AnimationError::ObserverUnavailable("scroll events disabled".to_string()));
        }
        let id = {
            let mut registry = self.registry.borrow_mut();
            registry.next_id += 1;
            let id = registry.next_id;
            registry.scroll.push((id, listener));
            id
        };
        Ok(self.subscription(id))
    }

    fn observe_pointer(
        &self,
        _region: &&'static str,
        listener: Box<dyn FnMut(PointerEvent)>,
    ) -> Result<Subscription, AnimationError> {
        if !self.observers_available.get() {
            return Err(AnimationError::ObserverUnavailable("pointer events disabled".to_string()));
        }
        let id = {
            let mut registry = self.registry.borrow_mut();
            registry.next_id += 1;
            let id = registry.next_id;
            registry.pointer.push((id, listener));
            id
        };
        Ok(self.subscription(id))
    }
}
