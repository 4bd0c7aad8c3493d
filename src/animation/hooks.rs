use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::warn;
use yew::prelude::*;

use super::controller::{self, BindOptions, ControllerHandle, Mode, ProgressListener};
use super::stage::AnimationError;
use super::timeline::{AnimationDescriptor, Repeat, Timeline};
use super::trigger::TriggerRegion;
use super::web::{self, MotionSupport, WebStage, WebTarget};

/// A ref that has not been attached yet gets one more chance after layout settles.
const BIND_RETRY_MS: u32 = 50;

/// What a section hands to [`use_scroll_animation`].
#[derive(Clone, Debug)]
pub struct Binding {
    pub region: TriggerRegion<WebTarget>,
    pub descriptors: Vec<AnimationDescriptor<WebTarget>>,
    pub mode: Mode,
    /// Off means the section renders in its final, static state.
    pub enabled: bool,
    pub on_progress: Option<Callback<f64>>,
    pub settle: Vec<AnimationDescriptor<WebTarget>>,
}

impl Binding {
    pub fn new(region: TriggerRegion<WebTarget>, mode: Mode) -> Self {
        Self { region, descriptors: Vec::new(), mode, enabled: true, on_progress: None, settle: Vec::new() }
    }

    /// Scrub progress goes to `callback` as well as the timeline.
    pub fn reporting(mut self, callback: Callback<f64>) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn settling(mut self, descriptor: AnimationDescriptor<WebTarget>) -> Self {
        self.settle.push(descriptor);
        self
    }

    pub fn enabled_if(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with(mut self, descriptor: AnimationDescriptor<WebTarget>) -> Self {
        self.descriptors.push(descriptor);
        self
    }
}

type Slot = Rc<RefCell<Option<ControllerHandle<WebStage>>>>;

fn try_bind(binding: &Binding, slot: &Slot) -> Result<(), AnimationError> {
    let on_progress = binding.on_progress.clone().map(|callback| {
        let listener: ProgressListener = Rc::new(move |progress: f64| callback.emit(progress));
        listener
    });
    let handle = controller::bind(
        Rc::new(WebStage::new()),
        binding.region.clone(),
        binding.descriptors.clone(),
        binding.mode.clone(),
        BindOptions { on_progress, settle: binding.settle.clone() },
    )?;
    *slot.borrow_mut() = Some(handle);
    Ok(())
}

/// Bind once after mount, tear down on unmount. Failures leave the section static.
#[hook]
pub fn use_scroll_animation(binding: Binding) {
    use_effect_with_deps(
        move |_| {
            let slot: Slot = Rc::new(RefCell::new(None));
            let mut retry = None;

            let outcome = if binding.enabled { try_bind(&binding, &slot) } else { Ok(()) };
            match outcome {
                Ok(()) => {}
                Err(AnimationError::InvalidRegion) => {
                    let slot = slot.clone();
                    retry = Some(Timeout::new(BIND_RETRY_MS, move || {
                        if let Err(e) = try_bind(&binding, &slot) {
                            warn!("Section stays static: {}", e);
                        }
                    }));
                }
                Err(e) => warn!("Section stays static: {}", e),
            }

            move || {
                // dropping a pending Timeout cancels it
                drop(retry);
                if let Some(handle) = slot.borrow_mut().take() {
                    handle.teardown();
                }
            }
        },
        (),
    );
}

/// Fire-and-forget animation outside any scroll binding (input shakes, success fades).
pub fn play_now(descriptors: &[AnimationDescriptor<WebTarget>]) {
    if web::init() != MotionSupport::Full {
        return;
    }
    if let Some(mut timeline) = controller::build_timeline(&WebStage::new(), descriptors, Repeat::Once) {
        timeline.play();
    }
}
