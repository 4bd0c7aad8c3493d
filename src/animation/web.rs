use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::js_sys::{Function, Object, Reflect};
use web_sys::{Animation, Element, EventTarget, MouseEvent};
use yew::NodeRef;

use super::stage::{AnimationError, Stage, Subscription};
use super::timeline::{PlacedStep, Repeat, Timeline, TimelinePlan};
use super::trigger::{PointerEvent, PointerMetrics, ScrollMetrics};

const SCROLL_EVENTS: [&str; 2] = ["scroll", "resize"];

// web-sys only exposes these behind `web_sys_unstable_apis`.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(extends = Element)]
    type AnimatableElement;

    #[wasm_bindgen(extends = Animation)]
    type CommittableAnimation;

    #[wasm_bindgen(method, catch, js_name = animate)]
    fn animate_effect(this: &AnimatableElement, keyframes: &JsValue, options: &JsValue) -> Result<Animation, JsValue>;

    #[wasm_bindgen(method, catch, js_name = commitStyles)]
    fn commit_reached_styles(this: &CommittableAnimation) -> Result<(), JsValue>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionSupport {
    Full,
    /// The visitor asked for less motion; sections stay static.
    Reduced,
    Unsupported,
}

static MOTION: OnceCell<MotionSupport> = OnceCell::new();

/// Detect what the browser offers. Safe to call any number of times; only the first call inspects the browser.
pub fn init() -> MotionSupport {
    *MOTION.get_or_init(|| {
        let support = detect_support();
        info!("Animation support: {:?}", support);
        support
    })
}

fn detect_support() -> MotionSupport {
    let Some(window) = web_sys::window() else {
        return MotionSupport::Unsupported;
    };
    let animate_available = window
        .document()
        .and_then(|document| document.create_element("div").ok())
        .map(|div| Reflect::has(&JsValue::from(div), &JsValue::from_str("animate")).unwrap_or(false))
        .unwrap_or(false);
    if !animate_available {
        return MotionSupport::Unsupported;
    }

    let reduced = window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .map(|query| query.matches())
        .unwrap_or(false);
    if reduced {
        MotionSupport::Reduced
    } else {
        MotionSupport::Full
    }
}

pub fn viewport_width() -> Option<f64> {
    web_sys::window()?.inner_width().ok()?.as_f64()
}

#[derive(Clone, PartialEq)]
pub enum WebTarget {
    Node(NodeRef),
    /// Every element matching the selector, in document order.
    Selector(String),
}

impl WebTarget {
    pub fn selector(selector: &str) -> Self {
        WebTarget::Selector(selector.to_string())
    }

    fn elements(&self) -> Vec<Element> {
        match self {
            WebTarget::Node(node) => node.cast::<Element>().into_iter().collect(),
            WebTarget::Selector(selector) => {
                let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                    return Vec::new();
                };
                let Ok(list) = document.query_selector_all(selector) else {
                    return Vec::new();
                };
                (0..list.length())
                    .filter_map(|i| list.item(i))
                    .filter_map(|node| node.dyn_into::<Element>().ok())
                    .collect()
            }
        }
    }
}

impl fmt::Debug for WebTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebTarget::Node(_) => f.write_str("Node(..)"),
            WebTarget::Selector(selector) => write!(f, "Selector({})", selector),
        }
    }
}

fn measure_element(element: &Element) -> Option<ScrollMetrics> {
    let window = web_sys::window()?;
    let scroll_y = window.scroll_y().ok()?;
    let viewport_height = window.inner_height().ok()?.as_f64()?;
    let rect = element.get_bounding_client_rect();
    Some(ScrollMetrics {
        scroll_y,
        viewport_height,
        element_top: rect.top() + scroll_y,
        element_height: rect.height(),
    })
}

fn attach(target: &EventTarget, events: &[&'static str], function: &Function) -> Result<(), AnimationError> {
    for (i, event) in events.iter().enumerate() {
        if let Err(e) = target.add_event_listener_with_callback(event, function) {
            for done in &events[..i] {
                let _ = target.remove_event_listener_with_callback(done, function);
            }
            return Err(AnimationError::ObserverUnavailable(format!("{} listener: {:?}", event, e)));
        }
    }
    Ok(())
}

fn listening<F: ?Sized + 'static>(
    target: EventTarget,
    events: &'static [&'static str],
    callback: Closure<F>,
) -> Result<Subscription, AnimationError> {
    attach(&target, events, callback.as_ref().unchecked_ref())?;
    Ok(Subscription::new(move || {
        for event in events {
            let _ = target.remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
        }
    }))
}

#[derive(Serialize)]
struct Frame<'a> {
    offset: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    easing: Option<&'static str>,
    #[serde(flatten)]
    props: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct EffectTiming {
    duration: f64,
    iterations: f64,
    direction: &'static str,
    fill: &'static str,
}

/// Steps that share a target, in start order. One element carries one effect.
fn group_by_target(steps: &[PlacedStep<WebTarget>]) -> Vec<(&WebTarget, Vec<&PlacedStep<WebTarget>>)> {
    let mut groups: Vec<(&WebTarget, Vec<&PlacedStep<WebTarget>>)> = Vec::new();
    for step in steps {
        match groups.iter_mut().find(|(target, _)| **target == step.target) {
            Some((_, members)) => members.push(step),
            None => groups.push((&step.target, vec![step])),
        }
    }
    for (_, members) in &mut groups {
        members.sort_by(|a, b| a.start.total_cmp(&b.start));
    }
    groups
}

/// Hold the first `from` until the first step begins and the last `to` after the
/// last one ends. Offsets never run backwards, so overlapping steps on one
/// target collapse onto the later one.
fn merged_frames<'a>(steps: &[&'a PlacedStep<WebTarget>], total: f64) -> Vec<Frame<'a>> {
    let mut frames = Vec::with_capacity(steps.len() * 2 + 2);
    let (Some(first), Some(last)) = (steps.first(), steps.last()) else {
        return frames;
    };
    frames.push(Frame { offset: 0.0, easing: None, props: &first.from.0 });
    let mut cursor = 0.0;
    for step in steps {
        let begin = (step.start / total).clamp(cursor, 1.0);
        let end = (step.end() / total).clamp(begin, 1.0);
        frames.push(Frame { offset: begin, easing: Some(step.easing.css()), props: &step.from.0 });
        frames.push(Frame { offset: end, easing: None, props: &step.to.0 });
        cursor = end;
    }
    frames.push(Frame { offset: 1.0, easing: None, props: &last.to.0 });
    frames
}

/// The browser's own animation engine behind the [`Timeline`] capability.
///
/// Every target gets one effect spanning the whole timeline, with its steps
/// placed by keyframe offsets, so seeking, reversing and yoyo looping apply to
/// all of them at once.
pub struct WebTimeline {
    animations: Vec<Animation>,
    duration: f64,
    repeat: Repeat,
    killed: bool,
}

impl WebTimeline {
    fn cancel_all(&mut self, keep_styles: bool) {
        for animation in &self.animations {
            if keep_styles {
                if let Err(e) = animation.unchecked_ref::<CommittableAnimation>().commit_reached_styles() {
                    debug!("Could not commit animated styles: {:?}", e);
                }
            }
            animation.cancel();
        }
        self.killed = true;
    }
}

impl Timeline for WebTimeline {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn time(&self) -> f64 {
        self.animations
            .first()
            .and_then(|a| a.current_time())
            .map(|ms| ms / 1000.0)
            .unwrap_or(0.0)
    }

    fn set_time(&mut self, seconds: f64) {
        for animation in &self.animations {
            animation.set_current_time(Some(seconds * 1000.0));
        }
    }

    fn play(&mut self) {
        for animation in &self.animations {
            let rate = animation.playback_rate();
            if rate < 0.0 {
                animation.set_playback_rate(-rate);
            }
            if let Err(e) = animation.play() {
                warn!("Animation play failed: {:?}", e);
            }
        }
    }

    fn reverse(&mut self) {
        let at_start = self.time() <= 0.0;
        for animation in &self.animations {
            let rate = animation.playback_rate();
            if rate > 0.0 {
                animation.set_playback_rate(-rate);
            }
            // play() with a negative rate at time 0 would rewind to the end
            let result = if at_start { animation.pause() } else { animation.play() };
            if let Err(e) = result {
                warn!("Animation reverse failed: {:?}", e);
            }
        }
    }

    fn kill(&mut self) {
        // a one-shot tween keeps whatever it reached; a loop falls back to the base style
        let keep = self.repeat == Repeat::Once;
        self.cancel_all(keep);
    }

    fn stop_in_place(&mut self) {
        self.cancel_all(true);
    }

    fn is_killed(&self) -> bool {
        self.killed
    }
}

#[derive(Default)]
pub struct WebStage;

impl WebStage {
    pub fn new() -> Self {
        Self
    }

    fn require_motion(&self) -> Result<(), AnimationError> {
        match init() {
            MotionSupport::Full => Ok(()),
            other => Err(AnimationError::ObserverUnavailable(format!("motion {:?}", other))),
        }
    }
}

impl Stage for WebStage {
    type Target = WebTarget;
    type Timeline = WebTimeline;

    fn is_mounted(&self, target: &WebTarget) -> bool {
        !target.elements().is_empty()
    }

    fn measure(&self, region: &WebTarget) -> Option<ScrollMetrics> {
        region.elements().first().and_then(measure_element)
    }

    fn build_timeline(&self, plan: &TimelinePlan<WebTarget>) -> Result<WebTimeline, AnimationError> {
        let total = plan.duration.max(0.001);
        let timing = match plan.repeat {
            Repeat::Once => EffectTiming { duration: total * 1000.0, iterations: 1.0, direction: "normal", fill: "both" },
            Repeat::Yoyo => EffectTiming {
                duration: total * 1000.0,
                iterations: f64::INFINITY,
                direction: "alternate",
                fill: "both",
            },
        };
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let options: Object = timing
            .serialize(&serializer)
            .map_err(|e| AnimationError::Primitive(e.to_string()))?
            .unchecked_into();

        let mut animations: Vec<Animation> = Vec::new();
        for (target, steps) in group_by_target(&plan.steps) {
            let keyframes: Object = merged_frames(&steps, total)
                .serialize(&serializer)
                .map_err(|e| AnimationError::Primitive(e.to_string()))?
                .unchecked_into();

            for element in target.elements() {
                let animation = match element.unchecked_ref::<AnimatableElement>().animate_effect(&keyframes, &options) {
                    Ok(animation) => animation,
                    Err(e) => {
                        for started in &animations {
                            started.cancel();
                        }
                        return Err(AnimationError::Primitive(format!("animate: {:?}", e)));
                    }
                };
                if let Err(e) = animation.pause() {
                    warn!("Could not hold animation at its start: {:?}", e);
                }
                animations.push(animation);
            }
        }

        if animations.is_empty() {
            return Err(AnimationError::AnimationTargetMissing("no elements matched".to_string()));
        }
        Ok(WebTimeline { animations, duration: plan.duration, repeat: plan.repeat, killed: false })
    }

    fn observe_scroll(
        &self,
        region: &WebTarget,
        mut listener: Box<dyn FnMut(ScrollMetrics)>,
    ) -> Result<Subscription, AnimationError> {
        self.require_motion()?;
        let window = web_sys::window()
            .ok_or_else(|| AnimationError::ObserverUnavailable("no window".to_string()))?;

        let region = region.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(metrics) = region.elements().first().and_then(measure_element) {
                listener(metrics);
            }
        });
        listening(window.into(), &SCROLL_EVENTS, callback)
    }

    fn observe_pointer(
        &self,
        region: &WebTarget,
        listener: Box<dyn FnMut(PointerEvent)>,
    ) -> Result<Subscription, AnimationError> {
        self.require_motion()?;
        let element = region.elements().into_iter().next().ok_or(AnimationError::InvalidRegion)?;
        let listener = Rc::new(RefCell::new(listener));

        let on_move = {
            let listener = listener.clone();
            let element = element.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                let rect = element.get_bounding_client_rect();
                let metrics = PointerMetrics {
                    client_x: event.client_x() as f64,
                    client_y: event.client_y() as f64,
                    rect_left: rect.left(),
                    rect_top: rect.top(),
                    rect_width: rect.width(),
                    rect_height: rect.height(),
                };
                (&mut *listener.borrow_mut())(PointerEvent::Move(metrics));
            })
        };
        let on_leave = Closure::<dyn FnMut(MouseEvent)>::new(move |_: MouseEvent| {
            (&mut *listener.borrow_mut())(PointerEvent::Leave);
        });

        let target: EventTarget = element.into();
        let moves = listening(target.clone(), &["mousemove"], on_move)?;
        let leaves = listening(target, &["mouseleave"], on_leave)?;
        Ok(Subscription::new(move || {
            moves.release();
            leaves.release();
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::timeline::{Easing, Keyframes};

    fn step(target: &str, start: f64, duration: f64, from: &str, to: &str) -> PlacedStep<WebTarget> {
        PlacedStep {
            descriptor: 0,
            target: WebTarget::selector(target),
            start,
            duration,
            from: Keyframes::new().set("transform", from),
            to: Keyframes::new().set("transform", to),
            easing: Easing::Linear,
        }
    }

    #[test]
    fn steps_on_one_target_share_a_track() {
        let steps = vec![
            step(".dot", 0.6, 0.3, "scale(1.1)", "scale(1)"),
            step(".other", 0.0, 0.4, "scale(1)", "scale(1.1)"),
            step(".dot", 0.2, 0.4, "scale(1)", "scale(1.1)"),
        ];
        let groups = group_by_target(&steps);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[0].1[0].start, 0.2);

        let frames = merged_frames(&groups[0].1, 1.0);
        let offsets: Vec<f64> = frames.iter().map(|f| f.offset).collect();
        assert_eq!(offsets.len(), 6);
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(frames[0].props["transform"], "scale(1)");
        assert_eq!(frames[5].props["transform"], "scale(1)");
        assert_eq!(frames[2].props["transform"], "scale(1.1)");
    }

    #[test]
    fn overlapping_steps_never_run_offsets_backwards() {
        let steps = vec![step(".a", 0.0, 1.0, "x", "y"), step(".a", 0.5, 0.2, "y", "z")];
        let groups = group_by_target(&steps);
        let frames = merged_frames(&groups[0].1, 1.0);
        let offsets: Vec<f64> = frames.iter().map(|f| f.offset).collect();
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
    }
}
