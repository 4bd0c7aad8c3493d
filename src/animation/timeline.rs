use std::collections::BTreeMap;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Easing {
    Linear,
    Power1Out,
    Power1InOut,
    Power2Out,
    Power2InOut,
    Power3Out,
    Power4Out,
    SineInOut,
    BackOut,
}

impl Easing {
    /// CSS timing function handed to the browser's interpolation.
    pub fn css(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::Power1Out => "cubic-bezier(0.25, 0.46, 0.45, 0.94)",
            Easing::Power1InOut => "cubic-bezier(0.455, 0.03, 0.515, 0.955)",
            Easing::Power2Out => "cubic-bezier(0.215, 0.61, 0.355, 1)",
            Easing::Power2InOut => "cubic-bezier(0.645, 0.045, 0.355, 1)",
            Easing::Power3Out => "cubic-bezier(0.165, 0.84, 0.44, 1)",
            Easing::Power4Out => "cubic-bezier(0.23, 1, 0.32, 1)",
            Easing::SineInOut => "cubic-bezier(0.445, 0.05, 0.55, 0.95)",
            Easing::BackOut => "cubic-bezier(0.175, 0.885, 0.32, 1.275)",
        }
    }
}

/// CSS property -> value. Ordered so the same descriptor always produces the same frames.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keyframes(pub BTreeMap<String, String>);

impl Keyframes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, property: &str, value: impl Into<String>) -> Self {
        self.0.insert(property.to_string(), value.into());
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StaggerFrom {
    Start,
    Center,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stagger {
    pub each: f64,
    pub from: StaggerFrom,
}

impl Stagger {
    pub fn each(each: f64) -> Self {
        Self { each, from: StaggerFrom::Start }
    }

    /// Spread a total amount of delay across `count` targets, radiating from the middle.
    pub fn from_center(amount: f64, count: usize) -> Self {
        let steps = (count.saturating_sub(1) as f64 / 2.0).max(1.0);
        Self { each: amount / steps, from: StaggerFrom::Center }
    }

    pub fn delay(&self, index: usize, count: usize) -> f64 {
        let last = count.saturating_sub(1) as f64;
        let i = index as f64;
        let distance = match self.from {
            StaggerFrom::Start => i,
            StaggerFrom::Center => (i - last / 2.0).abs(),
        };
        distance * self.each
    }
}

/// Where a descriptor starts relative to the ones declared before it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Position {
    /// Right after the previous descriptor ends.
    Sequential,
    /// Relative to the previous end; negative values overlap.
    Offset(f64),
    /// Together with the previous descriptor.
    WithPrevious,
    At(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationDescriptor<T> {
    pub targets: Vec<T>,
    pub from: Keyframes,
    pub to: Keyframes,
    pub duration: f64,
    pub easing: Easing,
    pub stagger: Option<Stagger>,
    pub position: Position,
}

impl<T> AnimationDescriptor<T> {
    pub fn new(target: T, from: Keyframes, to: Keyframes, duration: f64) -> Self {
        Self::many(vec![target], from, to, duration)
    }

    pub fn many(targets: Vec<T>, from: Keyframes, to: Keyframes, duration: f64) -> Self {
        Self {
            targets,
            from,
            to,
            duration: duration.max(0.0),
            easing: Easing::Linear,
            stagger: None,
            position: Position::Sequential,
        }
    }

    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn stagger(mut self, stagger: Stagger) -> Self {
        self.stagger = Some(stagger);
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Repeat {
    Once,
    /// Alternate forward and backward forever.
    Yoyo,
}

/// One target of one descriptor, placed at an absolute time inside the timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedStep<T> {
    pub descriptor: usize,
    pub target: T,
    pub start: f64,
    pub duration: f64,
    pub from: Keyframes,
    pub to: Keyframes,
    pub easing: Easing,
}

impl<T> PlacedStep<T> {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimelinePlan<T> {
    pub steps: Vec<PlacedStep<T>>,
    pub duration: f64,
    pub repeat: Repeat,
}

impl<T: Clone> TimelinePlan<T> {
    /// Resolve relative positions into absolute start times, in declared order.
    pub fn layout(descriptors: &[AnimationDescriptor<T>], repeat: Repeat) -> Self {
        let mut steps = Vec::new();
        let mut prev_start = 0.0_f64;
        let mut prev_end = 0.0_f64;

        for (index, d) in descriptors.iter().enumerate() {
            let base = match d.position {
                Position::Sequential => prev_end,
                Position::Offset(delta) => prev_end + delta,
                Position::WithPrevious => prev_start,
                Position::At(t) => t,
            }
            .max(0.0);

            let count = d.targets.len();
            let mut end = base;
            for (i, target) in d.targets.iter().enumerate() {
                let delay = d.stagger.map(|s| s.delay(i, count)).unwrap_or(0.0);
                let step = PlacedStep {
                    descriptor: index,
                    target: target.clone(),
                    start: base + delay,
                    duration: d.duration,
                    from: d.from.clone(),
                    to: d.to.clone(),
                    easing: d.easing,
                };
                end = end.max(step.end());
                steps.push(step);
            }

            prev_start = base;
            prev_end = end;
        }

        let duration = steps.iter().map(PlacedStep::end).fold(0.0, f64::max);
        Self { steps, duration, repeat }
    }
}

/// Capability the controller drives; how interpolation happens is the implementor's business.
/// Times are in seconds.
pub trait Timeline {
    fn duration(&self) -> f64;
    fn time(&self) -> f64;
    fn set_time(&mut self, seconds: f64);
    fn play(&mut self);
    /// Run backwards from wherever the playhead currently is.
    fn reverse(&mut self);
    fn kill(&mut self);
    /// Kill, but leave every target on the values it has reached.
    fn stop_in_place(&mut self);
    fn is_killed(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fade(target: &'static str, duration: f64) -> AnimationDescriptor<&'static str> {
        AnimationDescriptor::new(
            target,
            Keyframes::new().set("opacity", "0"),
            Keyframes::new().set("opacity", "1"),
            duration,
        )
    }

    #[test]
    fn sequential_descriptors_follow_each_other() {
        let plan = TimelinePlan::layout(&[fade("a", 1.0), fade("b", 0.5)], Repeat::Once);
        let starts: Vec<f64> = plan.steps.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0.0, 1.0]);
        assert_eq!(plan.duration, 1.5);
    }

    #[test]
    fn negative_offset_overlaps_but_keeps_order() {
        let plan = TimelinePlan::layout(
            &[fade("a", 1.0), fade("b", 1.0).at(Position::Offset(-0.4)), fade("c", 0.2).at(Position::WithPrevious)],
            Repeat::Once,
        );
        let order: Vec<(&str, f64)> = plan.steps.iter().map(|s| (s.target, s.start)).collect();
        assert_eq!(order[0], ("a", 0.0));
        assert_eq!(order[1].0, "b");
        assert!((order[1].1 - 0.6).abs() < 1e-9);
        assert!((order[2].1 - 0.6).abs() < 1e-9);
        assert!((plan.duration - 1.6).abs() < 1e-9);
    }

    #[test]
    fn overlap_never_starts_before_zero() {
        let plan = TimelinePlan::layout(&[fade("a", 1.0).at(Position::Offset(-3.0))], Repeat::Once);
        assert_eq!(plan.steps[0].start, 0.0);
    }

    #[test]
    fn stagger_spreads_targets() {
        let d = AnimationDescriptor::many(vec!["w0", "w1", "w2"], Keyframes::new(), Keyframes::new(), 0.8)
            .stagger(Stagger::each(0.15));
        let plan = TimelinePlan::layout(&[d, fade("tail", 0.1)], Repeat::Once);
        let starts: Vec<f64> = plan.steps.iter().map(|s| s.start).collect();
        assert!((starts[2] - 0.3).abs() < 1e-9);
        // next descriptor waits for the last staggered target
        assert!((starts[3] - 1.1).abs() < 1e-9);
    }

    #[test]
    fn center_stagger_is_symmetric() {
        let s = Stagger::from_center(0.2, 5);
        assert_eq!(s.delay(2, 5), 0.0);
        assert_eq!(s.delay(0, 5), s.delay(4, 5));
        assert!((s.delay(0, 5) - 0.2).abs() < 1e-9);
    }
}
