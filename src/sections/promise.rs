use yew::prelude::*;

use crate::animation::controller::Mode;
use crate::animation::hooks::{play_now, use_scroll_animation, Binding};
use crate::animation::text::{segment_class, segment_selectors, segment_words};
use crate::animation::timeline::{AnimationDescriptor, Easing, Keyframes, Position, Stagger};
use crate::animation::trigger::TriggerRegion;
use crate::animation::web::{self, MotionSupport, WebTarget};

struct Milestone {
    number: &'static str,
    title: &'static str,
    description: &'static str,
}

const MILESTONES: [Milestone; 3] = [
    Milestone {
        number: "01",
        title: "Vision",
        description: "Cognisync envisions a future where your mind connects effortlessly with technology and enhancing how we live, work, and evolve through cognitive-driven systems.",
    },
    Milestone {
        number: "02",
        title: "Mission",
        description: "We're on a mission to make brain-computer interaction a natural extension of the mind by boosting focus, preventing cognitive fatigue, and transforming how we engage with the world.",
    },
    Milestone {
        number: "03",
        title: "Ethos",
        description: "We don't just build BCI systems. We build cognitive tools that learn, adapt, and evolve with you by merging neuroscience, design, and intelligent software into one experience.",
    },
];

const HEART_WIDTH: usize = 7;
#[rustfmt::skip]
const HEART: [u8; 49] = [
    0, 0, 1, 1, 1, 0, 0,
    0, 1, 1, 1, 1, 1, 0,
    1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1,
    0, 1, 1, 1, 1, 1, 0,
    0, 0, 1, 1, 1, 0, 0,
    0, 0, 0, 1, 0, 0, 0,
];

const TITLE: &str = "OUR PROMISE";

/// One slot per milestone plus a trailing empty one, so the last milestone
/// hands off before the section scrolls away.
const SLOTS: usize = MILESTONES.len() + 1;

fn active_milestone(progress: f64) -> usize {
    ((progress * SLOTS as f64).floor() as usize).min(SLOTS - 1)
}

/// Dim the milestone being left and lift the one taking over, together.
fn highlight_shift<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<AnimationDescriptor<T>> {
    let mut steps = Vec::new();
    if let Some(leaving) = items.get(from) {
        steps.push(
            AnimationDescriptor::new(
                leaving.clone(),
                Keyframes::new(),
                Keyframes::new().set("opacity", "0.2").set("transform", "translateY(20px)"),
                0.4,
            )
            .ease(Easing::Power2InOut),
        );
    }
    if let Some(arriving) = items.get(to) {
        steps.push(
            AnimationDescriptor::new(
                arriving.clone(),
                Keyframes::new().set("opacity", "0.2").set("transform", "translateY(-20px)"),
                Keyframes::new().set("opacity", "1").set("transform", "translateY(0px)"),
                0.4,
            )
            .ease(Easing::Power2Out)
            .at(Position::WithPrevious),
        );
    }
    steps
}

fn backdrop_fade(backdrop: &NodeRef, lit: bool) -> AnimationDescriptor<WebTarget> {
    AnimationDescriptor::new(
        WebTarget::Node(backdrop.clone()),
        Keyframes::new(),
        Keyframes::new().set("opacity", if lit { "1" } else { "0" }),
        0.5,
    )
    .ease(Easing::Power2InOut)
}

fn filled_pixels() -> Vec<usize> {
    HEART.iter().enumerate().filter(|(_, cell)| **cell == 1).map(|(i, _)| i).collect()
}

fn heart_targets() -> Vec<WebTarget> {
    filled_pixels().into_iter().map(|i| WebTarget::selector(&format!(".heart-pixel-{}", i))).collect()
}

/// Pulse outward from the middle of the heart, then settle. Looped as a yoyo.
fn heartbeat() -> Vec<AnimationDescriptor<WebTarget>> {
    let pixels = heart_targets();
    let count = pixels.len();
    let rest = Keyframes::new().set("transform", "scale(1)");
    let swollen = Keyframes::new().set("transform", "scale(1.1)");
    vec![
        AnimationDescriptor::many(pixels.clone(), rest.clone(), swollen.clone(), 0.4)
            .ease(Easing::SineInOut)
            .stagger(Stagger::from_center(0.2, count)),
        AnimationDescriptor::many(pixels, swollen, rest, 0.3).ease(Easing::SineInOut),
    ]
}

/// Back to rest from wherever the pulse was when the heart scrolled out.
fn heart_settle() -> AnimationDescriptor<WebTarget> {
    AnimationDescriptor::many(heart_targets(), Keyframes::new(), Keyframes::new().set("transform", "scale(1)"), 0.2)
        .ease(Easing::Power1Out)
}

#[function_component(Promise)]
pub fn promise() -> Html {
    let section = use_node_ref();
    let backdrop = use_node_ref();
    let line_fill = use_node_ref();
    let heart = use_node_ref();
    let items = [use_node_ref(), use_node_ref(), use_node_ref()];
    let active = use_state_eq(|| 0usize);
    let lit = use_state_eq(|| false);
    let shown = use_mut_ref(|| (0usize, false));
    let words = segment_words(TITLE);
    // Without scroll tracking every milestone stays readable.
    let tracking = web::init() == MotionSupport::Full;

    let title_targets = segment_selectors("promise", &words).iter().map(|s| WebTarget::selector(s)).collect();
    use_scroll_animation(
        Binding::new(TriggerRegion::starting_at(WebTarget::Node(section.clone()), "top 80%"), Mode::OnceForward).with(
            AnimationDescriptor::many(
                title_targets,
                Keyframes::new().set("opacity", "0").set("transform", "translateY(100px) rotate(5deg)"),
                Keyframes::new().set("opacity", "1").set("transform", "translateY(0px) rotate(0deg)"),
                0.8,
            )
            .ease(Easing::Power4Out)
            .stagger(Stagger::each(0.08)),
        ),
    );

    use_scroll_animation(
        Binding::new(TriggerRegion::new(WebTarget::Node(section.clone()), "top center", "bottom center"), Mode::Scrub)
            .with(AnimationDescriptor::new(
                WebTarget::Node(line_fill.clone()),
                Keyframes::new().set("transform", "scaleY(0)"),
                Keyframes::new().set("transform", "scaleY(1)"),
                1.0,
            )),
    );

    let numbers = (0..MILESTONES.len()).map(|i| WebTarget::selector(&format!(".timeline-number-{}", i))).collect();
    use_scroll_animation(
        Binding::new(TriggerRegion::starting_at(WebTarget::Node(section.clone()), "top 70%"), Mode::OnceForward).with(
            AnimationDescriptor::many(
                numbers,
                Keyframes::new().set("opacity", "0").set("transform", "scale(0.5)"),
                Keyframes::new().set("opacity", "1").set("transform", "scale(1)"),
                0.7,
            )
            .ease(Easing::BackOut)
            .stagger(Stagger::each(0.15)),
        ),
    );

    let heart_binding = heartbeat().into_iter().fold(
        Binding::new(TriggerRegion::new(WebTarget::Node(heart.clone()), "top 80%", "bottom 20%"), Mode::PersistentLoop),
        Binding::with,
    );
    use_scroll_animation(heart_binding.settling(heart_settle()));

    {
        let active = active.clone();
        use_scroll_animation(
            Binding::new(
                TriggerRegion::new(WebTarget::Node(section.clone()), "top center+=100", "bottom center-=100"),
                Mode::Scrub,
            )
            .reporting(Callback::from(move |progress: f64| active.set(active_milestone(progress)))),
        );
    }

    {
        let lit = lit.clone();
        use_scroll_animation(
            Binding::new(
                TriggerRegion::new(WebTarget::Node(section.clone()), "top center+=25%", "bottom center-=25%"),
                Mode::Scrub,
            )
            .reporting(Callback::from(move |progress: f64| lit.set(progress > 0.0 && progress < 1.0))),
        );
    }

    {
        let items: Vec<WebTarget> = items.iter().map(|item| WebTarget::Node(item.clone())).collect();
        let backdrop = backdrop.clone();
        use_effect_with_deps(
            move |(active, lit)| {
                let (was_active, was_lit) = *shown.borrow();
                if *active != was_active {
                    play_now(&highlight_shift(&items, was_active, *active));
                }
                if *lit != was_lit {
                    play_now(&[backdrop_fade(&backdrop, *lit)]);
                }
                *shown.borrow_mut() = (*active, *lit);
                || ()
            },
            (*active, *lit),
        );
    }

    html! {
        <>
        <div ref={backdrop} class="promise-backdrop" />
        <section ref={section} class="promise">
            <div class="promise-heading">
                <h2 class="hero-heading">
                    { for words.iter().map(|w| html! {
                        <span class={classes!("promise-word", segment_class("promise", w))}>{ w.text.clone() }</span>
                    }) }
                </h2>
            </div>
            <div class="promise-body">
                <div class="promise-timeline">
                    <div class="timeline-track">
                        <div ref={line_fill} class="timeline-fill" />
                    </div>
                    <div class="timeline-items">
                        { for MILESTONES.iter().enumerate().map(|(i, m)| {
                            let current = !tracking || *active == i;
                            html! {
                                <div ref={items[i].clone()} class={classes!("timeline-item", (!current).then(|| "dimmed"))}>
                                    <div class={classes!("timeline-number", format!("timeline-number-{}", i))}>{ m.number }</div>
                                    <h3>{ m.title }</h3>
                                    if current {
                                        <p>{ m.description }</p>
                                    }
                                </div>
                            }
                        }) }
                    </div>
                </div>
                <div ref={heart} class="pixel-heart" style={format!("--heart-columns: {}", HEART_WIDTH)}>
                    { for HEART.iter().enumerate().map(|(i, cell)| {
                        let class = if *cell == 1 {
                            classes!("heart-pixel", "filled", format!("heart-pixel-{}", i))
                        } else {
                            classes!("heart-pixel")
                        };
                        html! { <div {class} /> }
                    }) }
                </div>
            </div>
        </section>
        </>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heart_is_symmetric_with_a_single_tip() {
        for row in HEART.chunks(HEART_WIDTH) {
            let mirrored: Vec<u8> = row.iter().rev().copied().collect();
            assert_eq!(row, mirrored.as_slice());
        }
        assert_eq!(HEART[HEART.len() - HEART_WIDTH..].iter().filter(|c| **c == 1).count(), 1);
        assert_eq!(filled_pixels().len(), 31);
    }

    #[test]
    fn milestones_take_turns_with_a_blank_tail() {
        assert_eq!(active_milestone(0.0), 0);
        assert_eq!(active_milestone(0.26), 1);
        assert_eq!(active_milestone(0.5), 2);
        assert_eq!(active_milestone(0.8), MILESTONES.len());
        assert_eq!(active_milestone(1.0), SLOTS - 1);
    }

    #[test]
    fn highlight_moves_both_items_at_once() {
        let shift = highlight_shift(&["a", "b", "c"], 0, 1);
        assert_eq!(shift.len(), 2);
        assert_eq!(shift[0].targets, vec!["a"]);
        assert_eq!(shift[0].to.0["opacity"], "0.2");
        assert_eq!(shift[1].targets, vec!["b"]);
        assert_eq!(shift[1].position, Position::WithPrevious);

        // the blank slot has nothing to light up
        let tail = highlight_shift(&["a", "b", "c"], 2, 3);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].targets, vec!["c"]);
    }

    #[test]
    fn heartbeat_settles_after_the_pulse() {
        let beat = heartbeat();
        assert_eq!(beat.len(), 2);
        assert_eq!(beat[0].to, beat[1].from);
        assert_eq!(beat[1].to.0["transform"], "scale(1)");
    }
}
