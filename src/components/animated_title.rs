use yew::prelude::*;

use crate::animation::controller::Mode;
use crate::animation::hooks::{use_scroll_animation, Binding};
use crate::animation::text::{line_count, segment_class, segment_selectors, segment_words, Segment};
use crate::animation::timeline::{AnimationDescriptor, Easing, Keyframes, Stagger};
use crate::animation::trigger::TriggerRegion;
use crate::animation::web::WebTarget;

#[derive(Properties, PartialEq)]
pub struct AnimatedTitleProps {
    /// Lines separated by `\n`.
    pub title: AttrValue,
    /// Unique per page; word classes are derived from it.
    pub prefix: AttrValue,
    #[prop_or_default]
    pub class: Classes,
    /// Reveal once instead of replaying when scrolled back above.
    #[prop_or_default]
    pub once: bool,
}

fn reveal(prefix: &str, segments: &[Segment]) -> AnimationDescriptor<WebTarget> {
    let targets = segment_selectors(prefix, segments).iter().map(|s| WebTarget::selector(s)).collect();
    AnimationDescriptor::many(
        targets,
        Keyframes::new()
            .set("opacity", "0")
            .set("transform", "translate3d(10px, 51px, -60px) rotateY(60deg) rotateX(-40deg)"),
        Keyframes::new().set("opacity", "1").set("transform", "translate3d(0, 0, 0) rotateY(0deg) rotateX(0deg)"),
        0.8,
    )
    .ease(Easing::Power2InOut)
    .stagger(Stagger::each(0.02))
}

#[function_component(AnimatedTitle)]
pub fn animated_title(props: &AnimatedTitleProps) -> Html {
    let container = use_node_ref();
    let segments = segment_words(&props.title);
    let mode = if props.once { Mode::OnceForward } else { Mode::Toggle };

    use_scroll_animation(
        Binding::new(TriggerRegion::new(WebTarget::Node(container.clone()), "100 bottom", "center bottom"), mode)
            .with(reveal(&props.prefix, &segments)),
    );

    let lines = (0..line_count(&segments)).map(|line| {
        html! {
            <div class="animated-title-line">
                { for segments.iter().filter(|s| s.line == line).map(|s| html! {
                    <span class={classes!("animated-word", segment_class(&props.prefix, s))}>{ s.text.clone() }</span>
                }) }
            </div>
        }
    });

    html! {
        <div ref={container} class={classes!("animated-title", props.class.clone())}>
            { for lines }
        </div>
    }
}
