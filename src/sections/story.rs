use std::rc::Rc;

use yew::prelude::*;

use crate::animation::controller::{HoverResponse, Mode};
use crate::animation::hooks::{use_scroll_animation, Binding};
use crate::animation::timeline::{AnimationDescriptor, Easing, Keyframes, Stagger};
use crate::animation::trigger::{PointerOffset, TriggerRegion};
use crate::animation::web::WebTarget;

/// Degrees of tilt at the card edge.
const TILT: f64 = 8.0;
const LEVEL: &str = "perspective(1000px) rotateX(0deg) rotateY(0deg)";

fn tilt(offset: PointerOffset) -> Keyframes {
    Keyframes::new().set(
        "transform",
        format!("perspective(1000px) rotateX({:.2}deg) rotateY({:.2}deg)", -TILT * offset.y, TILT * offset.x),
    )
}

#[function_component(Story)]
pub fn story() -> Html {
    let section = use_node_ref();
    let card = use_node_ref();
    let tilt_layer = use_node_ref();
    let image = use_node_ref();
    let text = use_node_ref();
    let lines = [use_node_ref(), use_node_ref(), use_node_ref()];

    use_scroll_animation(
        Binding::new(TriggerRegion::new(WebTarget::Node(section.clone()), "top center", "bottom center"), Mode::Toggle)
            .with(
                AnimationDescriptor::new(
                    WebTarget::Node(card.clone()),
                    Keyframes::new().set("opacity", "0").set("transform", "translateY(100px)"),
                    Keyframes::new().set("opacity", "1").set("transform", "translateY(0px)"),
                    1.2,
                )
                .ease(Easing::Power3Out),
            ),
    );

    use_scroll_animation(
        Binding::new(TriggerRegion::new(WebTarget::Node(section.clone()), "top bottom", "bottom top"), Mode::Scrub).with(
            AnimationDescriptor::new(
                WebTarget::Node(image.clone()),
                Keyframes::new().set("transform", "translateY(-10%)"),
                Keyframes::new().set("transform", "translateY(10%)"),
                1.0,
            ),
        ),
    );

    use_scroll_animation(
        Binding::new(TriggerRegion::starting_at(WebTarget::Node(text.clone()), "top bottom-=100"), Mode::Toggle).with(
            AnimationDescriptor::many(
                lines.iter().map(|line| WebTarget::Node(line.clone())).collect(),
                Keyframes::new().set("opacity", "0").set("transform", "translateY(30px)"),
                Keyframes::new().set("opacity", "1").set("transform", "translateY(0px)"),
                0.8,
            )
            .ease(Easing::Power2Out)
            .stagger(Stagger::each(0.15)),
        ),
    );

    // Tilt lives on an inner layer so it never fights the entrance transform.
    let response: HoverResponse = Rc::new(tilt);
    use_scroll_animation(
        Binding::new(TriggerRegion::new(WebTarget::Node(card.clone()), "top bottom", "bottom top"), Mode::Hover(response))
            .with(
                AnimationDescriptor::new(
                    WebTarget::Node(tilt_layer.clone()),
                    Keyframes::new(),
                    Keyframes::new().set("transform", LEVEL),
                    0.4,
                )
                .ease(Easing::Power2Out),
            ),
    );

    html! {
        <section ref={section} id="story" class="story">
            <div class="story-frame">
                <div ref={card} class="story-card">
                    <div ref={tilt_layer} class="story-tilt">
                        <div ref={image} class="story-image">
                            <img src="/img/mentor.jpg" alt="Mentor portrait" loading="eager" />
                        </div>
                        <div class="story-shade" />
                        <div ref={text} class="story-text">
                            <h2 ref={lines[0].clone()} class="hero-heading">
                                {"Mr. Pa"}<b>{"v"}</b>{"an M"}<br />{"S"}<b>{"r"}</b>{"ivatsa"}
                            </h2>
                            <p ref={lines[1].clone()} class="story-role">
                                {"Psychologist & Psychoanalyst,"}<br />
                                {"Founder Chakshu Foundation,"}<br />
                                {"Mentor & MD, Cognisync"}
                            </p>
                            <div ref={lines[2].clone()} class="story-quote">
                                <p>{"\"Anyatha sharanam nasthi, tvameva sharnam mama, tasmath karunya bhavena raksha raksha janardhana\""}</p>
                            </div>
                        </div>
                    </div>
                </div>
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilt_leans_towards_the_pointer() {
        let frames = tilt(PointerOffset { x: 0.5, y: -0.25 });
        assert_eq!(frames.0["transform"], "perspective(1000px) rotateX(2.00deg) rotateY(4.00deg)");
    }
}
