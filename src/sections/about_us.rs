use yew::prelude::*;

use crate::animation::controller::Mode;
use crate::animation::hooks::{use_scroll_animation, Binding};
use crate::animation::timeline::{AnimationDescriptor, Easing, Keyframes, Position, Stagger};
use crate::animation::trigger::TriggerRegion;
use crate::animation::web::WebTarget;

const PARAGRAPHS: [&str; 3] = [
    "At Cognisync, we're pioneering the future of brain-computer interfaces, transforming how humans interact with technology through groundbreaking neural innovations.",
    "Our journey began with a vision to enhance human cognitive capabilities through AI-powered brain-computer interfaces. Today, we're at the forefront of BCI technology, developing systems that are both powerful and accessible.",
    "From signal processing breakthroughs to revolutionary hardware design, we're committed to pushing the boundaries of what's possible in neural technology, making it more intuitive, efficient, and seamlessly integrated into daily life.",
];

fn rise(px: u32) -> (Keyframes, Keyframes) {
    (
        Keyframes::new().set("opacity", "0").set("transform", format!("translateY({}px)", px)),
        Keyframes::new().set("opacity", "1").set("transform", "translateY(0px)"),
    )
}

#[function_component(AboutUs)]
pub fn about_us() -> Html {
    let section = use_node_ref();
    let heading = use_node_ref();
    let paragraphs = [use_node_ref(), use_node_ref(), use_node_ref()];

    let (heading_from, heading_to) = rise(30);
    let (para_from, para_to) = rise(20);
    use_scroll_animation(
        Binding::new(TriggerRegion::starting_at(WebTarget::Node(section.clone()), "top 70%"), Mode::Toggle)
            .with(
                AnimationDescriptor::new(WebTarget::Node(heading.clone()), heading_from, heading_to, 0.6)
                    .ease(Easing::Power2Out),
            )
            .with(
                AnimationDescriptor::many(
                    paragraphs.iter().map(|p| WebTarget::Node(p.clone())).collect(),
                    para_from,
                    para_to,
                    0.4,
                )
                .ease(Easing::Power1Out)
                .stagger(Stagger::each(0.1))
                .at(Position::Offset(-0.3)),
            ),
    );

    html! {
        <section ref={section} id="about-us" class="about-us">
            <div class="about-us-inner">
                <h2 ref={heading} class="hero-heading">
                    {"Better "}<b>{"s"}</b>{"cience"}<br />{"for better "}<b>{"f"}</b>{"ocus"}
                </h2>
                <div class="about-us-content">
                    { for PARAGRAPHS.iter().zip(paragraphs.iter()).map(|(text, node)| html! {
                        <p ref={node.clone()}>{ *text }</p>
                    }) }
                    <div class="about-us-rule" />
                </div>
            </div>
        </section>
    }
}
