use yew::prelude::*;
use yew_router::prelude::*;

use crate::animation::controller::Mode;
use crate::animation::hooks::{use_scroll_animation, Binding};
use crate::animation::timeline::{AnimationDescriptor, Easing, Keyframes, Position};
use crate::animation::trigger::TriggerRegion;
use crate::animation::web::WebTarget;
use crate::components::animated_title::AnimatedTitle;
use crate::components::newsletter_form::NewsletterForm;
use crate::Route;

fn rise(target: &NodeRef, px: u32, at: f64) -> AnimationDescriptor<WebTarget> {
    AnimationDescriptor::new(
        WebTarget::Node(target.clone()),
        Keyframes::new().set("opacity", "0").set("transform", format!("translateY({}px)", px)),
        Keyframes::new().set("opacity", "1").set("transform", "translateY(0px)"),
        1.0,
    )
    .ease(Easing::Power3Out)
    .at(Position::At(at))
}

#[function_component(Products)]
pub fn products() -> Html {
    let container = use_node_ref();
    let image = use_node_ref();
    let newsletter = use_node_ref();

    // Already in view on arrival, so this fires during the initial measurement.
    use_scroll_animation(
        Binding::new(TriggerRegion::starting_at(WebTarget::Node(container.clone()), "top bottom"), Mode::OnceForward)
            .with(
                AnimationDescriptor::new(
                    WebTarget::Node(container.clone()),
                    Keyframes::new().set("opacity", "0"),
                    Keyframes::new().set("opacity", "1"),
                    0.5,
                )
                .ease(Easing::Power2InOut),
            )
            .with(rise(&image, 100, 0.3))
            .with(rise(&newsletter, 50, 0.6)),
    );

    html! {
        <div ref={container} class="products">
            <Link<Route> to={Route::Home} classes="products-close">{"✕"}</Link<Route>>
            <div class="products-content">
                <div ref={image} class="products-image">
                    <img src="/img/soon.png" alt="Coming Soon" />
                </div>
                <div ref={newsletter} class="newsletter-section">
                    <p class="eyebrow">{"Stay in the loop"}</p>
                    <AnimatedTitle prefix="products" title="Be the first to know" once={true} />
                    <NewsletterForm />
                </div>
            </div>
        </div>
    }
}
