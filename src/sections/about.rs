use yew::prelude::*;

use crate::animation::controller::Mode;
use crate::animation::hooks::{use_scroll_animation, Binding};
use crate::animation::timeline::{AnimationDescriptor, Keyframes};
use crate::animation::trigger::TriggerRegion;
use crate::animation::web::{self, WebTarget};
use crate::components::animated_title::AnimatedTitle;

/// Below this width the mask stays full-bleed.
const MIN_MASK_WIDTH: f64 = 640.0;

#[function_component(About)]
pub fn about() -> Html {
    let clip = use_node_ref();
    let mask = use_node_ref();
    let wide = web::viewport_width().map_or(false, |w| w >= MIN_MASK_WIDTH);

    use_scroll_animation(
        Binding::new(TriggerRegion::new(WebTarget::Node(clip.clone()), "center center", "+=800 center"), Mode::Scrub)
            .with(AnimationDescriptor::new(
                WebTarget::Node(mask.clone()),
                Keyframes::new().set("width", "25rem").set("height", "60vh").set("borderRadius", "2rem"),
                Keyframes::new().set("width", "100vw").set("height", "100vh").set("borderRadius", "0"),
                1.0,
            ))
            .enabled_if(wide),
    );

    html! {
        <div id="about" class="about">
            <div class="about-intro">
                <p class="eyebrow">{"Welcome to Cognisync"}</p>
                <AnimatedTitle prefix="about" title={"The future is,\nNeural"} class="about-title" />
                <div class="about-subtext">
                    <p class="lead">{"The Future starts here, with you"}</p>
                    <p class="muted">
                        {"At Cognisync, we're redefining brain-computer interaction to elevate human cognition and unlock peak mental performance."}
                    </p>
                </div>
            </div>
            <div ref={clip} id="clip" class="about-clip">
                <div ref={mask} class="mask-clip-path about-image">
                    <img src="img/about.png" alt="Background" />
                </div>
            </div>
        </div>
    }
}
