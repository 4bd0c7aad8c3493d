use yew::prelude::*;
use yew_router::prelude::*;

use crate::animation::controller::Mode;
use crate::animation::hooks::{use_scroll_animation, Binding};
use crate::animation::timeline::{AnimationDescriptor, Easing, Keyframes};
use crate::animation::trigger::TriggerRegion;
use crate::animation::web::WebTarget;
use crate::components::button::Button;
use crate::components::loading_screen::LoadingScreen;
use crate::Route;

const FULL_FRAME: &str = "polygon(0% 0%, 100% 0%, 100% 100%, 0% 100%)";
const CUT_FRAME: &str = "polygon(14% 0, 72% 0, 88% 90%, 0 95%)";

#[function_component(Hero)]
pub fn hero() -> Html {
    let frame = use_node_ref();
    let navigator = use_navigator();
    let loading = use_state(|| true);
    let video_ready = use_state(|| false);

    // The video frame folds into a cut polygon as it scrolls past the centre.
    use_scroll_animation(
        Binding::new(
            TriggerRegion::new(WebTarget::Node(frame.clone()), "center center", "bottom center"),
            Mode::Scrub,
        )
        .with(
            AnimationDescriptor::new(
                WebTarget::Node(frame.clone()),
                Keyframes::new().set("clipPath", FULL_FRAME).set("borderRadius", "0% 0% 0% 0%"),
                Keyframes::new().set("clipPath", CUT_FRAME).set("borderRadius", "0% 0% 40% 10%"),
                1.0,
            )
            .ease(Easing::Power1InOut),
        ),
    );

    let to_products = Callback::from(move |_: MouseEvent| {
        if let Some(navigator) = &navigator {
            navigator.push(&Route::Products);
        }
    });

    let on_loaded = {
        let video_ready = video_ready.clone();
        Callback::from(move |_: Event| video_ready.set(true))
    };
    let on_loading_complete = {
        let loading = loading.clone();
        Callback::from(move |_: ()| loading.set(false))
    };

    html! {
        <div class="hero">
            if *loading {
                <LoadingScreen ready={*video_ready} on_complete={on_loading_complete} />
            }
            <div ref={frame} id="video-frame" class="hero-frame">
                <video
                    src="videos/hero.mp4"
                    autoplay={true}
                    loop={true}
                    muted={true}
                    class="hero-video"
                    onloadeddata={on_loaded}
                />
                <h1 class="hero-heading hero-heading-corner">{"re"}<b>{"A"}</b>{"lity."}</h1>
                <div class="hero-copy">
                    <h1 class="hero-heading">{"re"}<b>{"w"}</b>{"iring"}</h1>
                    <p class="hero-tagline">
                        {"If you can't assess it"}<br />{"you can't improve it."}
                    </p>
                    <Button id="be-the-future" title="Be the future." class="hero-cta" onclick={to_products} />
                </div>
            </div>
            <h1 class="hero-heading hero-heading-corner is-outside">{"re"}<b>{"A"}</b>{"lity."}</h1>
        </div>
    }
}
