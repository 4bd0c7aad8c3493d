use gloo_timers::callback::Timeout;
use yew::prelude::*;

use crate::animation::controller::Mode;
use crate::animation::hooks::{play_now, use_scroll_animation, Binding};
use crate::animation::timeline::{AnimationDescriptor, Easing, Keyframes};
use crate::animation::trigger::TriggerRegion;
use crate::animation::web::WebTarget;

const FADE_OUT_MS: u32 = 500;

#[derive(Properties, PartialEq)]
pub struct LoadingScreenProps {
    /// Flip to true once the page content is ready; the overlay then fades away.
    pub ready: bool,
    pub on_complete: Callback<()>,
}

fn logo_entrance<T>(logo: T) -> AnimationDescriptor<T> {
    AnimationDescriptor::new(
        logo,
        Keyframes::new().set("opacity", "0").set("transform", "scale(0.9) rotate(-10deg)"),
        Keyframes::new().set("opacity", "1").set("transform", "scale(1) rotate(0deg)"),
        0.8,
    )
    .ease(Easing::Power2Out)
}

fn breathing<T>(logo: T) -> AnimationDescriptor<T> {
    AnimationDescriptor::new(
        logo,
        Keyframes::new().set("transform", "scale(1)"),
        Keyframes::new().set("transform", "scale(0.95)"),
        0.8,
    )
    .ease(Easing::Power1InOut)
}

fn fade_out<T>(overlay: T) -> AnimationDescriptor<T> {
    AnimationDescriptor::new(overlay, Keyframes::new(), Keyframes::new().set("opacity", "0"), FADE_OUT_MS as f64 / 1000.0)
}

/// Full-screen overlay with a breathing logo, shown until `ready`.
#[function_component(LoadingScreen)]
pub fn loading_screen(props: &LoadingScreenProps) -> Html {
    let overlay = use_node_ref();
    let badge = use_node_ref();
    let logo = use_node_ref();

    // The overlay is fixed, so its window always contains the viewport.
    use_scroll_animation(
        Binding::new(TriggerRegion::new(WebTarget::Node(overlay.clone()), "top bottom", "bottom top"), Mode::PersistentLoop)
            .with(breathing(WebTarget::Node(logo.clone()))),
    );

    {
        let badge = badge.clone();
        use_effect_with_deps(
            move |_| {
                play_now(&[logo_entrance(WebTarget::Node(badge))]);
                || ()
            },
            (),
        );
    }

    {
        let overlay = overlay.clone();
        let on_complete = props.on_complete.clone();
        use_effect_with_deps(
            move |ready| {
                let pending = ready.then(|| {
                    play_now(&[fade_out(WebTarget::Node(overlay))]);
                    Timeout::new(FADE_OUT_MS, move || on_complete.emit(()))
                });
                move || drop(pending)
            },
            props.ready,
        );
    }

    html! {
        <div ref={overlay} class="loading-screen">
            <div ref={badge} class="loading-badge">
                <img ref={logo} src="/img/logo1.png" alt="Cognisync Logo" class="loading-logo" />
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logo_arrives_upright_then_breathes_from_rest() {
        let entrance = logo_entrance("logo");
        let breath = breathing("logo");
        assert_eq!(entrance.to.0["transform"], "scale(1) rotate(0deg)");
        assert_eq!(breath.from.0["transform"], "scale(1)");
        assert!((fade_out("overlay").duration - 0.5).abs() < 1e-9);
    }
}
