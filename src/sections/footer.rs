use std::rc::Rc;

use yew::prelude::*;
use yew_router::prelude::*;

use crate::animation::controller::{HoverResponse, Mode};
use crate::animation::hooks::{use_scroll_animation, Binding};
use crate::animation::timeline::{AnimationDescriptor, Easing, Keyframes};
use crate::animation::trigger::{PointerOffset, TriggerRegion};
use crate::animation::web::WebTarget;
use crate::components::button::Button;
use crate::Route;

const SOCIALS: [(&str, &str); 3] = [
    ("LinkedIn", "https://www.linkedin.com/company/cognisync-tech"),
    ("Twitter", "https://x.com/cognisynctech"),
    ("Instagram", "https://www.instagram.com/cognisync.tech"),
];

/// The wordmark swings and stretches towards the side the pointer is on.
fn swing(offset: PointerOffset) -> Keyframes {
    // -1 at the left edge, 1 at the right
    let pull = offset.x * 2.0;
    Keyframes::new().set(
        "transform",
        format!(
            "perspective(1000px) translateX({:.1}px) rotateY({:.1}deg) scaleX({:.3})",
            pull * 50.0,
            pull * 15.0,
            1.0 + pull.abs() * 0.2
        ),
    )
}

#[function_component(Footer)]
pub fn footer() -> Html {
    let strip = use_node_ref();
    let wordmark = use_node_ref();
    let navigator = use_navigator();

    let response: HoverResponse = Rc::new(swing);
    use_scroll_animation(
        Binding::new(TriggerRegion::new(WebTarget::Node(strip.clone()), "top bottom", "bottom top"), Mode::Hover(response))
            .with(
                AnimationDescriptor::new(
                    WebTarget::Node(wordmark.clone()),
                    Keyframes::new(),
                    Keyframes::new().set("transform", "perspective(1000px) translateX(0px) rotateY(0deg) scaleX(1)"),
                    0.5,
                )
                .ease(Easing::Power3Out),
            ),
    );

    let to_join = Callback::from(move |_: MouseEvent| {
        if let Some(navigator) = &navigator {
            navigator.push(&Route::JoinTeam);
        }
    });

    html! {
        <footer class="footer">
            <div ref={strip} class="footer-strip">
                <h2 ref={wordmark} class="wordmark">{"CO"}<b>{"G"}</b>{"NISYNC"}</h2>
            </div>
            <div class="footer-body">
                <Button title="Join Team" class="footer-join" onclick={to_join} />
                <div class="footer-socials">
                    { for SOCIALS.iter().map(|(label, href)| html! {
                        <a href={*href} target="_blank" rel="noopener noreferrer" aria-label={*label}>{ *label }</a>
                    }) }
                </div>
                <p class="footer-contact">{"contact@cognisync.tech"}</p>
                <div class="footer-legal">
                    <span>{ format!("©Cogniwire LLP {}", chrono::Utc::now().format("%Y")) }</span>
                    <span>{"•"}</span>
                    <a href="#privacy-policy">{"Privacy Policy"}</a>
                </div>
            </div>
        </footer>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swing_is_strongest_at_the_edges() {
        let right = swing(PointerOffset { x: 0.5, y: 0.0 });
        assert_eq!(
            right.0["transform"],
            "perspective(1000px) translateX(50.0px) rotateY(15.0deg) scaleX(1.200)"
        );
        let left = swing(PointerOffset { x: -0.5, y: 0.0 });
        assert_eq!(
            left.0["transform"],
            "perspective(1000px) translateX(-50.0px) rotateY(-15.0deg) scaleX(1.200)"
        );
    }
}
