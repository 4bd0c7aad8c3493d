use std::rc::Rc;

use yew::prelude::*;

use crate::animation::controller::{HoverResponse, Mode};
use crate::animation::hooks::{play_now, use_scroll_animation, Binding};
use crate::animation::timeline::{AnimationDescriptor, Easing, Keyframes, Position};
use crate::animation::trigger::{PointerOffset, TriggerRegion};
use crate::animation::web::{self, WebTarget};

/// Below this width tiles are not wrapped in profile links.
const MIN_LINK_WIDTH: f64 = 640.0;

#[derive(Clone, PartialEq)]
pub struct Member {
    pub name: &'static str,
    pub image: &'static str,
    pub position: &'static str,
    pub linkedin: &'static str,
}

const MEMBERS: [Member; 10] = [
    Member {
        name: "Santosh",
        image: "/img/team/1.jpeg",
        position: "Co-Founder & CEO",
        linkedin: "https://www.linkedin.com/in/meflux/",
    },
    Member {
        name: "Samanth",
        image: "/img/team/2.jpeg",
        position: "Co-Founder & CTO",
        linkedin: "https://www.linkedin.com/in/samanth-abbur-9bb54026b/",
    },
    Member {
        name: "Tushar",
        image: "/img/team/3.jpeg",
        position: "Co-Founder & CMO",
        linkedin: "https://www.linkedin.com/in/tushar-satish-8b1bab195/",
    },
    Member {
        name: "Harshith",
        image: "/img/team/4.jpeg",
        position: "Co-Founder & Jt. CTO",
        linkedin: "https://www.linkedin.com/in/harshith-p-s-1a21202a8/",
    },
    Member {
        name: "Dhanyashree",
        image: "/img/team/5.jpeg",
        position: "Developer",
        linkedin: "https://www.linkedin.com/in/dhanyashree-k/",
    },
    Member {
        name: "Sinchana",
        image: "/img/team/6.jpeg",
        position: "Developer",
        linkedin: "https://www.linkedin.com/in/sinchana-navarathna-899935305/",
    },
    Member {
        name: "Oviya",
        image: "/img/team/7.jpeg",
        position: "Design & Finance",
        linkedin: "https://www.linkedin.com/in/duggirala-oviya-95144231a/",
    },
    Member {
        name: "Advaith",
        image: "/img/team/8.jpeg",
        position: "Design",
        linkedin: "https://www.linkedin.com/in/n-sai-advaith-58b9a42a7/",
    },
    Member {
        name: "Indushree",
        image: "/img/team/9.jpeg",
        position: "Developer",
        linkedin: "https://www.linkedin.com/in/indu-shree-3599972a7/",
    },
    Member {
        name: "Ruthu",
        image: "/img/team/10.jpeg",
        position: "Media & Design",
        linkedin: "https://www.linkedin.com/in/tangirala-ruthu-639a28338/",
    },
];

/// The hovered name pops up past full size and settles; the position slides in just behind it.
fn name_pop<T: Clone>(name: T, position: T) -> Vec<AnimationDescriptor<T>> {
    vec![
        AnimationDescriptor::new(
            name.clone(),
            Keyframes::new()
                .set("opacity", "0")
                .set("transform", "translateY(60px) scale(0.95)")
                .set("letterSpacing", "-0.04em"),
            Keyframes::new()
                .set("opacity", "1")
                .set("transform", "translateY(0px) scale(1.04)")
                .set("letterSpacing", "0.01em"),
            0.7,
        )
        .ease(Easing::Power3Out),
        AnimationDescriptor::new(
            name,
            Keyframes::new().set("transform", "translateY(0px) scale(1.04)"),
            Keyframes::new().set("transform", "translateY(0px) scale(1)"),
            0.3,
        )
        .ease(Easing::Power1Out),
        AnimationDescriptor::new(
            position,
            Keyframes::new().set("opacity", "0").set("transform", "translateY(30px)"),
            Keyframes::new().set("opacity", "1").set("transform", "translateY(0px)"),
            0.6,
        )
        .ease(Easing::Power2Out)
        .at(Position::At(0.15)),
    ]
}

#[derive(Properties, PartialEq)]
struct TileProps {
    member: Member,
    dimmed: bool,
    linked: bool,
    on_hover: Callback<Option<Member>>,
}

/// Grows under the pointer and settles back on leave.
#[function_component(Tile)]
fn tile(props: &TileProps) -> Html {
    let node = use_node_ref();

    let lifted: HoverResponse = Rc::new(|_: PointerOffset| {
        Keyframes::new().set("transform", "scale(1.16)").set("boxShadow", "0 8px 32px #ff2d2d44")
    });
    use_scroll_animation(
        Binding::new(TriggerRegion::new(WebTarget::Node(node.clone()), "top bottom", "bottom top"), Mode::Hover(lifted))
            .with(
                AnimationDescriptor::new(
                    WebTarget::Node(node.clone()),
                    Keyframes::new(),
                    Keyframes::new().set("transform", "scale(1)").set("boxShadow", "0 0px 0px #0000"),
                    0.35,
                )
                .ease(Easing::Power2Out),
            ),
    );

    let onmouseenter = {
        let on_hover = props.on_hover.clone();
        let member = props.member.clone();
        Callback::from(move |_: MouseEvent| on_hover.emit(Some(member.clone())))
    };
    let onmouseleave = {
        let on_hover = props.on_hover.clone();
        Callback::from(move |_: MouseEvent| on_hover.emit(None))
    };

    let tile = html! {
        <div ref={node} class={classes!("team-tile", props.dimmed.then(|| "dimmed"))} {onmouseenter} {onmouseleave}>
            <img src={props.member.image} alt={props.member.name} draggable="false" />
        </div>
    };
    if props.linked {
        html! {
            <a
                class="team-link"
                href={props.member.linkedin}
                target="_blank"
                rel="noopener noreferrer"
                aria-label={format!("{} LinkedIn", props.member.name)}
            >
                { tile }
            </a>
        }
    } else {
        tile
    }
}

#[function_component(Team)]
pub fn team() -> Html {
    let section = use_node_ref();
    let heading = use_node_ref();
    let position_ref = use_node_ref();
    let hovered = use_state(|| None::<Member>);
    let linked = web::viewport_width().map_or(false, |w| w >= MIN_LINK_WIDTH);

    use_scroll_animation(
        Binding::new(TriggerRegion::starting_at(WebTarget::Node(section.clone()), "top 70%"), Mode::OnceForward).with(
            AnimationDescriptor::new(
                WebTarget::Node(heading.clone()),
                Keyframes::new()
                    .set("opacity", "0")
                    .set("transform", "translateY(80px) scale(0.92)")
                    .set("letterSpacing", "-0.04em"),
                Keyframes::new()
                    .set("opacity", "1")
                    .set("transform", "translateY(0px) scale(1)")
                    .set("letterSpacing", "0.01em"),
                1.2,
            )
            .ease(Easing::Power4Out),
        ),
    );

    {
        let heading = heading.clone();
        let position_ref = position_ref.clone();
        use_effect_with_deps(
            move |name: &Option<&'static str>| {
                if name.is_some() {
                    play_now(&name_pop(WebTarget::Node(heading), WebTarget::Node(position_ref)));
                }
                || ()
            },
            hovered.as_ref().map(|m| m.name),
        );
    }

    let on_hover = {
        let hovered = hovered.clone();
        Callback::from(move |member: Option<Member>| hovered.set(member))
    };

    let tiles = MEMBERS.iter().map(|member| {
        let dimmed = hovered.as_ref().map_or(false, |h| h.name != member.name);
        html! { <Tile member={member.clone()} {dimmed} {linked} on_hover={on_hover.clone()} /> }
    });

    let (label, position) = match &*hovered {
        Some(member) => (member.name.to_uppercase(), Some(member.position)),
        None => ("THE SQUAD".to_string(), None),
    };

    html! {
        <section ref={section} id="team" class="team">
            <div class="team-grid">{ for tiles }</div>
            <div class="team-caption">
                <h2 ref={heading} class={classes!("hero-heading", hovered.is_some().then(|| "highlighted"))}>{ label }</h2>
                { for position.map(|p| html! { <span ref={position_ref.clone()} class="team-position">{ p }</span> }) }
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::timeline::{Repeat, TimelinePlan};

    #[test]
    fn name_pops_then_settles_while_position_trails() {
        let steps = name_pop("name", "position");
        let plan = TimelinePlan::layout(&steps, Repeat::Once);
        let starts: Vec<(&str, f64)> = plan.steps.iter().map(|s| (s.target, s.start)).collect();
        assert_eq!(starts, vec![("name", 0.0), ("name", 0.7), ("position", 0.15)]);
        assert_eq!(steps[0].to.0["transform"], "translateY(0px) scale(1.04)");
        assert_eq!(steps[1].to.0["transform"], "translateY(0px) scale(1)");
    }

    #[test]
    fn every_member_links_out() {
        assert!(MEMBERS.iter().all(|m| m.linkedin.starts_with("https://www.linkedin.com/in/")));
    }
}
