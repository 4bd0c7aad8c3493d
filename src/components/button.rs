use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ButtonProps {
    pub title: AttrValue,
    #[prop_or_default]
    pub id: Option<AttrValue>,
    #[prop_or_default]
    pub class: Classes,
    #[prop_or_default]
    pub onclick: Callback<MouseEvent>,
    #[prop_or_default]
    pub disabled: bool,
    #[prop_or(AttrValue::Static("button"))]
    pub kind: AttrValue,
    #[prop_or_default]
    pub children: Children,
}

/// Pill button whose label rolls up on hover (two stacked copies of the title).
#[function_component(Button)]
pub fn button(props: &ButtonProps) -> Html {
    let state = if props.disabled { "is-disabled" } else { "is-enabled" };
    html! {
        <button
            id={props.id.clone()}
            type={props.kind.clone()}
            class={classes!("roll-button", state, props.class.clone())}
            onclick={props.onclick.clone()}
            disabled={props.disabled}
        >
            { for props.children.iter() }
            <span class="roll-button-label">
                <div class="roll-button-front">{ props.title.clone() }</div>
                <div class="roll-button-back">{ props.title.clone() }</div>
            </span>
        </button>
    }
}
