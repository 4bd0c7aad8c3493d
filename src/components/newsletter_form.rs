use futures::future::{abortable, AbortHandle};
use log::{error, info};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_hooks::use_unmount;

use crate::animation::hooks::play_now;
use crate::animation::timeline::{AnimationDescriptor, Easing, Keyframes};
use crate::animation::web::WebTarget;
use crate::components::button::Button;
use crate::config;
use crate::endpoints::{DocumentLookup, EmailDelivery, TimerBackoff};
use crate::forms;
use crate::validation::{self, InvalidReason, RemoteValidator, ValidationResult, DEFAULT_COLLECTION};

const SUCCESS: &str = "Thanks for subscribing! We'll keep you updated.";
const DELIVERY_FAILED: &str = "We couldn't add your email right now. Please try again later.";

#[derive(Clone, PartialEq)]
enum Notice {
    Error(String),
    /// Shown while the submission carries on.
    Info(String),
    Success(String),
}

#[derive(Clone, Copy, PartialEq)]
enum InputState {
    Initial,
    Valid,
    Invalid,
}

fn slide(node: &NodeRef, from: &str, to: &str) -> AnimationDescriptor<WebTarget> {
    AnimationDescriptor::new(
        WebTarget::Node(node.clone()),
        Keyframes::new().set("transform", format!("translateX({})", from)),
        Keyframes::new().set("transform", format!("translateX({})", to)),
        0.1,
    )
    .ease(Easing::Power2Out)
}

fn shake(node: &NodeRef) {
    let path = ["0px", "-10px", "10px", "-10px", "10px", "0px"];
    let steps: Vec<_> = path.windows(2).map(|w| slide(node, w[0], w[1])).collect();
    play_now(&steps);
}

fn lift_and_return(node: &NodeRef) {
    let target = WebTarget::Node(node.clone());
    let shown = Keyframes::new().set("opacity", "1").set("transform", "translateY(0px)");
    let lifted = Keyframes::new().set("opacity", "0").set("transform", "translateY(-20px)");
    play_now(&[
        AnimationDescriptor::new(target.clone(), shown.clone(), lifted.clone(), 0.3),
        AnimationDescriptor::new(target, lifted, shown, 0.3),
    ]);
}

fn local_timestamp() -> String {
    chrono::Local::now().format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

#[function_component(NewsletterForm)]
pub fn newsletter_form() -> Html {
    let email = use_state(String::new);
    let notice = use_state(|| None::<Notice>);
    let input_state = use_state(|| InputState::Initial);
    let submitting = use_state(|| false);
    let input_ref = use_node_ref();
    let pending = use_mut_ref(|| None::<AbortHandle>);

    {
        let pending = pending.clone();
        use_unmount(move || {
            if let Some(handle) = pending.borrow_mut().take() {
                handle.abort();
            }
        });
    }

    let oninput = {
        let email = email.clone();
        let notice = notice.clone();
        let input_state = input_state.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let value = input.value();
            input_state.set(if validation::validate_email(&value) {
                InputState::Valid
            } else if value.is_empty() {
                InputState::Initial
            } else {
                InputState::Invalid
            });
            notice.set(None);
            email.set(value);
        })
    };

    let onsubmit = {
        let email = email.clone();
        let notice = notice.clone();
        let input_state = input_state.clone();
        let submitting = submitting.clone();
        let input_ref = input_ref.clone();
        let pending = pending.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitting {
                return;
            }

            let value = (*email).clone();
            let local = if value.trim().is_empty() {
                Some(ValidationResult::Invalid(InvalidReason::Empty))
            } else if !validation::validate_email(&value) {
                Some(ValidationResult::Invalid(InvalidReason::Format))
            } else {
                None
            };
            if let Some(result) = local {
                notice.set(result.message().map(|m| Notice::Error(m.to_string())));
                input_state.set(InputState::Invalid);
                shake(&input_ref);
                return;
            }

            submitting.set(true);
            notice.set(None);

            let email = email.clone();
            let notice = notice.clone();
            let input_state = input_state.clone();
            let submitting = submitting.clone();
            let input_ref = input_ref.clone();
            let task = async move {
                let validator = RemoteValidator::new(DocumentLookup::from_config(), TimerBackoff);
                let result = validator.check_remote_exists(&value, DEFAULT_COLLECTION).await;
                if !result.allows_submission() {
                    notice.set(result.message().map(|m| Notice::Error(m.to_string())));
                    input_state.set(InputState::Invalid);
                    submitting.set(false);
                    shake(&input_ref);
                    return;
                }
                if let Some(message) = result.message() {
                    info!("Existence check inconclusive: {:?}", result);
                    notice.set(Some(Notice::Info(message.to_string())));
                }

                let address = validation::normalize_email(&value);
                let settings = config::get_email_settings();
                let params = forms::newsletter_params(&address, settings.notify_address, &local_timestamp());
                match EmailDelivery::from_config().send(&params).await {
                    Ok(()) => {
                        info!("Newsletter signup delivered");
                        lift_and_return(&input_ref);
                        email.set(String::new());
                        input_state.set(InputState::Valid);
                        notice.set(Some(Notice::Success(SUCCESS.to_string())));
                    }
                    Err(e) => {
                        error!("Error submitting newsletter: {}", e);
                        input_state.set(InputState::Invalid);
                        notice.set(Some(Notice::Error(DELIVERY_FAILED.to_string())));
                        shake(&input_ref);
                    }
                }
                submitting.set(false);
            };

            let (task, handle) = abortable(task);
            if let Some(previous) = pending.borrow_mut().replace(handle) {
                previous.abort();
            }
            spawn_local(async move {
                let _ = task.await;
            });
        })
    };

    let input_class = match *input_state {
        InputState::Initial => "newsletter-input",
        InputState::Valid => "newsletter-input is-valid",
        InputState::Invalid => "newsletter-input is-invalid",
    };

    html! {
        <form class="newsletter-form" onsubmit={onsubmit} novalidate={true}>
            <input
                ref={input_ref}
                type="email"
                class={input_class}
                placeholder="Enter your email"
                value={(*email).clone()}
                oninput={oninput}
                disabled={*submitting}
            />
            {
                match &*notice {
                    Some(Notice::Error(msg)) => html! { <p class="newsletter-notice error">{ msg }</p> },
                    Some(Notice::Info(msg)) => html! { <p class="newsletter-notice info">{ msg }</p> },
                    Some(Notice::Success(msg)) => html! { <p class="newsletter-notice success">{ msg }</p> },
                    None => html! {},
                }
            }
            <Button
                kind="submit"
                title={if *submitting { "Subscribing..." } else { "Notify Me" }}
                class="newsletter-submit"
                disabled={*submitting}
            />
        </form>
    }
}
