use std::collections::BTreeMap;

use log::{error, info, warn};
use wasm_bindgen_futures::spawn_local;
use web_sys::js_sys::Date;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::components::button::Button;
use crate::endpoints::SheetWebhook;
use crate::forms::{self, FieldKind, SubmissionKind, SubmitGate, JOB_FIELDS, JOB_REQUIRED};

const THANKS: &str = "Thank you for your interest! We will review your application and get back to you soon.";

#[derive(Clone, PartialEq)]
enum Status {
    Idle,
    Error(String),
    Success(String),
}

fn field_value(e: &InputEvent) -> Option<String> {
    if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
        return Some(input.value());
    }
    e.target_dyn_into::<HtmlTextAreaElement>().map(|area| area.value())
}

#[function_component(JoinTeamForm)]
pub fn join_team_form() -> Html {
    let fields = use_state(forms::empty_job_application);
    let status = use_state(|| Status::Idle);
    let submitting = use_state(|| false);
    // Lives for the page session only; a reload starts a fresh gate.
    let gate = use_mut_ref(SubmitGate::default);

    let onsubmit = {
        let fields = fields.clone();
        let status = status.clone();
        let submitting = submitting.clone();
        let gate = gate.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitting {
                return;
            }

            let now = Date::now();
            if let Err(e) = gate.borrow().check(now) {
                warn!("Application blocked: {}", e);
                status.set(Status::Error(e.to_string()));
                return;
            }

            let missing = forms::missing_required(&fields, &JOB_REQUIRED);
            if !missing.is_empty() {
                status.set(Status::Error(format!("Please fill in all required fields: {}", missing.join(", "))));
                return;
            }

            submitting.set(true);
            status.set(Status::Idle);

            let snapshot: BTreeMap<String, String> = (*fields).clone();
            let fields = fields.clone();
            let status = status.clone();
            let submitting = submitting.clone();
            let gate = gate.clone();
            spawn_local(async move {
                match SheetWebhook::from_config().submit(&snapshot, SubmissionKind::JobApplication).await {
                    Ok(()) => {
                        info!("Job application sent");
                        gate.borrow_mut().record_success(now);
                        fields.set(forms::empty_job_application());
                        status.set(Status::Success(THANKS.to_string()));
                    }
                    Err(e) => {
                        error!("Error submitting job application: {}", e);
                        status.set(Status::Error(format!(
                            "We're having trouble submitting your application. Error: {}",
                            e
                        )));
                    }
                }
                submitting.set(false);
            });
        })
    };

    let inputs = JOB_FIELDS.iter().map(|field| {
        let name = field.name;
        let value = fields.get(name).cloned().unwrap_or_default();
        let oninput = {
            let fields = fields.clone();
            Callback::from(move |e: InputEvent| {
                if let Some(value) = field_value(&e) {
                    let mut next = (*fields).clone();
                    next.insert(name.to_string(), value);
                    fields.set(next);
                }
            })
        };
        let required = JOB_REQUIRED.contains(&name);
        let control = match field.kind {
            FieldKind::TextArea => html! {
                <textarea name={name} rows="4" {value} {oninput} {required} />
            },
            kind => {
                let kind = match kind {
                    FieldKind::Date => "date",
                    FieldKind::Email => "email",
                    FieldKind::Tel => "tel",
                    _ => "text",
                };
                html! { <input type={kind} name={name} {value} {oninput} {required} /> }
            }
        };
        html! {
            <div class="form-field">
                <label>{ field.label }</label>
                { control }
            </div>
        }
    });

    html! {
        <div class="join-team">
            <div class="join-team-header">
                <h2 class="wordmark">{"CO"}<b>{"G"}</b>{"NISYNC"}</h2>
                <h1>{"Join Our Team"}</h1>
                <p>{"Be part of something extraordinary"}</p>
            </div>
            {
                match &*status {
                    Status::Error(msg) => html! { <div class="form-status error">{ msg }</div> },
                    Status::Success(msg) => html! { <div class="form-status success">{ msg }</div> },
                    Status::Idle => html! {},
                }
            }
            <form class="join-team-form" {onsubmit} novalidate={true}>
                { for inputs }
                <Button kind="submit" title={if *submitting { "Submitting..." } else { "Submit" }} disabled={*submitting} />
            </form>
        </div>
    }
}
