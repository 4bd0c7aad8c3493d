use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::join_team_form::JoinTeamForm;
use crate::Route;

#[function_component(JoinTeam)]
pub fn join_team() -> Html {
    html! {
        <div class="join-team-page">
            <Link<Route> to={Route::Home} classes="join-team-close">{"✕"}</Link<Route>>
            <JoinTeamForm />
        </div>
    }
}
