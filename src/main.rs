use yew::prelude::*;
use yew_router::prelude::*;
use log::{info, warn, Level};
use web_sys::MouseEvent;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

mod config;
mod endpoints;
mod forms;
mod validation;

mod animation {
    pub mod trigger;
    pub mod timeline;
    pub mod stage;
    pub mod controller;
    pub mod web;
    pub mod hooks;
    pub mod text;
    #[cfg(test)]
    pub mod testing;
}
mod components {
    pub mod button;
    pub mod animated_title;
    pub mod newsletter_form;
    pub mod join_team_form;
    pub mod loading_screen;
}
mod sections {
    pub mod hero;
    pub mod about;
    pub mod promise;
    pub mod team;
    pub mod story;
    pub mod about_us;
    pub mod footer;
}
mod pages {
    pub mod home;
    pub mod products;
    pub mod join_team;
}

use pages::{
    home::Home,
    products::Products,
    join_team::JoinTeam,
};

/// Page offset past which the nav bar turns solid.
const NAV_SOLID_AFTER: f64 = 600.0;

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/products")]
    Products,
    #[at("/join")]
    JoinTeam,
    #[not_found]
    #[at("/404")]
    NotFound,
}


fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => {
            info!("Rendering Home page");
            html! { <Home /> }
        },
        Route::Products => {
            info!("Rendering Products page");
            html! { <Products /> }
        },
        Route::JoinTeam => {
            info!("Rendering Join Team page");
            html! { <JoinTeam /> }
        },
        Route::NotFound => {
            html! { <Redirect<Route> to={Route::Home} /> }
        },
    }
}


#[function_component(Nav)]
pub fn nav() -> Html {
    let menu_open = use_state(|| false);
    let is_scrolled = use_state(|| false);

    {
        let is_scrolled = is_scrolled.clone();
        use_effect_with_deps(move |_| {
            let window = web_sys::window();
            let scroll_callback = Closure::<dyn FnMut()>::new(move || {
                let offset = web_sys::window()
                    .and_then(|w| w.scroll_y().ok())
                    .unwrap_or(0.0);
                is_scrolled.set(offset > NAV_SOLID_AFTER);
            });

            if let Some(window) = &window {
                if let Err(e) = window.add_event_listener_with_callback("scroll", scroll_callback.as_ref().unchecked_ref()) {
                    warn!("Nav scroll listener not attached: {:?}", e);
                }
            }

            move || {
                if let Some(window) = window {
                    let _ = window.remove_event_listener_with_callback("scroll", scroll_callback.as_ref().unchecked_ref());
                }
            }
        }, ());
    }

    let toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            menu_open.set(!*menu_open);
        })
    };

    let close_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| {
            menu_open.set(false);
        })
    };

    let menu_class = if *menu_open {
        "nav-right mobile-menu-open"
    } else {
        "nav-right"
    };

    html! {
        <nav class={classes!("top-nav", (*is_scrolled).then(|| "scrolled"))}>
            <div class="nav-content">
                <Link<Route> to={Route::Home} classes="nav-logo">
                    {"CO"}<b>{"G"}</b>{"NISYNC"}
                </Link<Route>>

                <button class="burger-menu" onclick={toggle_menu}>
                    <span></span>
                    <span></span>
                    <span></span>
                </button>
                <div class={menu_class}>
                    <div onclick={close_menu.clone()}>
                        <Link<Route> to={Route::Products} classes="nav-link">
                            {"Products"}
                        </Link<Route>>
                    </div>
                    <div onclick={close_menu.clone()}>
                        <Link<Route> to={Route::JoinTeam} classes="nav-link">
                            {"Join Team"}
                        </Link<Route>>
                    </div>
                </div>
            </div>
        </nav>
    }
}


#[function_component]
fn App() -> Html {
    html! {
        <BrowserRouter>
            <Nav />
            <Switch<Route> render={switch} />
        </BrowserRouter>
    }
}


fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(Level::Info).expect("error initializing log");

    let motion = animation::web::init();
    info!("Starting brochure site (motion: {:?})", motion);
    yew::Renderer::<App>::new().render();
}
