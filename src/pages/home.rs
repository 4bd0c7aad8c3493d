use yew::prelude::*;

use crate::sections::{
    about::About, about_us::AboutUs, footer::Footer, hero::Hero, promise::Promise, story::Story, team::Team,
};

#[function_component(Home)]
pub fn home() -> Html {
    html! {
        <main class="home">
            <Hero />
            <About />
            <Promise />
            <Team />
            <Story />
            <AboutUs />
            <Footer />
        </main>
    }
}
