//! Fallback for unknown routes

use leptos::*;
use libris_core::Message;

use crate::state::AppContext;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let locale = ctx.locale;
    let home = move || locale.get().path("");

    view! {
        <div class="page not-found-page">
            <h1 class="not-found-code">"404"</h1>
            <p>{move || locale.get().t(Message::NotFound)}</p>
            <a class="btn btn-primary" href=home>{move || locale.get().t(Message::Back)}</a>
        </div>
    }
}
