//! Toast notifications

use leptos::*;

use crate::state::AppContext;

/// Renders the context's toast queue
#[component]
pub fn ToastHost() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let toasts = ctx.toasts;
    let ctx = store_value(ctx);

    view! {
        <div class="toast-host" role="region" aria-live="polite">
            <For
                each=move || toasts.get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div class=toast.kind.class() role="status">
                            <span class="toast-message">{toast.message}</span>
                            <button
                                class="toast-close"
                                aria-label="Dismiss"
                                on:click=move |_| ctx.with_value(|c| c.dismiss(id))
                            >
                                "×"
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
