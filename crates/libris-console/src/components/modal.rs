//! Modal dialog and delete confirmation

use leptos::*;
use libris_core::Message;

use crate::state::AppContext;

/// Dialog over a backdrop; clicking the backdrop or pressing the close button
/// calls `on_close`
#[component]
pub fn Modal(
    #[prop(into)] open: Signal<bool>,
    #[prop(into)] title: Signal<String>,
    on_close: Callback<()>,
    #[prop(optional)] wide: bool,
    children: ChildrenFn,
) -> impl IntoView {
    let class = if wide { "modal modal-wide" } else { "modal" };
    let children = store_value(children);

    view! {
        <Show when=move || open.get()>
            <div class="modal-backdrop" on:click=move |_| on_close.call(())></div>
            <div class=class role="dialog" aria-modal="true" aria-label=move || title.get()>
                <div class="modal-header">
                    <h2 class="modal-title">{move || title.get()}</h2>
                    <button class="btn btn-icon" aria-label="Close" on:click=move |_| on_close.call(())>
                        "×"
                    </button>
                </div>
                <div class="modal-body">{children.with_value(|c| c())}</div>
            </div>
        </Show>
    }
}

/// Yes/no confirmation, used before deletes
#[component]
pub fn ConfirmDialog(
    #[prop(into)] open: Signal<bool>,
    #[prop(optional, into)] message: Option<Signal<String>>,
    on_confirm: Callback<()>,
    on_cancel: Callback<()>,
    #[prop(optional, into)] busy: Option<Signal<bool>>,
) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let text = {
        let ctx = ctx.clone();
        Signal::derive(move || match message {
            Some(m) => m.get(),
            None => ctx.t(Message::ConfirmDelete).to_string(),
        })
    };
    let busy = move || busy.map(|b| b.get()).unwrap_or(false);
    let title = {
        let ctx = ctx.clone();
        Signal::derive(move || ctx.t(Message::Delete).to_string())
    };
    let ctx = store_value(ctx);

    view! {
        <Modal open=open title=title on_close=on_cancel>
            <p class="confirm-text">{move || text.get()}</p>
            <div class="modal-actions">
                <button class="btn btn-secondary" on:click=move |_| on_cancel.call(())>
                    {move || ctx.with_value(|c| c.t(Message::Cancel))}
                </button>
                <button class="btn btn-danger" disabled=busy on:click=move |_| on_confirm.call(())>
                    {move || ctx.with_value(|c| c.t(Message::Delete))}
                </button>
            </div>
        </Modal>
    }
}
