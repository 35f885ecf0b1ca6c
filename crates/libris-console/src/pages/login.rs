//! Sign-in screen

use std::sync::Arc;

use leptos::*;
use leptos_router::{use_navigate, NavigateOptions};
use libris_client::models::LoginResponse;
use libris_client::ApiError;
use libris_core::form::{Field, FieldKind, FormSchema};
use libris_core::{Area, Locale, Message, Role};
use tracing::warn;

use super::{international_phone, PHONE_MASK};
use crate::components::{AutoForm, Submission};
use crate::state::AppContext;

fn login_schema(locale: Locale) -> FormSchema {
    FormSchema::new(
        "login",
        vec![
            Field::new("phone", locale.t(Message::Phone), FieldKind::Tel)
                .required()
                .mask(PHONE_MASK)
                .placeholder("(90) 123-45-67"),
            Field::new("password", locale.t(Message::Password), FieldKind::Password).required(),
        ],
    )
}

/// First screen after sign-in
pub(crate) fn landing(role: Role) -> Area {
    if role.is_staff() {
        Area::Dashboard
    } else {
        Area::Catalog
    }
}

/// Message shown under the form for a failed sign-in
fn failure_text(error: &ApiError, locale: Locale) -> String {
    match error {
        ApiError::Unauthorized | ApiError::Http { status: 400 | 403 | 404, .. } => {
            locale.t(Message::InvalidCredentials).to_string()
        }
        other => other.to_string(),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let navigate = store_value(use_navigate());
    let locale = ctx.locale;
    let failure = create_rw_signal(None::<String>);

    let go_home = move |role: Role| {
        let path = locale.get_untracked().path(landing(role).path());
        navigate.with_value(|nav| {
            nav(
                &path,
                NavigateOptions {
                    replace: true,
                    ..Default::default()
                },
            )
        });
    };

    // Already signed in
    let session = ctx.session;
    create_effect(move |_| {
        if let Some(role) = session.with(|s| s.as_ref().map(|s| s.user.role)) {
            go_home(role);
        }
    });

    let client = store_value(ctx.query.clone());
    let login = create_action(move |credentials: &(String, String)| {
        let (phone, password) = credentials.clone();
        let client = client.get_value();
        async move { client.login(&phone, &password).await }
    });

    let signed_ctx = ctx.clone();
    create_effect(move |_| {
        login.value().with(|outcome| match outcome {
            Some(Ok(response)) => {
                let response: LoginResponse = response.clone();
                untrack(|| {
                    failure.set(None);
                    signed_ctx.sign_in(response);
                });
            }
            Some(Err(e)) => {
                warn!(error = %e, "Sign-in failed");
                failure.set(Some(failure_text(e, locale.get_untracked())));
            }
            None => {}
        })
    });

    let form = move || {
        view! {
            <AutoForm
                schema=Arc::new(login_schema(locale.get()))
                on_submit=Callback::new(move |submission: Submission| {
                    let phone = submission.values.get("phone").map(|v| v.as_text()).unwrap_or_default();
                    let password = submission.values.get("password").map(|v| v.as_text()).unwrap_or_default();
                    login.dispatch((international_phone(&phone), password));
                })
                submit_label=Signal::derive(move || locale.get().t(Message::Login).to_string())
                busy=login.pending()
            />
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1 class="login-title">"Libris"</h1>
                {form}
                {move || failure.get().map(|text| view! { <p class="form-error" role="alert">{text}</p> })}
                <a class="btn btn-link" href=move || locale.get().path(Area::Catalog.path())>
                    {move || locale.get().t(Message::Catalog)}
                </a>
            </div>
        </div>
    }
}
