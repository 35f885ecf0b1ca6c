//! Header component
//!
//! The top bar showing:
//! - Current page title (derived from route)
//! - Language switcher that keeps the current page
//! - Theme toggle (light, dark, system)
//! - Signed-in user and sign-out

use leptos::*;
use leptos_router::{use_location, use_navigate, NavigateOptions};
use libris_core::{Area, Locale, Message, Theme};

use super::icons::{LogoutIcon, MoonIcon, SunIcon, SystemIcon};
use super::primitives::{Avatar, Badge, BadgeVariant};
use crate::state::AppContext;

fn area_title(area: Area) -> Message {
    match area {
        Area::Dashboard => Message::Dashboard,
        Area::Books => Message::Books,
        Area::Categories => Message::Categories,
        Area::Bookings => Message::Bookings,
        Area::Students => Message::Students,
        Area::Administrators => Message::Administrators,
        Area::Notifications => Message::Notifications,
        Area::Profile => Message::Profile,
        Area::Catalog => Message::Catalog,
    }
}

/// Page header with language, theme and account controls
#[component]
pub fn Header() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let location = use_location();
    let navigate = store_value(use_navigate());

    // Derive page title from current path
    let title_ctx = ctx.clone();
    let title = move || {
        let path = location.pathname.get();
        let (_, rest) = Locale::split_path(&path);
        let segment = rest.trim_start_matches('/').split('/').next().unwrap_or_default();
        Area::from_path(segment)
            .map(|area| title_ctx.t(area_title(area)))
            .unwrap_or_default()
    };

    let switch_locale = move |ev: ev::Event| {
        if let Some(locale) = Locale::from_code(&event_target_value(&ev)) {
            let target = locale.switch_path(&location.pathname.get_untracked());
            navigate.with_value(|nav| nav(&target, NavigateOptions::default()));
        }
    };

    let locale = ctx.locale;
    let theme = ctx.theme;
    let theme_ctx = ctx.clone();
    let theme_icon = move || match theme.get() {
        Theme::Light => view! { <SunIcon/> }.into_view(),
        Theme::Dark => view! { <MoonIcon/> }.into_view(),
        Theme::System => view! { <SystemIcon/> }.into_view(),
    };

    let logout_ctx = ctx.clone();
    let logout = move |_| {
        let target = logout_ctx.locale.get_untracked().path("login");
        logout_ctx.logout();
        navigate.with_value(|nav| nav(&target, NavigateOptions::default()));
    };

    let user_ctx = ctx.clone();
    let user = move || {
        user_ctx.user().map(|u| {
            let role = u.role.as_str().to_uppercase();
            let initials = u.initials();
            view! {
                <div class="header-user">
                    <Avatar initials=initials/>
                    <span class="header-user-name">{u.full_name}</span>
                    <Badge text=role.clone() variant=BadgeVariant::for_status(&role)/>
                </div>
            }
        })
    };

    let logout_title = move || ctx.t(Message::Logout);

    view! {
        <header class="header" role="banner">
            <div class="header-left">
                <h1 class="header-title" aria-live="polite">
                    {title}
                </h1>
            </div>
            <div class="header-right">
                <select
                    class="locale-select"
                    aria-label="Language"
                    prop:value=move || locale.get().code()
                    on:change=switch_locale
                >
                    {Locale::ALL.into_iter().map(|l| view! {
                        <option value=l.code()>{l.label()}</option>
                    }).collect_view()}
                </select>
                <button
                    class="btn btn-icon theme-toggle"
                    title=move || theme.get().as_str()
                    aria-label="Toggle theme"
                    on:click=move |_| theme_ctx.cycle_theme()
                >
                    {theme_icon}
                </button>
                {user}
                <button
                    class="btn btn-icon"
                    title=logout_title
                    on:click=logout
                >
                    <LogoutIcon/>
                </button>
            </div>
        </header>
    }
}
