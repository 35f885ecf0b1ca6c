//! Libris console - Leptos-based WebAssembly UI
//!
//! Staff console and public catalog for a university library, compiled to
//! WebAssembly and served as static files next to the REST backend.
//!
//! ## Routes
//!
//! Every route starts with the locale (`/uz/books`, `/ru/dashboard`). Login
//! and the catalog are public; everything else renders inside the shell and
//! is guarded by the signed-in user's role.
//!
//! ## Configuration
//!
//! The hosting page can point the console at a backend:
//!
//! ```html
//! <meta name="libris:api-url" content="https://api.library.example">
//! <meta name="libris:public-url" content="https://files.library.example">
//! <meta name="libris:version" content="1.4.0">
//! ```
//!
//! Or via JavaScript:
//!
//! ```javascript
//! window.__LIBRIS_CONFIG__ = {
//!     apiUrl: "https://api.library.example",
//!     defaultLocale: "ru"
//! };
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Browser                             │
//! │  ┌───────────────────────────────────────────────────┐  │
//! │  │            libris-console (WASM)                  │  │
//! │  │  ┌────────┐  ┌─────────────┐  ┌───────────────┐   │  │
//! │  │  │ pages  │→ │ QueryClient │→ │ GlooTransport │   │  │
//! │  │  │ hooks  │  │ cache       │  │ bearer cookie │   │  │
//! │  │  └────────┘  └─────────────┘  └───────┬───────┘   │  │
//! │  └───────────────────────────────────────┼───────────┘  │
//! └──────────────────────────────────────────┼──────────────┘
//!                                            │ HTTPS /api/*
//!                                   ┌────────▼────────┐
//!                                   │  REST backend   │
//!                                   └─────────────────┘
//! ```

pub mod components;
pub mod config;
pub mod files;
pub mod hooks;
pub mod pages;
pub mod state;
pub mod storage;

use leptos::*;
use leptos_router::*;
use libris_core::{Area, Locale, Message};
use tracing::info;

use components::{Header, LoadingSpinner, Sidebar, ToastHost};
use config::ConsoleConfig;
use pages::{
    AdminsPage, BookDetailPage, BookingsPage, BooksPage, CatalogPage, CategoriesPage, DashboardPage,
    LoginPage, NotFoundPage, NotificationsPage, ProfilePage, StudentsPage,
};
use state::{prefers_dark, AppContext};

/// Main console application component
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new(ConsoleConfig::load());
    provide_context(ctx.clone());
    ctx.init();

    let theme = ctx.theme;
    let locale = ctx.locale;
    create_effect(move |_| {
        let dark = theme.get().is_dark(prefers_dark());
        let lang = locale.get().code();
        if let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        {
            let _ = root.set_attribute("data-theme", if dark { "dark" } else { "light" });
            let _ = root.set_attribute("lang", lang);
        }
    });

    let default_locale = ctx.config.client.default_locale;

    view! {
        <Router>
            <Routes>
                <Route path="/" view=move || view! { <Redirect path=default_locale.path("")/> }/>
                <Route path="/:locale" view=LocaleLayout>
                    <Route path="login" view=LoginPage/>
                    <Route path="catalog" view=PublicCatalog/>
                    <Route path="" view=Shell>
                        <Route path="" view=Home/>
                        <Route path="dashboard" view=|| guarded(Area::Dashboard, || view! { <DashboardPage/> })/>
                        <Route path="books" view=|| guarded(Area::Books, || view! { <BooksPage/> })/>
                        <Route path="books/:id" view=|| guarded(Area::Books, || view! { <BookDetailPage/> })/>
                        <Route path="categories" view=|| guarded(Area::Categories, || view! { <CategoriesPage/> })/>
                        <Route path="bookings" view=|| guarded(Area::Bookings, || view! { <BookingsPage/> })/>
                        <Route path="students" view=|| guarded(Area::Students, || view! { <StudentsPage/> })/>
                        <Route path="admins" view=|| guarded(Area::Administrators, || view! { <AdminsPage/> })/>
                        <Route path="notifications" view=|| guarded(Area::Notifications, || view! { <NotificationsPage/> })/>
                        <Route path="profile" view=|| guarded(Area::Profile, || view! { <ProfilePage/> })/>
                        <Route path="*any" view=NotFoundPage/>
                    </Route>
                </Route>
                <Route path="/*any" view=NotFoundPage/>
            </Routes>
            <ToastHost/>
        </Router>
    }
}

// ============================================================================
// Layouts
// ============================================================================

/// Applies the locale segment of the route
#[component]
fn LocaleLayout() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let params = use_params_map();
    let route_locale = create_memo(move |_| {
        params.with(|p| p.get("locale").and_then(|code| Locale::from_code(code)))
    });

    // Set before the child route renders, then follow navigation
    let locale = ctx.locale;
    if let Some(initial) = route_locale.get_untracked() {
        locale.set(initial);
    }
    create_effect(move |_| {
        if let Some(next) = route_locale.get() {
            if locale.get_untracked() != next {
                locale.set(next);
            }
        }
    });

    view! {
        <Show when=move || route_locale.with(Option::is_some) fallback=|| view! { <NotFoundPage/> }>
            <Outlet/>
        </Show>
    }
}

/// Sidebar and header around the signed-in screens
#[component]
fn Shell() -> impl IntoView {
    view! {
        <div class="app">
            <Sidebar/>
            <main class="main">
                <Header/>
                <div class="content">
                    <Outlet/>
                </div>
            </main>
        </div>
    }
}

/// Catalog with its own light chrome, reachable without signing in
#[component]
fn PublicCatalog() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let locale = ctx.locale;
    let session = ctx.session;
    let account = move || {
        let locale = locale.get();
        if session.with(Option::is_some) {
            view! { <A href=locale.path(Area::Profile.path()) class="btn btn-link">{locale.t(Message::Profile)}</A> }.into_view()
        } else {
            view! { <A href=locale.path("login") class="btn btn-primary">{locale.t(Message::Login)}</A> }.into_view()
        }
    };

    view! {
        <div class="public">
            <header class="public-header">
                <span class="brand">"Libris"</span>
                {account}
            </header>
            <CatalogPage/>
        </div>
    }
}

/// `/{locale}` lands on the first screen of the user's role
#[component]
fn Home() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let locale = ctx.locale;
    let target = move || {
        let area = ctx
            .user()
            .map(|u| pages::login::landing(u.role))
            .unwrap_or(Area::Dashboard);
        locale.get_untracked().path(area.path())
    };
    view! { <Redirect path=target()/> }
}

// ============================================================================
// Guard
// ============================================================================

fn guarded<F, V>(area: Area, page: F) -> View
where
    F: Fn() -> V + Copy + 'static,
    V: IntoView,
{
    view! { <Guarded area=area>{move || page()}</Guarded> }.into_view()
}

/// Renders `children` only for a signed-in user whose role may open `area`
#[component]
fn Guarded(area: Area, children: ChildrenFn) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let ready = ctx.ready;
    let session = ctx.session;
    let locale = ctx.locale;

    move || {
        if !ready.get() {
            return view! { <LoadingSpinner/> }.into_view();
        }
        match session.with(|s| s.as_ref().map(|s| s.user.role)) {
            None => {
                info!(area = area.path(), "Anonymous visit, redirecting to login");
                view! { <Redirect path=locale.get_untracked().path("login")/> }.into_view()
            }
            Some(role) if !role.can_access(area) => view! {
                <div class="forbidden" role="alert">
                    <h2>{move || locale.get().t(Message::Forbidden)}</h2>
                </div>
            }
            .into_view(),
            Some(_) => children().into_view(),
        }
    }
}

/// Mount the application to the DOM
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    mount_to_body(|| view! { <App/> });
}
