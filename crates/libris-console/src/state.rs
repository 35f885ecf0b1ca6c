//! Application context
//!
//! One [`AppContext`] is created by the root component and provided to the
//! whole tree. It owns the query client, the session store and the UI-wide
//! signals (session, theme, locale, toasts).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, NaiveDate, Utc};
use gloo_timers::future::TimeoutFuture;
use leptos::*;
use libris_client::models::LoginResponse;
use libris_client::{ApiClient, ApiError, CookieCredentials, CredentialSource, GlooTransport, QueryClient};
use libris_core::{Area, KeyValueStore, Locale, Message, Session, SessionStore, SessionUser, Theme};
use tracing::{info, warn};
use wasm_bindgen_futures::spawn_local;

use crate::config::ConsoleConfig;
use crate::storage::LocalStore;

/// Local storage key of the theme preference
pub const THEME_STORAGE_KEY: &str = "libris-theme";

/// How long a toast stays on screen
const TOAST_TIMEOUT_MS: u32 = 4_000;

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn class(&self) -> &'static str {
        match self {
            ToastKind::Success => "toast toast-success",
            ToastKind::Error => "toast toast-error",
            ToastKind::Info => "toast toast-info",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Global console state
#[derive(Clone)]
pub struct AppContext {
    pub config: Rc<ConsoleConfig>,
    pub query: QueryClient,
    sessions: Rc<RefCell<SessionStore<LocalStore>>>,
    /// Signed-in session, `None` when anonymous
    pub session: RwSignal<Option<Session>>,
    /// Set once the persisted session has been checked against the backend
    pub ready: RwSignal<bool>,
    pub theme: RwSignal<Theme>,
    /// Locale of the current route
    pub locale: RwSignal<Locale>,
    pub toasts: RwSignal<Vec<Toast>>,
    next_toast: Rc<Cell<u64>>,
}

impl AppContext {
    pub fn new(config: ConsoleConfig) -> Self {
        let api = ApiClient::new(config.client.clone(), GlooTransport).with_credentials(CookieCredentials);
        let theme = LocalStore
            .get(THEME_STORAGE_KEY)
            .and_then(|t| match t.as_str() {
                "light" => Some(Theme::Light),
                "dark" => Some(Theme::Dark),
                "system" => Some(Theme::System),
                _ => None,
            })
            .unwrap_or_default();
        let locale = config.client.default_locale;

        Self {
            config: Rc::new(config),
            query: QueryClient::new(api),
            sessions: Rc::new(RefCell::new(SessionStore::new(LocalStore))),
            session: create_rw_signal(None),
            ready: create_rw_signal(false),
            theme: create_rw_signal(theme),
            locale: create_rw_signal(locale),
            toasts: create_rw_signal(Vec::new()),
            next_toast: Rc::new(Cell::new(0)),
        }
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Restore the persisted session, then confirm it with a profile check
    pub fn init(&self) {
        let restored = self.sessions.borrow_mut().restore().cloned();
        let Some(session) = restored else {
            self.ready.set(true);
            return;
        };
        if CookieCredentials.token().is_none() {
            CookieCredentials::store(&session.token);
        }
        self.session.set(Some(session));

        let ctx = self.clone();
        spawn_local(async move {
            match ctx.query.me().await {
                Ok(user) => ctx.set_user(user),
                Err(ApiError::Unauthorized) => {
                    info!("Stored session rejected by backend");
                    ctx.clear_session();
                }
                Err(e) => warn!(error = %e, "Profile check failed, keeping stored session"),
            }
            ctx.ready.set(true);
        });
    }

    pub fn sign_in(&self, login: LoginResponse) {
        CookieCredentials::store(&login.token);
        let session = {
            let mut sessions = self.sessions.borrow_mut();
            if let Err(e) = sessions.sign_in(login.user, login.token) {
                warn!(error = %e, "Session not persisted");
            }
            sessions.session().cloned()
        };
        self.session.set(session);
        self.ready.set(true);
    }

    /// Replace the signed-in user after a profile edit
    pub fn set_user(&self, user: SessionUser) {
        let session = {
            let mut sessions = self.sessions.borrow_mut();
            if let Err(e) = sessions.update_user(user) {
                warn!(error = %e, "Session user not updated");
            }
            sessions.session().cloned()
        };
        self.session.set(session);
    }

    /// Tell the backend, then drop local state whatever it answers
    pub fn logout(&self) {
        let ctx = self.clone();
        spawn_local(async move {
            if let Err(e) = ctx.query.logout().await {
                warn!(error = %e, "Logout request failed");
            }
            ctx.clear_session();
        });
    }

    fn clear_session(&self) {
        CookieCredentials::clear();
        if let Err(e) = self.sessions.borrow_mut().logout() {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.query.clear();
        self.session.set(None);
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.session.with(|s| s.as_ref().map(|s| s.user.clone()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.with(Option::is_some)
    }

    pub fn can_access(&self, area: Area) -> bool {
        self.session
            .with(|s| s.as_ref().is_some_and(|s| s.user.role.can_access(area)))
    }

    // ========================================================================
    // Errors and toasts
    // ========================================================================

    /// Surface a failed request; 401 ends the session
    pub fn report_error(&self, error: &ApiError) {
        if error.is_unauthorized() {
            if self.is_authenticated() {
                self.clear_session();
            }
            self.toast(ToastKind::Error, self.t(Message::Unauthorized));
        } else {
            self.toast(ToastKind::Error, error.to_string());
        }
    }

    pub fn toast(&self, kind: ToastKind, message: impl Into<String>) {
        let id = self.next_toast.get();
        self.next_toast.set(id + 1);
        self.toasts.update(|t| {
            t.push(Toast {
                id,
                kind,
                message: message.into(),
            })
        });

        let toasts = self.toasts;
        spawn_local(async move {
            TimeoutFuture::new(TOAST_TIMEOUT_MS).await;
            toasts.try_update(|t| t.retain(|toast| toast.id != id));
        });
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|t| t.retain(|toast| toast.id != id));
    }

    // ========================================================================
    // Locale and theme
    // ========================================================================

    /// Translate in the current locale (reactive)
    pub fn t(&self, message: Message) -> &'static str {
        self.locale.get().t(message)
    }

    /// Locale-prefixed path, e.g. `/ru/books`
    pub fn href(&self, path: &str) -> String {
        self.locale.get().path(path)
    }

    pub fn cycle_theme(&self) {
        let next = self.theme.get_untracked().next();
        if let Err(e) = LocalStore.set(THEME_STORAGE_KEY, next.as_str()) {
            warn!(error = %e, "Theme preference not persisted");
        }
        self.theme.set(next);
    }
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Format a number with K/M suffix
pub fn format_number(num: u64) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_datetime(at: Option<DateTime<Utc>>) -> String {
    at.map(|d| d.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Whether the OS asks for a dark color scheme
pub fn prefers_dark() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .map(|m| m.matches())
        .unwrap_or(false)
}
