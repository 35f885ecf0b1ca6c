//! Reusable UI primitive components
//!
//! Loading placeholders, error and empty states, badges, cards, the search
//! box and the avatar used by the layout and the pages.

use leptos::*;
use libris_core::Message;

use super::icons::{BookIcon, SearchIcon};
use crate::state::AppContext;

// ============================================================================
// Loading States
// ============================================================================

/// Busy indicator; the localized label is only read by screen readers
#[component]
pub fn LoadingSpinner(#[prop(optional)] label: Option<Message>) -> impl IntoView {
    let locale = expect_context::<AppContext>().locale;
    let label = label.unwrap_or(Message::Loading);

    view! {
        <div class="busy" role="status" aria-live="polite">
            <svg class="busy-ring" viewBox="0 0 32 32" aria-hidden="true">
                <path d="M16 3a13 13 0 1 1-13 13" fill="none" stroke="currentColor" stroke-width="3" stroke-linecap="round"/>
            </svg>
            <span class="sr-only">{move || locale.get().t(label)}</span>
        </div>
    }
}

/// Skeleton placeholder for loading content
#[component]
pub fn Skeleton(
    #[prop(optional, default = "100%")] width: &'static str,
    #[prop(optional, default = "1rem")] height: &'static str,
) -> impl IntoView {
    let style = format!("width: {}; height: {};", width, height);

    view! {
        <div class="skeleton" style=style aria-hidden="true"></div>
    }
}

/// Placeholder table row with `cells` cells
#[component]
pub fn SkeletonRow(cells: usize) -> impl IntoView {
    view! {
        <tr class="skeleton-row" aria-hidden="true">
            {(0..cells).map(|_| view! {
                <td><Skeleton width="80%"/></td>
            }).collect_view()}
        </tr>
    }
}

// ============================================================================
// Error and Empty States
// ============================================================================

/// Error state display
#[component]
pub fn ErrorState(
    #[prop(into)] message: String,
    #[prop(optional)] retry: Option<Callback<()>>,
) -> impl IntoView {
    view! {
        <div class="error-state" role="alert">
            <div class="error-icon">
                <svg xmlns="http://www.w3.org/2000/svg" fill="none" viewBox="0 0 24 24" stroke-width="1.5" stroke="currentColor">
                    <path stroke-linecap="round" stroke-linejoin="round" d="M12 9v3.75m-9.303 3.376c-.866 1.5.217 3.374 1.948 3.374h14.71c1.73 0 2.813-1.874 1.948-3.374L13.949 3.378c-.866-1.5-3.032-1.5-3.898 0L2.697 16.126ZM12 15.75h.007v.008H12v-.008Z"/>
                </svg>
            </div>
            <p class="error-message">{message}</p>
            {retry.map(|on_retry| view! {
                <button class="btn btn-primary" on:click=move |_| on_retry.call(())>
                    "↻"
                </button>
            })}
        </div>
    }
}

/// Generic empty state component
#[component]
pub fn EmptyState(
    #[prop(into)] title: String,
    #[prop(optional, into)] description: Option<String>,
) -> impl IntoView {
    view! {
        <div class="empty-state" role="status">
            <div class="empty-icon"><BookIcon/></div>
            <div class="empty-text">{title}</div>
            {description.map(|desc| view! { <p class="empty-description">{desc}</p> })}
        </div>
    }
}

// ============================================================================
// Badges
// ============================================================================

/// Colour of a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadgeVariant {
    #[default]
    Default,
    Primary,
    Success,
    Warning,
    Error,
    Info,
}

impl BadgeVariant {
    /// Value of the badge's `data-tone` attribute
    pub fn tone(&self) -> &'static str {
        match self {
            BadgeVariant::Default => "neutral",
            BadgeVariant::Primary => "staff",
            BadgeVariant::Success => "ok",
            BadgeVariant::Warning => "waiting",
            BadgeVariant::Error => "problem",
            BadgeVariant::Info => "on-loan",
        }
    }

    /// Variant for a backend status code such as `APPROVED` or `LOST`
    pub fn for_status(status: &str) -> Self {
        match status.to_ascii_uppercase().as_str() {
            "APPROVED" | "AVAILABLE" | "RETURNED" | "ACTIVE" | "TRUE" => BadgeVariant::Success,
            "PENDING" | "RESERVED" => BadgeVariant::Warning,
            "REJECTED" | "OVERDUE" | "LOST" | "FALSE" => BadgeVariant::Error,
            "BORROWED" => BadgeVariant::Info,
            "SUPER_ADMIN" | "ADMIN" => BadgeVariant::Primary,
            _ => BadgeVariant::Default,
        }
    }
}

/// Status, role or availability label
#[component]
pub fn Badge<T: IntoView + 'static>(text: T, #[prop(optional)] variant: BadgeVariant) -> impl IntoView {
    view! { <span class="badge" data-tone=variant.tone()>{text}</span> }
}

/// Circle with the user's initials
#[component]
pub fn Avatar(#[prop(into)] initials: String) -> impl IntoView {
    view! {
        <span class="avatar" aria-hidden="true">{initials}</span>
    }
}

// ============================================================================
// Cards & Containers
// ============================================================================

/// Stat card for dashboard figures
#[component]
pub fn StatCard(
    #[prop(into)] label: Signal<String>,
    #[prop(into)] value: Signal<String>,
    #[prop(optional)] color: Option<&'static str>,
    #[prop(optional)] icon: Option<View>,
) -> impl IntoView {
    let class = format!("stat-card {}", color.unwrap_or(""));

    view! {
        <div class=class>
            <div class="stat-header">
                {icon.map(|i| view! { <div class="stat-icon">{i}</div> })}
                <span class="stat-label">{move || label.get()}</span>
            </div>
            <div class="stat-value">{move || value.get()}</div>
        </div>
    }
}

/// Titled card container
#[component]
pub fn TableCard(
    #[prop(into)] title: MaybeSignal<String>,
    children: Children,
    #[prop(optional)] action: Option<View>,
) -> impl IntoView {
    view! {
        <div class="table-card">
            <div class="table-header">
                <div class="table-title">{move || title.get()}</div>
                {action}
            </div>
            {children()}
        </div>
    }
}

/// Key-value info row with children for the value
#[component]
pub fn InfoRow(#[prop(into)] label: Signal<String>, children: Children) -> impl IntoView {
    view! {
        <div class="info-row">
            <span class="info-label">{move || label.get()}</span>
            <span class="info-value">{children()}</span>
        </div>
    }
}

// ============================================================================
// Search
// ============================================================================

/// Search box bound to a signal
#[component]
pub fn SearchInput(#[prop(into)] value: RwSignal<String>) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let placeholder = move || ctx.t(Message::Search);

    view! {
        <div class="search-bar">
            <div class="search-icon"><SearchIcon/></div>
            <input
                type="search"
                class="search-input"
                placeholder=placeholder.clone()
                aria-label=placeholder
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_tones() {
        assert_eq!(BadgeVariant::for_status("overdue"), BadgeVariant::Error);
        assert_eq!(BadgeVariant::for_status("BORROWED").tone(), "on-loan");
        assert_eq!(BadgeVariant::for_status("SUPER_ADMIN").tone(), "staff");
        assert_eq!(BadgeVariant::for_status("ARCHIVED"), BadgeVariant::Default);
    }
}
