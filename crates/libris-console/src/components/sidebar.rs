//! Sidebar navigation component
//!
//! Provides the main navigation for the console with:
//! - Branding/logo
//! - Links filtered by the signed-in role, prefixed with the current locale
//! - Version and role in the footer

use leptos::*;
use leptos_router::*;
use libris_core::{Area, Message};

use super::icons::{
    AdminIcon, BellIcon, BookIcon, BookingIcon, CatalogIcon, CategoryIcon, DashboardIcon,
    StudentIcon, UserIcon,
};
use crate::state::AppContext;

struct NavItem {
    area: Area,
    label: Message,
}

struct NavSection {
    title: &'static str,
    items: &'static [NavItem],
}

fn nav_icon(area: Area) -> View {
    match area {
        Area::Dashboard => view! { <DashboardIcon/> }.into_view(),
        Area::Books => view! { <BookIcon/> }.into_view(),
        Area::Categories => view! { <CategoryIcon/> }.into_view(),
        Area::Bookings => view! { <BookingIcon/> }.into_view(),
        Area::Students => view! { <StudentIcon/> }.into_view(),
        Area::Administrators => view! { <AdminIcon/> }.into_view(),
        Area::Notifications => view! { <BellIcon/> }.into_view(),
        Area::Profile => view! { <UserIcon/> }.into_view(),
        Area::Catalog => view! { <CatalogIcon/> }.into_view(),
    }
}

const SECTIONS: &[NavSection] = &[
    NavSection {
        title: "Library",
        items: &[
            NavItem {
                area: Area::Dashboard,
                label: Message::Dashboard,
            },
            NavItem {
                area: Area::Books,
                label: Message::Books,
            },
            NavItem {
                area: Area::Categories,
                label: Message::Categories,
            },
            NavItem {
                area: Area::Bookings,
                label: Message::Bookings,
            },
        ],
    },
    NavSection {
        title: "People",
        items: &[
            NavItem {
                area: Area::Students,
                label: Message::Students,
            },
            NavItem {
                area: Area::Administrators,
                label: Message::Administrators,
            },
            NavItem {
                area: Area::Notifications,
                label: Message::Notifications,
            },
        ],
    },
    NavSection {
        title: "Account",
        items: &[
            NavItem {
                area: Area::Catalog,
                label: Message::Catalog,
            },
            NavItem {
                area: Area::Profile,
                label: Message::Profile,
            },
        ],
    },
];

/// Sidebar navigation with branding and status footer
#[component]
pub fn Sidebar() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let version = ctx
        .config
        .version
        .clone()
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    let nav_ctx = ctx.clone();
    let sections = move || {
        SECTIONS
            .iter()
            .filter_map(|section| {
                let links: Vec<_> = section
                    .items
                    .iter()
                    .filter(|item| nav_ctx.can_access(item.area))
                    .map(|item| {
                        let href = nav_ctx.href(item.area.path());
                        let text = nav_ctx.t(item.label);
                        let area = item.area;
                        view! {
                            <A href=href class="nav-link" active_class="active">
                                {nav_icon(area)}
                                <span>{text}</span>
                            </A>
                        }
                    })
                    .collect();
                (!links.is_empty()).then(|| {
                    view! {
                        <div class="nav-section">
                            <div class="nav-section-title" aria-hidden="true">{section.title}</div>
                            {links}
                        </div>
                    }
                })
            })
            .collect_view()
    };

    let role = move || {
        ctx.user()
            .map(|u| u.role.as_str().to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    view! {
        <aside
            class="sidebar"
            role="navigation"
            aria-label="Main navigation"
        >
            <div class="logo" aria-label="Libris">
                <div class="logo-icon" aria-hidden="true">"L"</div>
                <span class="logo-text">"Libris"</span>
            </div>

            <nav class="nav" aria-label="Primary">
                {sections}
            </nav>

            <div class="sidebar-footer" role="status">
                <div class="sidebar-stat">
                    <span class="sidebar-stat-label">"Role"</span>
                    <span class="sidebar-stat-value">{role}</span>
                </div>
                <div class="sidebar-stat">
                    <span class="sidebar-stat-label">"Version"</span>
                    <span class="sidebar-stat-value">{version}</span>
                </div>
            </div>
        </aside>
    }
}
