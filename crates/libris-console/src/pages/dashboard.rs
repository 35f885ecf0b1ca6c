//! Dashboard: library figures and activity charts

use leptos::*;
use libris_client::models::DashboardStats;
use libris_core::{Message, QueryKey};

use super::label;
use crate::components::icons::{BookIcon, BookingIcon, StudentIcon};
use crate::components::{BarChart, BarGroup, ErrorState, StatCard, TableCard};
use crate::hooks::use_query;
use crate::state::{format_number, AppContext};

fn statistics_key(_: &()) -> QueryKey {
    QueryKey::new("statistics")
}

/// Bookings and returns per month
fn monthly_groups(stats: &DashboardStats) -> Vec<BarGroup> {
    stats
        .monthly
        .iter()
        .map(|m| BarGroup {
            label: m.month.clone(),
            values: vec![m.bookings, m.returns],
        })
        .collect()
}

/// Books per category, largest first
fn category_groups(stats: &DashboardStats) -> Vec<BarGroup> {
    let mut counts = stats.by_category.clone();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    counts
        .into_iter()
        .map(|c| BarGroup {
            label: c.name,
            values: vec![c.count],
        })
        .collect()
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let stats = use_query(|| (), statistics_key, |client, _| async move {
        client.dashboard_stats().await
    });

    let figure = move |f: fn(&DashboardStats) -> u64| {
        Signal::derive(move || {
            stats
                .data
                .with(|s| s.as_ref().map(|s| format_number(f(s))))
                .unwrap_or_else(|| "–".to_string())
        })
    };
    let monthly = Signal::derive(move || stats.data.with(|s| s.as_ref().map(monthly_groups).unwrap_or_default()));
    let by_category = Signal::derive(move || stats.data.with(|s| s.as_ref().map(category_groups).unwrap_or_default()));

    let locale = ctx.locale;
    let charts = move || {
        let locale = locale.get();
        view! {
            <div class="chart-row">
                <TableCard title=locale.t(Message::MonthlyActivity).to_string()>
                    <BarChart groups=monthly series=vec![locale.t(Message::Bookings), locale.t(Message::Returns)]/>
                </TableCard>
                <TableCard title=locale.t(Message::ByCategory).to_string()>
                    <BarChart groups=by_category series=vec![locale.t(Message::TotalBooks)]/>
                </TableCard>
            </div>
        }
    };

    view! {
        <div class="page dashboard-page">
            <Show when=move || stats.error.with(Option::is_some)>
                <ErrorState
                    message=stats.error.get_untracked().unwrap_or_default()
                    retry=Callback::new(move |_| stats.refetch())
                />
            </Show>
            <div class="stats-grid">
                <StatCard
                    label=label(&ctx, Message::TotalBooks)
                    value=figure(|s| s.total_books)
                    icon=view! { <BookIcon/> }.into_view()
                />
                <StatCard label=label(&ctx, Message::Copies) value=figure(|s| s.total_copies)/>
                <StatCard
                    label=label(&ctx, Message::TotalStudents)
                    value=figure(|s| s.total_students)
                    icon=view! { <StudentIcon/> }.into_view()
                />
                <StatCard
                    label=label(&ctx, Message::ActiveBookings)
                    value=figure(|s| s.active_bookings)
                    icon=view! { <BookingIcon/> }.into_view()
                />
                <StatCard label=label(&ctx, Message::PendingBookings) value=figure(|s| s.pending_bookings) color="warning"/>
                <StatCard label=label(&ctx, Message::OverdueBookings) value=figure(|s| s.overdue_bookings) color="error"/>
            </div>
            {charts}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_client::models::{CategoryCount, MonthlyPoint};

    fn stats() -> DashboardStats {
        DashboardStats {
            total_books: 120,
            total_copies: 340,
            total_students: 80,
            active_bookings: 12,
            pending_bookings: 3,
            overdue_bookings: 1,
            monthly: vec![
                MonthlyPoint { month: "2024-01".into(), bookings: 10, returns: 7 },
                MonthlyPoint { month: "2024-02".into(), bookings: 4, returns: 9 },
            ],
            by_category: vec![
                CategoryCount { name: "Tarix".into(), count: 5 },
                CategoryCount { name: "Adabiyot".into(), count: 40 },
                CategoryCount { name: "Fizika".into(), count: 5 },
            ],
        }
    }

    #[test]
    fn test_monthly_groups_keep_series_order() {
        let groups = monthly_groups(&stats());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "2024-01");
        assert_eq!(groups[0].values, vec![10, 7]);
    }

    #[test]
    fn test_category_groups_sorted_by_count() {
        let labels: Vec<_> = category_groups(&stats()).into_iter().map(|g| g.label).collect();
        assert_eq!(labels, vec!["Adabiyot", "Fizika", "Tarix"]);
    }

    #[test]
    fn test_statistics_key_is_stable() {
        assert_eq!(statistics_key(&()), QueryKey::new("statistics"));
    }
}
