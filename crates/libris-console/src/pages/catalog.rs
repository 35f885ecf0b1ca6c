//! Public catalog: browse, search and download books

use gloo_timers::callback::Timeout;
use leptos::*;
use libris_client::models::{Book, Category};
use libris_client::ListParams;
use libris_core::Message;

use super::list_params;
use crate::components::icons::DownloadIcon;
use crate::components::{Badge, BadgeVariant, EmptyState, ErrorState, SearchInput, Skeleton};
use crate::hooks::use_list;
use crate::state::AppContext;

const CATALOG_PAGE_SIZE: usize = 12;
const SEARCH_DEBOUNCE_MS: u32 = 300;

/// Server-side read for one catalog page
fn catalog_params(page: usize, search: &str, category: Option<u64>) -> ListParams {
    let params = ListParams::new().page(page, CATALOG_PAGE_SIZE).search(search.trim());
    match category {
        Some(id) => params.filter("categoryId", id),
        None => params,
    }
}

#[component]
pub fn CatalogPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let search = create_rw_signal(String::new());
    let query = create_rw_signal(String::new());
    let category = create_rw_signal(None::<u64>);
    let page = create_rw_signal(1usize);

    // Typing settles before the backend is asked
    let pending = store_value(None::<Timeout>);
    create_effect(move |_| {
        let text = search.get();
        let timeout = Timeout::new(SEARCH_DEBOUNCE_MS, move || {
            page.set(1);
            query.set(text);
        });
        // Dropping the previous timeout cancels it
        pending.update_value(|p| *p = Some(timeout));
    });
    on_cleanup(move || {
        pending.try_update_value(|p| p.take());
    });

    let books = use_list::<Book>(move || catalog_params(page.get(), &query.get(), category.get()));
    let categories = use_list::<Category>(list_params);
    let total_pages = move || {
        books
            .data
            .with(|d| d.as_ref().map(|p| p.total_pages as usize).unwrap_or(1))
            .max(1)
    };

    let locale = ctx.locale;
    let files = store_value(ctx.query.clone());
    let card = move |book: Book| {
        let cover = book
            .image
            .as_deref()
            .and_then(|path| files.with_value(|q| q.file_url(path).ok()));
        let download = book
            .pdf
            .as_deref()
            .filter(|_| book.is_downloadable())
            .and_then(|path| files.with_value(|q| q.file_url(path).ok()));
        let available = book.available_copies.unwrap_or_default();
        let variant = if available > 0 {
            BadgeVariant::Success
        } else {
            BadgeVariant::Warning
        };
        view! {
            <article class="catalog-card">
                {match cover {
                    Some(src) => view! { <img class="book-cover" src=src alt=book.title.clone() loading="lazy"/> }.into_view(),
                    None => view! { <div class="book-cover placeholder"></div> }.into_view(),
                }}
                <div class="catalog-body">
                    <h3 class="book-title">{book.title.clone()}</h3>
                    <p class="book-author">{book.author.clone()}</p>
                    {book.category_name().map(|c| view! { <span class="book-category">{c.to_string()}</span> })}
                    <Badge
                        text=move || format!("{}: {}", locale.get().t(Message::AvailableCopies), available)
                        variant=variant
                    />
                    {download.map(|href| view! {
                        <a class="btn btn-secondary" href=href target="_blank" rel="noopener" download="">
                            <DownloadIcon/>
                            {move || locale.get().t(Message::Download)}
                        </a>
                    })}
                </div>
            </article>
        }
    };

    let grid = move || {
        if books.loading.get() && books.data.with(Option::is_none) {
            return view! {
                <div class="catalog-grid">
                    {(0..4).map(|_| view! { <Skeleton height="12rem"/> }).collect_view()}
                </div>
            }
            .into_view();
        }
        let items = books
            .data
            .with(|d| d.as_ref().map(|p| p.items.clone()).unwrap_or_default());
        if items.is_empty() {
            return view! { <EmptyState title=locale.get().t(Message::NoData)/> }.into_view();
        }
        view! {
            <div class="catalog-grid">{items.into_iter().map(card).collect_view()}</div>
        }
        .into_view()
    };

    view! {
        <div class="page catalog-page">
            <div class="catalog-toolbar">
                <SearchInput value=search/>
                <select
                    class="category-filter"
                    aria-label=move || locale.get().t(Message::Category)
                    on:change=move |ev| {
                        page.set(1);
                        category.set(event_target_value(&ev).parse::<u64>().ok());
                    }
                >
                    <option value="">{move || locale.get().t(Message::All)}</option>
                    {move || {
                        categories
                            .data
                            .get()
                            .map(|p| p.items)
                            .unwrap_or_default()
                            .into_iter()
                            .map(|c| view! { <option value=c.id.to_string()>{c.name}</option> })
                            .collect_view()
                    }}
                </select>
            </div>
            <Show when=move || books.error.with(Option::is_some)>
                <ErrorState
                    message=books.error.get_untracked().unwrap_or_default()
                    retry=Callback::new(move |_| books.refetch())
                />
            </Show>
            {grid}
            <div class="pagination">
                <button class="btn" disabled=move || page.get() <= 1 on:click=move |_| page.update(|p| *p -= 1)>
                    {move || locale.get().t(Message::Back)}
                </button>
                <span class="page-info">{move || format!("{} / {}", page.get(), total_pages())}</span>
                <button
                    class="btn"
                    disabled=move || page.get() >= total_pages()
                    on:click=move |_| page.update(|p| *p += 1)
                >
                    {move || locale.get().t(Message::Next)}
                </button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_params_trim_search() {
        let params = catalog_params(2, "  Navoiy ", None);
        assert_eq!(params.search, "Navoiy");
        assert_eq!(params.page, Some(2));
        assert_eq!(params.size, Some(CATALOG_PAGE_SIZE));
        assert!(params.filters.is_empty());
    }

    #[test]
    fn test_catalog_params_category_filter() {
        let params = catalog_params(1, "", Some(5));
        assert_eq!(params.filters.get("categoryId").map(String::as_str), Some("5"));
        assert_ne!(params.key("books"), catalog_params(1, "", None).key("books"));
    }
}
