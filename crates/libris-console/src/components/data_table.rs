//! Generic data table component
//!
//! Draws the [`TableView`](libris_core::table::TableView) derived by
//! `libris_core::table::derive` and turns user interaction (search box,
//! filter menus, sort headers, column menu, pager, selection) into
//! [`TableState`] updates. The records passed in are never modified.
//!
//! Columns whose key has an entry in [`CellRenderers`] are drawn by that
//! renderer; everything else is drawn from the column's [`CellFormat`].

use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use leptos::*;
use libris_core::table::{
    derive, selected_records, to_csv, BodyPlan, CellFormat, Column, PageCheck, Pin, RowKey,
    SelectionMode, SortDirection, TableOptions, TableState, TableView,
};
use libris_core::{display_text, Message, Record};
use serde_json::Value;
use tracing::warn;

use super::icons::{ChevronIcon, ColumnsIcon, DownloadIcon, FilterIcon, FullscreenIcon};
use super::primitives::{Badge, BadgeVariant, SearchInput, SkeletonRow};
use crate::files::download_text;
use crate::state::AppContext;

/// Renders one cell (or the detail of an expanded row) from the whole record
pub type CellRenderer = Rc<dyn Fn(&Record) -> View>;

/// Custom cell renderers keyed by column key
#[derive(Clone, Default)]
pub struct CellRenderers(HashMap<String, CellRenderer>);

impl CellRenderers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F, V>(mut self, column: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Record) -> V + 'static,
        V: IntoView,
    {
        self.0
            .insert(column.into(), Rc::new(move |r: &Record| f(r).into_view()));
        self
    }

    fn get(&self, column: &str) -> Option<&CellRenderer> {
        self.0.get(column)
    }
}

/// Owned copy of the rendered page, so the view does not borrow the data
#[derive(Debug, Clone, PartialEq)]
struct PageSnapshot {
    /// Indices into the column list, in render order
    columns: Vec<usize>,
    rows: Vec<(RowKey, Record)>,
    total: usize,
    page: usize,
    page_count: usize,
    range: Option<(usize, usize)>,
    span: usize,
    plan: BodyPlan,
}

impl PageSnapshot {
    fn new(all: &[Column], view: &TableView<'_>, loading: bool) -> Self {
        Self {
            columns: view
                .columns
                .iter()
                .filter_map(|c| all.iter().position(|x| x.key == c.key))
                .collect(),
            rows: view
                .rows
                .iter()
                .map(|r| (r.key.clone(), r.record.clone()))
                .collect(),
            total: view.total,
            page: view.page,
            page_count: view.page_count,
            range: view.range(),
            span: view.column_span(),
            plan: view.body(loading),
        }
    }
}

fn pin_class(pin: Option<Pin>) -> &'static str {
    match pin {
        Some(Pin::Left) => "pinned-left",
        Some(Pin::Right) => "pinned-right",
        None => "",
    }
}

/// Data table over `rows`
#[component]
pub fn DataTable(
    columns: Vec<Column>,
    #[prop(into)] rows: Signal<Vec<Record>>,
    #[prop(optional, into)] loading: MaybeSignal<bool>,
    #[prop(optional)] options: TableOptions,
    #[prop(optional)] cells: CellRenderers,
    /// Detail drawn under an expanded row
    #[prop(optional)]
    expanded: Option<CellRenderer>,
    /// Selection changed: all selected keys and their records
    #[prop(optional)]
    on_change: Option<Callback<(Vec<RowKey>, Vec<Record>)>>,
    /// One row toggled
    #[prop(optional)]
    on_select: Option<Callback<(RowKey, bool)>>,
    /// Header checkbox toggled for the keys of the current page
    #[prop(optional)]
    on_select_all: Option<Callback<(bool, Vec<RowKey>)>>,
    #[prop(optional, into)] title: Option<Signal<String>>,
    /// File name of the CSV export; no export button without it
    #[prop(optional, into)]
    export_name: Option<String>,
    /// Extra toolbar content, e.g. a create button
    #[prop(optional)]
    children: Option<Children>,
) -> impl IntoView {
    let state = create_rw_signal(TableState::new(&columns, &options));
    let columns = store_value(columns);
    let options = store_value(options);
    let cells = store_value(cells);
    let expanded = store_value(expanded);
    let tr = store_value(expect_context::<AppContext>());

    let snapshot = create_memo(move |_| {
        let loading = loading.get();
        columns.with_value(|all| {
            options.with_value(|opts| {
                rows.with(|data| {
                    state.with(|s| PageSnapshot::new(all, &derive(all, data, s, opts), loading))
                })
            })
        })
    });

    // Search box feeds the table state; a new query returns to page 1
    let search = create_rw_signal(String::new());
    create_effect(move |previous: Option<()>| {
        let query = search.get();
        if previous.is_some() {
            state.update(|s| s.set_search(query));
        }
    });

    let emit_change = move || {
        if let Some(cb) = on_change {
            let (keys, records) = options.with_value(|opts| {
                rows.with(|data| {
                    state.with(|s| {
                        let keys: Vec<RowKey> = s.selection.keys().iter().cloned().collect();
                        let records: Vec<Record> = selected_records(data, s, opts)
                            .into_iter()
                            .cloned()
                            .collect();
                        (keys, records)
                    })
                })
            });
            cb.call((keys, records));
        }
    };

    let selection_mode = options.with_value(|o| o.selection);
    let expandable = options.with_value(|o| o.expandable);
    let searchable = options.with_value(|o| o.searchable);
    let column_menu = options.with_value(|o| o.column_visibility);
    let fullscreen = options.with_value(|o| o.fullscreen);
    let pagination = options.with_value(|o| o.pagination.clone());

    // ------------------------------------------------------------------------
    // Toolbar
    // ------------------------------------------------------------------------

    let has_export = export_name.is_some();
    let export = move |_: ev::MouseEvent| {
        let Some(name) = export_name.clone() else {
            return;
        };
        let csv = columns.with_value(|all| {
            options.with_value(|opts| {
                rows.with(|data| state.with(|s| to_csv(&derive(all, data, s, opts), data)))
            })
        });
        if let Err(e) = download_text(&name, "text/csv;charset=utf-8", &csv) {
            warn!(error = %e, "CSV export failed");
        }
    };

    let column_toggles = move || {
        columns.with_value(|all| {
            all.iter()
                .map(|col| {
                    let key = col.key.clone();
                    let key_toggle = key.clone();
                    let key_pin = key.clone();
                    let key_pin_value = key.clone();
                    view! {
                        <div class="column-menu-item">
                            <label>
                                <input
                                    type="checkbox"
                                    prop:checked=move || state.with(|s| s.is_visible(&key))
                                    on:change=move |_| state.update(|s| s.toggle_column(&key_toggle))
                                />
                                {col.title.clone()}
                            </label>
                            <select
                                class="pin-select"
                                prop:value=move || match state.with(|s| s.pin_of(&key_pin_value)) {
                                    Some(Pin::Left) => "left",
                                    Some(Pin::Right) => "right",
                                    None => "",
                                }
                                on:change=move |ev| {
                                    let pin = match event_target_value(&ev).as_str() {
                                        "left" => Some(Pin::Left),
                                        "right" => Some(Pin::Right),
                                        _ => None,
                                    };
                                    state.update(|s| s.set_pin(&key_pin, pin));
                                }
                            >
                                <option value="">"–"</option>
                                <option value="left">"⇤"</option>
                                <option value="right">"⇥"</option>
                            </select>
                        </div>
                    }
                })
                .collect_view()
        })
    };

    let toolbar = view! {
        <div class="table-toolbar">
            {title.map(|t| view! { <div class="table-title">{move || t.get()}</div> })}
            {searchable.then(|| view! { <SearchInput value=search/> })}
            <div class="table-actions">
                {column_menu.then(|| view! {
                    <details class="dropdown column-menu">
                        <summary class="btn btn-secondary" title=move || tr.with_value(|c| c.t(Message::Columns))>
                            <ColumnsIcon/>
                        </summary>
                        <div class="dropdown-panel">{column_toggles}</div>
                    </details>
                })}
                {has_export.then(|| view! {
                    <button class="btn btn-secondary" on:click=export
                        title=move || tr.with_value(|c| c.t(Message::Export))>
                        <DownloadIcon/>
                    </button>
                })}
                {fullscreen.then(|| view! {
                    <button class="btn btn-secondary" on:click=move |_| state.update(|s| s.toggle_fullscreen())>
                        <FullscreenIcon/>
                    </button>
                })}
                {children.map(|c| c())}
            </div>
        </div>
    };

    // ------------------------------------------------------------------------
    // Header
    // ------------------------------------------------------------------------

    let header_cell = move |index: usize| {
        let col = columns.with_value(|all| all[index].clone());
        let key = store_value(col.key.clone());
        let sortable = col.sorter.is_some();
        let direction = move || state.with(|s| key.with_value(|k| s.sort_direction(k)));
        let class = move || {
            let pin = state.with(|s| key.with_value(|k| s.pin_of(k)));
            format!("{} {}", pin_class(pin), if sortable { "sortable" } else { "" })
        };
        let aria_sort = move || match direction() {
            Some(SortDirection::Ascending) => "ascending",
            Some(SortDirection::Descending) => "descending",
            None => "none",
        };
        let indicator = move || match direction() {
            Some(SortDirection::Ascending) => "▲",
            Some(SortDirection::Descending) => "▼",
            None => "↕",
        };
        let width = col.width.as_ref().map(|w| format!("width: {}", w));
        let title = col.title.clone();

        let filter_menu = col.filter.is_some().then(|| {
            let col = col.clone();
            let choices = move || rows.with(|data| col.filter_choices(data));
            view! {
                <details class="dropdown filter-menu">
                    <summary class="btn btn-icon" title=move || tr.with_value(|c| c.t(Message::Filter))
                        class:active=move || state.with(|s| key.with_value(|k| s.filters.contains_key(k)))>
                        <FilterIcon/>
                    </summary>
                    <div class="dropdown-panel">
                        {move || choices().into_iter().map(|choice| {
                            let value = choice.value.clone();
                            let value_toggle = choice.value.clone();
                            view! {
                                <label class="filter-option">
                                    <input
                                        type="checkbox"
                                        prop:checked=move || state.with(|s| key.with_value(|k| {
                                            s.filters.get(k).is_some_and(|v| v.contains(&value))
                                        }))
                                        on:change=move |_| state.update(|s| {
                                            key.with_value(|k| {
                                                let mut active: BTreeSet<String> =
                                                    s.filters.get(k).cloned().unwrap_or_default();
                                                if !active.remove(&value_toggle) {
                                                    active.insert(value_toggle.clone());
                                                }
                                                s.set_filter(k, active);
                                            })
                                        })
                                    />
                                    {choice.text}
                                </label>
                            }
                        }).collect_view()}
                    </div>
                </details>
            }
        });

        view! {
            <th scope="col" class=class style=width aria-sort=aria_sort>
                <div class="th-content">
                    {if sortable {
                        view! {
                            <button class="sort-button" on:click=move |_| state.update(|s| key.with_value(|k| s.toggle_sort(k)))>
                                {title}
                                <span class="sort-indicator">{indicator}</span>
                            </button>
                        }.into_view()
                    } else {
                        view! { <span>{title}</span> }.into_view()
                    }}
                    {filter_menu}
                </div>
            </th>
        }
    };

    let select_all = move |ev: ev::Event| {
        let checked = event_target_checked(&ev);
        let keys: Vec<RowKey> = snapshot.with(|s| s.rows.iter().map(|(k, _)| k.clone()).collect());
        state.update(|s| s.selection.select_page(keys.iter(), checked));
        if let Some(cb) = on_select_all {
            cb.call((checked, keys));
        }
        emit_change();
    };
    let page_check = move || {
        snapshot.with(|snap| state.with(|s| s.selection.page_check(snap.rows.iter().map(|(k, _)| k))))
    };

    let head = move || {
        let indices = snapshot.with(|s| s.columns.clone());
        view! {
            <tr>
                {match selection_mode {
                    Some(SelectionMode::Multiple) => view! {
                        <th class="select-cell">
                            <input
                                type="checkbox"
                                aria-label="Select page"
                                prop:checked=move || page_check() == PageCheck::All
                                prop:indeterminate=move || page_check() == PageCheck::Partial
                                on:change=select_all
                            />
                        </th>
                    }.into_view(),
                    Some(SelectionMode::Single) => view! { <th class="select-cell"></th> }.into_view(),
                    None => ().into_view(),
                }}
                {indices.into_iter().map(header_cell).collect_view()}
                {expandable.then(|| view! { <th class="expand-cell"></th> })}
            </tr>
        }
    };

    // ------------------------------------------------------------------------
    // Body
    // ------------------------------------------------------------------------

    let render_row = move |(key, record): (RowKey, Record), indices: Rc<Vec<usize>>, span: usize| {
        let key = store_value(key);
        let selected = move || state.with(|s| key.with_value(|k| s.selection.is_selected(k)));
        let is_expanded = move || state.with(|s| key.with_value(|k| s.expanded.contains(k)));

        let on_toggle = move |ev: ev::Event| {
            let checked = event_target_checked(&ev);
            let k = key.get_value();
            state.update(|s| s.selection.select(k.clone(), checked));
            if let Some(cb) = on_select {
                cb.call((k, checked));
            }
            emit_change();
        };

        let select_cell = selection_mode.map(|mode| {
            let input_type = if mode == SelectionMode::Single { "radio" } else { "checkbox" };
            view! {
                <td class="select-cell">
                    <input type=input_type prop:checked=selected on:change=on_toggle aria-label="Select row"/>
                </td>
            }
        });

        let body_cells = indices
            .iter()
            .map(|&i| {
                let (view, pin) = columns.with_value(|all| {
                    let col = &all[i];
                    let pin = state.with_untracked(|s| s.pin_of(&col.key));
                    let view = cells.with_value(|c| tr.with_value(|t| render_cell(col, &record, c, t)));
                    (view, pin)
                });
                view! { <td class=pin_class(pin)>{view}</td> }
            })
            .collect_view();

        let expand_cell = expandable.then(|| {
            view! {
                <td class="expand-cell">
                    <button
                        class="btn btn-icon expand-toggle"
                        class:open=is_expanded
                        aria-expanded=move || is_expanded().to_string()
                        on:click=move |_| state.update(|s| s.toggle_expanded(key.get_value()))
                    >
                        <ChevronIcon/>
                    </button>
                </td>
            }
        });

        let detail = expanded.with_value(|e| e.clone()).map(|render| {
            let content = render(&record);
            view! {
                <Show when=is_expanded>
                    <tr class="expanded-row">
                        <td colspan=span>{content.clone()}</td>
                    </tr>
                </Show>
            }
        });

        view! {
            <tr class:selected=selected>
                {select_cell}
                {body_cells}
                {expand_cell}
            </tr>
            {detail}
        }
    };

    let body = move || {
        let snap = snapshot.get();
        match snap.plan {
            BodyPlan::Skeleton { rows, cells } => (0..rows)
                .map(|_| view! { <SkeletonRow cells=cells/> })
                .collect_view(),
            BodyPlan::Empty { colspan } => view! {
                <tr class="empty-row">
                    <td colspan=colspan>{move || tr.with_value(|c| c.t(Message::NoData))}</td>
                </tr>
            }
            .into_view(),
            BodyPlan::Rows => {
                let indices = Rc::new(snap.columns);
                snap.rows
                    .into_iter()
                    .map(|row| render_row(row, indices.clone(), snap.span))
                    .collect_view()
            }
        }
    };

    // ------------------------------------------------------------------------
    // Pager
    // ------------------------------------------------------------------------

    let pager = pagination.map(|config| {
        let summary = move || {
            snapshot.with(|s| match s.range {
                Some((from, to)) => format!("{}–{} / {}", from, to, s.total),
                None => format!("0 / {}", s.total),
            })
        };
        let size_changer = config.show_size_changer.then(|| {
            let sizes = config.page_size_options.clone();
            view! {
                <label class="page-size">
                    {move || tr.with_value(|c| c.t(Message::RowsPerPage))}
                    <select
                        prop:value=move || state.with(|s| s.page_size.to_string())
                        on:change=move |ev| {
                            if let Ok(size) = event_target_value(&ev).parse::<usize>() {
                                state.update(|s| s.set_page_size(size));
                            }
                        }
                    >
                        {sizes.into_iter().map(|n| view! { <option value=n.to_string()>{n}</option> }).collect_view()}
                    </select>
                </label>
            }
        });
        let go = move |delta: isize| {
            let page = snapshot.with(|s| s.page).saturating_add_signed(delta);
            state.update(|s| s.set_page(page));
        };

        view! {
            <div class="table-footer">
                <span class="range-summary">{summary}</span>
                {size_changer}
                <div class="pager">
                    <button class="btn btn-secondary" disabled=move || snapshot.with(|s| s.page <= 1)
                        on:click=move |_| go(-1)>"‹"</button>
                    <span class="page-indicator">
                        {move || snapshot.with(|s| format!("{} / {}", s.page, s.page_count.max(1)))}
                    </span>
                    <button class="btn btn-secondary" disabled=move || snapshot.with(|s| s.page >= s.page_count)
                        on:click=move |_| go(1)>"›"</button>
                </div>
            </div>
        }
    });

    view! {
        <div class="data-table" class:fullscreen=move || state.with(|s| s.fullscreen)>
            {toolbar}
            <div class="table-scroll">
                <table role="table">
                    <thead>{head}</thead>
                    <tbody>{body}</tbody>
                </table>
            </div>
            {pager}
        </div>
    }
}

/// Default rendering of one cell from its column format
fn render_cell(col: &Column, record: &Record, cells: &CellRenderers, ctx: &AppContext) -> View {
    if let Some(render) = cells.get(&col.key) {
        return render(record);
    }
    let text = col.display(record);
    match &col.format {
        CellFormat::Text | CellFormat::Date | CellFormat::Boolean { .. } => text.into_view(),
        CellFormat::Number => view! { <span class="mono">{text}</span> }.into_view(),
        CellFormat::Badge if text.is_empty() => ().into_view(),
        CellFormat::Badge => {
            let variant = BadgeVariant::for_status(&text);
            view! { <Badge text=text variant=variant/> }.into_view()
        }
        CellFormat::Image => match public_url(ctx, &text) {
            Some(src) => view! { <img class="cell-image" src=src alt="" loading="lazy"/> }.into_view(),
            None => ().into_view(),
        },
        CellFormat::Link => match public_url(ctx, &text) {
            Some(href) => view! {
                <a class="cell-link" href=href target="_blank" rel="noopener">
                    {ctx.t(Message::Download)}
                </a>
            }
            .into_view(),
            None => ().into_view(),
        },
        CellFormat::Tags => match col.project(record).as_deref() {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| view! { <span class="tag">{display_text(item)}</span> })
                .collect_view(),
            _ => text.into_view(),
        },
    }
}

/// Resolve an uploaded path to a URL the page may load
fn public_url(ctx: &AppContext, path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let url = ctx.query.file_url(path).ok()?;
    ctx.config.client.is_allowed_image(&url).then_some(url)
}
