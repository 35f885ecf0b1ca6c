//! Generic form builder component
//!
//! Renders a [`FormSchema`] and binds every control to a [`FormState`]
//! signal. All edits go through [`FormState::input`], so masking, coercion
//! and validation are the same for every field kind. Drafts are written to
//! local storage on change when the schema is persisted, and restored on
//! mount.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use gloo_timers::callback::Interval;
use leptos::*;
use libris_core::form::{Draft, Field, FieldKind, FieldValue, FormSchema, FormState, FormValues, RawInput};
use libris_core::{KeyValueStore, Message, Record};
use tracing::{debug, warn};

use super::icons::{RedoIcon, UndoIcon};
use crate::files::{file_ref, picked_files};
use crate::state::AppContext;
use crate::storage::LocalStore;

/// How often the autosave schedule is checked
const AUTOSAVE_TICK_MS: u32 = 1_000;

/// A successful submission: visible values plus the files picked for them
#[derive(Clone, Default)]
pub struct Submission {
    pub values: FormValues,
    pub files: HashMap<String, Vec<web_sys::File>>,
}

impl Submission {
    /// First file picked for `field`
    pub fn file(&self, field: &str) -> Option<&web_sys::File> {
        self.files.get(field).and_then(|f| f.first())
    }
}

/// Storage entry written on an autosave tick; forms without persistence only
/// report their values
fn autosave_entry(form: &FormState) -> Option<(String, Draft)> {
    form.schema()
        .persist
        .then(|| (form.storage_key(), form.draft()))
}

fn save_draft(key: &str, draft: &Draft) {
    if let Err(e) = LocalStore.set_json(key, draft) {
        warn!(key, error = %e, "Draft not saved");
    }
}

#[component]
pub fn AutoForm(
    #[prop(into)] schema: Arc<FormSchema>,
    /// Record being edited; fields bind by name
    #[prop(optional)]
    initial: Option<Record>,
    on_submit: Callback<Submission>,
    #[prop(optional)] on_cancel: Option<Callback<()>>,
    /// Called with the current values each time an autosave runs
    #[prop(optional)]
    on_autosave: Option<Callback<FormValues>>,
    #[prop(optional, into)] submit_label: Option<Signal<String>>,
    #[prop(optional, into)] busy: MaybeSignal<bool>,
    /// Show undo / redo / reset
    #[prop(optional)]
    history: bool,
) -> impl IntoView {
    let ctx = store_value(expect_context::<AppContext>());

    let mut state = match &initial {
        Some(record) => FormState::from_record(schema.clone(), record),
        None => FormState::new(schema.clone()),
    };
    if schema.persist {
        if let Some(draft) = LocalStore.get_json::<Draft>(&state.storage_key()) {
            debug!(form = %schema.id, "Restored form draft");
            state.restore(draft);
        }
    }
    let form = create_rw_signal(state);
    let files = store_value(HashMap::<String, Vec<web_sys::File>>::new());
    let last_saved = create_rw_signal(None::<DateTime<Utc>>);

    if schema.persist {
        create_effect(move |_| {
            let (dirty, key, draft) = form.with(|f| (f.is_dirty(), f.storage_key(), f.draft()));
            if dirty {
                save_draft(&key, &draft);
            }
        });
    }

    if schema.autosave.is_some() {
        let timer = Interval::new(AUTOSAVE_TICK_MS, move || {
            let now = Utc::now();
            if form.try_with_untracked(|f| f.autosave_due(now)) != Some(true) {
                return;
            }
            let (entry, values) = form.with_untracked(|f| (autosave_entry(f), f.values().clone()));
            if let Some((key, draft)) = entry {
                save_draft(&key, &draft);
            }
            form.update(|f| f.mark_saved(now));
            last_saved.set(Some(now));
            if let Some(cb) = on_autosave {
                cb.call(values);
            }
        });
        on_cleanup(move || drop(timer));
    }

    let schema = store_value(schema);

    // Structure only changes with the step or with dependency visibility, so
    // controls keep focus while typing
    let layout = create_memo(move |_| {
        form.with(|f| {
            f.grouped_step_fields()
                .into_iter()
                .map(|(group, fields)| {
                    let names: Vec<String> = fields.into_iter().map(|x| x.name.clone()).collect();
                    (group, names)
                })
                .collect::<Vec<_>>()
        })
    });

    let field_view = move |field: Field| render_field(field, form, files);

    let groups = move || {
        layout
            .get()
            .into_iter()
            .map(|(group, names)| {
                let fields = schema.with_value(|s| {
                    names
                        .iter()
                        .filter_map(|n| s.field(n).cloned())
                        .collect::<Vec<_>>()
                });
                view! {
                    <fieldset class="form-group">
                        {group.map(|title| view! { <legend>{title}</legend> })}
                        <div class="form-grid">
                            {fields.into_iter().map(field_view).collect_view()}
                        </div>
                    </fieldset>
                }
            })
            .collect_view()
    };

    let steps = move || {
        let (titles, count) = schema.with_value(|s| (s.steps.clone(), s.step_count()));
        (count > 1).then(|| {
            let current = form.with(|f| f.step());
            view! {
                <ol class="form-steps">
                    {(0..count).map(|i| {
                        let title = titles.get(i).cloned().unwrap_or_else(|| (i + 1).to_string());
                        view! {
                            <li class:active=i == current class:done=i < current>
                                <span class="step-number">{i + 1}</span>
                                <span class="step-title">{title}</span>
                            </li>
                        }
                    }).collect_view()}
                </ol>
            }
        })
    };

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if !form.with_untracked(|f| f.is_last_step()) {
            form.update(|f| {
                f.next_step();
            });
            return;
        }
        let mut outcome = None;
        form.update(|f| outcome = Some(f.submit()));
        match outcome {
            Some(Ok(values)) => {
                let picked = files.with_value(|m| {
                    m.iter()
                        .filter(|(name, _)| values.contains_key(*name))
                        .map(|(name, list)| (name.clone(), list.clone()))
                        .collect()
                });
                let key = form.with_untracked(|f| f.storage_key());
                form.update(|f| f.mark_submitted());
                if schema.with_value(|s| s.persist) {
                    if let Err(e) = LocalStore.remove(&key) {
                        warn!(key, error = %e, "Draft not removed");
                    }
                }
                on_submit.call(Submission {
                    values,
                    files: picked,
                });
            }
            Some(Err(errors)) => debug!(errors = errors.len(), "Form has errors"),
            None => {}
        }
    };

    let t = move |m: Message| ctx.with_value(|c| c.t(m));
    let submit_text = move || match submit_label {
        Some(label) if form.with(|f| f.is_last_step()) => label.get(),
        _ if form.with(|f| f.is_last_step()) => t(Message::Submit).to_string(),
        _ => t(Message::Next).to_string(),
    };

    view! {
        <form class="auto-form" on:submit=submit novalidate=true>
            {steps}
            {groups}
            <div class="form-actions">
                {history.then(|| view! {
                    <div class="form-history">
                        <button type="button" class="btn btn-icon" title=move || t(Message::Undo)
                            disabled=move || !form.with(|f| f.can_undo())
                            on:click=move |_| form.update(|f| { f.undo(); })>
                            <UndoIcon/>
                        </button>
                        <button type="button" class="btn btn-icon" title=move || t(Message::Redo)
                            disabled=move || !form.with(|f| f.can_redo())
                            on:click=move |_| form.update(|f| { f.redo(); })>
                            <RedoIcon/>
                        </button>
                        <button type="button" class="btn btn-secondary"
                            disabled=move || !form.with(|f| f.is_dirty())
                            on:click=move |_| form.update(|f| f.reset())>
                            {move || t(Message::Reset)}
                        </button>
                    </div>
                })}
                {move || last_saved.get().map(|at| view! {
                    <span class="autosave-status">
                        {format!("{} {}", t(Message::Saved), at.with_timezone(&chrono::Local).format("%H:%M:%S"))}
                    </span>
                })}
                <div class="form-buttons">
                    {on_cancel.map(|cancel| view! {
                        <button type="button" class="btn btn-secondary" on:click=move |_| cancel.call(())>
                            {move || t(Message::Cancel)}
                        </button>
                    })}
                    <Show when=move || form.with(|f| f.step() > 0)>
                        <button type="button" class="btn btn-secondary" on:click=move |_| form.update(|f| { f.prev_step(); })>
                            {move || t(Message::Back)}
                        </button>
                    </Show>
                    <button type="submit" class="btn btn-primary" disabled=move || busy.get()>
                        {submit_text}
                    </button>
                </div>
            </div>
        </form>
    }
}

// ============================================================================
// Field controls
// ============================================================================

fn render_field(
    field: Field,
    form: RwSignal<FormState>,
    files: StoredValue<HashMap<String, Vec<web_sys::File>>>,
) -> View {
    let name = store_value(field.name.clone());
    let id = format!("field-{}", field.name);
    let input = move |raw: RawInput| {
        form.update(|f| {
            name.with_value(|n| {
                f.input(n, raw);
            })
        })
    };
    let blur = move |_: ev::FocusEvent| form.update(|f| name.with_value(|n| f.blur(n)));
    let text = move || form.with(|f| name.with_value(|n| f.value(n).map(FieldValue::as_text)).unwrap_or_default());
    let checked = move || form.with(|f| name.with_value(|n| f.value(n).is_some_and(FieldValue::as_bool)));
    let error = move || {
        form.with(|f| {
            name.with_value(|n| {
                f.is_touched(n)
                    .then(|| f.error(n).map(|e| e.to_string()))
                    .flatten()
            })
        })
    };

    let placeholder = field.placeholder.clone().unwrap_or_default();
    let disabled = field.disabled;
    let required = field.required;

    let control = match &field.kind {
        FieldKind::Text | FieldKind::Email | FieldKind::Tel | FieldKind::Password | FieldKind::Date | FieldKind::Color => view! {
            <input
                id=id.clone()
                type=field.kind.input_type()
                class="form-input"
                placeholder=placeholder
                disabled=disabled
                required=required
                prop:value=text
                on:input=move |ev| input(RawInput::text(event_target_value(&ev)))
                on:blur=blur
            />
        }
        .into_view(),
        FieldKind::Number { min, max, step } => view! {
            <input
                id=id.clone()
                type="number"
                class="form-input"
                placeholder=placeholder
                min=min.map(|v| v.to_string())
                max=max.map(|v| v.to_string())
                step=step.map(|v| v.to_string())
                disabled=disabled
                prop:value=text
                on:input=move |ev| input(RawInput::text(event_target_value(&ev)))
                on:blur=blur
            />
        }
        .into_view(),
        FieldKind::Range { min, max, step } => view! {
            <div class="form-range">
                <input
                    id=id.clone()
                    type="range"
                    min=min.to_string()
                    max=max.to_string()
                    step=step.to_string()
                    disabled=disabled
                    prop:value=text
                    on:input=move |ev| input(RawInput::text(event_target_value(&ev)))
                />
                <output class="range-value">{text}</output>
            </div>
        }
        .into_view(),
        FieldKind::Textarea { rows } => view! {
            <textarea
                id=id.clone()
                class="form-input"
                rows=*rows
                placeholder=placeholder
                disabled=disabled
                prop:value=text
                on:input=move |ev| input(RawInput::text(event_target_value(&ev)))
                on:blur=blur
            ></textarea>
        }
        .into_view(),
        FieldKind::Select { options, multiple: false } => {
            let options = options.clone();
            view! {
                <select
                    id=id.clone()
                    class="form-input"
                    disabled=disabled
                    prop:value=text
                    on:change=move |ev| input(RawInput::text(event_target_value(&ev)))
                    on:blur=blur
                >
                    <option value="">{if placeholder.is_empty() { "—".to_string() } else { placeholder }}</option>
                    {options.into_iter().map(|o| view! { <option value=o.value>{o.label}</option> }).collect_view()}
                </select>
            }
            .into_view()
        }
        FieldKind::Select { options, multiple: true } => {
            let selected = move || {
                form.with(|f| {
                    name.with_value(|n| match f.value(n) {
                        Some(FieldValue::List(items)) => items.clone(),
                        _ => Vec::new(),
                    })
                })
            };
            view! {
                <div class="form-choices" role="group">
                    {options.clone().into_iter().map(|o| {
                        let value = store_value(o.value);
                        view! {
                            <label class="form-choice">
                                <input
                                    type="checkbox"
                                    disabled=disabled
                                    prop:checked=move || value.with_value(|v| selected().contains(v))
                                    on:change=move |ev| {
                                        let mut items = selected();
                                        let v = value.get_value();
                                        items.retain(|i| *i != v);
                                        if event_target_checked(&ev) {
                                            items.push(v);
                                        }
                                        input(RawInput::Selected(items));
                                    }
                                />
                                {o.label}
                            </label>
                        }
                    }).collect_view()}
                </div>
            }
            .into_view()
        }
        FieldKind::Checkbox => view! {
            <input
                id=id.clone()
                type="checkbox"
                class="form-checkbox"
                disabled=disabled
                prop:checked=checked
                on:change=move |ev| input(RawInput::Checked(event_target_checked(&ev)))
            />
        }
        .into_view(),
        FieldKind::Switch => view! {
            <label class="switch">
                <input
                    id=id.clone()
                    type="checkbox"
                    role="switch"
                    disabled=disabled
                    prop:checked=checked
                    aria-checked=move || checked().to_string()
                    on:change=move |ev| input(RawInput::Checked(event_target_checked(&ev)))
                />
                <span class="switch-track"></span>
            </label>
        }
        .into_view(),
        FieldKind::File { accept, multiple } => view! {
            <div class="form-file">
                <input
                    id=id.clone()
                    type="file"
                    accept=accept.clone()
                    multiple=*multiple
                    disabled=disabled
                    on:change=move |ev| {
                        let element = event_target::<web_sys::HtmlInputElement>(&ev);
                        let picked = picked_files(&element);
                        let refs = picked.iter().map(file_ref).collect();
                        files.update_value(|m| {
                            m.insert(name.get_value(), picked);
                        });
                        input(RawInput::Files(refs));
                    }
                />
                <span class="file-current">{text}</span>
            </div>
        }
        .into_view(),
    };

    let class = format!("form-field {}", field.layout.classes());
    view! {
        <div class=class class:has-error=move || error().is_some()>
            <label class="form-label" for=id>
                {field.label}
                {required.then(|| view! { <span class="required" aria-hidden="true">"*"</span> })}
            </label>
            {control}
            {field.description.map(|d| view! { <p class="form-help">{d}</p> })}
            {move || error().map(|e| view! { <p class="form-error" role="alert">{e}</p> })}
        </div>
    }
    .into_view()
}
