//! Minimal SVG charts for the dashboard

use leptos::*;

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 240.0;
const PADDING: f64 = 28.0;

/// One labelled group of bars
#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    pub label: String,
    pub values: Vec<u64>,
}

/// Grouped bar chart; `series` names the bars of each group in order
#[component]
pub fn BarChart(
    #[prop(into)] groups: Signal<Vec<BarGroup>>,
    series: Vec<&'static str>,
) -> impl IntoView {
    let series_len = series.len().max(1);
    let legend = series
        .iter()
        .enumerate()
        .map(|(i, name)| {
            view! {
                <span class="legend-item">
                    <span class=format!("legend-swatch series-{}", i)></span>
                    {*name}
                </span>
            }
        })
        .collect_view();

    let bars = move || {
        let groups = groups.get();
        let max = groups
            .iter()
            .flat_map(|g| g.values.iter().copied())
            .max()
            .unwrap_or(0)
            .max(1) as f64;
        let slot = (WIDTH - 2.0 * PADDING) / groups.len().max(1) as f64;
        let bar = slot * 0.8 / series_len as f64;

        groups
            .into_iter()
            .enumerate()
            .map(|(gi, group)| {
                let x0 = PADDING + gi as f64 * slot + slot * 0.1;
                let rects = group
                    .values
                    .iter()
                    .enumerate()
                    .map(|(si, &value)| {
                        let h = (HEIGHT - 2.0 * PADDING) * value as f64 / max;
                        view! {
                            <rect
                                class=format!("bar series-{}", si)
                                x={x0 + si as f64 * bar}
                                y={HEIGHT - PADDING - h}
                                width=bar
                                height=h
                            >
                                <title>{format!("{}: {}", group.label, value)}</title>
                            </rect>
                        }
                    })
                    .collect_view();
                view! {
                    <g>
                        {rects}
                        <text class="axis-label" x={x0 + slot * 0.4} y={HEIGHT - PADDING / 3.0} text-anchor="middle">
                            {group.label.clone()}
                        </text>
                    </g>
                }
            })
            .collect_view()
    };

    view! {
        <div class="chart">
            <svg viewBox=format!("0 0 {} {}", WIDTH, HEIGHT) role="img" preserveAspectRatio="xMidYMid meet">
                <line class="axis" x1=PADDING y1={HEIGHT - PADDING} x2={WIDTH - PADDING} y2={HEIGHT - PADDING}/>
                {bars}
            </svg>
            <div class="chart-legend">{legend}</div>
        </div>
    }
}
