//! Interactive HTML output backed by Plotly

use crate::chart::{ChartRenderer, ComparisonChart, OutputFormat};
use crate::error::Result;
use minijinja::{Environment, context};
use serde_json::{Value, json};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const TEMPLATE_NAME: &str = "comparison.html";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{ title }}</title>
<script src="{{ plotly_src }}"></script>
<style>
  body { font-family: sans-serif; margin: 0; padding: 1rem; }
  #chart { width: 100%; height: 90vh; }
  .missing { color: #a94442; }
</style>
</head>
<body>
<div id="chart"></div>
{% if missing %}<p class="missing">No data for: {{ missing | join(", ") }}</p>
{% endif %}<script>
const figure = {{ figure | safe }};
Plotly.newPlot("chart", figure.data, figure.layout, { responsive: true });
</script>
</body>
</html>
"#;

/// Renders a self-contained page with a Plotly figure
pub struct HtmlRenderer {
    plotly_src: String,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self {
            plotly_src: PLOTLY_CDN.to_string(),
        }
    }

    /// Load plotly.js from `src` instead of the public CDN
    pub fn with_plotly_src(mut self, src: impl Into<String>) -> Self {
        self.plotly_src = src.into();
        self
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRenderer for HtmlRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }

    fn render(&self, chart: &ComparisonChart) -> Result<String> {
        let figure = script_safe_json(&plotly_figure(chart))?;

        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, PAGE_TEMPLATE)?;
        let page = env.get_template(TEMPLATE_NAME)?.render(context! {
            title => &chart.title,
            plotly_src => &self.plotly_src,
            missing => &chart.missing,
            figure => figure,
        })?;

        Ok(page)
    }
}

/// Build the Plotly `{ data, layout }` object for `chart`
pub fn plotly_figure(chart: &ComparisonChart) -> Value {
    let [(left_start, left_end), (right_start, right_end)] = chart.column_domains();

    let mut data: Vec<Value> = chart
        .daily
        .traces
        .iter()
        .map(|trace| {
            json!({
                "type": "scatter",
                "mode": "lines+markers",
                "name": trace.ticker,
                "x": trace.points.iter().map(|p| p.date.format("%Y-%m-%d").to_string()).collect::<Vec<_>>(),
                "y": trace.points.iter().map(|p| p.pct_change).collect::<Vec<_>>(),
                "customdata": trace.points.iter().map(|p| [p.tooltip.open, p.tooltip.close]).collect::<Vec<_>>(),
                "hovertemplate": trace.hover_template(),
                "xaxis": "x",
                "yaxis": "y",
            })
        })
        .collect();

    let bars = &chart.overall;
    data.push(json!({
        "type": "bar",
        "name": bars.series_name,
        "x": bars.bars.iter().map(|b| b.ticker.as_str()).collect::<Vec<_>>(),
        "y": bars.bars.iter().map(|b| b.value).collect::<Vec<_>>(),
        "marker": { "color": bars.color.css() },
        "xaxis": "x2",
        "yaxis": "y2",
    }));

    let hovermode = if chart.unified_hover { "x unified" } else { "closest" };
    let layout = json!({
        "title": { "text": chart.title },
        "hovermode": hovermode,
        "barmode": "group",
        "xaxis": {
            "domain": [left_start, left_end],
            "anchor": "y",
            "title": { "text": chart.daily.x_title },
        },
        "yaxis": {
            "anchor": "x",
            "title": { "text": chart.daily.y_title },
        },
        "xaxis2": {
            "domain": [right_start, right_end],
            "anchor": "y2",
            "title": { "text": bars.x_title },
            "tickangle": bars.tick_angle,
        },
        "yaxis2": {
            "anchor": "x2",
            "title": { "text": bars.y_title },
        },
        "annotations": [
            subplot_title(&chart.daily.title, (left_start + left_end) / 2.0),
            subplot_title(&bars.title, (right_start + right_end) / 2.0),
        ],
    });

    json!({ "data": data, "layout": layout })
}

fn subplot_title(text: &str, x: f64) -> Value {
    json!({
        "text": text,
        "x": x,
        "y": 1.0,
        "xref": "paper",
        "yref": "paper",
        "xanchor": "center",
        "yanchor": "bottom",
        "showarrow": false,
        "font": { "size": 16 },
    })
}

// Ticker names end up inside a <script> block.
fn script_safe_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}
