//! Server-rendered prediction page
//!
//! The page is rebuilt on every interaction: the form always renders with
//! bounded controls, the assembled record is echoed back, and a result
//! banner appears only when a prediction was requested and served.

use predictor_lib::collector::{FieldSpec, WidgetKind, FEATURE_SCHEMA};
use predictor_lib::predictor::{unavailable_message, BannerStyle, ResultView};
use predictor_lib::{FeatureRecord, FieldValue, ValidationError};
use std::fmt::Write;
use std::path::Path;

const STYLE: &str = r#"
        body { font-family: system-ui, -apple-system, sans-serif; margin: 0; color: #1f2933; background: #f5f7fa; }
        .layout { display: flex; min-height: 100vh; }
        aside { width: 340px; background: #ffffff; border-right: 1px solid #d9e2ec; padding: 20px; }
        main { flex: 1; padding: 30px 40px; }
        h1 { font-size: 22px; margin-top: 0; }
        .field { margin-bottom: 14px; }
        .field label { display: block; font-weight: 600; font-size: 14px; margin-bottom: 4px; }
        .field input, .field select { width: 100%; box-sizing: border-box; }
        .actions button { padding: 8px 16px; margin-right: 8px; border-radius: 4px; border: 1px solid #1db954; background: #fff; }
        .actions button.primary { background: #1db954; color: #fff; font-weight: 600; }
        .actions button:disabled { background: #cbd2d9; border-color: #cbd2d9; cursor: not-allowed; }
        table { border-collapse: collapse; background: #fff; font-size: 13px; }
        th, td { border: 1px solid #d9e2ec; padding: 6px 8px; text-align: right; }
        .banner { padding: 14px 18px; border-radius: 6px; font-weight: 700; margin: 16px 0; }
        .banner.success { background: #e3f9e5; color: #05400a; }
        .banner.error { background: #ffe3e3; color: #610404; }
        .banner.warning { background: #fffbea; color: #513c06; }
        .progress { background: #d9e2ec; border-radius: 4px; height: 14px; width: 100%; max-width: 600px; }
        .progress .bar { background: #1db954; height: 14px; border-radius: 4px; }
"#;

/// What happened on this interaction
#[derive(Debug, Clone)]
pub enum PageOutcome {
    Prediction(ResultView),
    /// Inference failed for this attempt only
    Failed(String),
    /// Input was rejected before a record was built
    Invalid(ValidationError),
}

pub struct PageModel<'a> {
    pub record: &'a FeatureRecord,
    pub model_path: &'a Path,
    /// Load failure detail; `Some` disables the predict trigger
    pub unavailable: Option<String>,
    pub outcome: Option<PageOutcome>,
}

pub fn render_page(model: &PageModel<'_>) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n");
    html.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("    <title>Spotify Hit Predictor</title>\n    <style>");
    html.push_str(STYLE);
    html.push_str("    </style>\n</head>\n<body>\n<div class=\"layout\">\n");

    render_sidebar(&mut html, model);

    html.push_str("<main>\n<h1>Your model in action</h1>\n");
    html.push_str("<p>Adjust the song characteristics on the left and ask the model for a verdict.</p>\n");

    if let Some(detail) = &model.unavailable {
        let _ = writeln!(
            html,
            "<div class=\"banner warning\" id=\"model-unavailable\">{}<br><small>{}</small></div>",
            escape(&unavailable_message(model.model_path)),
            escape(detail)
        );
    }

    render_record(&mut html, model.record);

    match &model.outcome {
        Some(PageOutcome::Prediction(view)) => render_result(&mut html, view),
        Some(PageOutcome::Failed(message)) => {
            let _ = writeln!(
                html,
                "<div class=\"banner error\" id=\"prediction-error\">An error occurred during prediction: {}</div>",
                escape(message)
            );
        }
        Some(PageOutcome::Invalid(error)) => {
            html.push_str("<div class=\"banner error\" id=\"validation-error\">Some values were rejected:<ul>\n");
            for issue in &error.issues {
                let _ = writeln!(html, "<li>{} {}</li>", escape(&issue.field), escape(&issue.reason));
            }
            html.push_str("</ul></div>\n");
        }
        None => {}
    }

    html.push_str("</main>\n</div>\n</body>\n</html>\n");
    html
}

fn render_sidebar(html: &mut String, model: &PageModel<'_>) {
    html.push_str("<aside>\n<h1>Spotify Hit Predictor</h1>\n<h2>Song characteristics</h2>\n");
    html.push_str("<form method=\"get\" action=\"/\" id=\"controls\" onchange=\"this.submit()\">\n");

    for (spec, (_, value)) in FEATURE_SCHEMA.iter().zip(model.record.values()) {
        render_control(html, spec, value);
    }

    let disabled = if model.unavailable.is_some() { " disabled" } else { "" };
    html.push_str("<div class=\"actions\">\n<button type=\"submit\">Update</button>\n");
    let _ = writeln!(
        html,
        "<button type=\"submit\" class=\"primary\" name=\"action\" value=\"predict\" id=\"predict\"{}>Predict hit!</button>",
        disabled
    );
    html.push_str("</div>\n</form>\n</aside>\n");
}

fn render_control(html: &mut String, spec: &FieldSpec, value: FieldValue) {
    let _ = writeln!(html, "<div class=\"field\">");
    match spec.widget {
        WidgetKind::Slider => {
            let _ = writeln!(
                html,
                "<label for=\"{name}\">{label} <output id=\"{name}-out\">{value}</output></label>\n\
                 <input type=\"range\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\" \
                 oninput=\"document.getElementById('{name}-out').value=this.value\">",
                name = spec.name,
                label = escape(spec.label),
                min = spec.format_value(spec.min),
                max = spec.format_value(spec.max),
                step = spec.step,
                value = value,
            );
        }
        WidgetKind::Number => {
            let _ = writeln!(
                html,
                "<label for=\"{name}\">{label}</label>\n\
                 <input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\" required>",
                name = spec.name,
                label = escape(spec.label),
                min = spec.format_value(spec.min),
                max = spec.format_value(spec.max),
                step = spec.step,
                value = value,
            );
        }
        WidgetKind::Choice => {
            let _ = writeln!(
                html,
                "<label for=\"{name}\">{label}</label>\n<select id=\"{name}\" name=\"{name}\">",
                name = spec.name,
                label = escape(spec.label),
            );
            let current = value.as_f64().round() as i64;
            for option in spec.choices() {
                let selected = if option == current { " selected" } else { "" };
                let _ = writeln!(html, "<option value=\"{0}\"{1}>{0}</option>", option, selected);
            }
            html.push_str("</select>\n");
        }
    }
    html.push_str("</div>\n");
}

fn render_record(html: &mut String, record: &FeatureRecord) {
    html.push_str("<h2>Song characteristics entered</h2>\n<table id=\"record\">\n<tr>");
    let values = record.values();
    for (name, _) in values.iter() {
        let _ = write!(html, "<th>{}</th>", name);
    }
    html.push_str("</tr>\n<tr>");
    for (_, value) in values.iter() {
        let _ = write!(html, "<td>{}</td>", value);
    }
    html.push_str("</tr>\n</table>\n");
}

fn render_result(html: &mut String, view: &ResultView) {
    let class = match view.style {
        BannerStyle::Success => "success",
        BannerStyle::Error => "error",
    };
    html.push_str("<h2>Prediction result</h2>\n");
    let _ = writeln!(
        html,
        "<div class=\"banner {}\" id=\"verdict\">{}</div>",
        class,
        escape(&view.headline)
    );
    let _ = writeln!(
        html,
        "<div class=\"progress\" role=\"progressbar\" aria-valuemin=\"0\" aria-valuemax=\"100\" aria-valuenow=\"{0}\"><div class=\"bar\" style=\"width: {0}%\"></div></div>",
        view.progress_percent
    );
    let _ = writeln!(html, "<p id=\"confidence\">{}</p>", escape(&view.confidence_text));
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
