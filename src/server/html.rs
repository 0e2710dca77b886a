//! Server-rendered pages for the prediction form

use crate::types::input::{
    FieldRange, FormInput, Frequency, Gender, TransportMode, YesNo, AGE_RANGE, CH2O_RANGE,
    FAF_RANGE, FCVC_RANGE, HEIGHT_RANGE, NCP_RANGE, TUE_RANGE, WEIGHT_RANGE,
};
use crate::types::prediction::PredictionReport;
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; }
fieldset { border: 1px solid #ccc; border-radius: 6px; margin-bottom: 1rem; }
label { display: block; margin: .5rem 0 .2rem; }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
.result { background: #e7f6ea; border: 1px solid #4caf50; padding: 1rem; border-radius: 6px; }
.error { background: #fdecea; border: 1px solid #e53935; padding: 1rem; border-radius: 6px; }
table { border-collapse: collapse; } td, th { padding: .2rem .6rem; border-bottom: 1px solid #eee; text-align: left; }
button { padding: .6rem 1.2rem; font-size: 1rem; }
"#;

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
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

fn number_input(out: &mut String, label: &str, range: &FieldRange, value: f64) {
    let _ = write!(
        out,
        r#"<label for="{name}">{label}</label><input type="number" id="{name}" name="{name}" min="{min}" max="{max}" step="{step}" value="{value}" required>"#,
        name = range.field,
        label = escape(label),
        min = range.min,
        max = range.max,
        step = range.step,
        value = value,
    );
}

fn select_input(out: &mut String, name: &str, label: &str, options: &[&str], selected: &str) {
    let _ = write!(
        out,
        r#"<label for="{name}">{label}</label><select id="{name}" name="{name}">"#,
        label = escape(label),
    );
    for option in options {
        let mark = if *option == selected { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{0}"{1}>{0}</option>"#, option, mark);
    }
    out.push_str("</select>");
}

fn yes_no_options() -> Vec<&'static str> {
    YesNo::ALL.iter().map(YesNo::as_str).collect()
}

fn frequency_options() -> Vec<&'static str> {
    Frequency::ALL.iter().map(Frequency::as_str).collect()
}

fn form(values: &FormInput) -> String {
    let mut out = String::new();
    out.push_str(r#"<form method="post" action="/predict"><div class="grid">"#);

    out.push_str("<fieldset><legend>Personal information</legend>");
    number_input(&mut out, "Age", &AGE_RANGE, values.age);
    let genders: Vec<&str> = Gender::ALL.iter().map(Gender::as_str).collect();
    select_input(&mut out, "Gender", "Gender", &genders, &values.gender);
    number_input(&mut out, "Height (m)", &HEIGHT_RANGE, values.height);
    number_input(&mut out, "Weight (kg)", &WEIGHT_RANGE, values.weight);
    select_input(
        &mut out,
        "family_history_with_overweight",
        "Family history of overweight?",
        &yes_no_options(),
        &values.family_history_with_overweight,
    );
    out.push_str("</fieldset>");

    out.push_str("<fieldset><legend>Eating and drinking</legend>");
    select_input(
        &mut out,
        "FAVC",
        "Frequently eat high-calorie food (FAVC)?",
        &yes_no_options(),
        &values.favc,
    );
    number_input(
        &mut out,
        "Vegetable frequency (FCVC: 1 never, 2 sometimes, 3 always)",
        &FCVC_RANGE,
        values.fcvc,
    );
    number_input(&mut out, "Main meals per day (NCP)", &NCP_RANGE, values.ncp);
    select_input(
        &mut out,
        "CAEC",
        "Eat between meals (CAEC)?",
        &frequency_options(),
        &values.caec,
    );
    number_input(&mut out, "Water per day in liters (CH2O)", &CH2O_RANGE, values.ch2o);
    select_input(
        &mut out,
        "CALC",
        "Alcohol consumption (CALC)?",
        &frequency_options(),
        &values.calc,
    );
    out.push_str("</fieldset>");

    out.push_str("<fieldset><legend>Activity and other habits</legend>");
    select_input(
        &mut out,
        "SCC",
        "Monitor calorie intake (SCC)?",
        &yes_no_options(),
        &values.scc,
    );
    number_input(
        &mut out,
        "Physical activity (FAF: 0 none, 1 1-2 days, 2 2-4 days, 3 4-5 days)",
        &FAF_RANGE,
        values.faf,
    );
    number_input(
        &mut out,
        "Device time (TUE: 0 0-2h, 1 3-5h, 2 more than 5h)",
        &TUE_RANGE,
        values.tue,
    );
    out.push_str("</fieldset>");

    out.push_str("<fieldset><legend>Lifestyle</legend>");
    select_input(&mut out, "SMOKE", "Do you smoke?", &yes_no_options(), &values.smoke);
    let modes: Vec<&str> = TransportMode::ALL.iter().map(TransportMode::as_str).collect();
    select_input(
        &mut out,
        "MTRANS",
        "Main transport (MTRANS)",
        &modes,
        &values.mtrans,
    );
    out.push_str("</fieldset>");

    out.push_str(r#"</div><button type="submit">Predict my obesity level</button></form>"#);
    out
}

fn page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><title>Obesity Level Prediction</title><style>{STYLE}</style></head><body><h1>⚖️ Obesity Level Prediction</h1><p>Predicts obesity level from eating habits and physical condition. Enter your data below.</p>{body}</body></html>"#
    )
}

/// Form pre-filled with `values`
pub fn render_form(values: &FormInput) -> String {
    page(&form(values))
}

/// Form with an error banner
pub fn render_error(values: &FormInput, message: &str) -> String {
    page(&format!(
        r#"<div class="error"><strong>Could not predict:</strong> {}</div>{}"#,
        escape(message),
        form(values)
    ))
}

/// Predicted label with the detail view, followed by the form
pub fn render_result(values: &FormInput, report: &PredictionReport) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<div class="result"><strong>Prediction: {}</strong></div>"#,
        escape(&report.display_label())
    );

    out.push_str("<details><summary>Show processed input</summary>");
    out.push_str("<p>Submitted data:</p><pre>");
    let raw = serde_json::to_string_pretty(&report.input).unwrap_or_default();
    out.push_str(&escape(&raw));
    out.push_str("</pre><p>Data as fed to the model:</p>");
    out.push_str("<table><tr><th>Column</th><th>Encoded</th><th>Scaled</th></tr>");
    for ((column, value), scaled) in report.features.iter().zip(report.scaled.iter()) {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{:.4}</td></tr>",
            escape(column),
            value,
            scaled
        );
    }
    out.push_str("</table></details>");

    out.push_str(&form(values));
    page(&out)
}
