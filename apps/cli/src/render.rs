//! Plain-text rendering of verdicts and history.

use chrono::Local;
use client_core::{HistoryList, Prediction};
use shared::domain::Label;

fn verdict_heading(label: Label) -> &'static str {
    match label {
        Label::Real => "REAL NEWS",
        Label::Fake => "FAKE NEWS",
    }
}

fn local_time(prediction: &Prediction) -> String {
    prediction
        .created_at
        .with_timezone(&Local)
        .format("%H:%M:%S")
        .to_string()
}

pub fn render_prediction(prediction: &Prediction, confidence_scale: f64) -> String {
    let analyzed_at = local_time(prediction);
    format!(
        "{heading} [{badge}]\n  confidence: {percent}%\n  preview:    {preview}...\n  analyzed:   {analyzed_at}  id: {id}",
        heading = verdict_heading(prediction.label),
        badge = prediction.label.as_str().to_ascii_uppercase(),
        percent = prediction.confidence_percent(confidence_scale),
        preview = prediction.source_text,
        id = prediction.id.short(),
    )
}

pub fn render_history(history: &HistoryList, confidence_scale: f64) -> String {
    if history.is_empty() {
        return "No predictions yet. Analyze an article to get started!".to_string();
    }

    history
        .iter()
        .enumerate()
        .map(|(index, prediction)| {
            format!(
                "{:>2}. {:<4} {:>3}%  {}  {}...",
                index + 1,
                prediction.label.as_str().to_ascii_uppercase(),
                prediction.confidence_percent(confidence_scale),
                local_time(prediction),
                prediction.source_text,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
