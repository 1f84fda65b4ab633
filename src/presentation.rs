//! # Presentation
//! Everything about *showing* an analysis: colours, number formats, previews,
//! terminal blocks and HTML. Nothing here feeds back into classification.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use html_escape::encode_text;
use serde::Serialize;

use crate::classifier::{Analysis, NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD};
use crate::sentiment::SentimentLabel;

pub const POSITIVE_COLOR: &str = "#28a745";
pub const NEGATIVE_COLOR: &str = "#dc3545";
pub const NEUTRAL_COLOR: &str = "#6c757d";
/// Used for label strings that don't name a known variant.
pub const DEFAULT_COLOR: &str = "#000000";

pub const DEFAULT_PREVIEW_CHARS: usize = 100;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const RULE: &str = "------------------------------------------------------------";

pub fn label_color(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => POSITIVE_COLOR,
        SentimentLabel::Negative => NEGATIVE_COLOR,
        SentimentLabel::Neutral => NEUTRAL_COLOR,
    }
}

/// Colour lookup for free-form label text (query strings, stored JSON, ...).
pub fn color_for_label_str(label: &str) -> &'static str {
    label
        .parse::<SentimentLabel>()
        .map(label_color)
        .unwrap_or(DEFAULT_COLOR)
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// First `max_chars` characters, with `...` appended when something was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Flat, display-ready shape used by the HTTP API.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisView {
    pub text: String,
    pub preview: String,
    pub label: SentimentLabel,
    pub color: &'static str,
    pub pos: f32,
    pub neu: f32,
    pub neg: f32,
    pub compound: f32,
    pub timestamp: String,
}

impl AnalysisView {
    pub fn from_analysis(a: &Analysis, preview_chars: usize) -> Self {
        let s = a.scores();
        Self {
            text: a.text().to_string(),
            preview: preview(a.text(), preview_chars),
            label: a.label(),
            color: label_color(a.label()),
            pos: s.pos,
            neu: s.neu,
            neg: s.neg,
            compound: s.compound,
            timestamp: format_timestamp(a.timestamp()),
        }
    }
}

/// Terminal block for a single result.
pub fn render_text(a: &Analysis) -> String {
    let s = a.scores();
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "SENTIMENT ANALYSIS RESULTS:");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Positive Score: {:.3}", s.pos);
    let _ = writeln!(out, "Neutral Score:  {:.3}", s.neu);
    let _ = writeln!(out, "Negative Score: {:.3}", s.neg);
    let _ = writeln!(out, "Compound Score: {:.4}", s.compound);
    let _ = writeln!(
        out,
        "\n>>> SENTIMENT LABEL: {} <<<",
        a.label().as_str().to_uppercase()
    );
    let _ = writeln!(out, "{RULE}");
    out
}

/// Numbered history list, newest first.
pub fn render_history_text(entries: &[Analysis], preview_chars: usize) -> String {
    if entries.is_empty() {
        return "No analysis history yet. Start analyzing text!\n".to_string();
    }
    let mut out = String::new();
    for (i, a) in entries.iter().enumerate() {
        let s = a.scores();
        let _ = writeln!(
            out,
            "#{} - {} ({})",
            i + 1,
            a.label(),
            format_timestamp(a.timestamp())
        );
        let _ = writeln!(out, "    Text: {}", preview(a.text(), preview_chars));
        let _ = writeln!(out, "    Compound: {:.4}", s.compound);
        let _ = writeln!(
            out,
            "    Pos: {:.3} | Neu: {:.3} | Neg: {:.3}",
            s.pos, s.neu, s.neg
        );
    }
    out
}

/// Result card: coloured label headline plus score breakdown.
pub fn render_html_card(a: &Analysis) -> String {
    let s = a.scores();
    let color = label_color(a.label());
    let mut out = String::new();
    let _ = write!(
        out,
        "<section class=\"result\"><h1 style=\"text-align: center; color: {color};\">{}</h1>",
        a.label().as_str().to_uppercase()
    );
    let _ = write!(
        out,
        "<p class=\"text\">{}</p><ul class=\"scores\">",
        encode_text(a.text())
    );
    for (name, v) in [("Positive", s.pos), ("Neutral", s.neu), ("Negative", s.neg)] {
        let _ = write!(
            out,
            "<li>{name}: {v:.3} <progress max=\"1\" value=\"{v:.3}\"></progress> {:.1}%</li>",
            v * 100.0
        );
    }
    let _ = write!(out, "<li>Compound: {:.4}</li></ul></section>", s.compound);
    out
}

/// Sample inputs shown next to the form, grouped by the label they tend to get.
pub const EXAMPLE_TEXTS: &[(&str, &[&str])] = &[
    (
        "Positive",
        &[
            "I absolutely love this product! It's amazing!",
            "What a wonderful day! Everything is perfect.",
        ],
    ),
    (
        "Negative",
        &[
            "This is terrible. I hate it so much.",
            "Worst experience ever. Never again.",
        ],
    ),
    (
        "Neutral",
        &[
            "The meeting is scheduled for 3 PM.",
            "I went to the store yesterday.",
        ],
    ),
    (
        "Tricky (Sarcasm)",
        &[
            "Oh great, another meeting. Just what I needed.",
            "Yeah, right. Like that's going to work.",
        ],
    ),
];

fn write_rules(out: &mut String) {
    let _ = write!(
        out,
        "<section class=\"about\"><h2>Labeling Rules</h2><ul>\
         <li><strong>Positive</strong>: compound &ge; {p}</li>\
         <li><strong>Negative</strong>: compound &le; {n}</li>\
         <li><strong>Neutral</strong>: compound between {n} and {p}</li></ul>\
         <p>Scores range from 0.0 to 1.0, except compound: -1.0 to 1.0.</p></section>",
        p = POSITIVE_THRESHOLD,
        n = NEGATIVE_THRESHOLD,
    );
}

fn write_examples(out: &mut String) {
    out.push_str("<aside class=\"examples\"><h2>Example Texts</h2>");
    for (group, texts) in EXAMPLE_TEXTS {
        let _ = write!(out, "<h3>{group}</h3><ul>");
        for t in *texts {
            let _ = write!(out, "<li>&quot;{}&quot;</li>", encode_text(t));
        }
        out.push_str("</ul>");
    }
    out.push_str("<p><em>Lexicon scoring struggles with sarcasm and complex context.</em></p></aside>");
}

/// Whole page: input form, optional notice and current result, session history
/// with a clear button, labeling rules and example texts.
pub fn render_page(
    current: Option<&Analysis>,
    entries: &[Analysis],
    preview_chars: usize,
    notice: Option<&str>,
) -> String {
    let mut out = String::from(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Sentiment Analyzer</title></head><body>",
    );
    out.push_str("<h1>Sentiment Analysis</h1>");
    out.push_str(
        "<form method=\"post\" action=\"/\"><label for=\"text\">Type or paste your text here:</label>\
         <textarea id=\"text\" name=\"text\" rows=\"6\" placeholder=\"Enter text to analyze its sentiment...\"></textarea>\
         <button type=\"submit\">Analyze Sentiment</button></form>",
    );
    if let Some(msg) = notice {
        let _ = write!(out, "<p class=\"notice\">{}</p>", encode_text(msg));
    }
    if let Some(a) = current {
        out.push_str(&render_html_card(a));
    }
    out.push_str("<h2>Analysis History</h2><p><em>Last 5 analyses</em></p>");
    if entries.is_empty() {
        out.push_str("<p>No analysis history yet. Start analyzing text!</p>");
    } else {
        out.push_str("<ol class=\"history\">");
        for a in entries {
            let s = a.scores();
            let _ = write!(
                out,
                "<li><span style=\"color: {};\">{}</span> ({}) {} <small>compound {:.4} | pos {:.3} | neu {:.3} | neg {:.3}</small></li>",
                label_color(a.label()),
                a.label(),
                format_timestamp(a.timestamp()),
                encode_text(&preview(a.text(), preview_chars)),
                s.compound,
                s.pos,
                s.neu,
                s.neg
            );
        }
        out.push_str("</ol>");
        out.push_str(
            "<form method=\"post\" action=\"/clear\"><button type=\"submit\">Clear History</button></form>",
        );
    }
    write_rules(&mut out);
    write_examples(&mut out);
    out.push_str("</body></html>");
    out
}
