//! Terminal cards for predictions.
//!
//! Each card shows the chosen asset, the input text in a fenced block, and
//! the prediction label painted in the outcome color. Whether escapes are
//! emitted is decided by `colored` (tty detection, `NO_COLOR`, `--no-color`).

use colored::Colorize;
use cybulde_predict::{BatchItem, Prediction};
use cybulde_service::ServiceError;

const RULE_WIDTH: usize = 60;

const ABOUT: &str = "\
Cyberbullying Detection

A demo of a text classifier that flags cyberbullying in tweets in real time.
Every text goes through two services: a cleaning service that normalizes it,
then a model service that decides whether it is harmless or cyberbullying.

Modes:
  classify <TEXT>   test the model with your own text
  sample            run the model on random rows of the test dataset
";

// ── Public API ──

/// Short description of what the tool does.
pub fn render_about() -> String {
    ABOUT.to_string()
}

/// Render a prediction card.
pub fn render_prediction(prediction: &Prediction) -> String {
    let mut out = rule();
    match &prediction.asset {
        Some(asset) => out.push_str(&format!("  {:<12} {}\n", "Image:", asset)),
        None => out.push_str(&format!("  {:<12} (none configured)\n", "Image:")),
    }
    out.push_str(&text_block(&prediction.text));
    out.push_str(&format!(
        "  {:<12} {}\n",
        "Prediction:",
        paint(prediction.outcome.color, prediction.outcome.label)
    ));
    out
}

/// Render a card for a text whose classification failed.
pub fn render_failure(text: &str, err: &ServiceError) -> String {
    let mut out = rule();
    out.push_str(&text_block(text));
    out.push_str(&format!("  {:<12} {} ({:?})\n", "Error:", err, err.kind()));
    out
}

/// Render every item of a batch followed by a one-line summary.
pub fn render_batch(items: &[BatchItem]) -> String {
    let mut out = String::new();
    for item in items {
        match &item.result {
            Ok(prediction) => out.push_str(&render_prediction(prediction)),
            Err(e) => out.push_str(&render_failure(&item.text, e)),
        }
    }
    out.push_str(&rule());

    let flagged = items
        .iter()
        .filter(|item| matches!(&item.result, Ok(p) if p.verdict.is_flagged()))
        .count();
    let failed = items.iter().filter(|item| !item.is_ok()).count();
    out.push_str(&format!(
        "{} texts: {} harmless, {} cyberbullying, {} failed\n",
        items.len(),
        items.len() - flagged - failed,
        flagged,
        failed
    ));
    out
}

/// Paint `text` bold in a `#rrggbb` color. Unparseable colors leave the text
/// untouched.
pub fn paint(hex: &str, text: &str) -> String {
    match parse_hex(hex) {
        Some((r, g, b)) => text.truecolor(r, g, b).bold().to_string(),
        None => text.to_string(),
    }
}

/// Parse `#rrggbb`.
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

// ── Helpers ──

fn rule() -> String {
    format!("{}\n", "─".repeat(RULE_WIDTH))
}

fn text_block(text: &str) -> String {
    let mut out = String::from("  Text:\n  ```\n");
    for line in text.lines() {
        out.push_str(&format!("  {line}\n"));
    }
    out.push_str("  ```\n");
    out
}
