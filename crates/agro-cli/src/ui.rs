//! UI utilities for the CLI

use colored::*;
use crossterm::terminal::size;

use agro_client::Enrichment;
use agro_core::{
    parameter_impact_series, DiseaseResult, Field, FormDraft, HealthStatus, HistoryEntry,
    HistoryStore, Severity, ValidationErrors,
};

use crate::ChartSet;

const BAR_GLYPH: &str = "█";

fn terminal_width() -> usize {
    size().map(|(w, _)| w as usize).unwrap_or(80)
}

/// Scale `value` against `max` into a bar of at most `width` cells
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max.is_nan() || max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round() as usize;
    BAR_GLYPH.repeat(cells.min(width))
}

fn bar_width() -> usize {
    terminal_width().saturating_sub(30).clamp(10, 40)
}

/// Display startup banner
pub fn display_banner() {
    let terminal_width = terminal_width();
    let banner_width = std::cmp::min(67, terminal_width.saturating_sub(4)).max(40);

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.green());
    println!("{}", empty_line.green());

    let title = "AgroCast - Crop Yield Prediction";
    println!(
        "│  {}{}│",
        title.green().bold(),
        " ".repeat(banner_width.saturating_sub(title.chars().count() + 4))
    );
    println!("{}", empty_line.green());

    let feature_lines = [
        "Features:",
        "• Validated field-by-field input",
        "• Yield prediction with crop recommendations",
        "• Location and weather prefill",
        "• Leaf disease analysis",
        "",
        "v0.1.0",
    ];

    for line in feature_lines {
        if line.is_empty() {
            println!("{}", empty_line.green());
            continue;
        }
        let padding = " ".repeat(banner_width.saturating_sub(line.chars().count() + 4));
        if line.starts_with("v0.1.0") {
            println!("{}{}{}", "│  ".green(), line.dimmed(), format!("{}│", padding).green());
        } else {
            println!("{}", format!("│  {}{}│", line, padding).green());
        }
    }

    println!("{}", empty_line.green());
    println!("{}", bottom_border.green());
    println!();
    println!("{}", "💡 Tip: fill the form with 'set <field> <value>', or 'help' for commands".dimmed());
    println!();
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Set a form field", "set <field> <value>".green());
    println!("  {} - Same as set", "<field> = <value>".green());
    println!("  {} - Clear a form field", "unset <field>".green());
    println!("  {} - Show the form and its validation state", "show".green());
    println!("  {} - Submit the form for a yield prediction", "predict".green());
    println!("  {} - Predict automatically after edits", "auto on|off".green());
    println!("  {} - Prefill location and weather", "locate".green());
    println!("  {} - Show recent predictions (or clear them)", "history [clear]".green());
    println!("  {} - Show charts for the latest prediction", "chart".green());
    println!("  {} - Save the latest report as JSON", "export [dir]".green());
    println!("  {} - Print the summary of the latest prediction", "copy [full]".green());
    println!("  {} - Restore the default form", "reset".green());
    println!("  {} - Analyse a leaf image", "disease <image>".green());
    println!("  {} - Check the prediction service", "health".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Fields:".bold());
    for field in Field::ALL {
        let hint = match field.range() {
            Some((min, max)) => format!("{} to {} {}", min, max, field.unit()),
            None => match field {
                Field::SoilType => "clay, sandy, loamy, peaty".to_string(),
                _ => "wheat, rice, maize, soybean".to_string(),
            },
        };
        println!("  {:<12} {}", field.name().cyan(), hint.trim_end().dimmed());
    }
}

pub fn render_form(draft: &FormDraft, errors: &ValidationErrors) {
    println!("{}", "Current form:".bold());
    for field in Field::ALL {
        let value = draft.get(field).unwrap_or("");
        let line = format!("  {:<12} {}", field.label(), value);
        match errors.get(field) {
            Some(message) => println!("{}  {}", line, format!("✗ {}", message).red()),
            None => println!("{}  {}", line, "✓".green()),
        }
    }
}

pub fn render_validation_errors(errors: &ValidationErrors) {
    println!("{} Please fix the following fields:", "⚠️".yellow());
    for (field, message) in errors.iter() {
        println!("  {} {}", format!("{}:", field.label()).yellow(), message);
    }
}

pub fn render_prediction(entry: &HistoryEntry) {
    let result = &entry.result;
    println!(
        "{} Predicted Yield: {} tons/hectare",
        "🌾".green(),
        format!("{:.2}", result.predicted_yield).green().bold()
    );
    if result.recommended_crops.is_empty() {
        println!("  {}", "No crop recommendations returned".dimmed());
    } else {
        println!("  Recommended: {}", result.recommended_crops.join(", ").cyan());
    }
}

pub fn render_charts(charts: &ChartSet) {
    let width = bar_width();

    println!("{}", "Yield comparison (tons/hectare):".bold());
    let max = charts
        .comparison
        .iter()
        .map(|p| p.yield_value)
        .fold(0.0, f64::max);
    for point in &charts.comparison {
        println!(
            "  {:<8} {} {:.2}",
            point.condition.label(),
            bar(point.yield_value, max, width).green(),
            point.yield_value
        );
    }

    println!();
    println!("{}", "Crop recommendations:".bold());
    for ranked in &charts.ranking {
        println!("  #{} {}", ranked.rank, ranked.crop);
    }

    println!();
    println!("{}", "Parameter impact:".bold());
    for point in parameter_impact_series() {
        println!(
            "  {:<12} {} {:.0}% (optimal {:.0}%)",
            point.parameter,
            bar(point.impact, 1.0, width).yellow(),
            point.impact * 100.0,
            point.optimal * 100.0
        );
    }

    if charts.history.len() > 1 {
        println!();
        println!("{}", "Prediction trend:".bold());
        let max = charts.history.iter().map(|p| p.yield_value).fold(0.0, f64::max);
        for point in charts.history.iter().rev() {
            println!(
                "  {:<4} {} {:.2}",
                point.label,
                bar(point.yield_value, max, width).blue(),
                point.yield_value
            );
        }
    }
}

pub fn render_history(history: &HistoryStore) {
    if history.is_empty() {
        println!("{}", "No predictions yet".dimmed());
        return;
    }
    println!("{}", format!("Recent predictions ({}/{}):", history.len(), history.capacity()).bold());
    for entry in history.iter() {
        println!(
            "  #{:<3} {}  {:.2} t/ha  {} on {} soil",
            entry.id,
            entry.timestamp.dimmed(),
            entry.result.predicted_yield,
            entry.inputs.crop_type,
            entry.inputs.soil_type
        );
    }
}

pub fn render_enrichment(enrichment: &Enrichment) {
    println!(
        "{} Location: {}, {}",
        "📍".green(),
        enrichment.coordinates.latitude,
        enrichment.coordinates.longitude
    );
    if let Some(weather) = enrichment.weather {
        println!(
            "{} Weather: {}°C, {}% humidity",
            "🌤️".green(),
            weather.temperature,
            weather.humidity
        );
    }
    if let Some(advisory) = &enrichment.advisory {
        println!("{} {}", "⚠️".yellow(), advisory.yellow());
    }
}

pub fn render_disease(result: &DiseaseResult) {
    let severity = match result.severity {
        Some(Severity::High) => "high".red().bold(),
        Some(Severity::Medium) => "medium".yellow().bold(),
        Some(Severity::Low) => "low".cyan(),
        Some(Severity::None) => "none".green(),
        None => "unknown".dimmed(),
    };

    println!("{} Detected: {}", "🍃".green(), result.disease.bold());
    if let Some(confidence) = result.confidence {
        println!("  Confidence: {:.0}%", confidence);
    }
    println!("  Severity: {}", severity);
    if !result.recommendations.is_empty() {
        println!("  Recommendations:");
        for recommendation in &result.recommendations {
            println!("    • {}", recommendation);
        }
    }
}

pub fn render_health(health: &HealthStatus) {
    let marker = if health.is_ready() { "✅".green() } else { "❌".red() };
    println!("{} Service status: {}", marker, health.status);
    println!("  Crop model: {}", health.crop_model);
    println!("  Disease model: {}", health.disease_model);
}

pub fn render_error(message: &str) {
    println!("{} {}", "❌".red(), message.red());
}
