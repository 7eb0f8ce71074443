use std::io::IsTerminal;
use chrono::{Duration, NaiveDateTime};
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::api::{HistoryEntry, HistoryPoint};
use crate::resort::{AvalancheLevel, ResortSnapshot};
use crate::summary::{DashboardSummary, TopEntry};

/// Score at or above which a resort is shown green
pub const GREAT_SCORE: f64 = 8.0;
/// Score at or above which a resort is shown yellow; below is red
pub const GOOD_SCORE: f64 = 6.0;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// One decimal, or "-" for an unscored resort
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{:.1}", s),
        None => "-".to_string(),
    }
}

fn paint_score(text: &str, score: Option<f64>, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match score {
        Some(s) if s >= GREAT_SCORE => text.green().bold().to_string(),
        Some(s) if s >= GOOD_SCORE => text.yellow().bold().to_string(),
        Some(_) => text.red().to_string(),
        None => text.dimmed().to_string(),
    }
}

fn paint_avalanche(level: AvalancheLevel, use_colors: bool) -> String {
    let text = if level.is_known() {
        format!("{} {}", level.get(), level.label())
    } else {
        "-".to_string()
    };
    if !use_colors {
        return text;
    }
    match level.get() {
        1 => text.green().to_string(),
        2 => text.yellow().to_string(),
        3 => text.truecolor(255, 140, 0).to_string(),
        4 => text.red().to_string(),
        5 => text.red().bold().to_string(),
        _ => text.dimmed().to_string(),
    }
}

/// "open/total", "open" when the total is unreported, "-" when neither is
pub fn format_ratio(open: Option<u32>, total: Option<u32>) -> String {
    match (open, total) {
        (Some(o), Some(t)) => format!("{}/{}", o, t),
        (Some(o), None) => o.to_string(),
        _ => "-".to_string(),
    }
}

fn format_km(km: Option<f64>) -> String {
    km.map_or_else(|| "-".to_string(), |v| format!("{:.1}", v))
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Pad by character count; `format!` width counts chars too, but colored
/// strings carry escape codes, so pad before painting.
fn pad_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

/// Ranked table, one resort per line.
///
/// Columns: index, score, name, snow (mountain cm), new snow (cm), lifts,
/// open km, avalanche level. `first_index` is the 1-based rank of the first
/// row. The name column shrinks to fit the terminal; pipes are not truncated.
pub fn format_resort_table(resorts: &[&ResortSnapshot], first_index: usize, use_colors: bool) -> String {
    if resorts.is_empty() {
        return "No resorts match the current filters.".to_string();
    }

    let term_width = get_terminal_width();
    let name_width = resorts
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(4, 32);
    // index 4, score 5, snow 6, new 5, lifts 7, km 7, separators
    let fixed_width = 4 + 1 + 5 + 2 + 2 + 6 + 2 + 5 + 2 + 7 + 2 + 7 + 2 + 16;
    let name_width = match term_width {
        Some(width) if width > fixed_width + 10 => name_width.min(width - fixed_width),
        Some(_) => name_width.min(20),
        None => name_width,
    };

    let header = format!(
        "{:>4} {:>5}  {}  {:>6}  {:>5}  {:>7}  {:>7}  {}",
        "#", "Score", pad_right("Resort", name_width), "Snow", "New", "Lifts", "Km", "Avalanche"
    );
    let header = if use_colors { header.dimmed().to_string() } else { header };

    let rows = resorts.iter().enumerate().map(|(offset, resort)| {
        let index = format!("{:>3}.", first_index + offset);
        let score = resort.shred_score();
        let score_str = paint_score(&format!("{:>5}", format_score(score)), score, use_colors);
        let name = pad_right(&truncate_name(&resort.name, name_width), name_width);
        let name = if use_colors && !resort.status.is_operating() {
            name.dimmed().to_string()
        } else {
            name
        };
        format!(
            "{} {}  {}  {:>6}  {:>5}  {:>7}  {:>7}  {}",
            if use_colors { index.dimmed().to_string() } else { index },
            score_str,
            name,
            format!("{:.0}", resort.snow_mountain),
            format!("{:.0}", resort.new_snow),
            format_ratio(resort.lifts_open, resort.lifts_total),
            format_km(resort.slopes_open_km),
            paint_avalanche(resort.avalanche_warning, use_colors)
        )
    });

    std::iter::once(header).chain(rows).collect::<Vec<_>>().join("\n")
}

/// Format resorts as tab-separated values for scripting
/// Columns: id, score, name, country, region, status, snow_mountain,
/// new_snow, avalanche (no headers, no colors)
pub fn format_tsv(resorts: &[&ResortSnapshot]) -> String {
    resorts
        .iter()
        .map(|r| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                r.id,
                format_score(r.shred_score()),
                r.name,
                r.country,
                r.region,
                r.status.label(),
                r.snow_mountain,
                r.new_snow,
                r.avalanche_warning.get()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else if duration.num_minutes() >= 1 {
        format!("{}m", duration.num_minutes())
    } else {
        "now".to_string()
    }
}

/// Detail view with the score breakdown. `now` anchors the report age.
pub fn format_resort_detail(resort: &ResortSnapshot, now: NaiveDateTime, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let title = format!("{} ({}, {})", resort.name, resort.region, resort.country);
    lines.push(if use_colors { title.bold().to_string() } else { title });
    lines.push(format!("  Status: {}", resort.status.label()));

    let score = resort.shred_score();
    lines.push(format!(
        "  Shred Score: {}",
        paint_score(&format_score(score), score, use_colors)
    ));
    if let Some(b) = &resort.score {
        lines.push(format!("    Freshness:         {:.2}", b.freshness));
        lines.push(format!("    Base snow:         {:.2}", b.base_snow));
        lines.push(format!("    Terrain:           {:.2}", b.terrain));
        lines.push(format!("    Avalanche factor:  x{:.2}", b.avalanche_penalty));
        lines.push(format!("    Snow factor:       x{:.2}", b.snow_factor));
        lines.push(format!("    Slope factor:      x{:.2}", b.slope_factor));
    }

    lines.push(format!(
        "  Snow: {:.0} cm mountain, {:.0} cm valley, {:.0} cm new",
        resort.snow_mountain, resort.snow_valley, resort.new_snow
    ));
    lines.push(format!("  Conditions: {}", resort.snow_condition));
    if let Some(last) = &resort.last_snowfall {
        lines.push(format!("  Last snowfall: {}", last));
    }
    lines.push(format!(
        "  Avalanche: {}",
        paint_avalanche(resort.avalanche_warning, use_colors)
    ));
    lines.push(format!("  Lifts: {}", format_ratio(resort.lifts_open, resort.lifts_total)));

    let km = match resort.slope_km_ratio() {
        Some((open, total)) => format!("{:.1}/{:.1} km", open, total),
        None => format!("{} km", format_km(resort.slopes_open_km)),
    };
    lines.push(format!(
        "  Slopes: {} ({} runs)",
        km,
        format_ratio(resort.slopes_open, resort.slopes_total)
    ));
    if let Some(condition) = &resort.slope_condition {
        lines.push(format!("  Slope condition: {}", condition));
    }
    if let Some(altitude) = &resort.altitude {
        lines.push(format!("  Altitude: {:.0}-{:.0} m", altitude.min, altitude.max));
    }
    if let Some(updated) = resort.last_update {
        lines.push(format!(
            "  Updated: {} ({} ago)",
            updated.format("%Y-%m-%d %H:%M"),
            format_age(now - updated)
        ));
    }
    if !resort.url.is_empty() {
        lines.push(format!(
            "  URL: {}",
            if use_colors { resort.url.underline().to_string() } else { resort.url.clone() }
        ));
    }

    lines.join("\n")
}

fn format_top_list(title: &str, entries: &[TopEntry]) -> Vec<String> {
    let mut lines = vec![format!("{}:", title)];
    if entries.is_empty() {
        lines.push("  -".to_string());
    }
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!("  {}. {} ({:.0} cm)", i + 1, entry.name, entry.value));
    }
    lines
}

/// Dashboard header: counts, totals, top lists and avalanche distribution
pub fn format_summary(summary: &DashboardSummary, use_colors: bool) -> String {
    let mut lines = Vec::new();
    let heading = format!("{} of {} resorts open", summary.open_count, summary.total_count);
    lines.push(if use_colors { heading.bold().to_string() } else { heading });
    lines.push(format!("Average mountain snow: {:.0} cm", summary.avg_snow_mountain));
    lines.push(format!("Total new snow: {:.0} cm", summary.total_new_snow));
    lines.push(format!("Open slopes: {:.1} km", summary.total_open_km));
    lines.push(String::new());
    lines.extend(format_top_list("Most snow", &summary.top_snow));
    lines.extend(format_top_list("Most new snow", &summary.top_new_snow));
    lines.push(String::new());
    lines.push("Avalanche levels:".to_string());
    for (level, count) in &summary.avalanche_distribution {
        lines.push(format!(
            "  {}: {}",
            paint_avalanche(AvalancheLevel::new(i64::from(*level)), use_colors),
            count
        ));
    }
    lines.join("\n")
}

fn format_history_point(point: &HistoryPoint) -> String {
    format!(
        "  {:<10}  {:>5}  {:>6.0}  {:>5.0}  {:>7}",
        point.date,
        format_score(point.shred_score),
        point.snow_mountain,
        point.new_snow,
        format_ratio(point.lifts_open, point.lifts_total)
    )
}

/// History for one resort, oldest first as the server sends it
pub fn format_history(label: &str, entry: &HistoryEntry, use_colors: bool) -> String {
    let title = if use_colors { label.bold().to_string() } else { label.to_string() };
    let body = match entry {
        HistoryEntry::Ready(points) if points.is_empty() => "  No history recorded.".to_string(),
        HistoryEntry::Ready(points) => {
            let header = format!("  {:<10}  {:>5}  {:>6}  {:>5}  {:>7}", "Date", "Score", "Snow", "New", "Lifts");
            std::iter::once(header)
                .chain(points.iter().map(format_history_point))
                .collect::<Vec<_>>()
                .join("\n")
        }
        HistoryEntry::Failed(msg) => format!("  History unavailable: {}", msg),
        HistoryEntry::Loading => "  Loading...".to_string(),
        HistoryEntry::NotFetched => "  Not fetched.".to_string(),
    };
    format!("{}\n{}", title, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resort::{OperatingStatus, ShredScoreBreakdown};
    use chrono::NaiveDate;

    fn sample_resort() -> ResortSnapshot {
        ResortSnapshot {
            id: "3".to_string(),
            name: "Sölden".to_string(),
            region: "Tirol".to_string(),
            country: "AT".to_string(),
            status: OperatingStatus::Open,
            snow_valley: 45.0,
            snow_mountain: 210.0,
            new_snow: 35.0,
            snow_condition: "Pulver".to_string(),
            last_snowfall: Some("Heute".to_string()),
            avalanche_warning: AvalancheLevel::new(3),
            lifts_open: Some(31),
            lifts_total: Some(34),
            slopes_open_km: Some(138.0),
            slopes_total_km: Some(144.0),
            slopes_open: None,
            slopes_total: None,
            slope_condition: None,
            altitude: None,
            location: None,
            last_update: Some(timestamp(8)),
            url: "https://www.soelden.com".to_string(),
            score: Some(ShredScoreBreakdown {
                freshness: 3.58,
                base_snow: 3.7,
                terrain: 1.49,
                avalanche_penalty: 0.85,
                snow_factor: 1.0,
                slope_factor: 0.98,
                shred_score: 7.5,
            }),
        }
    }

    fn timestamp(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 12)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(7.504)), "7.5");
        assert_eq!(format_score(Some(10.0)), "10.0");
        assert_eq!(format_score(None), "-");
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(Some(31), Some(34)), "31/34");
        assert_eq!(format_ratio(Some(5), None), "5");
        assert_eq!(format_ratio(None, Some(10)), "-");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::minutes(30)), "30m");
        assert_eq!(format_age(Duration::hours(3)), "3h");
        assert_eq!(format_age(Duration::days(2)), "2d");
        assert_eq!(format_age(Duration::weeks(2)), "2w");
        assert_eq!(format_age(Duration::seconds(-30)), "now");
    }

    #[test]
    fn test_truncate_name_unicode() {
        assert_eq!(truncate_name("Sölden", 6), "Sölden");
        assert_eq!(truncate_name("Zell am See - Kaprun", 10), "Zell am...");
        assert_eq!(truncate_name("Ischgl", 3), "Isc");
    }

    #[test]
    fn test_resort_table_empty() {
        assert_eq!(format_resort_table(&[], 1, false), "No resorts match the current filters.");
    }

    #[test]
    fn test_resort_table_rows() {
        let first = sample_resort();
        let mut second = sample_resort();
        second.name = "Ischgl".to_string();
        second.score = None;

        let result = format_resort_table(&[&first, &second], 1, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Score"));
        assert!(lines[1].starts_with("  1."));
        assert!(lines[1].contains("7.5"));
        assert!(lines[1].contains("Sölden"));
        assert!(lines[1].contains("31/34"));
        assert!(lines[1].contains("3 Considerable"));
        assert!(lines[2].starts_with("  2."));
        assert!(lines[2].contains("Ischgl"));
    }

    #[test]
    fn test_resort_table_first_index() {
        let resort = sample_resort();
        let result = format_resort_table(&[&resort], 25, false);
        assert!(result.lines().nth(1).unwrap().starts_with(" 25."));
    }

    #[test]
    fn test_format_tsv() {
        let resort = sample_resort();
        assert_eq!(format_tsv(&[]), "");
        assert_eq!(
            format_tsv(&[&resort]),
            "3\t7.5\tSölden\tAT\tTirol\tOpen\t210\t35\t3"
        );
    }

    #[test]
    fn test_resort_detail() {
        let result = format_resort_detail(&sample_resort(), timestamp(11), false);
        assert!(result.starts_with("Sölden (Tirol, AT)"));
        assert!(result.contains("Shred Score: 7.5"));
        assert!(result.contains("Avalanche factor:  x0.85"));
        assert!(result.contains("Lifts: 31/34"));
        assert!(result.contains("Slopes: 138.0/144.0 km"));
        assert!(result.contains("Updated: 2025-01-12 08:00 (3h ago)"));
        assert!(result.contains("URL: https://www.soelden.com"));
    }

    #[test]
    fn test_summary() {
        let resort = sample_resort();
        let summary = DashboardSummary::from_resorts(&[resort]);
        let result = format_summary(&summary, false);
        assert!(result.starts_with("1 of 1 resorts open"));
        assert!(result.contains("Open slopes: 138.0 km"));
        assert!(result.contains("  1. Sölden (210 cm)"));
        assert!(result.contains("  3 Considerable: 1"));
    }

    #[test]
    fn test_history_states() {
        let point = HistoryPoint {
            date: "2025-01-12".to_string(),
            timestamp: None,
            snow_mountain: 210.0,
            snow_valley: 45.0,
            new_snow: 35.0,
            shred_score: Some(7.5),
            breakdown: None,
            lifts_open: Some(31),
            lifts_total: Some(34),
            slopes_open: None,
            slopes_total: None,
        };
        let ready = format_history("Sölden", &HistoryEntry::Ready(vec![point]), false);
        assert!(ready.contains("2025-01-12"));
        assert!(ready.contains("7.5"));

        let failed = format_history("Sölden", &HistoryEntry::Failed("offline".into()), false);
        assert!(failed.ends_with("History unavailable: offline"));

        let empty = format_history("Sölden", &HistoryEntry::Ready(Vec::new()), false);
        assert!(empty.contains("No history recorded."));
    }
}
