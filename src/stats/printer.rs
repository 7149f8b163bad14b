use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};

use super::aggregator::StatisticsSnapshot;

/// 方法按次数降序，次数相同按名称
pub fn methods_by_count(snapshot: &StatisticsSnapshot) -> Vec<(&str, u64)> {
    let mut methods: Vec<_> = snapshot
        .method_breakdown
        .iter()
        .map(|(m, c)| (m.as_str(), *c))
        .collect();
    methods.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    methods
}

/// 状态码按数值升序
pub fn statuses_by_code(snapshot: &StatisticsSnapshot) -> Vec<(&str, u64)> {
    let mut statuses: Vec<_> = snapshot
        .status_breakdown
        .iter()
        .map(|(s, c)| (s.as_str(), *c))
        .collect();
    statuses.sort_by_key(|(s, _)| s.parse::<u16>().unwrap_or(u16::MAX));
    statuses
}

fn status_color(code: &str) -> Color {
    match code.parse::<u16>().unwrap_or(0) {
        200..=299 => Color::Green,
        400..=499 => Color::Yellow,
        500..=599 => Color::Red,
        _ => Color::Blue,
    }
}

pub fn print_statistics(snapshot: &StatisticsSnapshot) {
    if snapshot.total_requests == 0 {
        println!("{}", "No requests yet. Send one to see statistics.".dimmed());
        return;
    }

    println!("\n{}", "Summary".bold());
    println!("  Total:      {}", snapshot.total_requests);
    println!(
        "  Successful: {}",
        snapshot.successful_requests.to_string().green()
    );
    println!("  Failed:     {}", snapshot.failed_requests.to_string().red());
    println!("  Success:    {:.1}%\n", snapshot.success_rate);

    let total = snapshot.total_requests as f64;

    let mut methods = Table::new();
    methods
        .load_preset(UTF8_FULL)
        .set_header(vec!["Method", "Requests", "Share"]);
    for (method, count) in methods_by_count(snapshot) {
        methods.add_row(vec![
            Cell::new(method),
            Cell::new(count),
            Cell::new(format!("{:.1}%", count as f64 * 100.0 / total)),
        ]);
    }
    println!("{}", methods);

    let mut statuses = Table::new();
    statuses
        .load_preset(UTF8_FULL)
        .set_header(vec!["Status", "Requests", "Share"]);
    for (status, count) in statuses_by_code(snapshot) {
        statuses.add_row(vec![
            Cell::new(status).fg(status_color(status)),
            Cell::new(count),
            Cell::new(format!("{:.1}%", count as f64 * 100.0 / total)),
        ]);
    }
    println!("{}", statuses);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_ordering() {
        let mut snapshot = StatisticsSnapshot::default();
        snapshot.method_breakdown.insert("POST".into(), 2);
        snapshot.method_breakdown.insert("GET".into(), 5);
        snapshot.method_breakdown.insert("DELETE".into(), 2);
        snapshot.status_breakdown.insert("500".into(), 1);
        snapshot.status_breakdown.insert("1000".into(), 1);
        snapshot.status_breakdown.insert("201".into(), 3);
        snapshot.status_breakdown.insert("404".into(), 3);

        let methods: Vec<_> = methods_by_count(&snapshot).into_iter().map(|(m, _)| m).collect();
        assert_eq!(methods, vec!["GET", "DELETE", "POST"]);

        let statuses: Vec<_> = statuses_by_code(&snapshot).into_iter().map(|(s, _)| s).collect();
        assert_eq!(statuses, vec!["201", "404", "500", "1000"]);
    }
}
