use super::recorder::HistoryPage;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

pub fn print_history(page: &HistoryPage) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "ID", "Time", "Method", "URL", "Status", "Duration",
    ]);

    for record in &page.records {
        let status_color = if record.response.status < 400 {
            Color::Green
        } else {
            Color::Red
        };
        let duration = record
            .response
            .timing
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(record.short_id()),
            Cell::new(record.timestamp.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(record.method.as_str()),
            Cell::new(&record.endpoint).add_attribute(Attribute::Dim),
            Cell::new(record.response.status).fg(status_color),
            Cell::new(duration),
        ]);
    }

    println!("{}", table);

    let p = &page.pagination;
    println!(
        "Page {}/{} ({} records, {} per page)",
        p.current_page,
        p.total_pages.max(1),
        p.total_requests,
        p.limit
    );
}
