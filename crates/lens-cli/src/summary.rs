use std::time::Duration;

use console::Style;
use lens_core::rotate::RotateEvent;
use lens_core::ResourceKey;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    ok: Style,
    warn: Style,
    error: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            error: Style::new().red().bold(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_rotate_summary(event: &RotateEvent, zoom_percent: u32, elapsed: Duration) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Lens Rotate"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(11)));
    println!();

    match event {
        RotateEvent::Completed { key, angle, .. } => {
            println!("  {:<10}{}", s.label.apply_to("File"), s.path.apply_to(key));
            println!(
                "  {:<10}{}",
                s.label.apply_to("Angle"),
                s.value.apply_to(format!("{angle}\u{00b0}"))
            );
            println!(
                "  {:<10}{}",
                s.label.apply_to("Refit"),
                s.value.apply_to(format!("{zoom_percent}%"))
            );
            println!("  {:<10}{}", s.label.apply_to("Result"), s.ok.apply_to("rotated"));
        }
        RotateEvent::RolledBack {
            key,
            reason,
            cancelled,
        } => {
            println!("  {:<10}{}", s.label.apply_to("File"), s.path.apply_to(key));
            let result = if *cancelled {
                "cancelled, original restored"
            } else {
                "failed, original restored"
            };
            println!("  {:<10}{}", s.label.apply_to("Result"), s.warn.apply_to(result));
            if !cancelled {
                println!("  {:<10}{}", s.label.apply_to("Reason"), reason);
            }
        }
        RotateEvent::RestoreFailed { key, reason } => {
            println!("  {:<10}{}", s.label.apply_to("File"), s.path.apply_to(key));
            println!(
                "  {:<10}{}",
                s.label.apply_to("Result"),
                s.error.apply_to("restore failed, file may be inconsistent")
            );
            println!("  {:<10}{}", s.label.apply_to("Reason"), reason);
        }
    }
    println!(
        "  {:<10}{}",
        s.label.apply_to("Time"),
        s.value.apply_to(format!("{:.1}s", elapsed.as_secs_f64()))
    );
    println!();
}

pub fn print_recover_line(key: &ResourceKey, restored: bool) {
    let s = Styles::new();
    let status = if restored {
        s.ok.apply_to("restored")
    } else {
        s.label.apply_to("no backup")
    };
    println!("  {:<12}{}", status, s.path.apply_to(key));
}
