use chrono::TimeDelta;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::pump::PumpClass,
    quantity::{level::Metres, power::Kilowatts},
    simulation::StepRecord,
    statistics::Statistics,
};

pub fn build_steps_table(steps: &[StepRecord], n_units: usize, max_level: Metres) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Time",
        "Inflow",
        "Outflow",
        "Volume",
        "Level",
        "Pumping",
        "Power",
        "Next",
        "Target",
    ]);
    for step in steps {
        table.add_row(vec![
            Cell::new(step.timestamp.format("%Y-%m-%d %H:%M")),
            Cell::new(step.inflow).set_alignment(CellAlignment::Right),
            Cell::new(step.outflow).set_alignment(CellAlignment::Right).fg(
                if step.outflow < step.inflow { Color::DarkYellow } else { Color::Green },
            ),
            Cell::new(step.volume).set_alignment(CellAlignment::Right),
            Cell::new(step.level).set_alignment(CellAlignment::Right).fg(
                if step.level.0 >= 0.75 * max_level.0 {
                    Color::Red
                } else if step.level.0 >= 0.5 * max_level.0 {
                    Color::DarkYellow
                } else {
                    Color::Reset
                },
            ),
            Cell::new(step.pumping.display(n_units)),
            Cell::new(step.power).set_alignment(CellAlignment::Right),
            Cell::new(step.decision.display(n_units)).add_attribute(Attribute::Dim),
            Cell::new(step.target_flow.map_or_else(String::new, |flow| flow.to_string()))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
        ]);
    }
    table
}

pub fn build_pumps_table(statistics: &Statistics) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Pump", "Class", "Runtime", "Runs", "Short runs", "Running since"]);
    for pump in &statistics.pumps {
        table.add_row(vec![
            Cell::new(&pump.id),
            Cell::new(pump.class).fg(match pump.class {
                PumpClass::Small => Color::Cyan,
                PumpClass::Large => Color::Blue,
            }),
            Cell::new(format_duration(pump.run_time)).set_alignment(CellAlignment::Right),
            Cell::new(pump.n_runs).set_alignment(CellAlignment::Right),
            Cell::new(pump.n_short_runs)
                .set_alignment(CellAlignment::Right)
                .fg(if pump.n_short_runs == 0 { Color::Green } else { Color::Red }),
            Cell::new(pump.running_since.map_or_else(String::new, |since| since.to_string()))
                .add_attribute(Attribute::Dim),
        ]);
    }
    table
}

pub fn build_summary_table(statistics: &Statistics) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Metric", "Value", "At"]);
    table.add_row(vec![Cell::new("Steps"), Cell::new(statistics.n_steps), Cell::new("")]);
    table.add_row(vec![Cell::new("Energy"), Cell::new(statistics.energy), Cell::new("")]);
    table.add_row(vec![
        Cell::new("Cost at normal tariff"),
        Cell::new(statistics.normal_cost),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Cost at high tariff"),
        Cell::new(statistics.high_cost),
        Cell::new(""),
    ]);
    if let Some(balance) = &statistics.run_time_balance {
        table.add_row(vec![
            Cell::new("Runtime range"),
            Cell::new(format!(
                "{} – {} (Δ {})",
                format_duration(balance.min),
                format_duration(balance.max),
                format_duration(balance.max - balance.min),
            )),
            Cell::new(""),
        ]);
        table.add_row(vec![
            Cell::new("Runtime standard deviation"),
            Cell::new(format!("{:.2} h", balance.standard_deviation)),
            Cell::new(""),
        ]);
        table.add_row(vec![
            Cell::new("Runtime Gini coefficient"),
            Cell::new(format!("{:.4}", balance.gini)),
            Cell::new(""),
        ]);
    }
    for (label, extreme) in
        [("Maximum power draw", statistics.max_power), ("Minimum power draw", statistics.min_power)]
    {
        if let Some((timestamp, power)) = extreme {
            table.add_row(vec![
                Cell::new(label),
                Cell::new(power).fg(if power > Kilowatts::ZERO { Color::Reset } else { Color::Green }),
                Cell::new(timestamp).add_attribute(Attribute::Dim),
            ]);
        }
    }
    if let Some((timestamp, level)) = statistics.peak_level {
        table.add_row(vec![
            Cell::new("Peak level"),
            Cell::new(level),
            Cell::new(timestamp).add_attribute(Attribute::Dim),
        ]);
    }
    if let Some(level) = statistics.final_level {
        table.add_row(vec![Cell::new("Final level"), Cell::new(level), Cell::new("")]);
    }
    table
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

/// Human-readable duration, like `1day 2h 5m`.
fn format_duration(time_delta: TimeDelta) -> String {
    humantime::format_duration(time_delta.to_std().unwrap_or_default()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(TimeDelta::zero()), "0s");
        assert_eq!(format_duration(TimeDelta::minutes(26 * 60 + 5)), "1day 2h 5m");
        assert_eq!(format_duration(TimeDelta::minutes(150)), "2h 30m");
    }

    #[test]
    fn test_negative_duration_is_zero() {
        assert_eq!(format_duration(TimeDelta::minutes(-15)), "0s");
    }
}
