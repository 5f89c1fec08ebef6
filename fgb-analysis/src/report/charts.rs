//! SVG chart rendering
//!
//! One file per chart. Categorical axes use f64 coordinates with bars
//! centered on integer positions; tick labels map back to category names.

use crate::error::{Error, Result};
use crate::report::AnalysisReport;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

pub const GROUP_PROPORTIONS: &str = "group_proportions.svg";
pub const STIMULUS_DISTRIBUTION: &str = "stimulus_distribution.svg";
pub const PARTICIPANT_HEATMAP: &str = "participant_heatmap.svg";
pub const SIDE_CHOICE_TOTALS: &str = "side_choice_totals.svg";
pub const SIDE_CHOICE_PERCENT: &str = "side_choice_percent.svg";
pub const CHI_SQUARE_PVALUES: &str = "chi_square_pvalues.svg";

const GRAY: RGBColor = RGBColor(128, 128, 128);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
/// Per-group palette, reused cyclically
const GROUP_PALETTE: [RGBColor; 3] = [RGBColor(0, 128, 0), RGBColor(0, 0, 255), ORANGE];
/// coolwarm endpoints for white (0) and black (1) figure responses
const COOL: RGBColor = RGBColor(59, 76, 192);
const WARM: RGBColor = RGBColor(180, 4, 38);

fn chart_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Chart(e.to_string())
}

/// Category name for an integer tick, blank between ticks
fn category_label(names: &[String], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    names.get(rounded as usize).cloned().unwrap_or_default()
}

/// Upper y bound with headroom, never zero
fn y_ceiling(max: f64) -> f64 {
    if max <= 0.0 {
        1.0
    } else {
        max * 1.15
    }
}

/// Render every chart the report supports into `dir`
pub fn render_all(report: &AnalysisReport, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = vec![
        group_proportions(report, &dir.join(GROUP_PROPORTIONS))?,
        stimulus_distribution(report, &dir.join(STIMULUS_DISTRIBUTION))?,
        participant_heatmap(report, &dir.join(PARTICIPANT_HEATMAP))?,
    ];
    if report.side_choice.is_some() {
        written.push(side_choice_totals(report, &dir.join(SIDE_CHOICE_TOTALS))?);
        written.push(side_choice_percent(report, &dir.join(SIDE_CHOICE_PERCENT))?);
    }
    written.push(chi_square_pvalues(report, &dir.join(CHI_SQUARE_PVALUES))?);

    info!("Rendered {} charts into {}", written.len(), dir.display());
    Ok(written)
}

/// Mean black vs. white figure count per group, side by side
pub fn group_proportions(report: &AnalysisReport, path: &Path) -> Result<PathBuf> {
    let groups = &report.figure_ground.aggregate.groups;
    let names: Vec<String> = groups.iter().map(|g| g.group.clone()).collect();
    let n = names.len().max(1);
    let y_max = y_ceiling(
        groups
            .iter()
            .map(|g| g.mean_black.max(g.mean_white))
            .fold(0.0, f64::max),
    );

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Group-Wise Proportion of Responses", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
        .map_err(chart_err)?;

    let x_fmt = |x: &f64| category_label(&names, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&x_fmt)
        .x_desc("Group")
        .y_desc("Average Count")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(groups.iter().enumerate().map(|(i, g)| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x, g.mean_black)], BLACK.filled())
        }))
        .map_err(chart_err)?
        .label("Black Figure")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], BLACK.filled()));

    chart
        .draw_series(groups.iter().enumerate().map(|(i, g)| {
            let x = i as f64;
            Rectangle::new([(x, 0.0), (x + 0.4, g.mean_white)], GRAY.filled())
        }))
        .map_err(chart_err)?
        .label("White Figure")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], GRAY.filled()));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(path.to_path_buf())
}

/// Black-figure count per stimulus, one bar per group
pub fn stimulus_distribution(report: &AnalysisReport, path: &Path) -> Result<PathBuf> {
    let aggregate = &report.figure_ground.aggregate;
    let stimuli = aggregate.stimuli.clone();
    let groups: Vec<&str> = aggregate.groups.iter().map(|g| g.group.as_str()).collect();
    let n = stimuli.len().max(1);
    let width = 0.8 / groups.len().max(1) as f64;
    let y_max = y_ceiling(
        aggregate
            .per_stimulus
            .iter()
            .map(|c| c.black as f64)
            .fold(0.0, f64::max),
    );

    let root = SVGBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distribution of Responses Across Groups (Per Stimulus)", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
        .map_err(chart_err)?;

    let x_fmt = |x: &f64| category_label(&stimuli, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&x_fmt)
        .x_desc("Stimuli")
        .y_desc("Count of 'Black Figure' Responses")
        .draw()
        .map_err(chart_err)?;

    for (k, group) in groups.iter().enumerate() {
        let color = GROUP_PALETTE[k % GROUP_PALETTE.len()];
        let offset = -0.4 + k as f64 * width;
        let bars = stimuli.iter().enumerate().filter_map(|(s, stimulus)| {
            aggregate
                .per_stimulus
                .iter()
                .find(|c| &c.stimulus == stimulus && c.group == *group)
                .map(|c| {
                    let x0 = s as f64 + offset;
                    Rectangle::new([(x0, 0.0), (x0 + width, c.black as f64)], color.filled())
                })
        });
        chart
            .draw_series(bars)
            .map_err(chart_err)?
            .label(group.to_string())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(path.to_path_buf())
}

/// Participants x analysed stimuli response grid
pub fn participant_heatmap(report: &AnalysisReport, path: &Path) -> Result<PathBuf> {
    let aggregate = &report.figure_ground.aggregate;
    let participants: Vec<String> = aggregate
        .participants
        .iter()
        .map(|p| p.participant.clone())
        .collect();
    let stimuli = aggregate.stimuli.clone();
    let cols = participants.len().max(1);
    let rows = stimuli.len().max(1);

    let root = SVGBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Participant-Level Responses Across Stimuli", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(100)
        .build_cartesian_2d(-0.5f64..(cols as f64 - 0.5), -0.5f64..(rows as f64 - 0.5))
        .map_err(chart_err)?;

    let x_fmt = |x: &f64| category_label(&participants, *x);
    let y_fmt = |y: &f64| category_label(&stimuli, *y);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(cols)
        .y_labels(rows)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .x_desc("Participants")
        .y_desc("Stimuli")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(aggregate.participants.iter().enumerate().flat_map(|(i, p)| {
            p.responses.iter().enumerate().map(move |(j, &r)| {
                let (x, y) = (i as f64, j as f64);
                let color = if r == 1 { WARM } else { COOL };
                Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], color.filled())
            })
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(path.to_path_buf())
}

/// Stacked right/left totals per group
pub fn side_choice_totals(report: &AnalysisReport, path: &Path) -> Result<PathBuf> {
    let side = report
        .side_choice
        .as_ref()
        .ok_or_else(|| Error::Chart("no side-choice data in report".to_string()))?;
    let groups = &side.aggregate.groups;
    let names: Vec<String> = groups.iter().map(|g| g.group.clone()).collect();
    let n = names.len().max(1);
    let y_max = y_ceiling(
        groups
            .iter()
            .map(|g| (g.total_right + g.total_left) as f64)
            .fold(0.0, f64::max),
    );

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Total Right vs. Left Choices per Group", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
        .map_err(chart_err)?;

    let x_fmt = |x: &f64| category_label(&names, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&x_fmt)
        .x_desc("Group")
        .y_desc("Total Count")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(groups.iter().enumerate().map(|(i, g)| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, g.total_right as f64)], PURPLE.filled())
        }))
        .map_err(chart_err)?
        .label("Right Choices")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], PURPLE.filled()));

    chart
        .draw_series(groups.iter().enumerate().map(|(i, g)| {
            let x = i as f64;
            let bottom = g.total_right as f64;
            Rectangle::new(
                [(x - 0.4, bottom), (x + 0.4, bottom + g.total_left as f64)],
                ORANGE.filled(),
            )
        }))
        .map_err(chart_err)?
        .label("Left Choices")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], ORANGE.filled()));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(path.to_path_buf())
}

/// Right-choice percentage per group against the 50% neutral line
pub fn side_choice_percent(report: &AnalysisReport, path: &Path) -> Result<PathBuf> {
    let side = report
        .side_choice
        .as_ref()
        .ok_or_else(|| Error::Chart("no side-choice data in report".to_string()))?;
    let groups = &side.aggregate.groups;
    let names: Vec<String> = groups.iter().map(|g| g.group.clone()).collect();
    let n = names.len().max(1);
    let x_range = -0.5f64..(n as f64 - 0.5);

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Percentage of Right-Side Choices per Group", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), 0f64..100f64)
        .map_err(chart_err)?;

    let x_fmt = |x: &f64| category_label(&names, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&x_fmt)
        .x_desc("Group")
        .y_desc("Right-Side Choice (%)")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(groups.iter().enumerate().map(|(i, g)| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, g.right_percent)], PURPLE.filled())
        }))
        .map_err(chart_err)?
        .label("Right-Side Preference")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], PURPLE.filled()));

    chart
        .draw_series(LineSeries::new(
            vec![(x_range.start, 50.0), (x_range.end, 50.0)],
            RED.stroke_width(2),
        ))
        .map_err(chart_err)?
        .label("Neutral (50%)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(path.to_path_buf())
}

/// p-value per test against the 0.05 significance threshold
pub fn chi_square_pvalues(report: &AnalysisReport, path: &Path) -> Result<PathBuf> {
    let tests = report.tests();
    let names: Vec<String> = tests.iter().map(|(name, _)| name.to_string()).collect();
    let n = names.len().max(1);
    let x_range = -0.5f64..(n as f64 - 0.5);

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Chi-Square Test p-values", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), 0f64..1f64)
        .map_err(chart_err)?;

    let x_fmt = |x: &f64| category_label(&names, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&x_fmt)
        .y_desc("p-value")
        .draw()
        .map_err(chart_err)?;

    let colors = [BLACK, PURPLE];
    chart
        .draw_series(tests.iter().enumerate().map(|(i, (_, test))| {
            let x = i as f64;
            let color = colors[i % colors.len()];
            Rectangle::new([(x - 0.3, 0.0), (x + 0.3, test.p_value)], color.filled())
        }))
        .map_err(chart_err)?;

    chart
        .draw_series(LineSeries::new(
            vec![(x_range.start, 0.05), (x_range.end, 0.05)],
            RED.stroke_width(2),
        ))
        .map_err(chart_err)?
        .label("Significance Threshold (p=0.05)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_label() {
        let names = vec!["A".to_string(), "B".to_string()];
        assert_eq!(category_label(&names, 0.0), "A");
        assert_eq!(category_label(&names, 1.0), "B");
        assert_eq!(category_label(&names, 0.5), "");
        assert_eq!(category_label(&names, 2.0), "");
        assert_eq!(category_label(&names, -1.0), "");
    }

    #[test]
    fn test_y_ceiling() {
        assert_eq!(y_ceiling(0.0), 1.0);
        assert!(y_ceiling(10.0) > 10.0);
    }
}
