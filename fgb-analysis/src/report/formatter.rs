//! Console formatting of analysis results

use crate::pipeline::{
    ContingencyTable, FigureGroundAggregate, ParticipantFigureTotals, SideChoiceAggregate,
};
use crate::report::AnalysisReport;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Label shown for participants whose group code has no label
const UNLABELED: &str = "(unlabeled)";

/// CLI formatter for analysis results
pub struct CliFormatter;

impl CliFormatter {
    /// Box-drawn table; first column left-aligned, the rest right-aligned
    pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (w, cell) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let border = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{}{}{}\n", left, segments.join(mid), right)
        };
        let line = |cells: &[String]| {
            let padded: Vec<String> = cells
                .iter()
                .zip(widths.iter())
                .enumerate()
                .map(|(i, (cell, &w))| {
                    if i == 0 {
                        format!(" {:<w$} ", cell, w = w)
                    } else {
                        format!(" {:>w$} ", cell, w = w)
                    }
                })
                .collect();
            format!("│{}│\n", padded.join("│"))
        };

        let mut output = String::new();
        output.push_str(&border("┌", "┬", "┐"));
        let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        output.push_str(&line(&header_cells));
        output.push_str(&border("├", "┼", "┤"));
        for row in rows {
            output.push_str(&line(row));
        }
        output.push_str(&border("└", "┴", "┘"));
        output
    }

    /// Participant / group listing
    pub fn format_participants(participants: &[ParticipantFigureTotals]) -> String {
        let rows: Vec<Vec<String>> = participants
            .iter()
            .map(|p| {
                vec![
                    p.participant.clone(),
                    p.group.clone().unwrap_or_else(|| UNLABELED.to_string()),
                ]
            })
            .collect();

        let mut output = String::from("\nParticipant-Level Responses Summary:\n");
        output.push_str(&Self::format_table(&["Participant", "Group"], &rows));
        output
    }

    /// Mean black/white figure counts per group
    pub fn format_group_averages(aggregate: &FigureGroundAggregate) -> String {
        let rows: Vec<Vec<String>> = aggregate
            .groups
            .iter()
            .map(|g| {
                vec![
                    g.group.clone(),
                    g.participants.to_string(),
                    format!("{:.2}", g.mean_black),
                    format!("{:.2}", g.mean_white),
                ]
            })
            .collect();

        let mut output = String::from("\nGroup-Level Averages:\n");
        output.push_str(&Self::format_table(
            &["Group", "N", "Total Black Figure", "Total White Figure"],
            &rows,
        ));
        output
    }

    /// Black-figure counts per stimulus, one column per group
    pub fn format_stimulus_distribution(aggregate: &FigureGroundAggregate) -> String {
        let groups: Vec<&str> = aggregate.groups.iter().map(|g| g.group.as_str()).collect();

        let rows: Vec<Vec<String>> = aggregate
            .stimuli
            .iter()
            .map(|stimulus| {
                let mut row = vec![stimulus.clone()];
                for group in &groups {
                    let black = aggregate
                        .per_stimulus
                        .iter()
                        .find(|c| &c.stimulus == stimulus && c.group == *group)
                        .map(|c| c.black)
                        .unwrap_or(0);
                    row.push(black.to_string());
                }
                row
            })
            .collect();

        let mut headers = vec!["Stimulus"];
        headers.extend(groups.iter());

        let mut output = String::from("\nBlack Figure Responses per Stimulus:\n");
        output.push_str(&Self::format_table(&headers, &rows));
        output
    }

    /// Observed-frequency table
    pub fn format_contingency(title: &str, table: &ContingencyTable) -> String {
        let rows: Vec<Vec<String>> = table
            .row_labels
            .iter()
            .zip(table.counts.iter())
            .map(|(label, counts)| {
                let mut row = vec![label.clone()];
                row.extend(counts.iter().map(|c| c.to_string()));
                row
            })
            .collect();

        let mut headers = vec!["Group"];
        headers.extend(table.column_labels.iter().map(String::as_str));

        let mut output = format!("\nObserved Frequencies ({}):\n", title);
        output.push_str(&Self::format_table(&headers, &rows));
        output
    }

    /// Right/left totals and percentages per group
    pub fn format_side_summary(aggregate: &SideChoiceAggregate) -> String {
        let rows: Vec<Vec<String>> = aggregate
            .groups
            .iter()
            .map(|g| {
                vec![
                    g.group.clone(),
                    g.participants.to_string(),
                    g.total_right.to_string(),
                    g.total_left.to_string(),
                    format!("{:.1}%", g.right_percent),
                    format!("{:.1}%", g.left_percent),
                ]
            })
            .collect();

        let mut output = String::from("\nRight vs. Left Choices:\n");
        output.push_str(&Self::format_table(
            &["Group", "N", "Total Right", "Total Left", "Right %", "Left %"],
            &rows,
        ));
        if !aggregate.unmatched.is_empty() {
            output.push_str(&format!(
                "Dropped (not in both tables): {}\n",
                aggregate.unmatched.join(", ")
            ));
        }
        output
    }

    /// Chi-square results, one row per test
    pub fn format_test_results(report: &AnalysisReport) -> String {
        let rows: Vec<Vec<String>> = report
            .tests()
            .into_iter()
            .map(|(name, test)| {
                vec![
                    name.to_string(),
                    format!("{:.4}", test.statistic),
                    format!("{:.4e}", test.p_value),
                    test.degrees_of_freedom.to_string(),
                ]
            })
            .collect();

        let mut output = String::from("\nChi-Square Test Results:\n");
        output.push_str(&Self::format_table(
            &["Test", "Chi-Square Statistic", "p-value", "Degrees of Freedom"],
            &rows,
        ));
        output
    }

    /// Everything, in the order the analysis produces it
    pub fn format_report(report: &AnalysisReport) -> String {
        let figure = &report.figure_ground;

        let mut output = String::new();
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "Figure-Ground Bias Analysis v{} ({})\n",
            report.session.version, report.session.timestamp
        ));
        output.push_str(RULE);
        output.push('\n');

        output.push_str(&Self::format_participants(&figure.aggregate.participants));
        output.push_str(&Self::format_group_averages(&figure.aggregate));
        output.push_str(&Self::format_stimulus_distribution(&figure.aggregate));
        output.push_str(&Self::format_contingency("Black vs. White", &figure.contingency));

        if let Some(side) = &report.side_choice {
            output.push_str(&Self::format_side_summary(&side.aggregate));
            output.push_str(&Self::format_contingency("Right vs. Left", &side.contingency));
        }

        output.push_str(&Self::format_test_results(report));
        output
    }
}
