//! The canvas surface.
//!
//! A pure projection of the components attached to the transcript, drawn
//! in message order as a grid of one or two columns.

use opsflow_components::{ComponentInstance, ComponentRegistry, MIN_WIDTH};
use opsflow_credentials::Service;
use strum::IntoEnumIterator;

use crate::error::Result;
use crate::message::Thread;

/// Widths at or above this get two columns.
pub const TWO_COLUMN_WIDTH: usize = 100;

const GUTTER: usize = 2;

/// Components to show, in message order.
pub fn project(thread: &Thread) -> Vec<&ComponentInstance> {
    thread.components().collect()
}

/// Number of grid columns for a canvas `width` columns wide.
pub fn columns(width: usize) -> usize {
    if width < TWO_COLUMN_WIDTH { 1 } else { 2 }
}

/// Draw the canvas for `thread` at `width` text columns.
pub fn render(thread: &Thread, registry: &ComponentRegistry, width: usize) -> Result<Vec<String>> {
    let components = project(thread);
    if components.is_empty() {
        return Ok(empty_state(width));
    }

    let columns = columns(width);
    let cell_width = (width.saturating_sub(GUTTER * (columns - 1)) / columns).max(MIN_WIDTH);

    let mut lines = Vec::new();
    for row in components.chunks(columns) {
        let cells = row
            .iter()
            .map(|component| registry.render(component, cell_width))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let height = cells.iter().map(Vec::len).max().unwrap_or(0);

        for index in 0..height {
            let line: Vec<String> = cells
                .iter()
                .map(|cell| {
                    cell.get(index)
                        .cloned()
                        .unwrap_or_else(|| " ".repeat(cell_width))
                })
                .collect();
            lines.push(line.join(&" ".repeat(GUTTER)).trim_end().to_string());
        }
        lines.push(String::new());
    }
    lines.pop();
    Ok(lines)
}

/// Shown before any component has been attached.
pub fn empty_state(width: usize) -> Vec<String> {
    let services: Vec<&str> = Service::iter().map(|service| service.label()).collect();
    vec![
        center(&services.join("   "), width),
        String::new(),
        center("Dynamic Canvas", width),
        center(
            "Components will appear here based on your queries.",
            width,
        ),
        center("The AI decides which interface to show you.", width),
    ]
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let indent = width.saturating_sub(len) / 2;
    format!("{}{text}", " ".repeat(indent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use opsflow_components::{CardStatus, DataPoint, UniversalCardProps};
    use pretty_assertions::assert_eq;

    fn card(title: &str) -> ComponentInstance {
        ComponentInstance::UniversalCard(UniversalCardProps {
            source: Service::Github,
            title: title.to_string(),
            subtitle: None,
            status: Some(CardStatus::Success),
            data_points: vec![DataPoint::new("Stars", 1247)],
        })
    }

    fn thread_with(titles: &[&str]) -> Thread {
        let mut thread = Thread::new();
        for title in titles {
            thread.push(Message::user(format!("show {title}")));
            thread.push(Message::assistant("here", Some(card(title))));
        }
        thread
    }

    #[test]
    fn test_columns() {
        assert_eq!(columns(80), 1);
        assert_eq!(columns(99), 1);
        assert_eq!(columns(100), 2);
        assert_eq!(columns(160), 2);
    }

    #[test]
    fn test_empty_state() {
        let registry = ComponentRegistry::new().unwrap();
        let lines = render(&Thread::new(), &registry, 80).unwrap();
        assert!(lines[0].contains("GitHub"));
        assert!(lines[0].contains("Resend"));
        assert_eq!(lines[2].trim(), "Dynamic Canvas");
    }

    #[test]
    fn test_projection_order() {
        let thread = thread_with(&["first", "second", "third"]);
        let titles: Vec<String> = project(&thread)
            .into_iter()
            .map(|component| match component {
                ComponentInstance::UniversalCard(props) => props.title.clone(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_single_column_stacks() {
        let registry = ComponentRegistry::new().unwrap();
        let thread = thread_with(&["first", "second"]);

        let lines = render(&thread, &registry, 60).unwrap();
        // Each card is 5 lines, separated by a blank line.
        assert_eq!(lines.len(), 11);
        assert!(lines[1].contains("first"));
        assert!(lines[7].contains("second"));
        assert!(lines.iter().all(|line| line.chars().count() <= 60));
    }

    #[test]
    fn test_two_columns_side_by_side() {
        let registry = ComponentRegistry::new().unwrap();
        let thread = thread_with(&["first", "second", "third"]);

        let lines = render(&thread, &registry, 120).unwrap();
        assert!(lines[1].contains("first"));
        assert!(lines[1].contains("second"));
        assert_eq!(lines[0].chars().count(), 120);
        assert!(lines[7].contains("third"));
    }
}
