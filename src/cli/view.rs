//! trk cross-kind views: the prioritized listing.

use std::path::PathBuf;

use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::WorkItem;

pub struct PrioritizedOptions {
    pub data: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct PrioritizedOutput {
    total: usize,
    items: Vec<WorkItem>,
}

pub fn run_prioritized(options: PrioritizedOptions) -> Result<()> {
    let (_store, manager) = super::load_store(options.data)?;
    let items = manager.prioritized();

    let output = PrioritizedOutput {
        total: items.len(),
        items: items.clone(),
    };

    let mut human = HumanOutput::new("Prioritized items");
    human.push_summary("Total", items.len().to_string());
    for item in &items {
        let mut line = format!(
            "[{}] {} {} {}",
            item.status(),
            item.kind(),
            item.id(),
            item.name()
        );
        if let Some(label) = super::schedule_label(item.start(), item.duration()) {
            line.push_str(&format!(" ({label})"));
        }
        human.push_detail(line);
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "prioritized",
        &output,
        Some(&human),
    )
}
