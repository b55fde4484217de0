//! Line-oriented rendering of the resolution dialog on stdout, commands on stdin.

use arboard::Clipboard;
use fixer_core::{ButtonAction, DialogView, DownloadRowView, Notice};
use fixer_engine::{DownloadControl, ResolutionUi, UserAction};
use fixer_logging::fixer_warn;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const HELP: &str = "\
Commands:
  s <conflict> <candidate>  choose a candidate for a conflict
  ok                        apply the chosen candidates
  d <row>                   start downloading a missing model
  x <row>                   cancel a running download
  c <row>                   copy a download link
  q                         close the dialog";

pub(crate) struct TerminalUi {
    lines: Lines<BufReader<Stdin>>,
    view: Option<DialogView>,
}

impl TerminalUi {
    pub(crate) fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            view: None,
        }
    }

    fn parse(&self, line: &str) -> Result<UserAction, String> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let numbers: Vec<usize> = words.filter_map(|word| word.parse().ok()).collect();
        let view = self.view.as_ref().ok_or("no dialog is open")?;

        match (command, numbers.as_slice()) {
            ("ok" | "confirm", []) => Ok(UserAction::Confirm),
            ("q" | "quit" | "close", []) => Ok(UserAction::Close),
            ("s" | "select", [conflict, candidate]) => {
                let row = pick(&view.conflicts, *conflict, "conflict")?;
                if *candidate == 0 || *candidate > row.candidates.len() {
                    return Err(format!("conflict {conflict} has {} candidates", row.candidates.len()));
                }
                Ok(UserAction::SelectCandidate {
                    key: row.key.clone(),
                    index: candidate - 1,
                })
            }
            ("d" | "download", [row]) => Ok(UserAction::StartDownload {
                filename: pick(&view.downloads, *row, "download")?.filename.clone(),
            }),
            ("x" | "cancel", [row]) => Ok(UserAction::CancelDownload {
                filename: pick(&view.downloads, *row, "download")?.filename.clone(),
            }),
            ("c" | "copy", [row]) => Ok(UserAction::CopyLink {
                filename: pick(&view.downloads, *row, "download")?.filename.clone(),
            }),
            _ => Err(format!("unknown command: {line}")),
        }
    }
}

fn pick<'a, T>(rows: &'a [T], number: usize, what: &str) -> Result<&'a T, String> {
    number
        .checked_sub(1)
        .and_then(|index| rows.get(index))
        .ok_or_else(|| format!("no {what} row {number}"))
}

fn download_line(row: &DownloadRowView) -> String {
    let progress = row
        .progress_percent
        .map(|percent| format!(" {percent}%"))
        .unwrap_or_default();
    let hint = match row.button.action {
        ButtonAction::Start => " (d to start)",
        ButtonAction::Cancel => " (x to cancel)",
        ButtonAction::None => "",
    };
    format!(
        "{} -> {}{} [{}]{}",
        row.filename, row.target_folder, progress, row.button.label, hint
    )
}

#[async_trait::async_trait]
impl ResolutionUi for TerminalUi {
    fn render(&mut self, view: &DialogView) {
        println!();
        println!("== {} ==", view.title.text());
        println!("{}", view.notice);
        if !view.unknowns.is_empty() {
            println!("Not found anywhere:");
            for row in &view.unknowns {
                println!("  - {}", row.old_value);
            }
        }
        if !view.downloads.is_empty() {
            println!("Missing, downloadable:");
            for (index, row) in view.downloads.iter().enumerate() {
                println!("  {}. {}", index + 1, download_line(row));
            }
        }
        if !view.conflicts.is_empty() {
            println!("Several matches:");
            for (index, row) in view.conflicts.iter().enumerate() {
                println!(
                    "  {}. node {} {} = {}",
                    index + 1,
                    row.node_id,
                    row.widget_name,
                    row.old_value
                );
                for (candidate, path) in row.candidates.iter().enumerate() {
                    let marker = if candidate == row.selected { '>' } else { ' ' };
                    println!("     {marker} {}) {path}", candidate + 1);
                }
            }
        }
        let close = if view.can_confirm { "ok / q" } else { "q" };
        println!("({close}, ? for help)");
        self.view = Some(view.clone());
    }

    async fn next_action(&mut self) -> Option<UserAction> {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(err) => {
                    fixer_warn!("Reading stdin failed: {}", err);
                    return None;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "?" || line == "help" {
                println!("{HELP}");
                continue;
            }
            match self.parse(line) {
                Ok(action) => return Some(action),
                Err(message) => println!("{message}"),
            }
        }
    }

    async fn confirm(&mut self, prompt: &str) -> bool {
        println!("{prompt} [y/N]");
        match self.lines.next_line().await {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }

    fn notify(&mut self, notice: &Notice) {
        println!("! {notice}");
    }

    fn copy_to_clipboard(&mut self, text: &str) -> bool {
        let result = Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string()));
        match result {
            Ok(()) => {
                println!("Link copied.");
                true
            }
            Err(err) => {
                fixer_warn!("Clipboard copy failed: {}", err);
                false
            }
        }
    }

    fn control_for(&mut self, row: &DownloadRowView) -> Option<Box<dyn DownloadControl>> {
        Some(Box::new(TerminalControl {
            last_percent: row.progress_percent,
        }))
    }
}

/// Prints a line per visible change of one download row.
struct TerminalControl {
    last_percent: Option<u8>,
}

impl DownloadControl for TerminalControl {
    fn set_progress(&mut self, row: &DownloadRowView) {
        // Only whole-percent steps are worth a line.
        if row.progress_percent == self.last_percent {
            return;
        }
        self.last_percent = row.progress_percent;
        println!("  {}", download_line(row));
    }

    fn set_terminal(&mut self, row: &DownloadRowView) {
        self.last_percent = row.progress_percent;
        println!("  {}", download_line(row));
    }
}
