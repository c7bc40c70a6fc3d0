use clap::Subcommand;
use fadewrite_core::Database;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List archived text, newest first
    List {
        /// Maximum number of entries
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete every archived entry
    Clear,
}

/// First line of `text`, cut to `max` characters.
fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > max {
        let cut: String = line.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        HistoryAction::List { limit, json } => {
            let entries = db.history(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("history is empty");
            } else {
                for entry in &entries {
                    println!(
                        "#{:<4} {}  {:>4} words  {}",
                        entry.id,
                        entry.archived_at.format("%Y-%m-%d %H:%M"),
                        entry.word_count,
                        preview(&entry.text, 48)
                    );
                }
            }
        }
        HistoryAction::Clear => {
            let removed = db.clear_history()?;
            println!("removed {removed} entries");
        }
    }
    Ok(())
}
