use clap::Subcommand;
use fadewrite_core::storage::{clear_draft, load_draft};
use fadewrite_core::Database;

#[derive(Subcommand)]
pub enum DraftAction {
    /// Print the saved draft
    Show {
        /// Print the stored JSON blob instead of the text
        #[arg(long)]
        json: bool,
    },
    /// Delete the saved draft
    Clear,
}

pub fn run(action: DraftAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut db = Database::open()?;

    match action {
        DraftAction::Show { json } => match load_draft(&db)? {
            Some(draft) if json => println!("{}", serde_json::to_string_pretty(&draft)?),
            Some(draft) => {
                println!("{}", draft.text);
                eprintln!(
                    "{} words, saved {}",
                    draft.word_count,
                    draft.saved_at.format("%Y-%m-%d %H:%M")
                );
            }
            None => eprintln!("no draft saved"),
        },
        DraftAction::Clear => {
            clear_draft(&mut db)?;
            println!("draft cleared");
        }
    }
    Ok(())
}
