// UI layer: interactive console flows built on `dialoguer`. Every flow that
// lists contacts goes through `FeedWalker`, with `ContinueGate` deciding
// whether to fetch the next page.

use crate::api::{ContactsClient, ContactsFetcher, Session};
use crate::error::ApiError;
use crate::format::{contact_line, format_contacts_page, format_feed_page, format_loaded};
use crate::types::ContactEntry;
use crate::walker::{advance, Confirmer, FeedWalker, Page, WalkSummary};
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

type Render = fn(&Page<ContactEntry>, usize) -> (String, usize);

/// Interpret one answer to the continue prompt: `Some(true)` to go on,
/// `Some(false)` to stop, `None` to ask again. Only the line terminator is
/// stripped; padded answers are asked again.
pub fn parse_continue_answer(input: &str) -> Option<bool> {
    match input.trim_end_matches(&['\r', '\n'][..]) {
        "" | "y" | "Y" => Some(true),
        "n" | "N" => Some(false),
        _ => None,
    }
}

/// Console `Continue [Y/n]?` prompt. Re-asks until it gets an answer it
/// recognizes. A terminal that cannot be read counts as "stop".
#[derive(Default)]
pub struct ContinuePrompt;

impl Confirmer for ContinuePrompt {
    fn confirm(&mut self) -> bool {
        loop {
            let answer = Input::<String>::new()
                .with_prompt("Continue [Y/n]?")
                .allow_empty(true)
                .interact_text();
            match answer {
                Ok(text) => {
                    if let Some(decision) = parse_continue_answer(&text) {
                        return decision;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cannot read continue prompt, stopping");
                    return false;
                }
            }
        }
    }
}

/// Page-boundary gate: ask on the console, or always go on.
pub enum ContinueGate {
    Always,
    Prompt(ContinuePrompt),
}

impl ContinueGate {
    pub fn new(auto_continue: bool) -> Self {
        if auto_continue {
            ContinueGate::Always
        } else {
            ContinueGate::Prompt(ContinuePrompt)
        }
    }
}

impl Confirmer for ContinueGate {
    fn confirm(&mut self) -> bool {
        match self {
            ContinueGate::Always => true,
            ContinueGate::Prompt(prompt) => prompt.confirm(),
        }
    }
}

/// A logged-in console session over the contacts service.
pub struct ContactsApp {
    client: ContactsClient,
    session: Session,
    max_results: u32,
    auto_continue: bool,
}

impl ContactsApp {
    pub fn new(client: ContactsClient, session: Session, max_results: u32, auto_continue: bool) -> Self {
        ContactsApp {
            client,
            session,
            max_results,
            auto_continue,
        }
    }

    /// Print every contact page by page, one line per contact, or with full
    /// details when `detailed` is set.
    pub fn list_all_contacts(&self, detailed: bool) -> Result<WalkSummary> {
        let render: Render = if detailed { format_feed_page } else { format_contacts_page };
        let first = self.first_page()?;
        let mut walker = self.walker();
        walker
            .walk(first, |page, offset| {
                let (text, count) = render(page, offset);
                print!("{}", text);
                count
            })
            .context("Failed to fetch contacts page")
    }

    /// Walk the feed collecting entries, then let the user pick one.
    fn select_contact(&self) -> Result<Option<ContactEntry>> {
        let first = self.first_page()?;
        let mut entries = Vec::new();
        let mut walker = self.walker();
        walker
            .walk(first, |page, offset| {
                entries.extend(page.records.iter().cloned());
                let count = advance(page, offset);
                println!("{}", format_loaded(count));
                count
            })
            .context("Failed to fetch contacts page")?;

        if entries.is_empty() {
            println!("No contacts in feed.");
            return Ok(None);
        }
        let labels: Vec<String> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| contact_line(i + 1, entry))
            .collect();
        let choice = Select::new()
            .with_prompt("Select a contact (Esc to cancel)")
            .items(&labels)
            .default(0)
            .interact_opt()?;
        Ok(choice.map(|i| entries.swap_remove(i)))
    }

    pub fn update_contact_menu(&self) -> Result<()> {
        let Some(mut entry) = self.select_contact()? else {
            return Ok(());
        };
        let new_name: String = Input::new()
            .with_prompt("Enter a new name for the contact")
            .interact_text()?;
        entry.set_full_name(new_name.trim());

        let updated = self.save_contact(&entry)?;
        println!("Updated: {}", contact_line(1, &updated));
        Ok(())
    }

    pub fn delete_contact_menu(&self) -> Result<()> {
        let Some(entry) = self.select_contact()? else {
            return Ok(());
        };
        let sure = Confirm::new()
            .with_prompt(format!("Delete {}?", contact_line(1, &entry)))
            .default(false)
            .interact()?;
        if !sure {
            return Ok(());
        }

        self.remove_contact(&entry)?;
        println!("Contact deleted.");
        Ok(())
    }

    fn save_contact(&self, entry: &ContactEntry) -> Result<ContactEntry> {
        let spinner = spinner("Updating...")?;
        let res = self.client.update(&self.session, entry);
        spinner.finish_and_clear();
        res.context("Update failed")
    }

    fn remove_contact(&self, entry: &ContactEntry) -> Result<()> {
        let spinner = spinner("Deleting...")?;
        let res = self.client.delete(&self.session, entry);
        spinner.finish_and_clear();
        res.context("Delete failed")
    }

    fn first_page(&self) -> Result<Page<ContactEntry>> {
        let spinner = spinner("Fetching contacts...")?;
        let feed = self.client.get_contacts(&self.session, self.max_results);
        spinner.finish_and_clear();
        Ok(feed.context("Failed to fetch contacts")?.into())
    }

    fn walker(&self) -> FeedWalker<ContactsFetcher<'_>, ContinueGate> {
        FeedWalker::new(
            ContactsFetcher::new(&self.client, &self.session),
            ContinueGate::new(self.auto_continue),
        )
    }
}

/// Main interactive menu. Runs until the user chooses "Exit". Failed
/// actions are reported and the menu comes back, unless the session itself
/// was rejected.
pub fn main_menu(app: &ContactsApp) -> Result<()> {
    let items = [
        "List contacts",
        "List contacts (detailed)",
        "Update contact name",
        "Delete contact",
        "Exit",
    ];
    loop {
        let selection = Select::new().items(&items).default(0).interact()?;
        let res = match selection {
            0 => app.list_all_contacts(false).map(|_| ()),
            1 => app.list_all_contacts(true).map(|_| ()),
            2 => app.update_contact_menu(),
            3 => app.delete_contact_menu(),
            _ => break,
        };
        if let Err(e) = res {
            println!("{:#}", e);
            if session_rejected(&e) {
                println!("The service rejected the session; please log in again.");
                break;
            }
        }
    }
    Ok(())
}

/// True when `err` comes from the service refusing the session token.
fn session_rejected(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ApiError>().is_some_and(ApiError::is_auth)
}

fn spinner(msg: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}
