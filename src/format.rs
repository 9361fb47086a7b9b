// Console rendering of contact pages. Each function takes the page and the
// number of entries printed before it so numbering runs on across pages, and
// returns the text together with the new running count.

use crate::types::ContactEntry;
use crate::walker::{advance, Page};
use std::fmt::Write as _;

/// Generic feed view: title, content, primary emails, groups and extended
/// properties of every entry.
pub fn format_feed_page(page: &Page<ContactEntry>, offset: usize) -> (String, usize) {
    let mut out = String::new();
    if page.is_empty() {
        out.push_str("\nNo entries in feed.\n");
        return (out, offset);
    }
    for (i, entry) in page.records.iter().enumerate() {
        let _ = writeln!(out, "\n{} {}", offset + i + 1, entry.title.as_deref().unwrap_or(""));
        if let Some(content) = &entry.content {
            let _ = writeln!(out, "    {}", content);
        }
        for address in entry.primary_emails() {
            let _ = writeln!(out, "    {}", address);
        }
        for group in &entry.group_membership {
            let _ = writeln!(out, "    Member of group: {}", group.href);
        }
        for property in &entry.extended_properties {
            let _ = writeln!(out, "    Extended Property {}: {}", property.name, property.display_value());
        }
    }
    (out, advance(page, offset))
}

/// Contact view: one line per entry with name parts and the first phone
/// number. Entries without a name fall back to their title.
pub fn format_contacts_page(page: &Page<ContactEntry>, offset: usize) -> (String, usize) {
    let mut out = String::new();
    if page.is_empty() {
        out.push_str("\nNo contacts in feed.\n");
        return (out, offset);
    }
    for (i, entry) in page.records.iter().enumerate() {
        let _ = writeln!(out, "\n{}", contact_line(offset + i + 1, entry));
    }
    (out, advance(page, offset))
}

/// Single-line label for an entry, used by the listing and by the contact
/// picker.
pub fn contact_line(ordinal: usize, entry: &ContactEntry) -> String {
    let Some(name) = &entry.name else {
        return format!("{} {} (title)", ordinal, entry.title.as_deref().unwrap_or(""));
    };
    let part = |p: &Option<String>| p.clone().unwrap_or_else(|| " ".to_string());
    let mut line = format!(
        "{} {}: {} - {}",
        ordinal,
        part(&name.full_name),
        part(&name.given_name),
        part(&name.family_name)
    );
    if let Some(phone) = entry.first_phone() {
        let _ = write!(line, " ({})", phone);
    }
    line
}

/// Progress line printed while contacts are collected page by page.
pub fn format_loaded(count: usize) -> String {
    match count {
        1 => "Loaded 1 contact".to_string(),
        n => format!("Loaded {} contacts", n),
    }
}
