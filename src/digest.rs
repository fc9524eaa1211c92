/*
 * Digest Daemon
 * Joshua Bassett, 2017
 */

use std::fmt::Write;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::record::{Kind, Record};

pub const SUBJECT: &str = "Activity Digest";

const HEADER_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day] [hour]:[minute]");
const SEPARATOR_WIDTH: usize = 50;

/**
 * A view of the buffered records split by kind, in arrival order.
 */
#[derive(Debug)]
pub struct Digest<'a> {
    pub actions: Vec<&'a Record>,
    pub events: Vec<&'a Record>,
}

impl<'a> Digest<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        let (actions, events): (Vec<_>, Vec<_>) = records.iter().partition(|record| record.kind == Kind::Action);
        Digest { actions, events }
    }

    /// Renders the report body, headed with the given time.
    pub fn render(&self, generated_at: OffsetDateTime) -> Result<String, time::error::Format> {
        let mut text = format!("DIGEST REPORT - {}\n\n", generated_at.format(HEADER_FORMAT)?);
        section(&mut text, "ACTIONS", &self.actions);
        text.push_str("\n\n");
        section(&mut text, "EVENTS", &self.events);
        Ok(text)
    }
}

fn section(text: &mut String, title: &str, records: &[&Record]) {
    // Writing into a String cannot fail.
    let _ = writeln!(text, "{} ({}):", title, records.len());
    text.push_str(&"=".repeat(SEPARATOR_WIDTH));
    text.push('\n');
    for record in records {
        let _ = writeln!(text, "[{}] {}", record.timestamp, record.detail);
    }
}
