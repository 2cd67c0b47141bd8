// src/display.rs
//! Terminal presentation of filtered stories.

use std::collections::HashSet;
use std::io::{self, Write};

use crate::story::NewsItem;

const TITLE_RULE: &str = "---------------------------------------------------------------";
const STORY_RULE: &str = "*********************************************************************";

/// Prints each story once per printer lifetime, keyed by id.
#[derive(Debug)]
pub struct StoryPrinter<W: Write> {
    out: W,
    shown: HashSet<String>,
}

impl StoryPrinter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StoryPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: HashSet::new(),
        }
    }

    /// Print stories not shown before; returns how many were printed.
    pub fn show(&mut self, items: &[NewsItem]) -> io::Result<usize> {
        let mut printed = 0;
        for item in items {
            if self.shown.contains(&item.id) {
                continue;
            }
            writeln!(self.out, "{}", item.title)?;
            writeln!(self.out, "{TITLE_RULE}")?;
            if !item.description.is_empty() {
                writeln!(self.out, "{}", item.description)?;
            }
            if !item.link.is_empty() {
                writeln!(self.out, "{}", item.link)?;
            }
            writeln!(self.out, "{STORY_RULE}")?;
            self.shown.insert(item.id.clone());
            printed += 1;
        }
        self.out.flush()?;
        Ok(printed)
    }

    /// Number of distinct stories printed so far.
    pub fn shown_count(&self) -> usize {
        self.shown.len()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
