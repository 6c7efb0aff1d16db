//! Interactive fuzzy picker over discovered entries.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sessionizer_core::Entry;
use tracing::debug;

/// Matches listed under each query.
pub const MAX_SHOWN: usize = 10;

/// Entries whose label matches `query`, best first.
///
/// Ties keep their original order; an empty query keeps everything as is.
pub fn rank<'a>(entries: &'a [Entry], query: &str) -> Vec<&'a Entry> {
    let query = query.trim();
    if query.is_empty() {
        return entries.iter().collect();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &Entry)> = entries
        .iter()
        .filter_map(|e| matcher.fuzzy_match(&e.label, query).map(|score| (score, e)))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, e)| e).collect()
}

/// What the user typed at the selection prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Index into the shown matches.
    Pick(usize),
    /// Anything else is a new query.
    Requery(String),
}

/// Interpret an answer to the selection prompt, `shown` matches listed.
pub fn parse_choice(input: &str, shown: usize) -> Choice {
    let input = input.trim();
    if input.is_empty() {
        return Choice::Pick(0);
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=shown).contains(&n) => Choice::Pick(n - 1),
        _ => Choice::Requery(input.to_string()),
    }
}

/// Prompt until an entry is chosen. `None` if the user cancels.
pub fn pick(entries: &[Entry]) -> rustyline::Result<Option<Entry>> {
    let mut editor = DefaultEditor::new()?;
    let mut query = match read(&mut editor, "search> ")? {
        Some(q) => q,
        None => return Ok(None),
    };

    loop {
        let ranked = rank(entries, &query);
        if ranked.is_empty() {
            println!("No matches for '{}'", query);
            query = match read(&mut editor, "search> ")? {
                Some(q) => q,
                None => return Ok(None),
            };
            continue;
        }

        let shown = ranked.len().min(MAX_SHOWN);
        for (i, entry) in ranked.iter().take(shown).enumerate() {
            println!("{:>3}  {}", i + 1, entry.label);
        }

        let answer = match read(&mut editor, "pick [1]> ")? {
            Some(a) => a,
            None => return Ok(None),
        };
        match parse_choice(&answer, shown) {
            Choice::Pick(i) => {
                let chosen = ranked[i].clone();
                debug!(label = %chosen.label, "picked entry");
                return Ok(Some(chosen));
            }
            Choice::Requery(q) => query = q,
        }
    }
}

/// One line of input; `None` on Ctrl-C or Ctrl-D.
fn read(editor: &mut DefaultEditor, prompt: &str) -> rustyline::Result<Option<String>> {
    match editor.readline(prompt) {
        Ok(line) => {
            let _ = editor.add_history_entry(line.as_str());
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<Entry> {
        ["default", "work/api", "work/web", "dotfiles", "api-docs"]
            .iter()
            .map(|l| Entry::new(*l, format!("/src/{}", l)))
            .collect()
    }

    fn labels<'a>(ranked: &[&'a Entry]) -> Vec<&'a str> {
        ranked.iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn test_empty_query_keeps_order() {
        let entries = entries();
        assert_eq!(
            labels(&rank(&entries, "  ")),
            vec!["default", "work/api", "work/web", "dotfiles", "api-docs"]
        );
    }

    #[test]
    fn test_drops_non_matches() {
        let entries = entries();
        let ranked = rank(&entries, "web");
        assert_eq!(labels(&ranked), vec!["work/web"]);
        assert!(rank(&entries, "zzz").is_empty());
    }

    #[test]
    fn test_better_match_first() {
        let entries = entries();
        let ranked = rank(&entries, "api");
        assert!(ranked.len() >= 2);
        assert!(labels(&ranked).contains(&"work/api"));
        assert!(labels(&ranked).contains(&"api-docs"));
        assert!(!labels(&ranked).contains(&"dotfiles"));
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("", 3), Choice::Pick(0));
        assert_eq!(parse_choice(" 2 ", 3), Choice::Pick(1));
        assert_eq!(parse_choice("3", 3), Choice::Pick(2));
        assert_eq!(parse_choice("4", 3), Choice::Requery("4".into()));
        assert_eq!(parse_choice("0", 3), Choice::Requery("0".into()));
        assert_eq!(parse_choice("dot", 3), Choice::Requery("dot".into()));
    }
}
