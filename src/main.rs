//! `vidir`: rename, move, and delete files by editing a plain-text listing
//! in your editor.
//!
//! See the module docs on `planner` for the hard part. This file wires the
//! seven pipeline stages from the collector through the executor.

mod collector;
mod editor;
mod error;
mod executor;
mod expander;
mod listing;
mod normalize;
mod planner;

use std::io::BufRead;

use anyhow::{Context, Result};

use executor::{Platform, RealPlatform};
use planner::Action;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let stdin = std::io::stdin();
    match run(&args, stdin.lock()) {
        Ok(had_errors) => std::process::exit(if had_errors { 1 } else { 0 }),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

/// Runs the full pipeline; returns whether any non-fatal delete errors
/// occurred (§7: these still make the process exit non-zero, but don't
/// abort the plan or roll back completed work).
fn run(args: &[String], stdin: impl BufRead) -> Result<bool> {
    let config = collector::collect(args, stdin)?;

    let mut collected = Vec::new();
    for path in &config.paths {
        collected.extend(expander::expand(path));
    }
    let original = listing::build_listing(collected);

    if original.is_empty() {
        println!("vidir: nothing to edit");
        return Ok(false);
    }

    let listing_content = listing::render_listing(&original);
    let editor = editor::resolve_editor();
    let edited_content = editor::edit_in_temp_file(&listing_content, &editor)?;
    let edited = listing::parse_listing(&edited_content, original.len())?;

    let mut platform = RealPlatform;
    let plan = planner::compute_plan(&original, &edited, |p| platform.path_exists(p));

    let had_delete_errors = executor::execute(&plan, &mut platform, |action| {
        if config.verbose {
            println!("{}", narrate(action));
        }
    })
    .context("executing rename plan")?;

    Ok(had_delete_errors)
}

fn narrate(action: &Action) -> String {
    match action {
        Action::Delete { src } => format!("delete {src}"),
        Action::Rename { src, dst } => format!("rename {src} -> {dst}"),
        Action::Stash { src } => format!("stash {src}"),
        Action::Unstash { dst } => format!("unstash -> {dst}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_option_is_reported_and_nonzero() {
        let args = vec!["--bogus".to_string()];
        let err = run(&args, std::io::empty()).unwrap_err();
        assert!(err.to_string().contains("unknown option: --bogus"));
    }

    #[test]
    fn empty_listing_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let args = vec![missing.to_str().unwrap().to_string()];
        let had_errors = run(&args, std::io::empty()).unwrap();
        assert!(!had_errors);
    }
}
