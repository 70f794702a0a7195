//! Interactive triage REPL.
//!
//! Renders transcript entries as they appear and asks for the right kind of
//! input for the current state: free text, a numbered cause selection, or
//! the case form fields. `/status`, `/new` and `/quit` work everywhere.

use anyhow::Result;
use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};
use triage_core::{CaseForm, Speaker, TriageSession, TriageState, UserEvent};

pub fn run(mut session: TriageSession) -> Result<()> {
    println!("{}", console::style("Hardware Support Triage").bold());
    println!("{}", "Commands: /status, /new, /quit".dimmed());
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut printed = 0usize;

    loop {
        print_new_entries(&session, &mut printed);

        let Some(event) = next_event(&mut lines, &session)? else {
            break; // EOF or /quit
        };
        session.handle(event);
    }

    Ok(())
}

/// Print transcript entries added since the last turn.
fn print_new_entries(session: &TriageSession, printed: &mut usize) {
    let entries = session.record().transcript.entries();
    if *printed > entries.len() {
        // A reset replaced the record with a fresh transcript.
        *printed = 0;
    }
    for entry in &entries[*printed..] {
        match entry.speaker {
            Speaker::Assistant => {
                println!("{} {}", "assistant:".cyan().bold(), entry.text);
            }
            Speaker::User => {
                println!("{} {}", "you:".green().bold(), entry.text);
            }
        }
        println!();
    }
    *printed = entries.len();
}

/// Gather the next event for the current state. Returns None to quit.
fn next_event(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    session: &TriageSession,
) -> Result<Option<UserEvent>> {
    loop {
        let placeholder = match session.state() {
            TriageState::Intake => {
                "Describe your hardware issue (e.g., My printer won't connect after I updated the OS)."
            }
            TriageState::Refine => "Enter your answer to the question.",
            TriageState::SummaryConfirm => "Is the problem statement correct? Type 'Yes' or 'No'.",
            TriageState::DiagnoseConfirm => {
                return cause_selection(lines, session);
            }
            TriageState::ResolutionCheck => {
                "Did the suggested action resolve the issue? Type 'Yes' or 'No'."
            }
            TriageState::CaseForm => {
                return case_form(lines);
            }
            TriageState::Closed => "Chat is finished. Use /new to start over, /quit to exit.",
        };

        let Some(line) = read_line(lines, placeholder)? else {
            return Ok(None);
        };

        match command(&line) {
            Some(cmd) => match cmd {
                Command::Quit => return Ok(None),
                Command::New => return Ok(Some(UserEvent::Reset)),
                Command::Status => {
                    print_status(session);
                    continue;
                }
            },
            None => {
                if line.trim().is_empty() || session.state().is_terminal() {
                    continue;
                }
                return Ok(Some(UserEvent::Message(line)));
            }
        }
    }
}

/// Numbered multi-select over the catalog's causes, pre-seeded with the
/// bot's suggestion. Empty input keeps the current selection.
fn cause_selection(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    session: &TriageSession,
) -> Result<Option<UserEvent>> {
    let options = session.catalog().all_causes();
    let selected = &session.record().selected_causes;

    println!("{}", console::style("Confirm Diagnosis").bold());
    println!("Select ALL potential root causes (adjust the pre-selected option as needed):");
    for (i, cause) in options.iter().enumerate() {
        let marker = if selected.iter().any(|s| s == cause) { "x" } else { " " };
        println!("  [{}] {}. {}", marker, i + 1, cause);
    }
    println!(
        "{}",
        "Enter numbers separated by commas (e.g., 1,3), or press Enter to keep the selection."
            .dimmed()
    );

    loop {
        let Some(line) = read_line(lines, "Your selection.")? else {
            return Ok(None);
        };

        match command(&line) {
            Some(Command::Quit) => return Ok(None),
            Some(Command::New) => return Ok(Some(UserEvent::Reset)),
            Some(Command::Status) => {
                print_status(session);
                continue;
            }
            None => {}
        }

        let input = line.trim();
        if input.is_empty() {
            return Ok(Some(UserEvent::ConfirmCauses(selected.clone())));
        }

        match parse_selection(input, &options) {
            Ok(causes) => return Ok(Some(UserEvent::ConfirmCauses(causes))),
            Err(bad) => {
                println!("{} '{}' is not a valid option number.", "!".red().bold(), bad);
            }
        }
    }
}

/// Parse "1,3" style input into cause names.
fn parse_selection(input: &str, options: &[&'static str]) -> Result<Vec<String>, String> {
    let mut causes = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let n: usize = part.parse().map_err(|_| part.to_string())?;
        if n == 0 || n > options.len() {
            return Err(part.to_string());
        }
        causes.push(options[n - 1].to_string());
    }
    Ok(causes)
}

/// Sequential prompts for the escalation form.
fn case_form(
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<Option<UserEvent>> {
    println!("{}", console::style("Create a Support Case").bold());

    let prompts = [
        "Full Name (required)",
        "Email Address (required)",
        "Phone Number (optional)",
        "Product Model / Device Name (required)",
    ];
    let mut values = Vec::with_capacity(prompts.len());

    for prompt in prompts {
        let Some(line) = read_line(lines, prompt)? else {
            return Ok(None);
        };
        if matches!(command(&line), Some(Command::Quit)) {
            return Ok(None);
        }
        if matches!(command(&line), Some(Command::New)) {
            return Ok(Some(UserEvent::Reset));
        }
        values.push(line);
    }

    let mut fields = values.into_iter();
    let form = CaseForm {
        full_name: fields.next().unwrap_or_default(),
        email: fields.next().unwrap_or_default(),
        phone: fields.next().unwrap_or_default(),
        product_model: fields.next().unwrap_or_default(),
    };
    Ok(Some(UserEvent::SubmitCase(form)))
}

enum Command {
    Quit,
    New,
    Status,
}

fn command(line: &str) -> Option<Command> {
    match line.trim() {
        "/quit" | "/exit" => Some(Command::Quit),
        "/new" => Some(Command::New),
        "/status" => Some(Command::Status),
        _ => None,
    }
}

/// Current stage and refined problem, mirroring a status sidebar.
fn print_status(session: &TriageSession) {
    let record = session.record();
    println!("{} {}", "Current stage:".bold(), record.state);
    if !record.working_statement.is_empty() {
        println!("{} {}", "Refined problem:".bold(), record.working_statement);
    }
    if !record.selected_causes.is_empty() {
        println!("{} {}", "Selected causes:".bold(), record.selected_causes.join("; "));
    }
    if let Some(case_id) = &record.case_id {
        println!("{} {}", "Case ID:".bold(), case_id);
    }
    println!();
}

fn read_line(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    placeholder: &str,
) -> Result<Option<String>> {
    print!("{} ", format!("[{}]", placeholder).dimmed());
    print!("{} ", ">".bold());
    io::stdout().flush()?;

    match lines.next() {
        Some(line) => Ok(Some(line?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        let options: Vec<&'static str> = vec!["Cause A", "Cause B", "Cause C"];
        assert_eq!(
            parse_selection("1,3", &options).unwrap(),
            vec!["Cause A".to_string(), "Cause C".to_string()]
        );
        assert!(parse_selection("4", &options).is_err());
        assert!(parse_selection("zero", &options).is_err());
        assert_eq!(parse_selection("2", &options).unwrap(), vec!["Cause B".to_string()]);
    }
}
