//! Command handlers - what each CLI subcommand does to the engine
//!
//! Handlers that change the engine take it by value and hand back the
//! engine that follows together with the outcome, the same way the engine's
//! own operations do. Output goes to `out`.

use std::io::Write;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use crate::engine::{Engine, Execution};
use crate::models::{ListEntry, Request};
use crate::network::Transport;
use crate::parser::parse_request_with;

/// Parse, optionally save, then execute a request
pub fn send<T: Transport>(
    engine: Engine<T>,
    input: &str,
    vars: Option<&Value>,
    save: bool,
    out: &mut impl Write,
) -> (Engine<T>, Result<()>) {
    let request = match parse_request_with(input, vars).context("parsing request") {
        Ok(request) => request,
        Err(e) => return (engine, Err(e)),
    };

    let engine = if save {
        let (engine, saved) = engine.save_request(request.clone());
        if let Err(e) = saved {
            return (engine, Err(anyhow::Error::new(e).context("saving request")));
        }
        engine
    } else {
        engine
    };

    run(engine, request, out)
}

/// Parse a request and print what it would send, without sending it
pub fn check(input: &str, vars: Option<&Value>, out: &mut impl Write) -> Result<()> {
    let request = parse_request_with(input, vars).context("parsing request")?;

    writeln!(out, "method: {}", request.method)?;
    writeln!(out, "url: {}", request.url)?;
    for (title, entries, separator) in [
        ("headers", &request.headers, ": "),
        ("search params", &request.search_params, " = "),
        ("form fields", &request.form_fields, " = "),
    ] {
        if !entries.is_empty() {
            writeln!(out, "{}:", title)?;
            for (key, value) in entries {
                writeln!(out, "  {}{}{}", key, separator, value)?;
            }
        }
    }
    if let Some(body) = &request.json_body {
        writeln!(out, "json body:")?;
        writeln!(out, "{}", body)?;
    }
    Ok(())
}

/// Print history, most recent first, numbered from 1.
///
/// `filter` keeps entries whose method and url contain it (ignoring case);
/// numbers stay those `replay` expects.
pub fn history<T: Transport>(
    engine: &Engine<T>,
    filter: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    print_list(&engine.history_list(), filter, "No history yet", out)
}

/// Execute history entry `number` again (1 = most recent)
pub fn replay<T: Transport>(
    engine: Engine<T>,
    number: usize,
    out: &mut impl Write,
) -> (Engine<T>, Result<()>) {
    let request = engine
        .history_list()
        .get(number.wrapping_sub(1))
        .map(|entry| entry.request().clone());
    match request {
        Some(request) => run(engine, request, out),
        None => {
            let len = engine.history().len();
            (engine, Err(anyhow!("no history entry #{} ({} entries)", number, len)))
        }
    }
}

pub fn saved_list<T: Transport>(
    engine: &Engine<T>,
    filter: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    print_list(&engine.saved_list(), filter, "No saved requests", out)
}

pub fn saved_add<T: Transport>(
    engine: Engine<T>,
    input: &str,
    vars: Option<&Value>,
    out: &mut impl Write,
) -> (Engine<T>, Result<()>) {
    let request = match parse_request_with(input, vars).context("parsing request") {
        Ok(request) => request,
        Err(e) => return (engine, Err(e)),
    };
    let label = request.to_string();
    let (engine, saved) = engine.save_request(request);
    let result = saved
        .context("saving request")
        .and_then(|()| Ok(writeln!(out, "Saved #{} {}", engine.saved_requests().len(), label)?));
    (engine, result)
}

/// Remove saved request `number` (numbered from 1)
pub fn saved_remove<T: Transport>(
    engine: Engine<T>,
    number: usize,
    out: &mut impl Write,
) -> (Engine<T>, Result<()>) {
    let Some(index) = number.checked_sub(1) else {
        return (engine, Err(anyhow!("saved requests are numbered from 1")));
    };
    let (engine, removed) = engine.remove_saved_request(index);
    let result = removed
        .with_context(|| format!("removing saved request #{}", number))
        .and_then(|()| Ok(writeln!(out, "Removed saved request #{}", number)?));
    (engine, result)
}

/// Execute saved request `number` (numbered from 1)
pub fn saved_run<T: Transport>(
    engine: Engine<T>,
    number: usize,
    out: &mut impl Write,
) -> (Engine<T>, Result<()>) {
    let request = engine.saved_requests().get(number.wrapping_sub(1)).cloned();
    match request {
        Some(request) => run(engine, request, out),
        None => {
            let len = engine.saved_requests().len();
            (engine, Err(anyhow!("no saved request #{} ({} saved)", number, len)))
        }
    }
}

fn run<T: Transport>(
    engine: Engine<T>,
    request: Request,
    out: &mut impl Write,
) -> (Engine<T>, Result<()>) {
    let (engine, executed) = engine.execute(request);
    let result = executed
        .context("executing request")
        .and_then(|execution| print_execution(execution, out));
    (engine, result)
}

/// Print status line and body, then report a history write failure if any
fn print_execution(execution: Execution, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "{:?} {}",
        execution.response.version(),
        execution.response.status()
    )?;
    let body = execution
        .response
        .into_body()
        .into_string()
        .context("reading response body")?;
    if !body.is_empty() {
        writeln!(out, "{}", format_body(body))?;
    }

    if let Some(e) = execution.record_error {
        return Err(anyhow::Error::new(e).context("response received but not recorded in history"));
    }
    Ok(())
}

fn print_list(
    entries: &[ListEntry<'_>],
    filter: Option<&str>,
    empty: &str,
    out: &mut impl Write,
) -> Result<()> {
    if entries.is_empty() {
        writeln!(out, "{}", empty)?;
        return Ok(());
    }

    let needle = filter.map(str::to_lowercase);
    for (i, entry) in entries.iter().enumerate() {
        if let Some(needle) = &needle {
            if !entry.filter_value().to_lowercase().contains(needle.as_str()) {
                continue;
            }
        }
        writeln!(out, "{}. {}", i + 1, entry.describe())?;
    }
    Ok(())
}

/// Pretty-print JSON bodies, leave anything else as is
fn format_body(body: String) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(&body) {
        serde_json::to_string_pretty(&json).unwrap_or(body)
    } else {
        body
    }
}
