//! `duopad`: a two-author collaborative text pad over named pipes.
//!
//! The real product wires `duopad-net::Session` to a window system's
//! keyboard/text-input events and a glyph rasterizer — both out of scope
//! here per the design. This binary instead reads lines from stdin as a
//! stand-in event source: a bare line is typed character-by-character, and
//! a handful of `:`-prefixed commands drive cursor motion, deletion, and
//! shutdown. Everything downstream of "here is an edit" — the CRDT, the
//! wire protocol, the pipes — is the real thing.

use std::error::Error;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use duopad_core::{delete_letter, insert_letter, render, IdRange, RenderedView, UiBuffer};
use duopad_net::{pad_path, save_document, Role, Session};

/// How long one tick sleeps for, per spec §5 ("the fixed sleep at end of
/// tick"). The spec gives this as ~30ms.
const TICK_SLEEP: Duration = Duration::from_millis(30);

/// A two-author collaborative text pad over named pipes.
#[derive(Parser)]
#[command(name = "duopad", version, about, long_about = None)]
struct Cli {
    /// Name of the pad. The document is saved to `pads/<pad>` on exit and
    /// restored from there if it already exists.
    #[arg(long, default_value = "untitled")]
    pad: String,

    /// Display name for this author. Cosmetic only — the wire protocol
    /// identifies peers by their negotiated author id, never by name.
    #[arg(long, default_value = "anonymous")]
    username: String,

    /// Directory the two named pipes are created/opened under.
    #[arg(long, default_value = "/tmp")]
    channel_dir: PathBuf,

    /// Directory saved pads live under.
    #[arg(long, default_value = "pads")]
    pads_dir: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut session = Session::establish(&cli.channel_dir)?;
    tracing::info!(role = ?session.role(), username = %cli.username, "session established");

    let pad_file = pad_path(&cli.pads_dir, &cli.pad);
    if session.role() == Role::Host && pad_file.exists() {
        let restored = duopad_net::load_document(&pad_file)?;
        for record in restored.all() {
            session.store_mut().upsert(record.clone());
        }
        tracing::info!(pad = %cli.pad, "restored pad from disk");
    }

    wait_until_ready(&mut session)?;
    tracing::info!(author_id = session.author_id(), "ready to edit");

    let mut ids = {
        let (start, end) = session.id_range();
        IdRange::new(start, end)
    };
    let mut buffer = UiBuffer::new();
    let author = session.author_id();

    let lines = spawn_stdin_reader();
    let mut last_tick = Instant::now();

    'outer: loop {
        while let Ok(line) = lines.try_recv() {
            match line {
                None => break 'outer, // stdin closed (EOF)
                Some(line) => {
                    if !handle_line(&mut session, &mut buffer, &mut ids, author, &line)? {
                        break 'outer;
                    }
                }
            }
        }

        session.tick()?;

        let elapsed = last_tick.elapsed();
        last_tick = Instant::now();
        session.tick_resend_timer(elapsed)?;

        thread::sleep(TICK_SLEEP);
    }

    save_document(&pad_file, session.store())?;
    session.cleanup()?;
    tracing::info!(pad = %cli.pad, "pad saved, pipe removed, exiting");
    Ok(())
}

/// Block-tick the session until it's ready to accept edits: immediate for
/// a host, or once a joiner has learned its author id/range from `Init`.
fn wait_until_ready(session: &mut Session) -> Result<(), Box<dyn Error>> {
    if session.role() == Role::Host {
        return Ok(());
    }
    while session.author_id() == 0 {
        session.tick()?;
        thread::sleep(TICK_SLEEP);
    }
    Ok(())
}

/// Spawn a thread that blocks on stdin so the main loop's tick stays
/// non-blocking. Sends `Some(line)` per line, `None` once on EOF.
fn spawn_stdin_reader() -> mpsc::Receiver<Option<String>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Some(line)).is_err() {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        let _ = tx.send(None);
    });
    rx
}

/// Handle one line of stand-in input. Returns `false` if the session should
/// exit (an explicit `:quit` or equivalent).
fn handle_line(
    session: &mut Session,
    buffer: &mut UiBuffer,
    ids: &mut IdRange,
    author: u32,
    line: &str,
) -> Result<bool, Box<dyn Error>> {
    if let Some(command) = line.strip_prefix(':') {
        return handle_command(session, buffer, command);
    }
    for ch in line.chars() {
        type_char(session, buffer, ids, author, ch)?;
    }
    Ok(true)
}

fn handle_command(
    session: &mut Session,
    buffer: &mut UiBuffer,
    command: &str,
) -> Result<bool, Box<dyn Error>> {
    let view = render(session.store());
    match command {
        "left" => {
            buffer.cursor = buffer.cursor.saturating_sub(1);
            buffer.clear_active_insert();
        }
        "right" => {
            buffer.cursor = (buffer.cursor + 1).min(view.text.len());
            buffer.clear_active_insert();
        }
        "home" => {
            buffer.cursor = 0;
            buffer.clear_active_insert();
        }
        "end" => {
            buffer.cursor = view.text.len();
            buffer.clear_active_insert();
        }
        "del" => delete_char(session, buffer, &view)?,
        "print" => {
            let text: String = view.text.iter().collect();
            println!("{text}");
        }
        "quit" => return Ok(false),
        other => tracing::warn!(command = other, "unknown stand-in command, ignoring"),
    }
    Ok(true)
}

fn type_char(
    session: &mut Session,
    buffer: &mut UiBuffer,
    ids: &mut IdRange,
    author: u32,
    ch: char,
) -> Result<(), Box<dyn Error>> {
    let view = render(session.store());
    let self_id = insert_letter(session.store_mut(), buffer, &view, ids, author, ch)?;
    session.send_insert(self_id)?;
    let after = render(session.store());
    buffer.reanchor(&after, 0, 0);
    Ok(())
}

fn delete_char(
    session: &mut Session,
    buffer: &mut UiBuffer,
    view: &RenderedView,
) -> Result<(), Box<dyn Error>> {
    let prior = buffer.cursor_anchor(view);
    let author = session.author_id();
    if let Some(self_id) = delete_letter(session.store_mut(), buffer, view, author) {
        session.send_insert(self_id)?;
    }
    let after = render(session.store());
    buffer.reanchor(&after, prior.0, prior.1);
    Ok(())
}
