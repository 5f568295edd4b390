use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use pomokeeper::events::{TimerCommand, TimerEvent};
use pomokeeper::keeper::{self, KeeperHandle};
use pomokeeper::logging;
use pomokeeper::models::{Task, TaskPatch};
use pomokeeper::notify::DesktopNotifier;
use pomokeeper::storage::Storage;
use pomokeeper::store::TaskStore;
use pomokeeper::timer::format_clock;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let root = std::env::var("POMOKEEPER_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| Storage::default_root());
    let storage = Storage::new(root.clone());
    storage.ensure_dirs()?;

    if let Err(error) = logging::init_logging(&root) {
        eprintln!("logging unavailable: {error}");
    }

    let store = TaskStore::new(storage.clone());
    let handle = keeper::spawn(storage, Arc::new(DesktopNotifier));

    // Mirror every keeper broadcast; on attach, ask for a snapshot to
    // resynchronize.
    let mut events = handle.subscribe();
    tokio::spawn(async move {
        while let Ok(TimerEvent::StateUpdate(state)) = events.recv().await {
            println!(
                "[{}] {} {}",
                state.mode.as_str(),
                format_clock(state.remaining_seconds),
                if state.running {
                    "running"
                } else if state.active {
                    "paused"
                } else {
                    "idle"
                }
            );
        }
    });
    handle.send(TimerCommand::RequestState);

    println!("pomokeeper — type `help` for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => match line? {
                Some(line) => handle_line(line.trim(), &handle, &store),
                None => break,
            },
        }
    }

    log::info!("console detached, shutting down");
    Ok(())
}

fn handle_line(line: &str, handle: &KeeperHandle, store: &TaskStore) {
    let (word, rest) = match line.split_once(' ') {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match word {
        "" => {}
        "help" => print_help(),
        "start" => handle.send(TimerCommand::Start),
        "pause" => handle.send(TimerCommand::Pause),
        "resume" => handle.send(TimerCommand::Resume),
        "stop" => handle.send(TimerCommand::Stop),
        "toggle" => handle.send(TimerCommand::ToggleMode),
        "state" => handle.send(TimerCommand::RequestState),
        "set" => match parse_two(rest) {
            Some((work, brk)) => handle.send(TimerCommand::UpdateSettings {
                work_minutes: work,
                break_minutes: brk,
            }),
            None => println!("usage: set <work-minutes> <break-minutes>"),
        },
        "add" | "add!" => {
            if rest.is_empty() {
                println!("usage: add [!] <text>");
            } else {
                report(store.add(rest, word == "add!", None).map(|_| ()));
                print_tasks(&store.list());
            }
        }
        "list" => print_tasks(&store.list()),
        "done" => with_task(store, rest, |id| store.toggle_completed(id).map(|_| ())),
        "del" => with_task(store, rest, |id| store.delete(id).map(|_| ())),
        "pom" => with_task(store, rest, |id| store.increment_pomodoros(id).map(|_| ())),
        "edit" => match rest.split_once(' ') {
            Some((index, text)) if !text.trim().is_empty() => {
                let patch = TaskPatch {
                    text: Some(text.trim().to_string()),
                    ..TaskPatch::default()
                };
                with_task(store, index, |id| store.update(id, patch.clone()).map(|_| ()));
            }
            _ => println!("usage: edit <index> <text>"),
        },
        "move" => match parse_two(rest) {
            Some((old, new)) if old >= 1 && new >= 1 => {
                // Indices refer to the listed view the user just saw.
                report(
                    store
                        .reorder_listed(old as usize - 1, new as usize - 1)
                        .map(|_| ()),
                );
                print_tasks(&store.list());
            }
            _ => println!("usage: move <old-index> <new-index> (1-based)"),
        },
        other => println!("unknown command `{other}`; try `help`"),
    }
}

fn parse_two(rest: &str) -> Option<(u32, u32)> {
    let mut parts = rest.split_whitespace();
    let first = parts.next()?.parse().ok()?;
    let second = parts.next()?.parse().ok()?;
    Some((first, second))
}

/// Resolves a 1-based index in the listed order to a task id and runs
/// the operation against it.
fn with_task<F>(store: &TaskStore, index: &str, op: F)
where
    F: FnOnce(&str) -> Result<(), pomokeeper::storage::StorageError>,
{
    let tasks = store.list();
    let id = index
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|n| tasks.get(n))
        .map(|task| task.id.clone());
    match id {
        Some(id) => {
            report(op(&id));
            print_tasks(&store.list());
        }
        None => println!("no task at index `{index}`"),
    }
}

fn report(result: Result<(), pomokeeper::storage::StorageError>) {
    if let Err(error) = result {
        log::error!("task operation failed: {error}");
        println!("could not save tasks (see log)");
    }
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("(no tasks)");
        return;
    }
    for (index, task) in tasks.iter().enumerate() {
        println!(
            "{:>2}. [{}]{} {}{} ({} pomodoros)",
            index + 1,
            if task.completed { "x" } else { " " },
            if task.priority { "!" } else { " " },
            task.text,
            task.due_date
                .as_deref()
                .map(|due| format!(" (due {due})"))
                .unwrap_or_default(),
            task.pomodoros_completed
        );
    }
}

fn print_help() {
    println!("timer: start | pause | resume | stop | toggle | state | set <work> <break>");
    println!("tasks: add [!] <text> | list | done <n> | del <n> | pom <n> | edit <n> <text> | move <n> <m>");
}
