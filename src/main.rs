//! Postcap - command-line front end over the saved workspace
//!
//! Every mutating command loads the workspace, applies one operation and
//! saves it again.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use postcap::constants::LOG_FILE;
use postcap::query::split_url;
use postcap::storage::{export_json, import_json};
use postcap::{parse_curl, to_curl, HttpRequest, LoggedRequest, RequestTree, Storage};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory (defaults to ~/.postcap)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show root requests and collections
    List,
    /// Save a cURL command as a request (reads stdin when omitted)
    ImportCurl {
        #[arg(long)]
        collection: Option<String>,
        command: Option<String>,
    },
    /// Print a saved request as a cURL command
    ExportCurl { id: String },
    NewCollection { name: String },
    NewRequest {
        #[arg(long)]
        collection: Option<String>,
    },
    /// Rename a collection or a request
    Rename { id: String, name: String },
    /// Delete a collection (with its requests) or a request
    Delete { id: String },
    Duplicate { id: String },
    /// Move a request into a collection, or to root without --to
    Move {
        id: String,
        #[arg(long)]
        to: Option<String>,
    },
    /// Collapse or expand a collection
    Toggle { id: String },
    /// Print the workspace as JSON
    ExportJson,
    /// Replace the workspace with a JSON document from stdin
    ImportJson,
    /// Remove every collection and request
    Reset,
    #[command(subcommand)]
    Capture(CaptureCommand),
}

#[derive(Subcommand, Debug)]
enum CaptureCommand {
    /// Record one JSON-encoded captured request from stdin
    Record,
    List {
        #[arg(long)]
        filter: Option<String>,
    },
    Curl { id: String },
    /// Copy a captured request into the workspace
    Import {
        id: String,
        #[arg(long)]
        collection: Option<String>,
    },
    Delete { id: String },
    Clear,
    /// Pause or resume recording
    Toggle,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = match &cli.data_dir {
        Some(dir) => Storage::at(dir),
        None => Storage::new(),
    };

    // Initialize logging to file
    storage.ensure_dir()?;
    let file_appender = tracing_appender::rolling::never(storage.data_dir(), LOG_FILE);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!(command = ?cli.command, "Running command");
    let result = run(cli.command, &storage);
    if let Err(e) = &result {
        tracing::warn!(error = %e, "Command failed");
    }
    result
}

fn run(command: Command, storage: &Storage) -> Result<()> {
    match command {
        Command::List => print_tree(&storage.load_tree()?),
        Command::ImportCurl { collection, command } => {
            let text = match command {
                Some(c) => c,
                None => read_stdin()?,
            };
            let draft = parse_curl(&text).ok_or_else(|| anyhow!("Input is not a curl command"))?;
            mutate(storage, |tree| {
                tree.insert_request(collection.as_deref(), draft)
                    .ok_or_else(|| unknown("collection", collection.as_deref().unwrap_or_default()))
                    .map(|id| println!("{id}"))
            })?;
        }
        Command::ExportCurl { id } => {
            let tree = storage.load_tree()?;
            let request = tree.find_request(&id).ok_or_else(|| unknown("request", &id))?;
            println!("{}", to_curl(request));
        }
        Command::NewCollection { name } => mutate(storage, |tree| {
            println!("{}", tree.create_collection(&name));
            Ok(())
        })?,
        Command::NewRequest { collection } => mutate(storage, |tree| {
            tree.create_request(collection.as_deref())
                .ok_or_else(|| unknown("collection", collection.as_deref().unwrap_or_default()))
                .map(|id| println!("{id}"))
        })?,
        Command::Rename { id, name } => {
            if name.trim().is_empty() {
                bail!("Name must not be blank");
            }
            mutate(storage, |tree| {
                let renamed = tree.rename_collection(&id, &name) || tree.rename_request(&id, &name);
                ensure_found(renamed, &id)
            })?
        }
        Command::Delete { id } => mutate(storage, |tree| {
            let deleted = tree.delete_collection(&id) || tree.delete_request(&id);
            ensure_found(deleted, &id)
        })?,
        Command::Duplicate { id } => mutate(storage, |tree| {
            tree.duplicate_request(&id)
                .ok_or_else(|| unknown("request", &id))
                .map(|copy| println!("{copy}"))
        })?,
        Command::Move { id, to } => mutate(storage, |tree| {
            if tree.find_request(&id).is_none() {
                return Err(unknown("request", &id));
            }
            if !tree.move_request(&id, to.as_deref()) {
                tracing::info!(id = %id, "Request already in target container");
            }
            Ok(())
        })?,
        Command::Toggle { id } => mutate(storage, |tree| ensure_found(tree.toggle_collapse(&id), &id))?,
        Command::ExportJson => println!("{}", export_json(&storage.load_tree()?)?),
        Command::ImportJson => {
            let tree = import_json(&read_stdin()?)?;
            storage.save_tree(&tree)?;
        }
        Command::Reset => mutate(storage, |tree| {
            tree.reset();
            Ok(())
        })?,
        Command::Capture(cmd) => run_capture(cmd, storage)?,
    }
    Ok(())
}

fn run_capture(command: CaptureCommand, storage: &Storage) -> Result<()> {
    let mut log = storage.load_capture()?;
    match command {
        CaptureCommand::Record => {
            let entry: LoggedRequest =
                serde_json::from_str(&read_stdin()?).context("Invalid captured request")?;
            if !log.record(entry) {
                eprintln!("Recording is paused");
            }
            storage.save_capture(&log)?;
        }
        CaptureCommand::List { filter } => {
            for entry in log.filter(filter.as_deref().unwrap_or_default()) {
                let (origin, path) = split_url(&entry.url);
                let time = entry
                    .captured_at()
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_default();
                println!("{:<8} {:<7} {:>3} {}{}  [{}]", time, entry.method, entry.status, origin, path, entry.id);
            }
        }
        CaptureCommand::Curl { id } => {
            println!("{}", log.to_curl(&id).ok_or_else(|| unknown("captured request", &id))?);
        }
        CaptureCommand::Import { id, collection } => {
            let draft = log.import(&id).ok_or_else(|| unknown("captured request", &id))?;
            mutate(storage, |tree| {
                tree.insert_request(collection.as_deref(), draft)
                    .ok_or_else(|| unknown("collection", collection.as_deref().unwrap_or_default()))
                    .map(|new_id| println!("{new_id}"))
            })?;
        }
        CaptureCommand::Delete { id } => {
            ensure_found(log.delete(&id), &id)?;
            storage.save_capture(&log)?;
        }
        CaptureCommand::Clear => {
            log.clear();
            storage.save_capture(&log)?;
        }
        CaptureCommand::Toggle => {
            let recording = log.toggle_recording();
            println!("{}", if recording { "recording" } else { "paused" });
            storage.save_capture(&log)?;
        }
    }
    Ok(())
}

/// Load, apply one change, save
fn mutate<F>(storage: &Storage, change: F) -> Result<()>
where
    F: FnOnce(&mut RequestTree) -> Result<()>,
{
    let mut tree = storage.load_tree()?;
    change(&mut tree)?;
    storage.save_tree(&tree)
}

fn unknown(kind: &str, id: &str) -> anyhow::Error {
    anyhow!("No {} with id `{}`", kind, id)
}

fn ensure_found(found: bool, id: &str) -> Result<()> {
    if found {
        Ok(())
    } else {
        Err(unknown("item", id))
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
    Ok(buf)
}

fn print_tree(tree: &RequestTree) {
    println!("Requests");
    for request in &tree.root_requests {
        print_request(request, "  ");
    }
    println!("Collections");
    for collection in &tree.collections {
        let marker = if collection.collapsed { '+' } else { '-' };
        println!(
            "  {} {} ({})  [{}]",
            marker,
            collection.name,
            collection.requests.len(),
            collection.id
        );
        if !collection.collapsed {
            for request in &collection.requests {
                print_request(request, "      ");
            }
        }
    }
}

fn print_request(request: &HttpRequest, indent: &str) {
    let name = if request.name.is_empty() { "(untitled)" } else { request.name.as_str() };
    println!("{}{:<7} {}  [{}]", indent, request.method, name, request.id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from(["postcap", "--data-dir", "/tmp/x", "move", "r1", "--to", "c1"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        match cli.command {
            Command::Move { id, to } => {
                assert_eq!(id, "r1");
                assert_eq!(to.as_deref(), Some("c1"));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["postcap", "capture", "list", "--filter", "api"]).unwrap();
        assert!(matches!(cli.command, Command::Capture(CaptureCommand::List { filter: Some(_) })));
    }

    #[test]
    fn test_commands_mutate_saved_workspace() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::at(dir.path());

        run(Command::NewCollection { name: "Auth".into() }, &storage).unwrap();
        let col = storage.load_tree().unwrap().collections[0].id.clone();

        run(
            Command::ImportCurl {
                collection: Some(col.clone()),
                command: Some("curl -X POST 'https://x.dev/login' -d 'a=1'".into()),
            },
            &storage,
        )
        .unwrap();
        let req = storage.load_tree().unwrap().collections[0].requests[0].id.clone();

        run(Command::Move { id: req.clone(), to: None }, &storage).unwrap();
        let tree = storage.load_tree().unwrap();
        assert_eq!(tree.root_requests[0].id, req);
        assert!(tree.collections[0].requests.is_empty());

        assert!(run(Command::Delete { id: "missing".into() }, &storage).is_err());
        run(Command::Delete { id: col }, &storage).unwrap();
        assert!(storage.load_tree().unwrap().collections.is_empty());
    }

    #[test]
    fn test_import_rejects_non_curl_input() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::at(dir.path());
        let err = run(
            Command::ImportCurl { collection: None, command: Some("wget https://x.dev".into()) },
            &storage,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not a curl command"));
    }
}
