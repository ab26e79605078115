//! Person CLI - Application entry point
//!
//! Wires settings, the store binding and the person repository, then runs one
//! command. Ctrl-C cancels the in-flight store call.

mod args;

use std::sync::Arc;

use clap::Parser;

use args::{Cli, Commands};
use common::{init_tracing, AppError, AppResult, MongoSettings, TracingErrorLogger};
use domain::Person;
use repositories::{
    CancellationToken, Filter, MemoryStore, MongoStore, PersonRepository, PersonStore, Repository,
    Sort, StoreClient,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { "info" });

    let settings = MongoSettings::from_env();
    tracing::debug!(?settings, "Configuration loaded");

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            trigger.cancel();
        }
    });

    if let Err(e) = run(cli, settings, &cancel).await {
        tracing::error!(code = e.code(), "Command failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, settings: MongoSettings, cancel: &CancellationToken) -> AppResult<()> {
    let client: Arc<dyn StoreClient> = if cli.memory {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(MongoStore::connect(&settings).await?)
    };
    let logger = Arc::new(TracingErrorLogger::new(settings.namespace()));
    let persons = PersonStore::new(client, &settings, logger)?;

    match cli.command {
        Commands::Add {
            first_name,
            last_name,
            age,
        } => {
            let person = Person::new(first_name, last_name, age);
            let id = person.id;
            ensure_written(persons.create(person, Some(cancel)).await, "insert")?;
            println!("{}", id);
        }
        Commands::Get { id } => match persons.find_by_id(id, Some(cancel)).await? {
            Some(person) => print_person(&person),
            None => println!("No person with id {}", id),
        },
        Commands::UpdateAge { id, age } => {
            let Some(mut person) = persons.find_by_id(id, Some(cancel)).await? else {
                return Err(AppError::validation(format!("no person with id {}", id)));
            };
            person.age = age;
            ensure_written(persons.update(person, Some(cancel)).await, "update")?;
        }
        Commands::Adults => {
            for person in persons.find_adult_persons(Some(cancel)).await? {
                print_person(&person);
            }
        }
        Commands::List {
            skip,
            limit,
            sort_by_age,
        } => {
            let sort = sort_by_age.then(|| Sort::descending("age"));
            let page = persons
                .find(Filter::empty(), sort, skip, limit, Some(cancel))
                .await?;
            for person in page {
                print_person(&person);
            }
        }
    }

    Ok(())
}

/// Write failures are already logged by the repository
fn ensure_written(written: bool, operation: &str) -> AppResult<()> {
    if written {
        Ok(())
    } else {
        Err(AppError::internal(format!("{} was not acknowledged", operation)))
    }
}

fn print_person(person: &Person) {
    println!("{}\t{}\t{}", person.id, person.full_name(), person.age);
}
