use clap::{Args, Parser, Subcommand};
use pet_match::config::{LoggingSettings, Settings};
use pet_match::models::{Pet, SearchCriteria, User};
use pet_match::services::{DefaultHeaders, PetRepository};
use pet_match::store::{FileStorage, Mutation, SessionStore};
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use validator::Validate;

/// Pet adoption data and session tool
#[derive(Debug, Parser)]
#[command(name = "pet-match", version, about)]
struct Cli {
    /// Configuration file (default: config/default.toml, config/local.toml)
    #[arg(long, global = true, env = "PETMATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Inspect or change the persisted client session
    #[command(subcommand)]
    Session(SessionCommand),
    #[command(flatten)]
    Database(DatabaseCommand),
}

#[derive(Debug, Subcommand)]
enum DatabaseCommand {
    /// Apply database migrations
    Migrate,
    /// Create, read, update and delete pets
    #[command(subcommand)]
    Pets(PetCommand),
    /// Search pets a user has not liked yet
    Search(SearchArgs),
    /// List the pets a user has liked
    Liked { user_id: i32 },
    /// Record that a user liked a pet
    Like { user_id: i32, pet_id: i32 },
}

#[derive(Debug, Subcommand)]
enum PetCommand {
    List,
    Get { pet_id: i32 },
    /// Insert the pet described by a JSON file
    Add { file: PathBuf },
    /// Overwrite a pet from a JSON file
    Update {
        file: PathBuf,
        /// Id to update, overriding `petId` in the file
        #[arg(long)]
        pet_id: Option<i32>,
    },
    Delete { pet_id: i32 },
}

/// List flags take comma-separated values. Passing a flag with no value
/// asks for an empty list, which matches no pets on that attribute.
#[derive(Debug, Args)]
struct SearchArgs {
    #[arg(long)]
    user_id: i32,
    #[arg(long)]
    species_id: Option<i32>,
    #[arg(long)]
    sex: Option<String>,
    #[arg(long = "breed", num_args = 0.., value_delimiter = ',')]
    breed_ids: Option<Vec<i32>>,
    #[arg(long = "agency", num_args = 0.., value_delimiter = ',')]
    agency_ids: Option<Vec<i32>>,
    #[arg(long = "age-group", num_args = 0.., value_delimiter = ',')]
    age_groups: Option<Vec<String>>,
    #[arg(long = "activity-level", num_args = 0.., value_delimiter = ',')]
    activity_levels: Option<Vec<String>>,
    #[arg(long = "exercise-needs", num_args = 0.., value_delimiter = ',')]
    all_exercise_needs: Option<Vec<String>>,
    #[arg(long = "owner-experience", num_args = 0.., value_delimiter = ',')]
    owner_experiences: Option<Vec<String>>,
    #[arg(long = "size-group", num_args = 0.., value_delimiter = ',')]
    size_groups: Option<Vec<String>>,
    #[arg(long = "vocal-level", num_args = 0.., value_delimiter = ',')]
    vocal_levels: Option<Vec<String>>,
}

impl From<SearchArgs> for SearchCriteria {
    fn from(args: SearchArgs) -> Self {
        Self {
            user_id: args.user_id,
            species_id: args.species_id,
            breed_ids: args.breed_ids,
            agency_ids: args.agency_ids,
            sex: args.sex,
            age_groups: args.age_groups,
            activity_levels: args.activity_levels,
            all_exercise_needs: args.all_exercise_needs,
            owner_experiences: args.owner_experiences,
            size_groups: args.size_groups,
            vocal_levels: args.vocal_levels,
        }
    }
}

#[derive(Debug, Subcommand)]
enum SessionCommand {
    Show,
    /// Store a token (and optionally the user as JSON)
    Login {
        token: String,
        #[arg(long)]
        user: Option<String>,
    },
    Logout,
}

#[derive(Serialize)]
struct Outcome {
    success: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(|e| {
        eprintln!("Configuration error: {}", e);
        e
    })?;

    init_logging(&settings.logging);

    match cli.command {
        Command::Session(command) => run_session(&settings, command),
        Command::Database(command) => run_database(&settings, command).await,
    }
}

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries command output
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match logging.format.as_str() {
        "json" => subscriber.json().init(),
        "pretty" => subscriber.pretty().init(),
        _ => subscriber.init(),
    }
}

async fn run_database(settings: &Settings, command: DatabaseCommand) -> Result<(), Box<dyn Error>> {
    let repository = PetRepository::from_settings(&settings.database)
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            e
        })?;

    match command {
        DatabaseCommand::Migrate => repository.run_migrations().await?,
        DatabaseCommand::Pets(PetCommand::List) => print_json(&repository.get_all_pets().await)?,
        DatabaseCommand::Pets(PetCommand::Get { pet_id }) => {
            let pet = repository.get_pet(pet_id).await;
            if pet.is_empty() {
                info!("No pet with id {}", pet_id);
            }
            print_json(&pet)?;
        }
        DatabaseCommand::Pets(PetCommand::Add { file }) => {
            let pet = read_pet_file(&file)?;
            print_json(&Outcome {
                success: repository.add_pet(&pet).await,
            })?;
        }
        DatabaseCommand::Pets(PetCommand::Update { file, pet_id }) => {
            let mut pet = read_pet_file(&file)?;
            if let Some(pet_id) = pet_id {
                pet.pet_id = pet_id;
            }
            print_json(&Outcome {
                success: repository.update_pet(&pet).await,
            })?;
        }
        DatabaseCommand::Pets(PetCommand::Delete { pet_id }) => print_json(&Outcome {
            success: repository.delete_pet(pet_id).await,
        })?,
        DatabaseCommand::Search(args) => {
            let criteria = SearchCriteria::from(args);
            criteria.validate()?;

            let pets = repository.get_filtered_pets(&criteria).await;
            info!("Found {} pets for user {}", pets.len(), criteria.user_id);
            print_json(&pets)?;
        }
        DatabaseCommand::Liked { user_id } => print_json(&repository.get_liked_pets(user_id).await)?,
        DatabaseCommand::Like { user_id, pet_id } => print_json(&Outcome {
            success: repository.like_pet(user_id, pet_id).await,
        })?,
    }

    Ok(())
}

fn run_session(settings: &Settings, command: SessionCommand) -> Result<(), Box<dyn Error>> {
    let storage = FileStorage::open(&settings.storage.session_path)?;
    let mut store = SessionStore::restore(storage, DefaultHeaders::new());

    match command {
        SessionCommand::Show => {}
        SessionCommand::Login { token, user } => {
            store.commit(Mutation::SetAuthToken(token));
            if let Some(user) = user {
                let user: User = serde_json::from_str(&user)?;
                store.commit(Mutation::SetUser(user));
            }
            info!("Session saved to {}", store.storage().path().display());
        }
        SessionCommand::Logout => {
            store.commit(Mutation::Logout);
            info!("Session cleared");
        }
    }

    print_json(store.state())?;
    Ok(())
}

fn read_pet_file(path: &Path) -> Result<Pet, Box<dyn Error>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
