use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mxfixture_client::HomeserverClient;
use mxfixture_config::{load as load_config, FixtureConfig};
use mxfixture_runtime::{clock, telemetry, CommandRunner};
use tracing::info;

#[derive(Parser)]
#[command(name = "mxfixture")]
#[command(about = "Homeserver fixture steps for Maestro end-to-end flows")]
#[command(version)]
struct Cli {
    /// Homeserver base URL, overrides the configuration file
    #[arg(long, global = true, env = "FIXTURE_HOMESERVER")]
    homeserver: Option<String>,

    /// Password shared by the test accounts
    #[arg(long, global = true, env = "FIXTURE_PASSWORD")]
    password: Option<String>,

    /// Log requests as well as completed steps
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a user in and print the access token
    Login {
        #[arg(long, env = "FIXTURE_USER")]
        user: String,
    },
    /// Print the fully qualified ID of a local user
    UserId {
        #[arg(long, env = "FIXTURE_USER")]
        user: String,
    },
    /// Print the first room the user joined
    FirstRoom {
        #[arg(long, env = "FIXTURE_USER")]
        user: String,
    },
    /// Print the most recently joined room
    LatestRoom {
        #[arg(long, env = "FIXTURE_USER")]
        user: String,
    },
    /// Print the newest joined room whose name contains a pattern
    FindRoom {
        #[arg(long, env = "FIXTURE_USER")]
        user: String,
        #[arg(long, env = "FIXTURE_ROOM_NAME")]
        room_name: String,
    },
    /// Join a room
    Join {
        #[arg(long, env = "FIXTURE_USER")]
        user: String,
        #[arg(long, env = "FIXTURE_ROOM_ID")]
        room_id: String,
    },
    /// Leave a room
    Leave {
        #[arg(long, env = "FIXTURE_USER")]
        user: String,
        #[arg(long, env = "FIXTURE_ROOM_ID")]
        room_id: String,
    },
    /// Make every listed user leave all of their rooms
    Cleanup {
        #[arg(long, env = "FIXTURE_USERS", value_delimiter = ',', required = true)]
        users: Vec<String>,
    },
    /// Invite a user into a room as its admin
    Invite {
        #[arg(long, env = "FIXTURE_ADMIN_USER")]
        admin_user: String,
        #[arg(long, env = "FIXTURE_INVITE_USER")]
        invite_user: String,
        #[arg(long, env = "FIXTURE_ROOM_ID")]
        room_id: String,
    },
    /// Send a text message and print its transaction ID
    SendMessage {
        #[arg(long, env = "FIXTURE_USER")]
        user: String,
        #[arg(long, env = "FIXTURE_ROOM_ID")]
        room_id: String,
        #[arg(long, env = "FIXTURE_BODY")]
        body: String,
    },
    /// Send a location update and print its transaction ID
    SendLocation {
        #[arg(long, env = "FIXTURE_USER")]
        user: String,
        #[arg(long, env = "FIXTURE_ROOM_ID")]
        room_id: String,
        #[arg(long, env = "FIXTURE_LAT", allow_hyphen_values = true)]
        lat: String,
        #[arg(long, env = "FIXTURE_LON", allow_hyphen_values = true)]
        lon: String,
    },
    /// Open a direct room from one user to another and print its ID
    FriendRequest {
        #[arg(long, env = "FIXTURE_FROM_USER")]
        from_user: String,
        #[arg(long, env = "FIXTURE_TO_USER")]
        to_user: String,
    },
    /// Run a shell command and print its trimmed stdout
    Run {
        #[arg(long, env = "FIXTURE_SHELL_CMD", allow_hyphen_values = true)]
        command: String,
    },
    /// Pause for a number of milliseconds
    Sleep {
        #[arg(long, env = "FIXTURE_DURATION_MS")]
        duration_ms: u64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "debug" } else { "info" };
    telemetry::init_tracing(directive).context("failed to initialise tracing")?;

    let mut config = load_config().context("failed to load configuration")?;
    apply_overrides(&mut config, cli.homeserver, cli.password);

    if let Some(output) = execute(&config, cli.command).await? {
        println!("{output}");
    }
    Ok(())
}

fn apply_overrides(
    config: &mut FixtureConfig,
    homeserver: Option<String>,
    password: Option<String>,
) {
    if let Some(homeserver) = homeserver {
        config.homeserver.base_url = homeserver;
    }
    if let Some(password) = password {
        config.credentials.password = password;
    }
}

/// Run one fixture step. The returned value, if any, is what the calling
/// flow reads from stdout.
async fn execute(config: &FixtureConfig, command: Commands) -> Result<Option<String>> {
    match command {
        Commands::Run { command } => {
            let result = CommandRunner::new(&config.shell)
                .run_checked(&command)
                .await?;
            let stdout = result.stdout.trim();
            return Ok((!stdout.is_empty()).then(|| stdout.to_string()));
        }
        Commands::Sleep { duration_ms } => {
            clock::delay(duration_ms).await;
            return Ok(None);
        }
        _ => {}
    }

    let client = HomeserverClient::new(&config.homeserver)
        .context("failed to build homeserver client")?;
    let password = config.credentials.password.as_str();

    let output = match command {
        Commands::Login { user } => {
            let session = client.login(&user, password).await?;
            Some(session.access_token().to_string())
        }
        Commands::UserId { user } => Some(client.user_id(&user)),
        Commands::FirstRoom { user } => {
            let session = client.login(&user, password).await?;
            Some(client.first_room(&session).await?)
        }
        Commands::LatestRoom { user } => {
            let session = client.login(&user, password).await?;
            Some(client.latest_room(&session).await?)
        }
        Commands::FindRoom { user, room_name } => {
            let session = client.login(&user, password).await?;
            Some(client.find_room_by_name(&session, &room_name).await?.room_id)
        }
        Commands::Join { user, room_id } => {
            let session = client.login(&user, password).await?;
            client.join(&session, &room_id).await?;
            None
        }
        Commands::Leave { user, room_id } => {
            let session = client.login(&user, password).await?;
            client.leave(&session, &room_id).await?;
            None
        }
        Commands::Cleanup { users } => {
            let summary = client.leave_all(&users, password).await;
            info!(users = summary.len(), rooms = summary.total_left(), "cleanup complete");
            let lines: Vec<String> = summary
                .entries()
                .iter()
                .map(|entry| format!("{}={}", entry.username, entry.rooms_left))
                .collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        }
        Commands::Invite {
            admin_user,
            invite_user,
            room_id,
        } => {
            let admin = client.login(&admin_user, password).await?;
            let invitee = client.user_id(&invite_user);
            client.invite(&admin, &room_id, &invitee).await?;
            None
        }
        Commands::SendMessage { user, room_id, body } => {
            let session = client.login(&user, password).await?;
            Some(client.send_message(&session, &room_id, &body).await?.txn_id)
        }
        Commands::SendLocation {
            user,
            room_id,
            lat,
            lon,
        } => {
            let session = client.login(&user, password).await?;
            Some(client.send_location(&session, &room_id, &lat, &lon).await?.txn_id)
        }
        Commands::FriendRequest { from_user, to_user } => {
            let session = client.login(&from_user, password).await?;
            let invitee = client.user_id(&to_user);
            Some(client.create_direct_room(&session, &invitee).await?)
        }
        Commands::Run { .. } | Commands::Sleep { .. } => None,
    };

    Ok(output)
}
