use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::process;

use clap::{Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use terminal_size::{terminal_size, Width};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use yansi::Paint;

use panel::config::{self, DEFAULT_HOST, DEFAULT_PORT};
use panel::models::{AppState, Directory, Permission, RoleRecord, UserRecord};
use panel::services::{generate_password_hash, load_directory, persist_directory};
use panel::update::{self, Channel};

async fn build_state_from_env(env_file: Option<&str>) -> AppState {
    config::load_env_file(env_file);
    let data_path = config::get_data_file();
    let directory = match load_directory(&data_path).await {
        Ok(dir) => dir,
        Err(e) => {
            tracing::error!(%e, path = %data_path.display(), "Failed to load data file");
            eprintln!("{} {}: {}", Paint::red("Failed to load"), data_path.display(), e);
            process::exit(1);
        }
    };

    let mut state = AppState::new(directory, data_path);
    state.update_check_enabled = config::get_update_check_enabled();
    state.update_repo = config::get_update_repo();
    state.platform_index = config::get_platform_index();
    state.public_base_url = config::get_public_base_url();
    state
}

async fn start_server(mut state: AppState, host: &str, port: u16, stylesheet: Option<String>) {
    if let Some(path) = stylesheet {
        match std::fs::read_to_string(&path) {
            Ok(css) => {
                state.custom_css = Some(css);
                tracing::info!(%path, "Loaded custom stylesheet");
            }
            Err(e) => {
                tracing::error!(%e, "Failed to read custom stylesheet");
                eprintln!("{} {}: {}", Paint::red("Failed to read custom stylesheet at"), path, e);
                process::exit(1);
            }
        }
    }

    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(%e, "Invalid host/port format");
            eprintln!("{}: {}", Paint::red("Invalid host/port format"), e);
            process::exit(1);
        }
    };
    let app = panel::build_router(state);
    tracing::info!(%addr, "Starting panel server");
    println!("{} {}", Paint::green("Panel running on"), Paint::cyan(&format!("http://{}", addr)));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(%e, "Server encountered an error while running");
                eprintln!("{}: {}", Paint::red("Server error"), e);
                process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(%e, "Failed to bind to address; is the port already in use?");
            eprintln!(
                "{}: {}\n{}",
                Paint::red(&format!("Failed to bind to {}", addr)),
                e,
                Paint::yellow("Stop the process using this port, or pass a different --port value.")
            );
            process::exit(1);
        }
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }
    table.set_header(header);
    table
}

fn print_users(dir: &Directory) {
    if dir.users.is_empty() {
        println!("(no users)");
        return;
    }
    let mut table = new_table(vec!["ID", "Name", "Email", "Roles"]);
    for user in dir.users.values() {
        let roles: Vec<String> = dir.roles_of(user).into_iter().map(|r| r.slug).collect();
        table.add_row(vec![
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            roles.join(", "),
        ]);
    }
    println!("\n{table}\n");
}

fn print_roles(dir: &Directory) {
    if dir.roles.is_empty() {
        println!("(no roles)");
        return;
    }
    let mut table = new_table(vec!["ID", "Slug", "Name", "Permissions"]);
    for role in dir.roles.values() {
        let granted: Vec<&str> = role
            .permissions
            .iter()
            .filter(|(_, on)| **on)
            .map(|(slug, _)| slug.as_str())
            .collect();
        table.add_row(vec![
            role.id.to_string(),
            role.slug.clone(),
            role.name.clone(),
            granted.join(", "),
        ]);
    }
    println!("\n{table}\n");
}

async fn save_or_exit(state: &AppState) {
    if let Err(e) = persist_directory(state).await {
        eprintln!("{} {}: {}", Paint::red("Failed to write"), state.data_path.display(), e);
        process::exit(1);
    }
}

#[derive(Parser)]
#[command(
    name = "panel",
    author,
    version,
    about = "User and role administration panel",
    long_about = r#"A small administration panel for users and roles.

Run the web server, or manage the JSON data file directly from the command line.
Configuration comes from environment variables or an `.env` file:
DATA_FILE, PLATFORM_INDEX, PUBLIC_BASE_URL, UPDATE_CHECK, UPDATE_REPO.

Examples:
  panel serve --host 0.0.0.0 --port 8080
  panel users add "Ada Lovelace" ada@example.com secret --role admin
  panel check-update --channel beta
"#,
    after_help = "Use `panel <subcommand> --help` to get subcommand specific options."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Path to .env file
    #[arg(long, global = true)]
    env_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value_t = String::from(DEFAULT_HOST))]
        host: String,
        /// Port to bind to
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Path to a custom stylesheet to serve instead of the default
        #[arg(long)]
        stylesheet: Option<String>,
    },
    /// Manage users in the data file
    Users {
        #[command(subcommand)]
        sub: UserCommands,
    },
    /// Manage roles in the data file
    Roles {
        #[command(subcommand)]
        sub: RoleCommands,
    },
    /// Compare this build with the newest published release
    CheckUpdate {
        /// Release channel to check
        #[arg(long, value_enum, default_value_t = Channel::Stable)]
        channel: Channel,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    #[command(about = "List users", long_about = "Print every user with the slugs of their roles.")]
    List,
    #[command(about = "Add a user", long_about = "Create a user; the password is hashed before it is stored.")]
    Add {
        name: String,
        email: String,
        password: String,
        /// Role slug to assign (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,
    },
    #[command(about = "Reset a user's password", long_about = "Set a new password for the user with the given email.")]
    ResetPassword { email: String, password: String },
}

#[derive(Subcommand)]
enum RoleCommands {
    #[command(about = "List roles", long_about = "Print every role with the permissions it grants.")]
    List,
    #[command(about = "Add a role", long_about = "Create a role granting the given permission slugs (e.g. platform.systems.users).")]
    Add {
        slug: String,
        name: String,
        /// Permission slug to grant (repeatable)
        #[arg(long = "permission")]
        permissions: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    let env_file = cli.env_file.as_deref();
    let Some(command) = cli.command else {
        let state = build_state_from_env(env_file).await;
        start_server(state, DEFAULT_HOST, DEFAULT_PORT, None).await;
        return;
    };

    match command {
        Commands::Serve { host, port, stylesheet } => {
            let state = build_state_from_env(env_file).await;
            start_server(state, &host, port, stylesheet).await;
        }
        Commands::Users { sub } => {
            let state = build_state_from_env(env_file).await;
            match sub {
                UserCommands::List => print_users(&state.directory.lock().unwrap()),
                UserCommands::Add { name, email, password, roles } => {
                    let email = email.trim().to_string();
                    {
                        let mut dir = state.directory.lock().unwrap();
                        if dir.email_taken(&email, None) {
                            eprintln!("{} '{}' {}", Paint::red("User"), email, Paint::red("already exists"));
                            process::exit(1);
                        }
                        let mut role_ids = Vec::new();
                        for slug in &roles {
                            match dir.role_by_slug(slug) {
                                Some(role) => role_ids.push(role.id),
                                None => {
                                    eprintln!("{} '{}' {}", Paint::red("Role"), slug, Paint::red("not found"));
                                    process::exit(1);
                                }
                            }
                        }
                        let id = dir.next_user_id();
                        dir.insert_user(UserRecord {
                            id,
                            name: name.trim().to_string(),
                            email: email.clone(),
                            password: generate_password_hash(&password),
                            roles: Vec::new(),
                            permissions: BTreeMap::new(),
                        });
                        dir.replace_roles(id, &role_ids);
                    }
                    save_or_exit(&state).await;
                    println!("{} '{}' {}", Paint::green("User"), email, Paint::green("added"));
                }
                UserCommands::ResetPassword { email, password } => {
                    let found = {
                        let mut dir = state.directory.lock().unwrap();
                        let id = dir.user_by_email(&email).map(|u| u.id);
                        match id.and_then(|id| dir.user_mut(id)) {
                            Some(user) => {
                                user.password = generate_password_hash(&password);
                                true
                            }
                            None => false,
                        }
                    };
                    if !found {
                        eprintln!("{} '{}' {}", Paint::red("User"), email, Paint::red("not found"));
                        process::exit(1);
                    }
                    save_or_exit(&state).await;
                    println!("{} '{}' {}", Paint::green("Password for"), email, Paint::green("updated"));
                }
            }
        }
        Commands::Roles { sub } => {
            let state = build_state_from_env(env_file).await;
            match sub {
                RoleCommands::List => print_roles(&state.directory.lock().unwrap()),
                RoleCommands::Add { slug, name, permissions } => {
                    for p in &permissions {
                        if Permission::from_slug(p).is_none() {
                            eprintln!("{} '{}'", Paint::yellow("Granting unregistered permission"), p);
                        }
                    }
                    {
                        let mut dir = state.directory.lock().unwrap();
                        if dir.role_by_slug(&slug).is_some() {
                            eprintln!("{} '{}' {}", Paint::red("Role"), slug, Paint::red("already exists"));
                            process::exit(1);
                        }
                        let id = dir.next_role_id();
                        dir.insert_role(RoleRecord {
                            id,
                            slug: slug.clone(),
                            name,
                            permissions: permissions.into_iter().map(|p| (p, true)).collect(),
                        });
                    }
                    save_or_exit(&state).await;
                    println!("{} '{}' {}", Paint::green("Role"), slug, Paint::green("added"));
                }
            }
        }
        Commands::CheckUpdate { channel } => {
            config::load_env_file(env_file);
            let (owner, name) = config::get_update_repo();
            println!("Checking {}/{} on channel {}...", owner, name, channel);
            match update::check_for_update(&owner, &name, channel).await {
                Ok(status) if status.update_available() => {
                    println!(
                        "{} {} -> {}",
                        Paint::green("Update available:").bold(),
                        status.current,
                        Paint::cyan(&status.latest_text())
                    );
                    if let Some(url) = &status.release_url {
                        println!("Release notes: {}", Paint::new(url).underline());
                    }
                }
                Ok(status) => {
                    println!("{} ({})", Paint::green("You are running the latest version"), status.current);
                }
                Err(e) => {
                    eprintln!("{}: {}", Paint::red("Update check failed"), e);
                    process::exit(1);
                }
            }
        }
    }
}
