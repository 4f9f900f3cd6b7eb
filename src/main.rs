use color_eyre::Result;
use clap::Parser;
use std::io;
use std::sync::Arc;
use mindscribe::{
    Config, Dashboard, HttpJournalApi, Profile, Session,
    cli::{self, Cli, Commands},
    dashboard::SyncRunner,
    logging::{self, LogTarget},
    session::ConfiguredIdentity,
    utils,
};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev selects a separate config and log location
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(&utils::expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if let Some(user) = cli.user {
        config.user_id = Some(user);
    }

    let command = cli.command.unwrap_or(Commands::Tui);

    // The dashboard owns the terminal, everything else logs to stderr
    let log_target = match command {
        Commands::Tui => {
            let data_dir = utils::get_data_dir(profile)
                .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine data directory"))?;
            LogTarget::File(data_dir.join(logging::LOG_FILE_NAME))
        }
        _ => LogTarget::Stderr,
    };
    logging::init(&config.log_level, &log_target)?;

    let zone = config.display_zone()?;
    let api = Arc::new(HttpJournalApi::new(&config.api.base_url, config.request_timeout())?);
    log::info!("Using Journal API at {}", api.base_url());

    let identity = ConfiguredIdentity { user_id: config.user_id.clone() };
    let session = Session::resolve(cli.demo, &identity, &config.demo_user_id);
    let mut dashboard = Dashboard::new(session, config.chat_context_settings());

    if let Commands::Tui = command {
        let app = mindscribe::tui::App::new(config, zone, dashboard, api)?;
        mindscribe::tui::run_event_loop(app)?;
        return Ok(());
    }

    let runner = SyncRunner::new(api.as_ref());
    let mut out = io::stdout().lock();

    match command {
        Commands::Tui => {}
        Commands::Health => {
            cli::handle_health(api.as_ref(), &mut out)?;
        }
        Commands::Entries => {
            cli::handle_list_entries(&mut dashboard, &runner, &zone, &mut out)?;
        }
        Commands::Log { content } => {
            cli::handle_log(content, &mut dashboard, &runner, &mut out)?;
        }
        Commands::DeleteEntry { id, yes } => {
            let mut input = io::stdin().lock();
            cli::handle_delete_entry(id, yes, &mut dashboard, &runner, &mut input, &mut out)?;
        }
        Commands::Analyze { ids } => {
            cli::handle_analyze(ids, &mut dashboard, &runner, &zone, &mut out)?;
        }
        Commands::Goals => {
            cli::handle_list_goals(&mut dashboard, &runner, &mut out)?;
        }
        Commands::AddGoal { title } => {
            cli::handle_add_goal(title, &mut dashboard, &runner, &mut out)?;
        }
        Commands::DeleteGoal { id } => {
            cli::handle_delete_goal(id, &mut dashboard, &runner, &mut out)?;
        }
        Commands::Chat { message } => {
            cli::handle_chat(message, &mut dashboard, &runner, &mut out)?;
        }
    }

    Ok(())
}
