use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use stepwise::app::App;
use stepwise::config::Config;
use stepwise::hotkeys::HotkeyDispatcher;
use stepwise::logging;
use stepwise::manifest::TourManifest;
use stepwise::search::SearchOutcome;
use stepwise::ui::geometry_for;
use stepwise::window::Window;
use stepwise::{StepNavigator, Tour};

#[derive(Parser)]
#[command(name = "stepwise")]
#[command(about = "Guided step-by-step tours over an embedded document")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Tour manifest to run (same as `stepwise run <TOUR>`)
    tour: Option<PathBuf>,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tour in the terminal
    Run {
        /// Tour manifest (TOML, YAML or JSON)
        tour: PathBuf,
    },

    /// List the steps of a tour
    Outline {
        tour: PathBuf,
    },

    /// Search a tour and print the steps that match
    Search {
        tour: PathBuf,

        /// Text to look for (matched literally, ignoring case)
        query: String,

        /// Print highlighted markup of every matching step
        #[arg(short, long)]
        markup: bool,
    },

    /// Print the overlay markup built from a tour
    Markup {
        tour: PathBuf,
    },

    /// List the configured hotkeys
    Keys,

    /// Write the effective configuration as TOML
    Init {
        /// Destination (defaults to the per-user config file)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configuration first; logging depends on it
    let config = Config::load(cli.config.as_deref())?;

    let command = match (cli.command, cli.tour) {
        (Some(command), _) => command,
        (None, Some(tour)) => Commands::Run { tour },
        (None, None) => bail!("No tour given. Run `stepwise --help` for usage."),
    };

    let is_tui_mode = matches!(command, Commands::Run { .. });
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match command {
        Commands::Run { tour } => {
            run_tui(config, &tour, logging_handle.log_file_path)?;
        }
        Commands::Outline { tour } => {
            cmd_outline(&config, &tour)?;
        }
        Commands::Search {
            tour,
            query,
            markup,
        } => {
            cmd_search(&config, &tour, &query, markup)?;
        }
        Commands::Markup { tour } => {
            cmd_markup(&config, &tour)?;
        }
        Commands::Keys => {
            cmd_keys(&config)?;
        }
        Commands::Init { path, force } => {
            cmd_init(&config, path, force)?;
        }
    }

    Ok(())
}

fn load_navigator(config: &Config, path: &Path) -> Result<StepNavigator> {
    let manifest = TourManifest::from_path(path)
        .with_context(|| format!("Failed to load tour {}", path.display()))?;
    let navigator = StepNavigator::new(manifest.to_element(), &config.navigator_options())
        .with_context(|| format!("Invalid tour {}", path.display()))?;
    Ok(navigator)
}

fn run_tui(config: Config, path: &Path, log_file_path: Option<PathBuf>) -> Result<()> {
    let manifest = TourManifest::from_path(path)
        .with_context(|| format!("Failed to load tour {}", path.display()))?;
    let size = crossterm::terminal::size().context("Failed to read terminal size")?;

    let mut app = App::new(config, manifest.to_element(), size)?;
    let result = app.run();

    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

fn cmd_outline(config: &Config, path: &Path) -> Result<()> {
    let navigator = load_navigator(config, path)?;
    if navigator.is_empty() {
        println!("(no steps)");
        return Ok(());
    }
    for step in navigator.steps() {
        println!("{:>3}. {}", step.index() + 1, step.title());
    }
    Ok(())
}

fn cmd_search(config: &Config, path: &Path, query: &str, markup: bool) -> Result<()> {
    let mut navigator = load_navigator(config, path)?;
    match navigator.search(query)? {
        SearchOutcome::Skipped => {
            println!("Empty query; nothing searched.");
        }
        SearchOutcome::Applied { highlights: 0, .. } => {
            println!("No matches for '{}'.", query);
        }
        SearchOutcome::Applied { steps, highlights } => {
            println!("{} matches in {} steps:", highlights, steps);
            let arena = navigator.search_engine().highlights();
            for index in arena.steps() {
                let title = navigator.steps().get(index).map_or("", |step| step.title());
                println!("{:>3}. {} ({})", index + 1, title, arena.for_step(index).len());
                if markup {
                    if let Some(text) = navigator.highlighted_markup(index) {
                        println!("     {}", text);
                    }
                }
            }
        }
    }
    Ok(())
}

fn cmd_markup(config: &Config, path: &Path) -> Result<()> {
    let manifest = TourManifest::from_path(path)
        .with_context(|| format!("Failed to load tour {}", path.display()))?;
    let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut window = Window::new(geometry_for(width, height));
    let mut tour = Tour::mount(
        manifest.to_element(),
        &config.tour_options(),
        config.dispatcher()?,
        &mut window,
    )
    .with_context(|| format!("Invalid tour {}", path.display()))?;
    println!("{}", tour.navigator().root().to_markup());
    tour.detach(&mut window);
    Ok(())
}

fn cmd_init(config: &Config, path: Option<PathBuf>, force: bool) -> Result<()> {
    let target = path
        .clone()
        .or_else(Config::user_config_path)
        .context("No config directory on this platform")?;
    if target.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", target.display());
    }
    match path {
        Some(path) => config.save_to(&path)?,
        None => config.save()?,
    }
    println!("Wrote {}", target.display());
    Ok(())
}

fn cmd_keys(config: &Config) -> Result<()> {
    let dispatcher: HotkeyDispatcher = config.dispatcher()?;
    for (category, shortcuts) in dispatcher.shortcuts_by_category() {
        println!("{}:", category.display_name());
        for shortcut in shortcuts {
            println!(
                "  {}{}",
                shortcut.key_display_padded(),
                shortcut.operation.description()
            );
        }
    }
    Ok(())
}
