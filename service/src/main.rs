use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use minesweeper_core::{CellCount, Coord, Flag, Game, GameId, render_status};
use minesweeper_service::store::{DocumentStore, GameStore};
use minesweeper_service::{GameService, ServiceConfig, StoreConfig};

#[derive(Parser, Debug)]
#[command(version, about = "Play minesweeper games kept in a local store", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// TOML file selecting the store backend
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep games in this directory, overriding the config file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a new game
    New {
        user: String,
        #[arg(long, default_value_t = 9)]
        rows: Coord,
        #[arg(long, default_value_t = 9)]
        columns: Coord,
        #[arg(long, default_value_t = 10)]
        mines: CellCount,
    },
    /// Reveal a cell
    Reveal {
        user: String,
        game: GameId,
        row: Coord,
        column: Coord,
    },
    /// Put or remove a marker: red_flag or question_mark
    Flag {
        user: String,
        game: GameId,
        row: Coord,
        column: Coord,
        #[arg(default_value = "red_flag")]
        marker: String,
    },
    /// Show what the player currently sees
    Show { user: String, game: GameId },
    /// Show the whole minefield
    Solution { user: String, game: GameId },
    /// List a user's games
    Games { user: String },
    /// List every user with stored games
    Users,
    /// Delete every stored game
    Reset,
}

fn store_config(args: &Args) -> anyhow::Result<StoreConfig> {
    let mut config = match &args.config {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    if let Some(path) = &args.data_dir {
        config.store = StoreConfig::Document {
            path: path.clone(),
            timeout_ms: match config.store {
                StoreConfig::Document { timeout_ms, .. } => timeout_ms,
                StoreConfig::Memory => DocumentStore::DEFAULT_TIMEOUT.as_millis() as u64,
            },
        };
    }
    Ok(config.store)
}

fn print_game(game: &Game) {
    let (rows, columns) = game.size();
    println!(
        "game {} ({}x{}, {} mines, {} left) {}",
        game.game_id(),
        rows,
        columns,
        game.total_mines(),
        game.mines_left(),
        game.status().as_str()
    );
    print!("{}", render_status(game));
    if let Some(finish) = game.finish() {
        println!("finished after {}s", (finish - game.start()).num_seconds());
    }
}

fn run<S: GameStore>(service: &GameService<S>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::New {
            user,
            rows,
            columns,
            mines,
        } => print_game(&service.create_game(&user, rows, columns, mines)?),
        Command::Reveal {
            user,
            game,
            row,
            column,
        } => print_game(&service.reveal_cell(&user, game, (row, column))?),
        Command::Flag {
            user,
            game,
            row,
            column,
            marker,
        } => {
            let marker: Flag = marker.parse()?;
            print_game(&service.flag_cell(&user, game, (row, column), marker)?);
        }
        Command::Show { user, game } => match service.game(&user, game)? {
            Some(game) => print_game(&game),
            None => bail!("game {game} not found for {user}"),
        },
        Command::Solution { user, game } => match service.show_solution(&user, game)? {
            Some(solution) => print!("{solution}"),
            None => bail!("game {game} not found for {user}"),
        },
        Command::Games { user } => match service.games_for_user(&user)? {
            Some(user_game) => {
                for game in &user_game.games {
                    let (rows, columns) = game.size();
                    println!(
                        "{}\t{}x{}\t{} mines\t{}",
                        game.game_id(),
                        rows,
                        columns,
                        game.total_mines(),
                        game.status().as_str()
                    );
                }
            }
            None => bail!("no games for {user}"),
        },
        Command::Users => {
            for user_game in service.all_users()? {
                println!("{}\t{} game(s)", user_game.user_id, user_game.games.len());
            }
        }
        Command::Reset => service.delete_all()?,
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let store_config = store_config(&args)?;
    log::debug!("store: {:?}", store_config);
    let service = GameService::new(store_config.open().context("opening game store")?);

    run(&service, args.command)
}
