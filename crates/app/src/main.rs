use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

use services::{AppServices, Clock};
use sprout_core::model::GameId;
use sprout_core::unlock::{is_level_locked, stars_for_game};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingOperand { usage: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidLevel { raw: String },
    InvalidAccuracy { raw: String },
    InvalidMillis { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingOperand { usage } => write!(f, "usage: {usage}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidLevel { raw } => write!(f, "invalid level index: {raw}"),
            ArgsError::InvalidAccuracy { raw } => write!(f, "invalid accuracy: {raw}"),
            ArgsError::InvalidMillis { raw } => write!(f, "invalid milliseconds: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug)]
enum Command {
    Stats,
    Complete {
        game: GameId,
        level_index: u32,
        accuracy: f64,
    },
    PlayTime {
        game: GameId,
        millis: u64,
    },
    Reset,
}

#[derive(Debug)]
struct Args {
    data_file: Option<PathBuf>,
    command: Command,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, ArgsError> {
    let mut data_file = None;
    let mut positionals: Vec<String> = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data" => data_file = Some(PathBuf::from(require_value(&mut args, "--data")?)),
            other if other.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
            _ => positionals.push(arg),
        }
    }

    let mut operands = positionals.into_iter();
    let command = match operands.next().as_deref() {
        None | Some("stats") => Command::Stats,
        Some("complete") => {
            const USAGE: &str = "complete <game-id> <level-index> <accuracy>";
            let game = operands
                .next()
                .ok_or(ArgsError::MissingOperand { usage: USAGE })?;
            let level = operands
                .next()
                .ok_or(ArgsError::MissingOperand { usage: USAGE })?;
            let accuracy = operands
                .next()
                .ok_or(ArgsError::MissingOperand { usage: USAGE })?;
            Command::Complete {
                game: GameId::new(game),
                level_index: level
                    .parse()
                    .map_err(|_| ArgsError::InvalidLevel { raw: level.clone() })?,
                accuracy: accuracy
                    .parse()
                    .map_err(|_| ArgsError::InvalidAccuracy {
                        raw: accuracy.clone(),
                    })?,
            }
        }
        Some("play-time") => {
            const USAGE: &str = "play-time <game-id> <milliseconds>";
            let game = operands
                .next()
                .ok_or(ArgsError::MissingOperand { usage: USAGE })?;
            let millis = operands
                .next()
                .ok_or(ArgsError::MissingOperand { usage: USAGE })?;
            Command::PlayTime {
                game: GameId::new(game),
                millis: millis
                    .parse()
                    .map_err(|_| ArgsError::InvalidMillis { raw: millis.clone() })?,
            }
        }
        Some("reset") => Command::Reset,
        Some(other) => return Err(ArgsError::UnknownCommand(other.to_owned())),
    };

    Ok(Args { data_file, command })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- stats");
    eprintln!("  cargo run -p app -- complete <game-id> <level-index> <accuracy>");
    eprintln!("  cargo run -p app -- play-time <game-id> <milliseconds>");
    eprintln!("  cargo run -p app -- reset");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --data <path>   progress file (default: platform data dir)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SPROUT_DATA_FILE");
}

fn star_bar(stars: u8) -> String {
    let earned = usize::from(stars.min(3));
    format!("{}{}", "★".repeat(earned), "☆".repeat(3 - earned))
}

fn print_stats(services: &AppServices) {
    let registry = services.registry();
    let progress = services.progress();

    for meta in registry.games() {
        let state = progress.game_progress(&meta.id);
        let earned = stars_for_game(&state);
        let possible = meta.level_count() * 3;
        println!(
            "{} {} [{}] {earned}/{possible} stars",
            meta.icon, meta.title, meta.category
        );
        for (index, level) in meta.levels.iter().enumerate() {
            let ordinal = u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1);
            let stars = state.level(ordinal - 1).map(|lp| lp.stars).unwrap_or(0);
            let status = if is_level_locked(meta, &state, ordinal) {
                "locked".to_owned()
            } else {
                star_bar(stars)
            };
            println!("    {ordinal}. {:<16} {status}", level.name);
        }
        let minutes = state.total_play_time_ms / 60_000;
        if minutes > 0 {
            println!("    played {minutes} min");
        }
    }
    println!();
    println!("Total stars: {}", progress.total_stars());
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args(env::args().skip(1))?;

    let data_file = args
        .data_file
        .or_else(|| env::var_os("SPROUT_DATA_FILE").map(PathBuf::from));
    let services = match data_file {
        Some(path) => AppServices::new_json_file_at(path, Clock::default_clock()),
        None => AppServices::new_json_file(Clock::default_clock())?,
    };

    match args.command {
        Command::Stats => print_stats(&services),
        Command::Complete {
            game,
            level_index,
            accuracy,
        } => {
            services.progress().complete_level(&game, level_index, accuracy);
            let state = services.progress().game_progress(&game);
            let level = state.level(level_index);
            println!(
                "{game}: level {} recorded, {} (best {:.1}%), next playable level {}",
                level_index + 1,
                star_bar(level.map(|l| l.stars).unwrap_or(0)),
                level.map(|l| l.best_accuracy).unwrap_or(0.0),
                state.current_level
            );
        }
        Command::PlayTime { game, millis } => {
            services.progress().add_play_time(&game, millis);
            println!(
                "{game}: {} ms of play time recorded",
                services.progress().game_progress(&game).total_play_time_ms
            );
        }
        Command::Reset => {
            services.progress().reset_progress();
            println!("progress reset");
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            print_usage();
            ExitCode::FAILURE
        }
    }
}
