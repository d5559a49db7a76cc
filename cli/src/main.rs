//! # slide128 CLI
//!
//! Command-line interface for playing the puzzle interactively or running
//! headless simulations with configurable policies. Interactive games are
//! saved to a JSON file and restored on the next launch.

mod store;

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use slide128_core::{Direction, MemoryStore, Session, SessionConfig};

use store::JsonFileStore;

#[derive(Parser, Debug)]
#[command(name = "slide128")]
#[command(author, version, about = "Play slide128 in the terminal or run simulations")]
struct Args {
    /// Run in interactive mode (default if no other mode specified)
    #[arg(short, long)]
    interactive: bool,

    /// Number of episodes to run in headless mode
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Random seed for deterministic runs
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Maximum steps per episode (0 = unlimited)
    #[arg(short, long, default_value = "10000")]
    max_steps: u32,

    /// Policy for headless mode
    #[arg(short, long, value_enum, default_value = "random")]
    policy: Policy,

    /// Tile value that wins the game
    #[arg(short, long, default_value = "128")]
    win_value: u32,

    /// Save file for interactive games
    #[arg(long, default_value = "slide128-save.json")]
    save_file: PathBuf,

    /// Show board after each move in headless mode
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Random valid moves
    Random,
    /// Cycle through actions: Left, Down, Right, Up
    Cycle,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if let Some(episodes) = args.episodes {
        run_headless(&args, episodes);
    } else {
        run_interactive(&args)?;
    }
    Ok(())
}

/// Run interactive mode where user plays with keyboard.
fn run_interactive(args: &Args) -> Result<()> {
    let store = JsonFileStore::open(args.save_file.clone())?;
    let config = SessionConfig {
        win_value: args.win_value,
    };
    let mut session = Session::new(config, args.seed, store);

    // Set terminal to raw mode for single-key input
    enable_raw_mode();

    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];

    draw(&session);

    loop {
        // Read input
        let bytes_read = stdin.read(&mut buffer).unwrap_or(0);
        if bytes_read == 0 {
            continue;
        }

        match parse_input(&buffer[..bytes_read]) {
            InputAction::Move(direction) => {
                let outcome = session.step(direction);
                if outcome.changed {
                    draw(&session);
                    if outcome.score_delta > 0 {
                        println!("  +{} points!", outcome.score_delta);
                    }
                    if session.has_won() {
                        println!("\n  *** YOU WIN ({} reached) ***", args.win_value);
                        println!("  Press U to undo, R to restart, Q to quit");
                    } else if session.is_game_over() {
                        println!("\n  *** GAME OVER ***");
                        println!("  Final Score: {}", session.score());
                        println!("  Max Tile: {}", session.max_tile());
                        println!("\n  Press U to undo, R to restart, Q to quit");
                    }
                }
            }
            InputAction::Undo => {
                if session.undo() {
                    draw(&session);
                }
            }
            InputAction::Restart => {
                session.new_game(args.seed);
                draw(&session);
            }
            InputAction::Quit => {
                disable_raw_mode();
                println!("\nGoodbye!");
                break;
            }
            InputAction::None => {}
        }
    }
    Ok(())
}

fn draw<S: slide128_core::Store>(session: &Session<S>) {
    println!("\x1b[2J\x1b[H"); // Clear screen
    println!("=== slide128 ===");
    println!("Controls: WASD or Arrow Keys | U undo | R restart | Q quit\n");
    println!("Score: {}  Best: {}", session.score(), session.best());
    print!("{}", session.grid());
    io::stdout().flush().ok();
}

/// Run headless simulation mode.
fn run_headless(args: &Args, episodes: u32) {
    let config = SessionConfig {
        win_value: args.win_value,
    };
    let mut total_score: u64 = 0;
    let mut max_tile_overall: u32 = 0;
    let mut wins: u32 = 0;
    let mut scores: Vec<u32> = Vec::with_capacity(episodes as usize);
    let mut max_tiles: Vec<u32> = Vec::with_capacity(episodes as usize);

    // Use a separate RNG for action selection
    let mut action_rng = SimpleRng::new(args.seed.wrapping_add(1000));

    for episode in 0..episodes {
        let episode_seed = args.seed.wrapping_add(episode as u64);
        let mut session = Session::new(config, episode_seed, MemoryStore::default());
        let mut steps = 0;
        let mut action_cycle = 0;

        while !session.is_game_over()
            && !session.has_won()
            && (args.max_steps == 0 || steps < args.max_steps)
        {
            let direction = match args.policy {
                Policy::Random => select_random_direction(&session, &mut action_rng),
                Policy::Cycle => select_cycle_direction(&session, &mut action_cycle),
            };

            if let Some(dir) = direction {
                session.step(dir);
                steps += 1;

                if args.verbose {
                    println!("Episode {} Step {}: {:?}", episode + 1, steps, dir);
                    println!("Score: {}", session.score());
                    print!("{}", session.grid());
                }
            } else {
                break; // No valid moves
            }
        }

        let score = session.score();
        let max_tile = session.max_tile();

        scores.push(score);
        max_tiles.push(max_tile);
        total_score += score as u64;
        max_tile_overall = max_tile_overall.max(max_tile);
        if session.has_won() {
            wins += 1;
        }

        if args.verbose {
            println!(
                "Episode {}: Score={}, MaxTile={}, Steps={}, Won={}",
                episode + 1,
                score,
                max_tile,
                steps,
                session.has_won()
            );
        }
    }

    // Compute statistics
    let avg_score = total_score as f64 / episodes as f64;
    scores.sort();
    let median_score = if episodes % 2 == 0 {
        (scores[(episodes / 2 - 1) as usize] + scores[(episodes / 2) as usize]) as f64 / 2.0
    } else {
        scores[(episodes / 2) as usize] as f64
    };

    // Count tile distribution
    let mut tile_counts = std::collections::HashMap::new();
    for tile in &max_tiles {
        *tile_counts.entry(*tile).or_insert(0u32) += 1;
    }

    // Output results in parseable format
    println!("=== Simulation Results ===");
    println!("episodes={}", episodes);
    println!("policy={:?}", args.policy);
    println!("seed={}", args.seed);
    println!("max_steps={}", args.max_steps);
    println!("win_value={}", args.win_value);
    println!("wins={}", wins);
    println!("avg_score={:.2}", avg_score);
    println!("median_score={:.2}", median_score);
    println!("min_score={}", scores.first().unwrap_or(&0));
    println!("max_score={}", scores.last().unwrap_or(&0));
    println!("max_tile_overall={}", max_tile_overall);

    // Tile distribution
    let mut tile_list: Vec<_> = tile_counts.iter().collect();
    tile_list.sort_by_key(|&(tile, _)| *tile);
    print!("tile_distribution=");
    for (i, (tile, count)) in tile_list.iter().enumerate() {
        if i > 0 {
            print!(",");
        }
        print!("{}:{}", tile, count);
    }
    println!();
}

/// Select a random legal direction.
fn select_random_direction<S: slide128_core::Store>(
    session: &Session<S>,
    rng: &mut SimpleRng,
) -> Option<Direction> {
    let legal = session.legal_moves();
    let valid: Vec<Direction> = Direction::all()
        .into_iter()
        .enumerate()
        .filter(|(i, _)| legal[*i])
        .map(|(_, d)| d)
        .collect();

    if valid.is_empty() {
        None
    } else {
        let idx = (rng.next() as usize) % valid.len();
        Some(valid[idx])
    }
}

/// Select direction in a cycle: Left, Down, Right, Up.
fn select_cycle_direction<S: slide128_core::Store>(
    session: &Session<S>,
    cycle: &mut usize,
) -> Option<Direction> {
    let order = [
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
    ];
    let legal = session.legal_moves();

    // Try directions in cycle order, starting from current position
    for _ in 0..4 {
        let direction = order[*cycle % 4];
        *cycle += 1;
        if legal[direction as usize] {
            return Some(direction);
        }
    }

    None
}

/// Simple xorshift RNG for action selection.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }
}

enum InputAction {
    Move(Direction),
    Undo,
    Restart,
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Direction::Up),    // Up arrow
        [27, 91, 66] => InputAction::Move(Direction::Down),  // Down arrow
        [27, 91, 67] => InputAction::Move(Direction::Right), // Right arrow
        [27, 91, 68] => InputAction::Move(Direction::Left),  // Left arrow

        // WASD keys
        [b'w'] | [b'W'] => InputAction::Move(Direction::Up),
        [b's'] | [b'S'] => InputAction::Move(Direction::Down),
        [b'a'] | [b'A'] => InputAction::Move(Direction::Left),
        [b'd'] | [b'D'] => InputAction::Move(Direction::Right),

        // Control keys
        [b'u'] | [b'U'] => InputAction::Undo,
        [b'r'] | [b'R'] => InputAction::Restart,
        [b'q'] | [b'Q'] | [3] | [27] => InputAction::Quit, // q, Q, Ctrl+C, Esc

        _ => InputAction::None,
    }
}

// Platform-specific terminal raw mode handling
#[cfg(unix)]
fn enable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios.c_lflag &= !(libc::ICANON | libc::ECHO);
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(unix)]
fn disable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios.c_lflag |= libc::ICANON | libc::ECHO;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(not(unix))]
fn enable_raw_mode() {
    // On non-Unix systems, just continue without raw mode
    // Interactive mode will require Enter after each key
}

#[cfg(not(unix))]
fn disable_raw_mode() {}
