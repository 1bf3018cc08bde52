//! # 1024 CLI
//!
//! Play 1024 in the terminal, or drive a session from a script with one
//! command per line and JSON turn reports on stdout.

use std::io::{self, BufRead, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use game_1024_core::{goal_for, Command, Direction, GameError, Session, Status, TurnReport};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "game-1024")]
#[command(author, version, about = "Play 1024 in the terminal")]
struct Args {
    /// Squares per side, between 4 and 12
    #[arg(short = 'n', long, env = "GAME1024_SIZE", default_value = "4")]
    size: usize,

    /// Random seed for deterministic runs (defaults to OS entropy)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Read commands line by line from stdin and print JSON turn reports
    #[arg(long)]
    json: bool,

    /// Log engine events to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let session = match args.seed {
        Some(seed) => Session::with_seed(args.size, seed),
        None => Session::new(args.size),
    };
    let session = match session {
        Ok(session) => session,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::from(2);
        }
    };

    let result = if args.json {
        run_script(session)
    } else {
        run_interactive(session)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// What a keypress or script line asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Play(Command),
    /// Reset without a size yet; the size is prompted for.
    Reset,
    /// Debug poke without index and value yet; they are prompted for.
    Poke,
    Quit,
    None,
}

/// Run interactive mode where the user plays with the keyboard.
fn run_interactive(mut session: Session) -> io::Result<()> {
    enable_raw_mode();
    let result = interactive_loop(&mut session);
    disable_raw_mode();
    result
}

fn interactive_loop(session: &mut Session) -> io::Result<()> {
    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];
    let mut message = format!("Game ends when you reach {}.", session.goal());

    loop {
        print_screen(session, &message)?;
        if session.status().is_over() {
            print_final(session)?;
        }
        message.clear();

        let bytes_read = stdin.read(&mut buffer)?;
        if bytes_read == 0 {
            return Ok(());
        }

        let command = match parse_key(&buffer[..bytes_read]) {
            Input::Play(command) => command,
            Input::Reset => {
                let side = prompt("Enter the size board you want, between 4 and 12: ")?;
                match side.trim().parse() {
                    Ok(side) => Command::Reset(side),
                    Err(_) => {
                        message = format!("'{}' is not a board size.", side.trim());
                        continue;
                    }
                }
            }
            Input::Poke => {
                let line = prompt("Enter index and value: ")?;
                match parse_poke(&line) {
                    Some(command) => command,
                    None => {
                        message = "Expected an index and a value.".to_string();
                        continue;
                    }
                }
            }
            Input::Quit => {
                println!("\r\nThanks for playing. Exiting program...\r");
                return Ok(());
            }
            Input::None => continue,
        };

        message = match session.apply(command) {
            Ok(report) => describe(command, &report),
            Err(err) => describe_error(err),
        };
    }
}

/// Run script mode: one command per stdin line, one JSON report per line.
fn run_script(mut session: Session) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in io::stdin().lock().lines() {
        let line = line?;
        let command = match parse_line(&line) {
            Input::Play(command) => command,
            Input::Quit => break,
            Input::None => continue,
            Input::Reset | Input::Poke => {
                writeln!(out, "{}", error_json("missing arguments"))?;
                continue;
            }
        };

        match session.apply(command) {
            Ok(report) => {
                serde_json::to_writer(&mut out, &report)?;
                writeln!(out)?;
            }
            Err(err) => writeln!(out, "{}", error_json(&err.to_string()))?,
        }
    }
    Ok(())
}

fn error_json(message: &str) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

fn parse_key(bytes: &[u8]) -> Input {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => Input::Play(Command::Move(Direction::Up)),
        [27, 91, 66] => Input::Play(Command::Move(Direction::Down)),
        [27, 91, 67] => Input::Play(Command::Move(Direction::Right)),
        [27, 91, 68] => Input::Play(Command::Move(Direction::Left)),

        // WASD keys
        [b'w'] | [b'W'] => Input::Play(Command::Move(Direction::Up)),
        [b's'] | [b'S'] => Input::Play(Command::Move(Direction::Down)),
        [b'a'] | [b'A'] => Input::Play(Command::Move(Direction::Left)),
        [b'd'] | [b'D'] => Input::Play(Command::Move(Direction::Right)),

        // Control keys
        [b'u'] | [b'U'] => Input::Play(Command::Undo),
        [b'r'] | [b'R'] => Input::Reset,
        [b'p'] | [b'P'] => Input::Poke,
        [b'x'] | [b'X'] | [b'q'] | [b'Q'] | [3] | [27] => Input::Quit, // Ctrl+C, Esc

        _ => Input::None,
    }
}

/// Parse a script line such as `a`, `u`, `r 6` or `p 5 64`.
fn parse_line(line: &str) -> Input {
    let mut words = line.split_whitespace();
    let Some(key) = words.next() else {
        return Input::None;
    };
    let rest: Vec<&str> = words.collect();

    match (key.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("r", [side]) => match side.parse() {
            Ok(side) => Input::Play(Command::Reset(side)),
            Err(_) => Input::Reset,
        },
        ("r", _) => Input::Reset,
        ("p", _) => match parse_poke(&rest.join(" ")) {
            Some(command) => Input::Play(command),
            None => Input::Poke,
        },
        (single, []) if single.len() == 1 => parse_key(single.as_bytes()),
        _ => Input::None,
    }
}

fn parse_poke(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let index = words.next()?.parse().ok()?;
    let value = words.next()?.parse().ok()?;
    Some(Command::DebugSet { index, value })
}

fn describe(command: Command, report: &TurnReport) -> String {
    match command {
        Command::Undo => "* Undoing move *".to_string(),
        Command::Reset(side) => match goal_for(side) {
            Ok(goal) => format!("Resetting board. Game ends when you reach {}.", goal),
            Err(err) => describe_error(err),
        },
        Command::Move(_) if report.reward > 0 => format!("+{} points!", report.reward),
        Command::Move(_) if !report.changed => "That move does not change the board.".to_string(),
        _ => String::new(),
    }
}

fn describe_error(err: GameError) -> String {
    match err {
        GameError::AtHistoryBoundary => {
            "*** You cannot undo past the beginning of the game. Please retry. ***".to_string()
        }
        other => format!("*** {} ***", other),
    }
}

/// Read one line in cooked mode, then go back to raw mode.
fn prompt(text: &str) -> io::Result<String> {
    disable_raw_mode();
    print!("\r\n{}", text);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    enable_raw_mode();
    Ok(line)
}

fn print_screen(session: &Session, message: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "\x1b[2J\x1b[H")?; // Clear screen
    writeln!(out, "=== 1024 ===\r")?;
    writeln!(
        out,
        "WASD or Arrow Keys | U undo | R reset | P poke | X quit\r\n\r"
    )?;
    writeln!(out, "Score: {}\r", session.score())?;
    for line in session.board().to_string().lines() {
        writeln!(out, "{}\r", line)?;
    }
    let list: Vec<String> = session
        .history()
        .move_numbers()
        .map(|n| n.to_string())
        .collect();
    writeln!(out, "List: {}\r", list.join("->"))?;
    if !message.is_empty() {
        writeln!(out, "{}\r", message)?;
    }
    write!(out, "{}. Your move: ", session.move_number())?;
    out.flush()
}

fn print_final(session: &Session) -> io::Result<()> {
    match session.status() {
        Status::Won => println!(
            "\r\n\r\nCongratulations!  You made it to {} !!!\r",
            session.goal()
        ),
        Status::Lost => println!("\r\n\r\nNo more available moves. Game is over.\r"),
        Status::Playing => return Ok(()),
    }
    println!("Press U to undo, R to restart or X to quit\r");
    io::stdout().flush()
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
    // Without raw mode every key needs Enter.
}

#[cfg(not(unix))]
fn disable_raw_mode() {}
