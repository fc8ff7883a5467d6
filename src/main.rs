use clap::Parser;
use fable::{CodeManagement, Config, EngineEvent, ForthInterpreter, Observer, Outcome, Value};
use std::{
    io::{Write, stdout},
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fable")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "An educational Forth interpreter", long_about = None)]
struct Args {
    /// Forth source files to run, in order, before the REPL starts
    files: Vec<PathBuf>,

    /// Pause this many milliseconds after every visible step
    #[arg(long)]
    delay: Option<u64>,

    /// Print every word as it starts and completes, along with the stack
    #[arg(long)]
    trace: bool,

    /// Directory of the bundled libraries
    #[arg(long)]
    library_path: Option<PathBuf>,

    /// Directory SAVE-LIBRARY writes to
    #[arg(long)]
    user_libraries: Option<PathBuf>,

    /// Exit after running the files instead of starting the REPL
    #[arg(long)]
    no_repl: bool,
}

/// Prints the interpreter's output to stdout and its errors to stderr.
struct ConsoleObserver {
    trace: bool,
}

fn format_stack(stack: &[Value]) -> String {
    let items: Vec<String> = stack.iter().map(Value::to_string).collect();

    format!("[{}]", items.join(" "))
}

impl Observer for ConsoleObserver {
    fn notify(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::Output(text) => {
                print!("{}", text);
                let _ = stdout().flush();
            }

            EngineEvent::Error(message) => eprintln!("{}", message),

            EngineEvent::WordStarting { name, stack_effect } if self.trace => {
                eprintln!("-> {} {}", name, stack_effect);
            }

            EngineEvent::WordComplete { name, stack } if self.trace => {
                eprintln!("<- {} {}", name, format_stack(stack));
            }

            _ => {}
        }
    }
}

fn build_config(args: &Args) -> Config {
    let mut config = Config::from_env();

    if let Some(path) = &args.library_path {
        config.library_path = path.clone();
    }

    if let Some(path) = &args.user_libraries {
        config.user_library_path = path.clone();
    }

    if let Some(delay) = args.delay {
        config.delay = Duration::from_millis(delay);
    }

    config
}

async fn run_files(interpreter: &mut ForthInterpreter, files: &[PathBuf]) -> bool {
    for file in files {
        debug!(file = %file.display(), "running source file");

        let source = match tokio::fs::read_to_string(file).await {
            Ok(source) => source,
            Err(error) => {
                eprintln!("Could not read {}: {}", file.display(), error);
                return false;
            }
        };

        match interpreter.evaluate(&source).await {
            Ok(Outcome::Completed) => {}
            Ok(Outcome::Stopped) => {
                eprintln!("Stopped.");
                return false;
            }
            Err(_) => return false,
        }
    }

    true
}

async fn repl(interpreter: &mut ForthInterpreter) -> std::io::Result<()> {
    let mut lines = BufReader::new(stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match interpreter.evaluate(&line).await {
            Ok(Outcome::Completed) => {
                let prompt = if interpreter.is_compiling() { " compiled" } else { " ok" };
                println!("{}", prompt);
            }
            Ok(Outcome::Stopped) => println!(" stopped"),
            Err(_) => {}
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut interpreter = ForthInterpreter::with_config(build_config(&args));

    interpreter.add_observer(Box::new(ConsoleObserver { trace: args.trace }));

    // Ctrl-C stops whatever is running, the REPL itself keeps going.
    let control = interpreter.control();

    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            info!("stop requested");
            control.stop();
        }
    });

    if !run_files(&mut interpreter, &args.files).await {
        return ExitCode::FAILURE;
    }

    if args.no_repl {
        return ExitCode::SUCCESS;
    }

    match repl(&mut interpreter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Could not read input: {}", error);
            ExitCode::FAILURE
        }
    }
}
