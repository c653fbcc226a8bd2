mod cli;
mod paths;
mod run;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Command::Render(args) => run::render(args),
        Command::Simulate(args) => run::simulate(args),
        Command::Where => run::describe_paths(),
    }
}
