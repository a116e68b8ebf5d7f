mod bindings;
mod cli;
mod frame_loop;
mod report;
mod run;
mod surface;

use anyhow::Result;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();
    run::run(cli.run)
}
