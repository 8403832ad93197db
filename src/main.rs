// src/main.rs

use cycleflow::{cli, logging, run};

fn main() {
    if let Err(err) = run_main() {
        eprintln!("cycleflow error: {err:?}");
        std::process::exit(1);
    }
}

fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args)?;
    Ok(())
}
