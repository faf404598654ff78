fn run() -> anyhow::Result<()> {
    env_logger::init();
    let cli = wxunlock::cli::parse();
    cli.execute()
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}
