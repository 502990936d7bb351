use chess_rules::terminal;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    log::info!("Chess rules terminal");

    if let Err(e) = terminal::run_interactive_terminal() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
