use relaycrew::app::command_handlers;

fn output_header() -> &'static str {
    "relaycrew\nSequential multi-agent project orchestrator with checkpointed resume."
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    eprintln!("{}\n", output_header());
    match command_handlers::run_cli(args) {
        Ok(output) => println!("{output}"),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(err.exit_code);
        }
    }
}
