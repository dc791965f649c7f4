use flowpulse::status::ExitStatus;

/// Entry point - returns ExitStatus directly, which implements std::process::Termination.
fn main() -> ExitStatus {
    let args: Vec<String> = std::env::args().collect();
    flowpulse::core::run(args)
}
