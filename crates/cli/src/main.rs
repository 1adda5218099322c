use std::process::ExitCode;

fn main() -> ExitCode {
    scoutbook_cli::run()
}
