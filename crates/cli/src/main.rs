use std::process::ExitCode;

fn main() -> ExitCode {
    seoquote_cli::run()
}
