use std::process::ExitCode;

fn main() -> ExitCode {
    rfqmap_cli::run()
}
