use std::process::ExitCode;

fn main() -> ExitCode {
    aireports::cli::main()
}
