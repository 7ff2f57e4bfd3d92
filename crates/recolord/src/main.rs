use std::process::ExitCode;

fn main() -> ExitCode {
    match recolord::run_service() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("recolord: {error}");
            ExitCode::FAILURE
        }
    }
}
