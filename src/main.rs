use std::process::ExitCode;

use rogit::ui::output;

fn main() -> ExitCode {
    match rogit::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
