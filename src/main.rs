use std::process::ExitCode;

fn main() -> ExitCode {
    match addon_steward::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(denied) = err.downcast_ref::<addon_steward::cli::commands::NotAuthorized>() {
                eprintln!("{}", denied);
            } else {
                eprintln!("error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}
