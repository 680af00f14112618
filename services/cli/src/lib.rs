mod cli;
mod demo;
mod infra;

use excuse_ladder::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
