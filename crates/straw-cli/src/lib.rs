use std::ffi::OsString;

use clap::Parser;

mod cli_args;
mod commands;
mod error_map;
mod logging;

pub use logging::{init_logging, DEFAULT_LOG_FILTER};

pub(crate) use cli_args::{Cli, InfoArgs, Mode, RunArgs, SuiteArgs};
pub(crate) use error_map::{
    emit_error, map_cli_output_json, map_cli_script_read, map_scene, map_tool,
    CliError,
};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, CliError> {
    match cli.command {
        Mode::Run(args) => commands::run_scripts(args),
        Mode::Suite(args) => commands::run_suite(args),
        Mode::Info(args) => commands::run_info(args),
    }
}
