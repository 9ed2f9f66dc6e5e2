fn main() {
    straw_cli::init_logging();
    std::process::exit(straw_cli::run_cli_from_args(std::env::args_os()));
}
