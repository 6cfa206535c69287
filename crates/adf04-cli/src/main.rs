fn main() {
    std::process::exit(adf04_cli::cli::run_from_env());
}
