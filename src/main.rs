fn main() {
    if let Err(err) = seccheck::cli::run() {
        seccheck::ui::eprintln_error(&err);
        std::process::exit(seccheck::exit::exit_code(&err));
    }
}
