fn main() {
    if let Err(err) = burdy_content::cli::run() {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
