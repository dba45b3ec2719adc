fn main() {
    if let Err(e) = artrestorer::cli::main() {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
