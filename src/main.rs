fn main() {
    if let Err(err) = csv_repair::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
