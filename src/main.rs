fn main() {
    if let Err(err) = dynamic_reports::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
