fn main() {
    if let Err(err) = flowtab::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
