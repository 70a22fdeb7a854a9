fn main() {
    if let Err(err) = gluconote_lib::run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
