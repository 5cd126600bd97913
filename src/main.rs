fn main() {
    if let Err(err) = chartboard::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
