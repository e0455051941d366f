fn main() {
    if let Err(err) = minion::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
