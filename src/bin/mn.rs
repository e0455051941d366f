//! Short binary name (`mn`) that forwards to the `minion` library.

fn main() {
    if let Err(err) = minion::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
