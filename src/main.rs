fn main() {
    if let Err(err) = snip_notes::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
