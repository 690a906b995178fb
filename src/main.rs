fn main() {
    if let Err(err) = donor_ledger::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
