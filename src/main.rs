fn main() {
    if let Err(err) = cdr_loader::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
