fn main() {
    if let Err(err) = safedistance_lib::run() {
        eprintln!("safedistance: {err:?}");
        std::process::exit(1);
    }
}
