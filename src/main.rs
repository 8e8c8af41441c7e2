fn main() {
    if let Err(e) = farm_assist_lib::run() {
        eprintln!("farm-assist: {:#}", e);
        std::process::exit(1);
    }
}
