fn main() {
    env_logger::init();

    if let Err(err) = yolt2tfrecord::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
