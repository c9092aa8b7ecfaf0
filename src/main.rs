fn main() {
    if healthpredict_lib::run().is_err() {
        std::process::exit(1);
    }
}
