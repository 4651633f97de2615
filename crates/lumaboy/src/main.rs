use lumaboy::{Options, USAGE};

fn main() {
    env_logger::init();

    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(err) = lumaboy::run(&options) {
        eprintln!("lumaboy: {err:#}");
        std::process::exit(1);
    }
}
