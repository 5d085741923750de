use colored::Colorize;

fn main() {
    env_logger::init();
    let command_line_interface = pydgen::cli::CommandLineInterface::load();
    if let Err(error) = command_line_interface.run() {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
