use std::process::ExitCode;

use poetry_uvify::main as poetry_uvify_main;

fn main() -> ExitCode {
    poetry_uvify_main(std::env::args_os())
}
