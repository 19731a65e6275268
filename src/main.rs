fn main() -> std::process::ExitCode {
    ui_coder_lib::run()
}
