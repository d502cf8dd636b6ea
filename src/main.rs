fn main() -> std::process::ExitCode {
    guardctl_lib::run()
}
