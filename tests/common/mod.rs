use assert_cmd::Command;

pub fn goaltrackd_bin() -> Command {
    #[allow(deprecated)]
    {
        Command::cargo_bin("goaltrackd").expect("goaltrackd test binary should build")
    }
}
