use std::process::ExitCode;

fn main() -> ExitCode {
    tf_steps::contract::run(|text, _| tf_steps::sentiment_json(text))
}
