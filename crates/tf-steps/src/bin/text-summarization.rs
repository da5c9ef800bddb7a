use std::process::ExitCode;

use tf_steps::summarize::{sentence_count, summarize_text, DEFAULT_SENTENCES};

fn main() -> ExitCode {
    tf_steps::contract::run(|text, extra| {
        let count = sentence_count(extra.first().map(String::as_str)).unwrap_or_else(|raw| {
            eprintln!(
                "Warning: Invalid number of sentences '{raw}'. Using default of {DEFAULT_SENTENCES}."
            );
            DEFAULT_SENTENCES
        });
        summarize_text(text, count)
    })
}
