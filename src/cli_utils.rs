use indicatif::{ProgressBar, ProgressStyle};

/// Spinner drawn on stderr while the data file is read. Hidden in quiet mode.
pub fn create_spinner(quiet_mode: bool, msg: &str) -> ProgressBar {
    let spinner = match quiet_mode {
        true => ProgressBar::hidden(),
        false => ProgressBar::new_spinner(),
    };

    spinner.set_style(ProgressStyle::default_spinner().template("[{elapsed_precise}] {msg} {spinner:.green}"));
    spinner.set_message(msg);

    spinner.inc(0);    // Just to avoid the drawing after the log.

    spinner
}
