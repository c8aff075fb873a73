use anki_card_translator::translate::{
    errors_message,
    BatchHost,
    NoteError,
};
use dialoguer::Confirm;
use indicatif::{
    ProgressBar,
    ProgressStyle,
};

/// Batch host for an interactive terminal.
pub struct TerminalHost {
    assume_yes: bool,
    bar: Option<ProgressBar>,
}

impl TerminalHost {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes, bar: None }
    }
}

impl BatchHost for TerminalHost {
    fn confirm(&mut self, matched: usize, queued: usize) -> bool {
        let prompt = format!(
            "{matched} notes matched the search query.\n\
             {queued} notes will be sent for translation.\n\nProceed?"
        );
        if self.assume_yes {
            println!("{prompt} yes");
            return true;
        }

        match Confirm::new().with_prompt(prompt).default(false).interact() {
            Ok(answer) => answer,
            Err(e) => {
                log::error!("Confirmation prompt failed: {}", e);
                false
            }
        }
    }

    fn progress(&mut self, current: usize, total: usize) {
        let bar = self.bar.get_or_insert_with(|| {
            let style = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            ProgressBar::new(total as u64).with_style(style)
        });
        bar.set_position(current as u64);
        bar.set_message(format!("Translating note {current}/{total}..."));
    }

    fn finish_progress(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn notify(&mut self, message: &str) {
        println!("{message}");
    }

    fn report_errors(&mut self, errors: &[NoteError]) {
        eprintln!("\n{}", errors_message(errors));
    }
}
