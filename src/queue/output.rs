//! Output routing for commands
//!
//! Where a message goes depends on the queue's client:
//!
//! | client                          | `print`               | `error`                           |
//! |---------------------------------|-----------------------|-----------------------------------|
//! | none (configuration loading)    | dropped               | recorded in the cause sink        |
//! | control mode or no session      | stdout buffer         | stderr buffer, return value 1     |
//! | attached interactively          | active pane overlay   | status line, first letter capital |
//!
//! Guard lines (`%begin`, `%end`, `%error`) are written for control clients only.

use super::CmdQueue;

/// Replace anything that is not printable ASCII with `_`, for clients that
/// cannot display UTF-8
pub fn utf8_sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| if c == ' ' || c.is_ascii_graphic() { c } else { '_' })
        .collect()
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl CmdQueue {
    /// Show a message from a command
    pub fn print(&self, message: &str) {
        let Some(client) = self.client() else {
            return;
        };

        let session = {
            let mut c = client.borrow_mut();
            let session = if c.is_control() {
                None
            } else {
                c.session().cloned()
            };
            if session.is_none() {
                let line = if c.has_utf8() {
                    message.to_string()
                } else {
                    utf8_sanitize(message)
                };
                c.write_stdout(&line);
                c.write_stdout("\n");
                c.push_stdout();
            }
            session
        };

        if let Some(session) = session {
            let mut s = session.borrow_mut();
            let pane = s.active_pane_mut();
            if !pane.is_output_mode() {
                pane.reset_mode();
                pane.enter_output_mode();
            }
            pane.add_output(message);
        }
    }

    /// Show an error from a command
    pub fn error(&self, message: &str) {
        let Some(client) = self.client() else {
            let (file, line) = self
                .current_command()
                .map(|cmd| (cmd.file, cmd.line))
                .unwrap_or((None, 0));
            self.causes().add_cause(file.as_deref(), line, message);
            return;
        };

        let mut c = client.borrow_mut();
        if c.session().is_none() || c.is_control() {
            let line = if c.has_utf8() {
                message.to_string()
            } else {
                utf8_sanitize(message)
            };
            c.write_stderr(&line);
            c.write_stderr("\n");
            c.push_stderr();
            c.retval = 1;
        } else {
            c.set_message(capitalize(message));
        }
    }

    /// Write a guard line marking a command phase for control clients
    pub fn guard(&self, guard: &str, flags: i32) {
        let Some(client) = self.client() else {
            return;
        };
        let mut c = client.borrow_mut();
        if !c.is_control() {
            return;
        }

        let line = format!("%{} {} {} {}\n", guard, self.time(), self.number(), flags);
        c.write_stdout(&line);
        c.push_stdout();
    }
}
