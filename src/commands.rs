//! Built-in commands
//!
//! A small command set used by the `mosaicmux` binary and by tests. Each one
//! exercises a different queue outcome.

use crate::models::{Command, CommandEntry, CommandFlags};
use crate::parse::CommandTable;
use crate::queue::{CmdQueue, CmdRetval};

fn cmd_display_message(cmd: &Command, cmdq: &CmdQueue) -> CmdRetval {
    cmdq.print(&cmd.args.join(" "));
    CmdRetval::Normal
}

fn cmd_fail(cmd: &Command, cmdq: &CmdQueue) -> CmdRetval {
    if cmd.args.is_empty() {
        cmdq.error("command failed");
    } else {
        cmdq.error(&cmd.args.join(" "));
    }
    CmdRetval::Error
}

fn cmd_stop_queue(_cmd: &Command, cmdq: &CmdQueue) -> CmdRetval {
    debug!(cmdq = %cmdq.id(), pending = cmdq.len(), "stopping queue");
    CmdRetval::Stop
}

fn cmd_wait(_cmd: &Command, _cmdq: &CmdQueue) -> CmdRetval {
    CmdRetval::Wait
}

fn cmd_set_exit(_cmd: &Command, cmdq: &CmdQueue) -> CmdRetval {
    cmdq.request_client_exit();
    CmdRetval::Normal
}

/// Register the built-in commands into `table`
pub fn register_builtins(table: &mut CommandTable) {
    table.register(
        CommandEntry::new("display-message", cmd_display_message)
            .with_alias("display")
            .with_usage("[message ...]")
            .with_flags(CommandFlags::AFTER_HOOK),
    );
    table.register(CommandEntry::new("fail", cmd_fail).with_usage("[message ...]"));
    table.register(CommandEntry::new("stop-queue", cmd_stop_queue).with_alias("stop"));
    table.register(CommandEntry::new("wait", cmd_wait));
    table.register(CommandEntry::new("set-exit", cmd_set_exit));
}

/// A table holding only the built-in commands
pub fn builtin_table() -> CommandTable {
    let mut table = CommandTable::new();
    register_builtins(&mut table);
    table
}
