//! Line protocol: parsing inbound commands, rendering outbound lines.
//!
//! One inbound line is one command or one chat message; one outbound line
//! is one notification. Server notices are prefixed with `* ` so clients
//! can tell them apart from relayed partner messages, which are delivered
//! verbatim.

use tandem_core::{NotificationBody, Payload};

use crate::registry::BroadcastReport;

/// A parsed inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start` — request a match.
    Start,

    /// `/next` — skip the current partner and search again.
    Next,

    /// `/end` — end the current session.
    End,

    /// `/help` — list available commands.
    Help,

    /// `/admin <token>` — authenticate as administrator.
    Admin(String),

    /// `/stats` — report population counters (admin only).
    Stats,

    /// `/broadcast <text>` — send a notice to every known participant
    /// (admin only).
    Broadcast(String),

    /// An unrecognized `/command`.
    Unknown(String),

    /// Any other line: a chat message for the current partner.
    Say(String),
}

/// Parse one inbound line. Returns `None` for blank lines.
pub fn parse_line(line: &str) -> Option<Command> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    if !trimmed.starts_with('/') {
        // Chat text is forwarded as typed, not trimmed.
        return Some(Command::Say(line.to_owned()));
    }

    let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim_start()),
        None => (trimmed, ""),
    };

    let command = match keyword {
        "/start" => Command::Start,
        "/next" => Command::Next,
        "/end" => Command::End,
        "/help" => Command::Help,
        "/stats" => Command::Stats,
        "/admin" => Command::Admin(rest.to_owned()),
        "/broadcast" => Command::Broadcast(rest.to_owned()),
        other => Command::Unknown(other.to_owned()),
    };
    Some(command)
}

/// Render a notification body as one outbound line.
pub fn render_notification(body: &NotificationBody) -> String {
    match body {
        NotificationBody::Matched => notice("matched! you are now chatting, say hi"),
        NotificationBody::Waiting => notice("waiting for a partner..."),
        NotificationBody::SearchingAgain => notice("left the chat, searching again..."),
        NotificationBody::PartnerLeft => notice("your partner left, use /start to find a new one"),
        NotificationBody::PartnerEnded => notice("your partner ended the chat"),
        NotificationBody::Ended => notice("chat ended, use /start to match again"),
        NotificationBody::LeftQueue => notice("you left the waiting queue"),
        NotificationBody::AlreadyPaired => notice("you are already in a chat, use /next or /end"),
        NotificationBody::StillWaiting => notice("still waiting for a partner..."),
        NotificationBody::NotInSession => notice("you are not in a chat, use /start to match"),
        NotificationBody::PayloadRejected => notice("message blocked: plain text without links only"),
        NotificationBody::Message(Payload::Text(text)) => text.clone(),
        NotificationBody::Message(Payload::Binary(_)) => notice("[non-text payload]"),
    }
}

/// Lines sent to every new connection.
pub fn welcome_lines() -> Vec<String> {
    vec![
        notice("welcome to tandem, an anonymous pair chat"),
        notice("use /start to find a partner, /help for commands"),
    ]
}

/// Lines sent in reply to `/help`.
pub fn help_lines() -> Vec<String> {
    vec![
        notice("/start  find a partner"),
        notice("/next   skip the current partner and search again"),
        notice("/end    end the current chat"),
        notice("/help   this text"),
    ]
}

/// Reply to an `/admin` attempt.
pub fn admin_reply(granted: bool) -> String {
    if granted { notice("admin access granted") } else { notice("not authorized") }
}

/// Reply to a non-admin issuing an admin command.
pub fn not_authorized() -> String {
    notice("not authorized")
}

/// Population counters for `/stats`.
pub fn stats_line(all: usize, active_pairs: usize, waiting: usize) -> String {
    notice(&format!("users={all} active_pairs={active_pairs} waiting={waiting}"))
}

/// A broadcast notice as delivered to each participant.
pub fn broadcast_line(text: &str) -> String {
    notice(&format!("announcement: {text}"))
}

/// Delivery summary reported back to the broadcasting admin.
pub fn broadcast_report_line(report: &BroadcastReport) -> String {
    notice(&format!("broadcast delivered={} failed={}", report.delivered, report.failed))
}

/// Reply to an unrecognized command.
pub fn unknown_command(keyword: &str) -> String {
    notice(&format!("unknown command {keyword}, try /help"))
}

fn notice(text: &str) -> String {
    format!("* {text}")
}
