//! Plain-text rendering of listings for the terminal

use emails::{EmailRecord, EmailView};

const SENDER_WIDTH: usize = 32;

/// One listing row: unread and starred markers, date, sender, subject
pub fn email_line(email: &EmailRecord) -> String {
    let unread = if email.is_read { ' ' } else { 'U' };
    let starred = if email.is_starred { '*' } else { ' ' };
    format!(
        "{}{} {:<10}  {:<width$}  {}",
        unread,
        starred,
        email.formatted_date(),
        truncate(&email.from, SENDER_WIDTH),
        email.subject,
        width = SENDER_WIDTH
    )
}

/// Visible page of a view followed by its pagination line
pub fn view_listing(view: &EmailView) -> String {
    let mut out = String::new();
    for email in view.current_page() {
        out.push_str(&email_line(email));
        out.push('\n');
    }
    out.push_str(&format!(
        "[{}] {}",
        view.kind(),
        view.formatted_pagination()
    ));
    out
}

/// Full record for `show`
pub fn email_detail(email: &EmailRecord) -> String {
    let mut out = format!(
        "Id:         {}\nMessage-ID: {}\nDate:       {}\nFrom:       {}\nTo:         {}\n",
        email.id,
        email.message_id,
        email.formatted_date(),
        email.from,
        email.to.join(", ")
    );
    if !email.cc.is_empty() {
        out.push_str(&format!("Cc:         {}\n", email.cc.join(", ")));
    }
    if !email.bcc.is_empty() {
        out.push_str(&format!("Bcc:        {}\n", email.bcc.join(", ")));
    }
    out.push_str(&format!("Subject:    {}\n\n{}", email.subject, email.body));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
