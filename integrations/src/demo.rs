//! Canned demo data.
//!
//! Returned in place of live results when a service has no credential
//! configured. Every record matches the normalized output of its operation.

use opsflow_credentials::Service;
use serde::{Deserialize, Serialize};

use crate::github::{Issue as GithubIssue, RepoInfo};
use crate::linear::Issue as LinearIssue;
use crate::resend::Email;
use crate::stripe::{Customer, Payment};
use crate::supabase::User;

pub fn github_issues() -> Vec<GithubIssue> {
    [
        (1, 142, "Login button not responding on mobile", "alex-dev", "open", "Jan 15, 2026"),
        (2, 141, "Dark mode toggle persists incorrectly", "sarah-ui", "open", "Jan 14, 2026"),
        (3, 140, "API rate limiting not working", "mike-backend", "open", "Jan 13, 2026"),
        (4, 139, "Memory leak in dashboard component", "alex-dev", "closed", "Jan 12, 2026"),
        (5, 138, "Stripe webhook failing silently", "payment-bot", "open", "Jan 11, 2026"),
    ]
    .into_iter()
    .map(|(id, number, title, user, state, created_at)| GithubIssue {
        id,
        number,
        title: title.to_string(),
        user: user.to_string(),
        state: state.to_string(),
        created_at: created_at.to_string(),
    })
    .collect()
}

pub fn github_repo() -> RepoInfo {
    RepoInfo {
        name: "acme/web-platform".to_string(),
        description: Some("Main web application for Acme Corp".to_string()),
        stars: 1247,
        forks: 89,
        open_issues: 23,
        language: Some("TypeScript".to_string()),
    }
}

pub fn stripe_customer() -> Customer {
    Customer {
        id: "cus_Qx7mN9kL2pR4".to_string(),
        email: "alex@startup.io".to_string(),
        name: Some("Alex Thompson".to_string()),
        created: "Mar 15, 2025".to_string(),
        balance: -50.0,
    }
}

pub fn stripe_payments() -> Vec<Payment> {
    [
        ("pi_3Nx9mK2eZv", 299.0, "succeeded", "Jan 15, 2026"),
        ("pi_3Nx8jL1fYw", 299.0, "succeeded", "Dec 15, 2025"),
        ("pi_3Nx7kM0gXx", 99.0, "refunded", "Nov 15, 2025"),
        ("pi_3Nx6lN9hYy", 299.0, "succeeded", "Oct 15, 2025"),
    ]
    .into_iter()
    .map(|(id, amount, status, created)| Payment {
        id: id.to_string(),
        amount,
        currency: "USD".to_string(),
        status: status.to_string(),
        created: created.to_string(),
    })
    .collect()
}

pub fn supabase_user() -> User {
    User {
        id: "usr_8f7e6d5c4b3a".to_string(),
        email: "alex@startup.io".to_string(),
        plan: Some("Pro".to_string()),
        created_at: "Mar 15, 2025".to_string(),
    }
}

pub fn linear_issues() -> Vec<LinearIssue> {
    [
        ("lin_1", "ENG-423", "Implement SSO authentication", "In Progress", 1),
        ("lin_2", "ENG-422", "Fix dashboard loading performance", "Todo", 2),
        ("lin_3", "ENG-421", "Add export to CSV feature", "Done", 3),
        ("lin_4", "ENG-420", "Update API documentation", "In Review", 2),
    ]
    .into_iter()
    .map(|(id, identifier, title, state, priority)| LinearIssue {
        id: id.to_string(),
        identifier: identifier.to_string(),
        title: title.to_string(),
        state: state.to_string(),
        priority,
    })
    .collect()
}

pub fn resend_emails() -> Vec<Email> {
    [
        ("em_1", "alex@startup.io", "Welcome to OpsFlow!", "Jan 15, 2026 10:30 AM"),
        ("em_2", "alex@startup.io", "Your invoice is ready", "Jan 14, 2026 2:15 PM"),
        ("em_3", "team@startup.io", "Weekly metrics report", "Jan 13, 2026 9:00 AM"),
    ]
    .into_iter()
    .map(|(id, to, subject, created_at)| Email {
        id: id.to_string(),
        to: to.to_string(),
        subject: subject.to_string(),
        created_at: created_at.to_string(),
    })
    .collect()
}

/// Severity of an activity event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One entry of the cross-service activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: String,
    pub source: Service,
    pub timestamp: String,
    pub description: String,
    pub level: ActivityLevel,
}

/// Recent activity across every service, newest first.
pub fn activity() -> Vec<ActivityEvent> {
    use ActivityLevel::{Info, Success, Warning};

    [
        (Service::Github, "10:42 AM", "Issue #142 opened: Login button not responding", Info),
        (Service::Stripe, "10:38 AM", "Payment of $299.00 succeeded", Success),
        (Service::Supabase, "10:35 AM", "User alex@startup.io upgraded to Pro", Success),
        (Service::Linear, "10:30 AM", "ENG-423 moved to In Progress", Info),
        (Service::Resend, "10:25 AM", "Welcome email sent to alex@startup.io", Success),
        (Service::Github, "10:20 AM", "PR #89 merged to main", Success),
        (Service::Stripe, "10:15 AM", "Refund processed for $99.00", Warning),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (source, timestamp, description, level))| ActivityEvent {
        id: (index + 1).to_string(),
        source,
        timestamp: timestamp.to_string(),
        description: description.to_string(),
        level,
    })
    .collect()
}

/// A named numeric series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub title: String,
    pub unit: Option<String>,
    pub points: Vec<(String, f64)>,
}

fn weekly(title: &str, unit: Option<&str>, values: [f64; 7]) -> MetricSeries {
    const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    MetricSeries {
        title: title.to_string(),
        unit: unit.map(str::to_string),
        points: DAYS
            .iter()
            .zip(values)
            .map(|(day, value)| ((*day).to_string(), value))
            .collect(),
    }
}

/// Weekly revenue in dollars.
pub fn revenue() -> MetricSeries {
    weekly(
        "Weekly Revenue",
        Some("$"),
        [4200.0, 3800.0, 5100.0, 4600.0, 5800.0, 3200.0, 2900.0],
    )
}

/// Weekly active users.
pub fn active_users() -> MetricSeries {
    weekly(
        "Active Users",
        None,
        [1240.0, 1380.0, 1520.0, 1450.0, 1680.0, 890.0, 760.0],
    )
}
